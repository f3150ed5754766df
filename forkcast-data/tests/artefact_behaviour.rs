//! Behavioural tests for catalog loading and similarity artefacts.
//!
//! Each scenario works inside its own temporary directory.

use camino::{Utf8Path, Utf8PathBuf};
use forkcast_core::{Catalog, DenseSimilarityMatrix};
use forkcast_data::{
    ArtefactError, TfIdfBuilder, load_catalog, read_similarity_index, write_similarity_index,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tempfile::TempDir;

const EXPORT: &str = r#"[
  {"names": "Roma", "cuisine": "Italian, Pizza", "signature dishes": "Margherita",
   "price_for_two": "800", "ratings": "4.3/5", "location": "Indiranagar",
   "latitude": 12.97, "longitude": 77.64},
  {"names": "Napoli", "cuisine": "Italian, Pizza", "signature dishes": "Calzone",
   "price_for_two": 650, "ratings": 4.1, "location": "Koramangala",
   "latitude": 12.93, "longitude": 77.62},
  {"names": "Dragon Wok", "cuisine": "Chinese", "signature dishes": "Dim Sum",
   "price_for_two": "1,200", "ratings": "NEW", "location": "Jayanagar"}
]"#;

#[fixture]
fn workspace() -> TempDir {
    TempDir::new().expect("create temp dir")
}

#[fixture]
fn catalog_path() -> RefCell<Option<Utf8PathBuf>> {
    RefCell::new(None)
}

#[fixture]
fn catalog() -> RefCell<Option<Catalog>> {
    RefCell::new(None)
}

#[fixture]
fn matrix() -> RefCell<Option<DenseSimilarityMatrix>> {
    RefCell::new(None)
}

#[fixture]
fn artefact_path() -> RefCell<Option<Utf8PathBuf>> {
    RefCell::new(None)
}

#[fixture]
fn read_error() -> RefCell<Option<ArtefactError>> {
    RefCell::new(None)
}

fn root(workspace: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(workspace.path().to_path_buf()).expect("utf-8 temp path")
}

fn stored_path(cell: &RefCell<Option<Utf8PathBuf>>) -> Utf8PathBuf {
    cell.borrow().clone().expect("path must be initialised")
}

fn write_file(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write fixture file");
}

// --- Given steps ---

#[given("a catalog export with three restaurants")]
fn catalog_export(
    #[from(workspace)] workspace: &TempDir,
    #[from(catalog_path)] catalog_path: &RefCell<Option<Utf8PathBuf>>,
) {
    let path = root(workspace).join("catalog.json");
    write_file(&path, EXPORT.as_bytes());
    *catalog_path.borrow_mut() = Some(path);
}

#[given("an artefact file with a foreign header")]
fn foreign_artefact(
    #[from(workspace)] workspace: &TempDir,
    #[from(artefact_path)] artefact_path: &RefCell<Option<Utf8PathBuf>>,
) {
    let path = root(workspace).join("similarity.bin");
    write_file(&path, b"PK\x03\x04not an index");
    *artefact_path.borrow_mut() = Some(path);
}

// --- When steps ---

#[when("the catalog is loaded and indexed")]
fn load_and_index(
    #[from(catalog_path)] catalog_path: &RefCell<Option<Utf8PathBuf>>,
    #[from(catalog)] catalog: &RefCell<Option<Catalog>>,
    #[from(matrix)] matrix: &RefCell<Option<DenseSimilarityMatrix>>,
) {
    let loaded = load_catalog(&stored_path(catalog_path)).expect("catalog should load");
    let built = TfIdfBuilder::new().build(&loaded).expect("index should build");
    *catalog.borrow_mut() = Some(loaded);
    *matrix.borrow_mut() = Some(built);
}

#[when("the index is written to the artefacts directory")]
fn persist_index(
    #[from(workspace)] workspace: &TempDir,
    #[from(matrix)] matrix: &RefCell<Option<DenseSimilarityMatrix>>,
    #[from(artefact_path)] artefact_path: &RefCell<Option<Utf8PathBuf>>,
) {
    let path = root(workspace).join("artefacts/similarity.bin");
    let guard = matrix.borrow();
    let built = guard.as_ref().expect("matrix must be built");
    write_similarity_index(&path, built).expect("artefact should persist");
    *artefact_path.borrow_mut() = Some(path);
}

#[when("the artefact is read")]
fn read_artefact(
    #[from(artefact_path)] artefact_path: &RefCell<Option<Utf8PathBuf>>,
    #[from(read_error)] read_error: &RefCell<Option<ArtefactError>>,
) {
    let err = read_similarity_index(&stored_path(artefact_path)).expect_err("foreign file");
    *read_error.borrow_mut() = Some(err);
}

// --- Then steps ---

#[then("the catalog holds three restaurants")]
fn holds_three(#[from(catalog)] catalog: &RefCell<Option<Catalog>>) {
    let guard = catalog.borrow();
    let loaded = guard.as_ref().expect("catalog must be loaded");
    let names: Vec<&str> = loaded.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Roma", "Napoli", "Dragon Wok"]);
    assert_eq!(loaded.get(2).map(|r| r.price_for_two), Some(1200));
    assert_eq!(loaded.get(2).map(|r| r.coordinates), Some(None));
}

#[then("the two pizza places are the most similar pair")]
fn pizza_pair(#[from(matrix)] matrix: &RefCell<Option<DenseSimilarityMatrix>>) {
    let guard = matrix.borrow();
    let built = guard.as_ref().expect("matrix must be built");
    let pizza = built.get(0, 1).expect("in range");
    assert!(pizza > built.get(0, 2).expect("in range"));
    assert!(pizza > built.get(1, 2).expect("in range"));
}

#[then("reloading the artefact yields the same matrix")]
fn reloads(
    #[from(matrix)] matrix: &RefCell<Option<DenseSimilarityMatrix>>,
    #[from(artefact_path)] artefact_path: &RefCell<Option<Utf8PathBuf>>,
) {
    let reloaded = read_similarity_index(&stored_path(artefact_path)).expect("artefact loads");
    assert_eq!(matrix.borrow().as_ref(), Some(&reloaded));
}

#[then("an invalid magic error is reported")]
fn invalid_magic(#[from(read_error)] read_error: &RefCell<Option<ArtefactError>>) {
    let guard = read_error.borrow();
    assert!(matches!(
        guard.as_ref(),
        Some(ArtefactError::InvalidMagic { found, .. }) if found == b"PK\x03\x04"
    ));
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $index:literal) => {
        #[scenario(path = "tests/features/artefacts.feature", index = $index)]
        fn $fn_name(
            workspace: TempDir,
            catalog_path: RefCell<Option<Utf8PathBuf>>,
            catalog: RefCell<Option<Catalog>>,
            matrix: RefCell<Option<DenseSimilarityMatrix>>,
            artefact_path: RefCell<Option<Utf8PathBuf>>,
            read_error: RefCell<Option<ArtefactError>>,
        ) {
            let _ = (
                workspace,
                catalog_path,
                catalog,
                matrix,
                artefact_path,
                read_error,
            );
        }
    };
}

register_scenario!(export_becomes_index, 0);
register_scenario!(persisted_index_reloads, 1);
register_scenario!(foreign_file_refused, 2);
