//! Focused unit tests covering the build-index command.

use super::helpers::{Artefacts, CATALOG_JSON, write_utf8};
use super::*;
use crate::build_index::{BuildIndexArgs, BuildIndexConfig, build_index};
use camino::Utf8PathBuf;
use forkcast_data::read_similarity_index;
use rstest::rstest;

#[rstest]
fn converting_without_catalog_errors() {
    let err = BuildIndexConfig::try_from(BuildIndexArgs::default())
        .expect_err("missing catalog should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_CATALOG);
            assert_eq!(env, ENV_BUILD_INDEX_CATALOG);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[case("data/catalog.json", "data/similarity.bin")]
#[case("catalog.json", "similarity.bin")]
fn output_defaults_beside_the_catalog(#[case] catalog: &str, #[case] expected: &str) {
    let args = BuildIndexArgs {
        catalog: Some(Utf8PathBuf::from(catalog)),
        output: None,
    };
    let config = BuildIndexConfig::try_from(args).expect("config should build");
    assert_eq!(config.output, Utf8PathBuf::from(expected));
}

#[rstest]
fn build_index_writes_a_loadable_matrix() {
    let artefacts = Artefacts::new();
    write_utf8(&artefacts.catalog(), CATALOG_JSON.as_bytes());
    let output = artefacts.root().join("out/similarity.bin");
    let config = BuildIndexConfig {
        catalog: artefacts.catalog(),
        output: output.clone(),
    };

    let mut stdout = Vec::new();
    build_index(&config, &mut stdout).expect("index should build");

    let matrix = read_similarity_index(&output).expect("index should load");
    assert_eq!(matrix.size(), 3);
    let printed = String::from_utf8(stdout).expect("stdout utf-8");
    assert!(printed.starts_with("wrote 3x3 similarity index"), "{printed}");
}

#[rstest]
fn build_index_reports_missing_catalogs() {
    let artefacts = Artefacts::new();
    let config = BuildIndexConfig {
        catalog: artefacts.catalog(),
        output: artefacts.similarity_index(),
    };
    let err = build_index(&config, &mut Vec::new()).expect_err("missing catalog");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_CATALOG),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn build_index_reports_malformed_catalogs() {
    let artefacts = Artefacts::new();
    write_utf8(&artefacts.catalog(), b"{ not a catalog");
    let config = BuildIndexConfig {
        catalog: artefacts.catalog(),
        output: artefacts.similarity_index(),
    };
    let err = build_index(&config, &mut Vec::new()).expect_err("malformed catalog");
    assert!(matches!(err, CliError::LoadCatalog(_)), "{err:?}");
}
