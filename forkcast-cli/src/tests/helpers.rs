//! Test helpers for preparing catalog artefacts on disk.

use camino::{Utf8Path, Utf8PathBuf};
use geo::Coord;
use tempfile::TempDir;

use crate::build_index::{BuildIndexConfig, build_index};

/// Three Bengaluru restaurants within 7 km of MG Road; only MTR fits a 500
/// budget.
pub(super) const CATALOG_JSON: &str = r#"[
  {"names": "Toit", "cuisine": "Pub, Continental", "signature dishes": "Wings",
   "price_for_two": "1,500", "ratings": "4.7/5", "location": "Indiranagar",
   "more_info": "Craft beer, live sports", "latitude": 12.9784, "longitude": 77.6408},
  {"names": "Truffles", "cuisine": "Burger, American", "signature dishes": "Cheeseburger",
   "price_for_two": 900, "ratings": 4.5, "location": "Koramangala",
   "latitude": 12.9333, "longitude": 77.6145},
  {"names": "MTR", "cuisine": "South Indian", "signature dishes": "Rava Idli, Dosa",
   "price_for_two": 300, "ratings": 4.6, "location": "Basavanagudi",
   "latitude": 12.9551, "longitude": 77.5855}
]"#;

/// Search centre on MG Road.
pub(super) const MG_ROAD: Coord<f64> = Coord {
    x: 77.5946,
    y: 12.9716,
};

pub(super) struct Artefacts {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Artefacts {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub(super) fn catalog(&self) -> Utf8PathBuf {
        self.root.join("catalog.json")
    }

    pub(super) fn similarity_index(&self) -> Utf8PathBuf {
        self.root.join("similarity.bin")
    }

    /// Write the catalog and build its similarity index.
    pub(super) fn prepare(&self) {
        write_utf8(&self.catalog(), CATALOG_JSON.as_bytes());
        let config = BuildIndexConfig {
            catalog: self.catalog(),
            output: self.similarity_index(),
        };
        build_index(&config, &mut Vec::new()).expect("index should build");
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write fixture file");
}
