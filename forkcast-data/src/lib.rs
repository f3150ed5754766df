//! Data access for the forkcast recommender.
//!
//! Responsibilities:
//! - Load restaurant catalogs from JSON exports.
//! - Build the TF-IDF similarity index offline and persist it as an artefact.
//! - Provide the HTTP geocoder used to resolve user addresses.
//!
//! Boundaries:
//! - Do not encode ranking rules (live in `forkcast-core`).
//! - Keep blocking I/O off async executors.

#![forbid(unsafe_code)]

pub mod artefact;
pub mod catalog;
pub mod fs;
pub mod geocode;
pub mod tfidf;

pub use artefact::{
    ArtefactError, SIMILARITY_INDEX_MAGIC, SIMILARITY_INDEX_VERSION, read_similarity_index,
    write_similarity_index,
};
pub use catalog::{CatalogFormatError, CatalogLoadError, load_catalog, read_catalog};
pub use geocode::{GeocoderBuildError, HttpGeocoder, HttpGeocoderConfig};
pub use tfidf::{ENGLISH_STOP_WORDS, TfIdfBuilder};
