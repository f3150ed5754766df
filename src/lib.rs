//! Facade crate for the forkcast restaurant recommender.
//!
//! This crate re-exports the core pipeline types and exposes catalog loading,
//! similarity artefacts and HTTP geocoding behind the `data` feature.

#![forbid(unsafe_code)]

pub use forkcast_core::{
    AppContext, Catalog, DenseSimilarityMatrix, GeocodeError, Geocoder, MatchOutcome,
    NoRecommendation, RankingMode, Recommendation, RecommendationRequest, Recommendations,
    Recommender, Restaurant, SimilarityIndex,
};

#[cfg(feature = "data")]
pub use forkcast_data::{
    HttpGeocoder, HttpGeocoderConfig, TfIdfBuilder, load_catalog, read_similarity_index,
    write_similarity_index,
};
