//! Core domain types and the recommendation pipeline for Forkcast.
//!
//! The crate is free of I/O. Catalog loading, similarity index artefacts and
//! HTTP geocoding live in `forkcast-data`; this crate only consumes them
//! through [`Catalog`], [`SimilarityIndex`] and [`Geocoder`].

#![forbid(unsafe_code)]

pub mod distance;
pub mod filter;
pub mod fuzzy;
pub mod geocode;
pub mod rank;
pub mod recommend;
pub mod request;
pub mod restaurant;
pub mod similarity;

#[doc(hidden)]
pub mod test_support;

pub use distance::{EARTH_RADIUS_KM, haversine_km};
pub use filter::{Constraints, filter_by_constraints, filter_by_cuisine, filter_by_location, relax};
pub use fuzzy::{FuzzyMatch, MATCH_THRESHOLD};
pub use geocode::{GeocodeError, Geocoder, resolve_location};
pub use rank::{RankingMode, Ranker, Recommendation, ScoreWeights, ScoreWeightsError};
pub use recommend::{
    AppContext, ContextError, MatchOutcome, NoRecommendation, Recommendations, Recommender,
};
pub use request::{
    DEFAULT_MAX_PRICE, DEFAULT_RADIUS_KM, DEFAULT_TOP_N, RecommendationRequest, RequestError,
};
pub use restaurant::{Catalog, CatalogError, Restaurant, RestaurantId};
pub use similarity::{DenseSimilarityMatrix, SimilarityError, SimilarityIndex};
