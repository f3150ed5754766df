//! Recommendation pipeline: proximity, constraints, relaxation, matching and
//! ranking.
//!
//! Stages run in a fixed order and each one can end the request early:
//!
//! 1. Without a user location there is nothing to search around.
//! 2. The location filter keeps restaurants within the radius.
//! 3. The constraint filter applies cuisine, budget and occasion.
//! 4. Fewer strict matches than requested widens the pool to every nearby
//!    restaurant of the right cuisine. If that is still short, the pool is
//!    returned ordered by rating.
//! 5. A liked restaurant is fuzzy-matched against the whole catalog. A
//!    confident match anchors similarity ranking; an unconfident one falls
//!    back to rating order.
//! 6. The ranker blends similarity and rating and truncates the list.

use log::{debug, info, warn};
use thiserror::Error;

use crate::{
    Catalog, DenseSimilarityMatrix, Geocoder, RankingMode, Ranker, Recommendation,
    RecommendationRequest, RequestError, Restaurant, RestaurantId, ScoreWeights,
    ScoreWeightsError, SimilarityIndex,
    filter::{filter_by_constraints, filter_by_location, relax},
    fuzzy::{FuzzyMatch, best_match},
    resolve_location,
};

/// Errors returned by [`AppContext::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The similarity index does not cover exactly the catalog's records.
    #[error("similarity index covers {index} records but the catalog has {catalog}")]
    DimensionMismatch {
        /// Catalog size.
        catalog: usize,
        /// Index size.
        index: usize,
    },
}

/// Process-wide, read-only state shared by every request.
///
/// Build it once at start-up and lend it to [`Recommender`]s.
#[derive(Debug, Clone)]
pub struct AppContext<S = DenseSimilarityMatrix> {
    catalog: Catalog,
    index: S,
}

impl<S: SimilarityIndex> AppContext<S> {
    /// Pair a catalog with its similarity index.
    ///
    /// # Errors
    /// Returns [`ContextError::DimensionMismatch`] when the index size does
    /// not equal the catalog size.
    pub fn new(catalog: Catalog, index: S) -> Result<Self, ContextError> {
        if catalog.len() != index.len() {
            return Err(ContextError::DimensionMismatch {
                catalog: catalog.len(),
                index: index.len(),
            });
        }
        Ok(Self { catalog, index })
    }

    /// The restaurant catalog.
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The similarity index.
    pub const fn index(&self) -> &S {
        &self.index
    }

    /// Recommender with default score weights.
    #[must_use]
    pub fn recommender(&self) -> Recommender<'_, S> {
        Recommender::new(self)
    }
}

/// Why no list could be produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NoRecommendation {
    /// The address was missing or could not be geocoded.
    #[error("Please provide a valid address.")]
    NoCoordinates,
    /// Nothing in the catalog lies within the search radius.
    #[error("No restaurants found within {radius_km} km of your location.")]
    EmptyAfterLocationFilter {
        /// Radius that was searched.
        radius_km: f64,
    },
    /// Nothing nearby matches the cuisine, even after relaxation.
    #[error("No restaurants found matching your criteria.")]
    EmptyAfterConstraints,
    /// The request parameters were invalid.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),
}

/// How the liked restaurant influenced the ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// No liked restaurant was given.
    NotRequested,
    /// The candidate pool was too small for the liked restaurant to matter.
    NotConsulted,
    /// The liked restaurant resolved to a catalog entry.
    Matched(FuzzyMatch),
    /// No catalog name was similar enough; `best` is the closest attempt.
    Unreliable {
        /// Best candidate below the threshold, if any.
        best: Option<FuzzyMatch>,
    },
}

/// A ranked result list and how it came about.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendations<'a> {
    /// Ranked entries, at most `top_n`.
    pub entries: Vec<Recommendation<'a>>,
    /// Ordering used for `entries`.
    pub mode: RankingMode,
    /// Whether price and occasion were relaxed to fill the list.
    pub relaxed: bool,
    /// What happened to the liked restaurant.
    pub liked: MatchOutcome,
}

impl Recommendations<'_> {
    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Report whether the list is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the recommended restaurants in rank order.
    pub fn restaurants(&self) -> impl Iterator<Item = &Restaurant> {
        self.entries.iter().map(|entry| entry.restaurant)
    }
}

/// Runs the pipeline against a borrowed [`AppContext`].
///
/// # Examples
/// ```
/// use geo::Coord;
/// use forkcast_core::{
///     AppContext, Catalog, DenseSimilarityMatrix, RecommendationRequest, Restaurant,
/// };
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let catalog = Catalog::new(vec![
///     Restaurant::new(0, "Roma")
///         .with_cuisine("Italian")
///         .with_price_for_two(400)
///         .with_rating(4.5)
///         .with_coordinates(Coord { x: 0.01, y: 0.0 }),
/// ])?;
/// let index = DenseSimilarityMatrix::new(1, vec![1.0])?;
/// let context = AppContext::new(catalog, index)?;
///
/// let request = RecommendationRequest::new("italian", 500)
///     .with_user_location(Coord { x: 0.0, y: 0.0 });
/// let found = context.recommender().recommend(&request)?;
/// assert_eq!(found.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Recommender<'ctx, S = DenseSimilarityMatrix> {
    catalog: &'ctx Catalog,
    index: &'ctx S,
    ranker: Ranker,
}

impl<'ctx, S: SimilarityIndex> Recommender<'ctx, S> {
    /// Recommender with default 50/50 weights.
    #[must_use]
    pub fn new(context: &'ctx AppContext<S>) -> Self {
        Self {
            catalog: &context.catalog,
            index: &context.index,
            ranker: Ranker::new(context.catalog.max_rating()),
        }
    }

    /// Recommender with custom weights.
    ///
    /// # Errors
    /// Returns [`ScoreWeightsError`] when the weights fail validation.
    pub fn with_weights(self, weights: ScoreWeights) -> Result<Self, ScoreWeightsError> {
        Ok(Self {
            ranker: Ranker::with_weights(weights, self.catalog.max_rating())?,
            ..self
        })
    }

    /// Geocode `address` and run [`Recommender::recommend`].
    ///
    /// Any geocoding failure ends the request with
    /// [`NoRecommendation::NoCoordinates`] before any filtering happens.
    ///
    /// # Errors
    /// See [`Recommender::recommend`].
    pub fn recommend_at<G>(
        &self,
        geocoder: &G,
        address: &str,
        request: &RecommendationRequest,
    ) -> Result<Recommendations<'ctx>, NoRecommendation>
    where
        G: Geocoder + ?Sized,
    {
        let location =
            resolve_location(geocoder, address).ok_or(NoRecommendation::NoCoordinates)?;
        let located = request.clone().with_user_location(location);
        self.recommend(&located)
    }

    /// Produce recommendations for `request`.
    ///
    /// # Errors
    /// Returns [`NoRecommendation`] when the request is invalid, has no
    /// location, or filtering leaves nothing to recommend.
    pub fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Recommendations<'ctx>, NoRecommendation> {
        let center = request.user_location.ok_or(NoRecommendation::NoCoordinates)?;
        request.validate()?;
        let top_n = request.top_n;

        let nearby = filter_by_location(center, self.catalog, request.radius_km);
        debug!(
            "{} of {} restaurants within {} km",
            nearby.len(),
            self.catalog.len(),
            request.radius_km
        );
        if nearby.is_empty() {
            return Err(NoRecommendation::EmptyAfterLocationFilter {
                radius_km: request.radius_km,
            });
        }

        let constraints = request.constraints();
        let strict = filter_by_constraints(&nearby, &constraints);
        debug!("{} restaurants satisfy every constraint", strict.len());

        let relaxed = strict.len() < top_n;
        let candidates = if relaxed {
            let widened = relax(&strict, &nearby, &constraints.cuisine);
            info!(
                "relaxed price and occasion: {} strict matches widened to {}",
                strict.len(),
                widened.len()
            );
            widened
        } else {
            strict
        };

        if relaxed && candidates.len() < top_n {
            if candidates.is_empty() {
                return Err(NoRecommendation::EmptyAfterConstraints);
            }
            return Ok(self.by_rating(&candidates, top_n, true, MatchOutcome::NotConsulted));
        }

        let liked = self.resolve_liked(request.liked_restaurant());
        let reference = match &liked {
            MatchOutcome::Matched(found) => Some(found.index),
            MatchOutcome::Unreliable { .. } => {
                return Ok(self.by_rating(&candidates, top_n, relaxed, liked));
            }
            MatchOutcome::NotRequested | MatchOutcome::NotConsulted => None,
        };

        let (entries, mode) = self.rank(&candidates, reference, top_n);
        Ok(Recommendations {
            entries,
            mode,
            relaxed,
            liked,
        })
    }

    fn resolve_liked(&self, liked: Option<&str>) -> MatchOutcome {
        let Some(query) = liked else {
            return MatchOutcome::NotRequested;
        };
        match best_match(query, self.catalog.names()) {
            Some(found) if found.is_reliable() => {
                debug!(
                    "liked restaurant {query:?} matched {:?} ({}%)",
                    found.name, found.confidence
                );
                MatchOutcome::Matched(found)
            }
            best => {
                info!(
                    "no reliable match for liked restaurant {query:?} (best {:?})",
                    best.as_ref().map(|found| (&found.name, found.confidence))
                );
                MatchOutcome::Unreliable { best }
            }
        }
    }

    fn rank(
        &self,
        candidates: &[&'ctx Restaurant],
        reference: Option<RestaurantId>,
        top_n: usize,
    ) -> (Vec<Recommendation<'ctx>>, RankingMode) {
        if let Some(id) = reference {
            match self.ranker.rank(candidates, Some(id), self.index, top_n) {
                Ok(entries) => return (entries, RankingMode::Similarity),
                Err(err) => warn!("similarity lookup failed, using rating baseline: {err}"),
            }
        }
        let entries = self
            .ranker
            .rank(candidates, None, self.index, top_n)
            .unwrap_or_default();
        (entries, RankingMode::Baseline)
    }

    fn by_rating(
        &self,
        candidates: &[&'ctx Restaurant],
        top_n: usize,
        relaxed: bool,
        liked: MatchOutcome,
    ) -> Recommendations<'ctx> {
        Recommendations {
            entries: self.ranker.rank_by_rating(candidates, top_n),
            mode: RankingMode::RatingOnly,
            relaxed,
            liked,
        }
    }
}
