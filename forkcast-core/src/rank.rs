//! Blend text similarity with normalised rating and keep the best entries.
//!
//! Ratings are normalised against the catalog-wide maximum, never the
//! filtered subset, so scores are comparable across requests.

use thiserror::Error;

use crate::{Restaurant, RestaurantId, SimilarityError, SimilarityIndex};

/// How a result list was ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RankingMode {
    /// Similarity to a reference restaurant blended with rating.
    Similarity,
    /// Constant similarity baseline blended with rating.
    Baseline,
    /// Rating alone.
    RatingOnly,
}

/// A ranked restaurant with the values that ordered it.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation<'a> {
    /// The recommended catalog entry.
    pub restaurant: &'a Restaurant,
    /// Similarity to the reference restaurant, when one was used.
    pub similarity: Option<f32>,
    /// Value the list is sorted by, in `0.0..=1.0`.
    pub score: f32,
}

/// Errors returned by [`ScoreWeights::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScoreWeightsError {
    /// A weight was negative or not finite, or both were zero.
    #[error("score weights must be finite, non-negative and not both zero")]
    Invalid,
}

/// Relative weighting between similarity and rating.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScoreWeights {
    /// Multiplier applied to the similarity component.
    pub similarity: f32,
    /// Multiplier applied to the normalised rating component.
    pub rating: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            similarity: 0.5_f32,
            rating: 0.5_f32,
        }
    }
}

impl ScoreWeights {
    /// Validate the weights and return a copy.
    ///
    /// # Errors
    /// Returns [`ScoreWeightsError::Invalid`] when either value is negative or
    /// not finite, or the total is zero.
    pub fn validate(self) -> Result<Self, ScoreWeightsError> {
        let finite = self.similarity.is_finite() && self.rating.is_finite();
        let non_negative = self.similarity >= 0.0 && self.rating >= 0.0;
        let non_zero = self.similarity > 0.0 || self.rating > 0.0;
        if finite && non_negative && non_zero {
            Ok(self)
        } else {
            Err(ScoreWeightsError::Invalid)
        }
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "score blending requires weighted averages"
    )]
    fn blend(self, similarity: f32, rating: f32) -> f32 {
        let total = self.similarity + self.rating;
        if total == 0.0 {
            return 0.0;
        }
        sanitise((similarity * self.similarity + rating * self.rating) / total)
    }
}

/// Orders candidates by weighted score or by rating alone.
///
/// # Examples
/// ```
/// use forkcast_core::{DenseSimilarityMatrix, Ranker, Restaurant};
///
/// # fn main() -> Result<(), forkcast_core::SimilarityError> {
/// let restaurants = [
///     Restaurant::new(0, "Reference").with_rating(4.0),
///     Restaurant::new(1, "Twin").with_rating(3.0),
///     Restaurant::new(2, "Stranger").with_rating(5.0),
/// ];
/// let index = DenseSimilarityMatrix::new(
///     3,
///     vec![1.0, 0.9, 0.0, 0.9, 1.0, 0.0, 0.0, 0.0, 1.0],
/// )?;
/// let ranker = Ranker::new(5.0);
/// let candidates: Vec<&Restaurant> = restaurants.iter().skip(1).collect();
///
/// let ranked = ranker.rank(&candidates, Some(0), &index, 5)?;
/// assert_eq!(ranked[0].restaurant.name, "Twin");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranker {
    weights: ScoreWeights,
    max_rating: f32,
}

impl Ranker {
    /// Ranker with default 50/50 weights for a catalog whose highest rating
    /// is `max_rating`.
    #[must_use]
    pub fn new(max_rating: f32) -> Self {
        Self {
            weights: ScoreWeights::default(),
            max_rating,
        }
    }

    /// Ranker with custom weights.
    ///
    /// # Errors
    /// Returns [`ScoreWeightsError`] when the weights fail validation.
    pub fn with_weights(weights: ScoreWeights, max_rating: f32) -> Result<Self, ScoreWeightsError> {
        Ok(Self {
            weights: weights.validate()?,
            max_rating,
        })
    }

    /// Rating scaled by the catalog maximum into `0.0..=1.0`.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "normalising divides by the catalog maximum"
    )]
    pub fn normalised_rating(&self, rating: f32) -> f32 {
        if self.max_rating <= 0.0 {
            return 0.0;
        }
        sanitise(rating / self.max_rating)
    }

    /// Score candidates and return the best `top_n`.
    ///
    /// With a `reference`, similarity comes from `index`; without one every
    /// candidate receives a constant similarity of `1.0`, which leaves the
    /// order to the rating term. Equal scores keep their input order.
    ///
    /// # Errors
    /// Propagates [`SimilarityError`] when `index` does not know an id, and
    /// returns [`SimilarityError::LengthMismatch`] when it answers with a
    /// different number of scores than there are candidates.
    pub fn rank<'a, S>(
        &self,
        candidates: &[&'a Restaurant],
        reference: Option<RestaurantId>,
        index: &S,
        top_n: usize,
    ) -> Result<Vec<Recommendation<'a>>, SimilarityError>
    where
        S: SimilarityIndex + ?Sized,
    {
        let similarities = match reference {
            Some(reference) => {
                let ids: Vec<RestaurantId> = candidates.iter().map(|r| r.id).collect();
                let scores = index.similarity(reference, &ids)?;
                if scores.len() != ids.len() {
                    return Err(SimilarityError::LengthMismatch {
                        expected: ids.len(),
                        found: scores.len(),
                    });
                }
                Some(scores)
            }
            None => None,
        };

        let mut ranked: Vec<Recommendation<'a>> = candidates
            .iter()
            .enumerate()
            .map(|(position, &restaurant)| {
                let similarity = similarities
                    .as_ref()
                    .and_then(|scores| scores.get(position))
                    .map(|&score| sanitise(score));
                let score = self.weights.blend(
                    similarity.unwrap_or(1.0),
                    self.normalised_rating(restaurant.rating),
                );
                Recommendation {
                    restaurant,
                    similarity,
                    score,
                }
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(top_n);
        Ok(ranked)
    }

    /// Order candidates by rating alone and return the best `top_n`.
    #[must_use]
    pub fn rank_by_rating<'a>(
        &self,
        candidates: &[&'a Restaurant],
        top_n: usize,
    ) -> Vec<Recommendation<'a>> {
        let mut ranked: Vec<Recommendation<'a>> = candidates
            .iter()
            .map(|&restaurant| Recommendation {
                restaurant,
                similarity: None,
                score: self.normalised_rating(restaurant.rating),
            })
            .collect();
        ranked.sort_by(|a, b| b.restaurant.rating.total_cmp(&a.restaurant.rating));
        ranked.truncate(top_n);
        ranked
    }
}

/// Return `0.0` for non-finite values and clamp to `0.0..=1.0`.
fn sanitise(score: f32) -> f32 {
    if !score.is_finite() {
        return 0.0;
    }
    score.clamp(0.0, 1.0)
}
