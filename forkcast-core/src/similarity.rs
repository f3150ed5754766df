//! Precomputed text-similarity lookups between catalog entries.
//!
//! The index is built offline and treated as read-only at request time. Its
//! rows are aligned with [`Catalog`](crate::Catalog) positions.

use thiserror::Error;

use crate::RestaurantId;

/// Tolerance applied when validating symmetry.
const SYMMETRY_TOLERANCE: f32 = 1e-4;

/// Errors raised when building or querying a similarity index.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimilarityError {
    /// The flat value buffer does not describe a square matrix.
    #[error("expected {expected} similarity values for {size} records, found {found}")]
    NotSquare {
        /// Number of records the matrix should cover.
        size: usize,
        /// Required number of values (`size * size`).
        expected: usize,
        /// Number of values supplied.
        found: usize,
    },
    /// A value was NaN or infinite.
    #[error("similarity between {row} and {column} is not finite")]
    NonFinite {
        /// Row of the offending value.
        row: usize,
        /// Column of the offending value.
        column: usize,
    },
    /// A value lies outside `0.0..=1.0`.
    #[error("similarity between {row} and {column} is outside 0..=1")]
    OutOfRange {
        /// Row of the offending value.
        row: usize,
        /// Column of the offending value.
        column: usize,
    },
    /// `(i, j)` and `(j, i)` disagree.
    #[error("similarity between {row} and {column} is not symmetric")]
    Asymmetric {
        /// Row of the offending value.
        row: usize,
        /// Column of the offending value.
        column: usize,
    },
    /// A queried id is outside the index.
    #[error("restaurant {id} is not present in the similarity index")]
    UnknownRecord {
        /// Requested id.
        id: RestaurantId,
    },
    /// An index answered with a different number of scores than requested.
    #[error("expected {expected} similarity scores, received {found}")]
    LengthMismatch {
        /// Number of candidates queried.
        expected: usize,
        /// Number of scores returned.
        found: usize,
    },
}

/// Read-only similarity lookup.
///
/// Implementations must be thread-safe (`Send` + `Sync`) so a single index
/// can serve concurrent requests.
///
/// # Examples
///
/// ```rust
/// use forkcast_core::{DenseSimilarityMatrix, SimilarityIndex};
///
/// # fn main() -> Result<(), forkcast_core::SimilarityError> {
/// let index = DenseSimilarityMatrix::new(2, vec![1.0, 0.25, 0.25, 1.0])?;
/// assert_eq!(index.similarity(0, &[1, 0])?, vec![0.25, 1.0]);
/// # Ok(())
/// # }
/// ```
pub trait SimilarityIndex: Send + Sync {
    /// Number of records covered by the index.
    fn len(&self) -> usize;

    /// Report whether the index covers no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Similarity between `reference` and each of `candidates`, in order.
    ///
    /// # Errors
    /// Returns [`SimilarityError::UnknownRecord`] when any id is out of range.
    fn similarity(
        &self,
        reference: RestaurantId,
        candidates: &[RestaurantId],
    ) -> Result<Vec<f32>, SimilarityError>;
}

/// Row-major `n × n` similarity matrix.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DenseSimilarityMatrix {
    size: usize,
    values: Vec<f32>,
}

impl DenseSimilarityMatrix {
    /// Validate and construct a matrix from row-major values.
    ///
    /// # Errors
    /// Returns [`SimilarityError`] when the buffer is not `size * size` long,
    /// holds non-finite values or values outside `0.0..=1.0`, or is not
    /// symmetric.
    pub fn new(size: usize, values: Vec<f32>) -> Result<Self, SimilarityError> {
        let expected = size.checked_mul(size).unwrap_or(usize::MAX);
        if values.len() != expected {
            return Err(SimilarityError::NotSquare {
                size,
                expected,
                found: values.len(),
            });
        }
        let matrix = Self { size, values };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Build a matrix by evaluating `f(i, j)` for every pair.
    ///
    /// # Errors
    /// Propagates validation failures from [`DenseSimilarityMatrix::new`].
    pub fn from_fn<F>(size: usize, mut f: F) -> Result<Self, SimilarityError>
    where
        F: FnMut(usize, usize) -> f32,
    {
        let values = (0..size)
            .flat_map(|row| (0..size).map(move |column| (row, column)))
            .map(|(row, column)| f(row, column))
            .collect();
        Self::new(size, values)
    }

    /// Number of records covered.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Row-major values.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Single value lookup.
    #[must_use]
    pub fn get(&self, row: usize, column: usize) -> Option<f32> {
        if row >= self.size || column >= self.size {
            return None;
        }
        self.values.get(row * self.size + column).copied()
    }

    fn row(&self, row: usize) -> Option<&[f32]> {
        let start = row.checked_mul(self.size)?;
        let end = start.checked_add(self.size)?;
        self.values.get(start..end)
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "symmetry is checked with an absolute tolerance"
    )]
    fn validate(&self) -> Result<(), SimilarityError> {
        for row in 0..self.size {
            for column in row..self.size {
                let (Some(forward), Some(backward)) =
                    (self.get(row, column), self.get(column, row))
                else {
                    return Err(SimilarityError::UnknownRecord { id: row });
                };
                if !forward.is_finite() || !backward.is_finite() {
                    return Err(SimilarityError::NonFinite { row, column });
                }
                if !(0.0..=1.0).contains(&forward) || !(0.0..=1.0).contains(&backward) {
                    return Err(SimilarityError::OutOfRange { row, column });
                }
                if (forward - backward).abs() > SYMMETRY_TOLERANCE {
                    return Err(SimilarityError::Asymmetric { row, column });
                }
            }
        }
        Ok(())
    }
}

impl SimilarityIndex for DenseSimilarityMatrix {
    fn len(&self) -> usize {
        self.size
    }

    fn similarity(
        &self,
        reference: RestaurantId,
        candidates: &[RestaurantId],
    ) -> Result<Vec<f32>, SimilarityError> {
        let row = self
            .row(reference)
            .ok_or(SimilarityError::UnknownRecord { id: reference })?;
        candidates
            .iter()
            .map(|&id| {
                row.get(id)
                    .copied()
                    .ok_or(SimilarityError::UnknownRecord { id })
            })
            .collect()
    }
}
