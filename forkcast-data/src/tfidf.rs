//! Offline TF-IDF text similarity between catalog entries.
//!
//! Each restaurant becomes one document built from its cuisine, signature
//! dishes, notes and location. Terms are weighted by raw count times smoothed
//! inverse document frequency `ln((1 + n) / (1 + df)) + 1`, vectors are
//! L2-normalised, and the similarity of two entries is the cosine of their
//! vectors.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use forkcast_core::{Catalog, DenseSimilarityMatrix, Restaurant, SimilarityError};
use log::debug;

/// Words too common to carry meaning in restaurant descriptions.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "been", "but", "by", "can", "do", "for", "from", "had", "has", "have", "here", "how", "i",
    "if", "in", "into", "is", "it", "its", "just", "may", "more", "most", "my", "no", "not", "of",
    "on", "or", "our", "out", "so", "some", "such", "than", "that", "the", "their", "them",
    "then", "there", "these", "they", "this", "to", "too", "up", "very", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "will", "with", "you", "your",
];

/// Sparse, L2-normalised term vector sorted by term id.
type TermVector = Vec<(usize, f64)>;

/// Builds a [`DenseSimilarityMatrix`] from catalog text.
///
/// # Examples
/// ```
/// use forkcast_core::{Catalog, Restaurant};
/// use forkcast_data::TfIdfBuilder;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let catalog = Catalog::new(vec![
///     Restaurant::new(0, "A").with_cuisine("Italian, Pizza"),
///     Restaurant::new(1, "B").with_cuisine("Pizza"),
///     Restaurant::new(2, "C").with_cuisine("Sushi"),
/// ])?;
/// let matrix = TfIdfBuilder::new().build(&catalog)?;
/// let pizza = matrix.get(0, 1).unwrap_or_default();
/// let sushi = matrix.get(0, 2).unwrap_or_default();
/// assert!(pizza > sushi);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TfIdfBuilder {
    stop_words: HashSet<String>,
}

impl Default for TfIdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TfIdfBuilder {
    /// Builder using [`ENGLISH_STOP_WORDS`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_stop_words(ENGLISH_STOP_WORDS.iter().copied())
    }

    /// Builder using a custom stop-word list.
    pub fn with_stop_words<'a, I>(words: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            stop_words: words.into_iter().map(str::to_lowercase).collect(),
        }
    }

    /// Tokenise one restaurant's descriptive text.
    ///
    /// Tokens are lowercase alphanumeric runs of at least two characters
    /// that are not stop-words.
    #[must_use]
    pub fn tokens(&self, restaurant: &Restaurant) -> Vec<String> {
        [
            restaurant.cuisine.as_str(),
            restaurant.signature_dishes.as_str(),
            restaurant.more_info.as_str(),
            restaurant.location.as_str(),
        ]
        .iter()
        .flat_map(|field| field.split(|c: char| !c.is_alphanumeric()))
        .filter(|token| token.chars().nth(1).is_some())
        .map(str::to_lowercase)
        .filter(|token| !self.stop_words.contains(token))
        .collect()
    }

    /// Compute pairwise cosine similarity for every catalog entry.
    ///
    /// Entries without any tokens have similarity `0.0` to everything,
    /// themselves included.
    ///
    /// # Errors
    /// Propagates [`SimilarityError`] if the assembled matrix fails
    /// validation.
    pub fn build(&self, catalog: &Catalog) -> Result<DenseSimilarityMatrix, SimilarityError> {
        let documents: Vec<Vec<String>> = catalog.iter().map(|r| self.tokens(r)).collect();
        let vectors = vectorise(&documents);
        debug!("built tf-idf vectors for {} restaurants", vectors.len());

        DenseSimilarityMatrix::from_fn(vectors.len(), |row, column| {
            match (vectors.get(row), vectors.get(column)) {
                (Some(left), Some(right)) => cosine(left, right),
                _ => 0.0,
            }
        })
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "tf-idf weighting is floating-point by definition"
)]
fn vectorise(documents: &[Vec<String>]) -> Vec<TermVector> {
    let mut vocabulary: HashMap<&str, usize> = HashMap::new();
    let counts: Vec<BTreeMap<usize, f64>> = documents
        .iter()
        .map(|tokens| {
            let mut counts = BTreeMap::new();
            for token in tokens {
                let next = vocabulary.len();
                let term = *vocabulary.entry(token.as_str()).or_insert(next);
                *counts.entry(term).or_insert(0.0) += 1.0;
            }
            counts
        })
        .collect();

    let mut document_frequency = vec![0_usize; vocabulary.len()];
    for term in counts.iter().flat_map(BTreeMap::keys) {
        if let Some(df) = document_frequency.get_mut(*term) {
            *df = df.saturating_add(1);
        }
    }

    let total = documents.len() as f64;
    let idf: Vec<f64> = document_frequency
        .iter()
        .map(|&df| ((1.0 + total) / (1.0 + df as f64)).ln() + 1.0)
        .collect();

    counts
        .into_iter()
        .map(|terms| {
            let weighted: TermVector = terms
                .into_iter()
                .map(|(term, count)| (term, count * idf.get(term).copied().unwrap_or(1.0)))
                .collect();
            let norm = weighted.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            if norm == 0.0 {
                return Vec::new();
            }
            weighted.into_iter().map(|(term, w)| (term, w / norm)).collect()
        })
        .collect()
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    reason = "cosine similarity of unit vectors is accumulated in f64 and stored as f32"
)]
fn cosine(left: &[(usize, f64)], right: &[(usize, f64)]) -> f32 {
    let mut dot = 0.0_f64;
    let (mut i, mut j) = (0, 0);
    while let (Some(&(lt, lw)), Some(&(rt, rw))) = (left.get(i), right.get(j)) {
        match lt.cmp(&rt) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                dot += lw * rw;
                i += 1;
                j += 1;
            }
        }
    }
    dot.clamp(0.0, 1.0) as f32
}
