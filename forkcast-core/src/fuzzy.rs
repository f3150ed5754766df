//! Best-match lookup of free-text names against catalog names.
//!
//! Confidence follows the familiar weighted-ratio recipe: the plain edit
//! ratio competes with token-order-insensitive variants, and when one string
//! is much longer than the other the best-aligned substring is scored
//! instead, at a discount. All ratios are built on normalised Levenshtein
//! similarity from `strsim`.

use std::collections::BTreeSet;

use strsim::normalized_levenshtein;

/// Minimum confidence for a match to be used as a similarity anchor.
pub const MATCH_THRESHOLD: u8 = 80;

const TOKEN_DISCOUNT: f64 = 0.95;
const PARTIAL_SCALE: f64 = 0.9;
const DISTANT_PARTIAL_SCALE: f64 = 0.6;
const PARTIAL_LENGTH_RATIO: f64 = 1.5;
const DISTANT_LENGTH_RATIO: f64 = 8.0;

/// The single best candidate for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyMatch {
    /// Position of the candidate in the input sequence.
    pub index: usize,
    /// Candidate name as supplied.
    pub name: String,
    /// Similarity estimate in `0..=100`.
    pub confidence: u8,
}

impl FuzzyMatch {
    /// Report whether the confidence reaches [`MATCH_THRESHOLD`].
    #[must_use]
    pub const fn is_reliable(&self) -> bool {
        self.confidence >= MATCH_THRESHOLD
    }
}

/// Find the candidate most similar to `query`.
///
/// Returns `None` when the query is blank or there are no candidates. When
/// several candidates share the top confidence the earliest one wins.
///
/// # Examples
/// ```
/// use forkcast_core::fuzzy::best_match;
///
/// let names = ["Burger Barn", "Pizza Hut", "Noodle Box"];
/// let found = best_match("Pizzaa Hut", names).expect("a candidate");
/// assert_eq!(found.index, 1);
/// assert!(found.is_reliable());
/// ```
pub fn best_match<'a, I>(query: &str, candidates: I) -> Option<FuzzyMatch>
where
    I: IntoIterator<Item = &'a str>,
{
    let query = normalise(query);
    if query.is_empty() {
        return None;
    }

    let mut best: Option<FuzzyMatch> = None;
    for (index, name) in candidates.into_iter().enumerate() {
        let confidence = confidence(&query, &normalise(name));
        let improves = best
            .as_ref()
            .is_none_or(|current| confidence > current.confidence);
        if improves {
            best = Some(FuzzyMatch {
                index,
                name: name.to_owned(),
                confidence,
            });
        }
    }
    best
}

/// Confidence between two raw strings, in `0..=100`.
#[must_use]
pub fn similarity(a: &str, b: &str) -> u8 {
    confidence(&normalise(a), &normalise(b))
}

/// Lowercase, replace non-alphanumerics with spaces and collapse whitespace.
fn normalise(text: &str) -> String {
    let mapped: String = text
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().next().unwrap_or(c)
            } else {
                ' '
            }
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "confidence is a rounded percentage of a ratio in 0.0..=1.0"
)]
fn confidence(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let score = weighted_ratio(a, b).clamp(0.0, 1.0);
    (score * 100.0).round() as u8
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "length ratios and discounts are floating-point weights"
)]
fn weighted_ratio(a: &str, b: &str) -> f64 {
    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    let length_ratio = longer.chars().count() as f64 / shorter.chars().count() as f64;
    let base = normalized_levenshtein(a, b);

    if length_ratio < PARTIAL_LENGTH_RATIO {
        return base
            .max(token_sort_ratio(a, b) * TOKEN_DISCOUNT)
            .max(token_set_ratio(a, b) * TOKEN_DISCOUNT);
    }

    let scale = if length_ratio < DISTANT_LENGTH_RATIO {
        PARTIAL_SCALE
    } else {
        DISTANT_PARTIAL_SCALE
    };
    let partial = partial_ratio(shorter, longer) * scale;
    let partial_sorted =
        partial_ratio(&sorted_tokens(shorter), &sorted_tokens(longer)) * scale * TOKEN_DISCOUNT;
    base.max(partial).max(partial_sorted)
}

fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_sort_ratio(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&sorted_tokens(a), &sorted_tokens(b))
}

fn token_set_ratio(a: &str, b: &str) -> f64 {
    let left: BTreeSet<&str> = a.split_whitespace().collect();
    let right: BTreeSet<&str> = b.split_whitespace().collect();
    let join = |tokens: Vec<&str>| tokens.join(" ");

    let common = join(left.intersection(&right).copied().collect());
    let only_left = join(left.difference(&right).copied().collect());
    let only_right = join(right.difference(&left).copied().collect());
    let with_left = [common.as_str(), only_left.as_str()].join(" ").trim().to_owned();
    let with_right = [common.as_str(), only_right.as_str()].join(" ").trim().to_owned();

    let anchored = |other: &str| {
        if common.is_empty() {
            0.0
        } else {
            normalized_levenshtein(&common, other)
        }
    };
    anchored(&with_left)
        .max(anchored(&with_right))
        .max(normalized_levenshtein(&with_left, &with_right))
}

/// Best ratio between `shorter` and any equally long window of `longer`.
fn partial_ratio(shorter: &str, longer: &str) -> f64 {
    let needle: Vec<char> = shorter.chars().collect();
    let haystack: Vec<char> = longer.chars().collect();
    if needle.is_empty() || needle.len() > haystack.len() {
        return normalized_levenshtein(shorter, longer);
    }
    haystack
        .windows(needle.len())
        .map(|window| normalized_levenshtein(shorter, &window.iter().collect::<String>()))
        .fold(0.0_f64, f64::max)
}
