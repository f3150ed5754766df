//! Catalog loading from JSON exports of the restaurant dataset.
//!
//! The input is a JSON array of objects. Field names follow the cleaned
//! dataset (`names`, `ratings`, `signature dishes`, ...) and the snake_case
//! names of [`Restaurant`] are accepted as well. Ids are assigned by position.

use std::io::{BufReader, Read};

use camino::{Utf8Path, Utf8PathBuf};
use forkcast_core::{Catalog, CatalogError, Restaurant};
use geo::Coord;
use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::fs::open_utf8_file;

/// Errors raised while decoding catalog JSON.
#[derive(Debug, Error)]
pub enum CatalogFormatError {
    /// The document is not a JSON array of restaurant objects.
    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A price could not be read as a non-negative whole amount.
    #[error("record {position} has unreadable price {value:?}")]
    InvalidPrice {
        /// Position of the record.
        position: usize,
        /// Value as found in the file.
        value: String,
    },
    /// The decoded records failed catalog validation.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Errors raised by [`load_catalog`].
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    /// The catalog file could not be opened.
    #[error("failed to open catalog at {path}: {source}")]
    Io {
        /// Catalog location.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The catalog file could not be decoded.
    #[error("failed to read catalog at {path}: {source}")]
    Format {
        /// Catalog location.
        path: Utf8PathBuf,
        /// Decoding failure.
        #[source]
        source: CatalogFormatError,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Amount {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(alias = "names")]
    name: String,
    #[serde(default)]
    cuisine: Option<String>,
    #[serde(default, alias = "signature dishes")]
    signature_dishes: Option<String>,
    #[serde(default)]
    price_for_two: Option<Amount>,
    #[serde(default, alias = "ratings")]
    rating: Option<Amount>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    more_info: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
}

impl RawRecord {
    fn into_restaurant(self, position: usize) -> Result<Restaurant, CatalogFormatError> {
        let price = match self.price_for_two {
            None => 0,
            Some(amount) => parse_price(&amount).ok_or_else(|| CatalogFormatError::InvalidPrice {
                position,
                value: amount.to_string(),
            })?,
        };
        let restaurant = Restaurant::new(position, self.name)
            .with_cuisine(self.cuisine.unwrap_or_default())
            .with_signature_dishes(self.signature_dishes.unwrap_or_default())
            .with_price_for_two(price)
            .with_rating(self.rating.as_ref().map_or(0.0, parse_rating))
            .with_location(self.location.unwrap_or_default())
            .with_more_info(self.more_info.unwrap_or_default());
        Ok(Restaurant {
            coordinates: coordinates(self.latitude, self.longitude),
            ..restaurant
        })
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// Decode a catalog from a JSON reader.
///
/// Missing text fields become empty strings. Unrated or unparsable ratings
/// (such as `"NEW"` or `"-"`) become `0.0`. Prices may be numbers or strings
/// with thousands separators. Missing or out-of-range coordinates become
/// `None`.
///
/// # Errors
/// Returns [`CatalogFormatError`] for malformed JSON, unreadable prices, or a
/// catalog that fails validation.
///
/// # Examples
/// ```
/// use forkcast_data::read_catalog;
///
/// let json = r#"[
///     {"names": "Roma", "cuisine": "Italian", "price_for_two": "1,200",
///      "ratings": 4.2, "signature dishes": "Lasagne",
///      "latitude": 12.97, "longitude": 77.59}
/// ]"#;
/// let catalog = read_catalog(json.as_bytes())?;
/// let roma = catalog.get(0).expect("one record");
/// assert_eq!(roma.price_for_two, 1200);
/// assert_eq!(roma.signature_dishes, "Lasagne");
/// # Ok::<(), forkcast_data::CatalogFormatError>(())
/// ```
pub fn read_catalog<R: Read>(reader: R) -> Result<Catalog, CatalogFormatError> {
    let records: Vec<RawRecord> = serde_json::from_reader(BufReader::new(reader))?;
    let restaurants = records
        .into_iter()
        .enumerate()
        .map(|(position, record)| record.into_restaurant(position))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Catalog::new(restaurants)?)
}

/// Load the catalog stored at `path`.
///
/// # Errors
/// Returns [`CatalogLoadError`] when the file cannot be opened or decoded.
pub fn load_catalog(path: &Utf8Path) -> Result<Catalog, CatalogLoadError> {
    let file = open_utf8_file(path).map_err(|source| CatalogLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = read_catalog(file).map_err(|source| CatalogLoadError::Format {
        path: path.to_path_buf(),
        source,
    })?;
    let located = catalog.iter().filter(|r| r.coordinates.is_some()).count();
    debug!(
        "loaded {} restaurants ({located} with coordinates) from {path}",
        catalog.len()
    );
    Ok(catalog)
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "prices are validated as finite, non-negative and within u32 before casting"
)]
fn parse_price(amount: &Amount) -> Option<u32> {
    let value = match amount {
        Amount::Number(value) => *value,
        Amount::Text(text) => text.trim().replace(',', "").parse::<f64>().ok()?,
    };
    (value.is_finite() && (0.0..=f64::from(u32::MAX)).contains(&value))
        .then(|| value.round() as u32)
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "ratings are small decimals well within f32 precision"
)]
fn parse_rating(amount: &Amount) -> f32 {
    let value = match amount {
        Amount::Number(value) => Some(*value),
        Amount::Text(text) => text
            .split('/')
            .next()
            .and_then(|head| head.trim().parse::<f64>().ok()),
    };
    value
        .filter(|rating| rating.is_finite() && *rating >= 0.0)
        .map_or(0.0, |rating| rating as f32)
}

fn coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Option<Coord<f64>> {
    let (y, x) = (latitude?, longitude?);
    let valid = (-90.0..=90.0).contains(&y) && (-180.0..=180.0).contains(&x);
    valid.then_some(Coord { x, y })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn single(json: &str) -> Restaurant {
        let catalog = read_catalog(json.as_bytes()).expect("valid catalog");
        catalog.get(0).cloned().expect("one record")
    }

    #[rstest]
    fn accepts_dataset_column_names() {
        let restaurant = single(
            r#"[{"names": "Toit", "ratings": 4.7, "signature dishes": "Wings",
                 "cuisine": "Pub", "price_for_two": 1500, "location": "Indiranagar",
                 "more_info": "Friends", "latitude": 12.97, "longitude": 77.64}]"#,
        );
        assert_eq!(restaurant.name, "Toit");
        assert_eq!(restaurant.signature_dishes, "Wings");
        assert_eq!(restaurant.price_for_two, 1500);
        assert!((restaurant.rating - 4.7).abs() < 1e-6);
        assert_eq!(restaurant.coordinates, Some(Coord { x: 77.64, y: 12.97 }));
    }

    #[rstest]
    fn accepts_field_names() {
        let restaurant = single(
            r#"[{"name": "Roma", "rating": "4.1/5", "signature_dishes": "Pasta",
                 "price_for_two": "800"}]"#,
        );
        assert_eq!(restaurant.name, "Roma");
        assert!((restaurant.rating - 4.1).abs() < 1e-6);
        assert_eq!(restaurant.price_for_two, 800);
        assert_eq!(restaurant.coordinates, None);
    }

    #[rstest]
    #[case(r#""NEW""#)]
    #[case(r#""-""#)]
    #[case("null")]
    #[case("-1.0")]
    fn unrated_records_score_zero(#[case] rating: &str) {
        let restaurant = single(&format!(r#"[{{"names": "A", "ratings": {rating}}}]"#));
        assert_eq!(restaurant.rating, 0.0);
    }

    #[rstest]
    #[case(r#"{"names": "A", "latitude": null, "longitude": 77.0}"#)]
    #[case(r#"{"names": "A", "latitude": 95.0, "longitude": 77.0}"#)]
    #[case(r#"{"names": "A"}"#)]
    fn unusable_coordinates_become_none(#[case] record: &str) {
        assert_eq!(single(&format!("[{record}]")).coordinates, None);
    }

    #[rstest]
    #[case(r#""cheap""#)]
    #[case("-300")]
    fn unreadable_prices_are_rejected(#[case] price: &str) {
        let json = format!(r#"[{{"names": "A", "price_for_two": {price}}}]"#);
        let err = read_catalog(json.as_bytes()).expect_err("bad price");
        assert!(matches!(err, CatalogFormatError::InvalidPrice { position: 0, .. }));
    }

    #[rstest]
    fn ids_follow_positions() {
        let catalog = read_catalog(r#"[{"names": "A"}, {"names": "B"}]"#.as_bytes())
            .expect("valid catalog");
        let ids: Vec<usize> = catalog.iter().map(|r| r.id).collect();
        assert_eq!(ids, [0, 1]);
    }

    #[rstest]
    fn missing_names_are_rejected() {
        let err = read_catalog(r#"[{"cuisine": "Thai"}]"#.as_bytes()).expect_err("no name");
        assert!(matches!(err, CatalogFormatError::Json(_)));
    }
}
