//! Restaurant records and the immutable catalog that owns them.

use geo::Coord;
use thiserror::Error;

/// Position of a restaurant within the [`Catalog`] and the similarity index.
pub type RestaurantId = usize;

/// A single catalog row.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. They are
/// optional because parts of the source data were never geocoded.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use forkcast_core::Restaurant;
///
/// let restaurant = Restaurant::new(0, "Trattoria Roma")
///     .with_cuisine("Italian, Pizza")
///     .with_price_for_two(600)
///     .with_rating(4.3)
///     .with_coordinates(Coord { x: 77.59, y: 12.97 });
///
/// assert_eq!(restaurant.name, "Trattoria Roma");
/// assert!(restaurant.coordinates.is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Restaurant {
    /// Row position in the catalog.
    pub id: RestaurantId,
    /// Display name; not guaranteed unique.
    pub name: String,
    /// Free-text cuisine tags, possibly several separated by commas.
    pub cuisine: String,
    /// Dishes the restaurant is known for.
    pub signature_dishes: String,
    /// Typical bill for two people.
    pub price_for_two: u32,
    /// Average rating.
    pub rating: f32,
    /// Display address or neighbourhood.
    pub location: String,
    /// Free text about occasions, amenities and seating.
    pub more_info: String,
    /// Geocoded position, when known.
    pub coordinates: Option<Coord<f64>>,
}

impl Restaurant {
    /// Construct a restaurant with the given id and name and empty details.
    pub fn new(id: RestaurantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            cuisine: String::new(),
            signature_dishes: String::new(),
            price_for_two: 0,
            rating: 0.0,
            location: String::new(),
            more_info: String::new(),
            coordinates: None,
        }
    }

    /// Set the cuisine tags.
    #[must_use]
    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = cuisine.into();
        self
    }

    /// Set the signature dishes.
    #[must_use]
    pub fn with_signature_dishes(mut self, dishes: impl Into<String>) -> Self {
        self.signature_dishes = dishes.into();
        self
    }

    /// Set the price for two.
    #[must_use]
    pub const fn with_price_for_two(mut self, price: u32) -> Self {
        self.price_for_two = price;
        self
    }

    /// Set the rating.
    #[must_use]
    pub const fn with_rating(mut self, rating: f32) -> Self {
        self.rating = rating;
        self
    }

    /// Set the display location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Set the occasion and amenity notes.
    #[must_use]
    pub fn with_more_info(mut self, more_info: impl Into<String>) -> Self {
        self.more_info = more_info.into();
        self
    }

    /// Set the geocoded position.
    #[must_use]
    pub const fn with_coordinates(mut self, coordinates: Coord<f64>) -> Self {
        self.coordinates = Some(coordinates);
        self
    }
}

/// Errors returned by [`Catalog::new`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// A record's id does not match its position.
    #[error("restaurant at position {position} has id {id}")]
    MisalignedId {
        /// Position of the record in the input.
        position: usize,
        /// Id carried by the record.
        id: RestaurantId,
    },
    /// A rating was negative or not finite.
    #[error("restaurant {id} has invalid rating {rating}")]
    InvalidRating {
        /// Affected restaurant.
        id: RestaurantId,
        /// Offending value.
        rating: f32,
    },
}

/// Read-only table of restaurants for one process lifetime.
///
/// The catalog caches the maximum rating so the rating term of the ranking
/// stays on the same scale regardless of how aggressively a request filters.
///
/// # Examples
/// ```
/// use forkcast_core::{Catalog, Restaurant};
///
/// # fn main() -> Result<(), forkcast_core::CatalogError> {
/// let catalog = Catalog::new(vec![
///     Restaurant::new(0, "A").with_rating(3.5),
///     Restaurant::new(1, "B").with_rating(4.5),
/// ])?;
/// assert_eq!(catalog.len(), 2);
/// assert_eq!(catalog.max_rating(), 4.5);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Catalog {
    restaurants: Vec<Restaurant>,
    max_rating: f32,
}

impl Catalog {
    /// Validate and construct a catalog.
    ///
    /// # Errors
    /// Returns [`CatalogError`] when ids are not positional or a rating is
    /// negative or non-finite.
    pub fn new(restaurants: Vec<Restaurant>) -> Result<Self, CatalogError> {
        let mut max_rating = 0.0_f32;
        for (position, restaurant) in restaurants.iter().enumerate() {
            if restaurant.id != position {
                return Err(CatalogError::MisalignedId {
                    position,
                    id: restaurant.id,
                });
            }
            if !restaurant.rating.is_finite() || restaurant.rating < 0.0 {
                return Err(CatalogError::InvalidRating {
                    id: restaurant.id,
                    rating: restaurant.rating,
                });
            }
            max_rating = max_rating.max(restaurant.rating);
        }
        Ok(Self {
            restaurants,
            max_rating,
        })
    }

    /// Highest rating across the whole catalog.
    #[must_use]
    pub const fn max_rating(&self) -> f32 {
        self.max_rating
    }

    /// Number of restaurants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.restaurants.len()
    }

    /// Report whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }

    /// Look up a restaurant by id.
    #[must_use]
    pub fn get(&self, id: RestaurantId) -> Option<&Restaurant> {
        self.restaurants.get(id)
    }

    /// Iterate over restaurants in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, Restaurant> {
        self.restaurants.iter()
    }

    /// Borrow the records as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Restaurant] {
        &self.restaurants
    }

    /// Iterate over display names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.restaurants.iter().map(|r| r.name.as_str())
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Restaurant;
    type IntoIter = std::slice::Iter<'a, Restaurant>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn catalog_tracks_max_rating() {
        let catalog = Catalog::new(vec![
            Restaurant::new(0, "A").with_rating(4.1),
            Restaurant::new(1, "B").with_rating(4.9),
            Restaurant::new(2, "C").with_rating(2.0),
        ])
        .expect("valid catalog");
        assert_eq!(catalog.max_rating(), 4.9);
        assert_eq!(catalog.names().collect::<Vec<_>>(), ["A", "B", "C"]);
    }

    #[rstest]
    fn catalog_rejects_misaligned_ids() {
        let err = Catalog::new(vec![Restaurant::new(0, "A"), Restaurant::new(5, "B")])
            .expect_err("id 5 at position 1");
        assert_eq!(err, CatalogError::MisalignedId { position: 1, id: 5 });
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f32::NAN)]
    #[case(f32::INFINITY)]
    fn catalog_rejects_invalid_ratings(#[case] rating: f32) {
        let result = Catalog::new(vec![Restaurant::new(0, "A").with_rating(rating)]);
        assert!(matches!(result, Err(CatalogError::InvalidRating { id: 0, .. })));
    }

    #[rstest]
    fn empty_catalog_has_zero_max_rating() {
        let catalog = Catalog::new(Vec::new()).expect("empty catalog");
        assert!(catalog.is_empty());
        assert_eq!(catalog.max_rating(), 0.0);
    }
}
