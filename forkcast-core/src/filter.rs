//! Candidate filters: proximity, hard constraints and relaxation.
//!
//! Every filter is a stable selection over borrowed records. Input order is
//! preserved and nothing is copied.

use std::collections::HashSet;

use geo::Coord;

use crate::{Restaurant, RestaurantId, haversine_km};

/// Hard constraints applied by [`filter_by_constraints`].
///
/// # Examples
/// ```
/// use forkcast_core::Constraints;
///
/// let constraints = Constraints::new("italian", 500).with_occasion("family");
/// assert_eq!(constraints.occasion.as_deref(), Some("family"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Constraints {
    /// Case-insensitive substring expected in the cuisine field. Empty
    /// matches every record.
    pub cuisine: String,
    /// Inclusive ceiling on the price for two.
    pub max_price: u32,
    /// Case-insensitive substring expected in the occasion notes.
    pub occasion: Option<String>,
}

impl Constraints {
    /// Constraints on cuisine and price without an occasion.
    pub fn new(cuisine: impl Into<String>, max_price: u32) -> Self {
        Self {
            cuisine: cuisine.into(),
            max_price,
            occasion: None,
        }
    }

    /// Add an occasion requirement. Blank values are ignored.
    #[must_use]
    pub fn with_occasion(mut self, occasion: impl Into<String>) -> Self {
        let occasion = occasion.into();
        self.occasion = (!occasion.trim().is_empty()).then_some(occasion);
        self
    }

    /// Report whether `restaurant` satisfies every constraint.
    #[must_use]
    pub fn accepts(&self, restaurant: &Restaurant) -> bool {
        matches_cuisine(restaurant, &self.cuisine)
            && restaurant.price_for_two <= self.max_price
            && self
                .occasion
                .as_deref()
                .is_none_or(|occasion| contains_ignore_case(&restaurant.more_info, occasion))
    }
}

/// Keep restaurants with known coordinates within `radius_km` of `center`.
///
/// Restaurants without coordinates are dropped silently.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use forkcast_core::{Restaurant, filter_by_location};
///
/// let near = Restaurant::new(0, "Near").with_coordinates(Coord { x: 0.05, y: 0.0 });
/// let far = Restaurant::new(1, "Far").with_coordinates(Coord { x: 0.1, y: 0.0 });
/// let unknown = Restaurant::new(2, "Unknown");
/// let catalog = [near, far, unknown];
///
/// let kept = filter_by_location(Coord { x: 0.0, y: 0.0 }, &catalog, 7.0);
/// assert_eq!(kept.len(), 1);
/// assert_eq!(kept[0].name, "Near");
/// ```
pub fn filter_by_location<'a, I>(
    center: Coord<f64>,
    candidates: I,
    radius_km: f64,
) -> Vec<&'a Restaurant>
where
    I: IntoIterator<Item = &'a Restaurant>,
{
    candidates
        .into_iter()
        .filter(|restaurant| {
            restaurant
                .coordinates
                .is_some_and(|position| haversine_km(center, position) <= radius_km)
        })
        .collect()
}

/// Keep restaurants that satisfy every constraint.
pub fn filter_by_constraints<'a>(
    candidates: &[&'a Restaurant],
    constraints: &Constraints,
) -> Vec<&'a Restaurant> {
    candidates
        .iter()
        .copied()
        .filter(|restaurant| constraints.accepts(restaurant))
        .collect()
}

/// Keep restaurants whose cuisine matches, ignoring price and occasion.
pub fn filter_by_cuisine<'a>(candidates: &[&'a Restaurant], cuisine: &str) -> Vec<&'a Restaurant> {
    candidates
        .iter()
        .copied()
        .filter(|restaurant| matches_cuisine(restaurant, cuisine))
        .collect()
}

/// Widen a strict selection with cuisine-only matches from `pool`.
///
/// The result lists `strict` first, followed by cuisine matches from `pool`
/// not already present. Records are de-duplicated by id. `pool` must be the
/// location-filtered set so the proximity constraint survives relaxation.
pub fn relax<'a>(
    strict: &[&'a Restaurant],
    pool: &[&'a Restaurant],
    cuisine: &str,
) -> Vec<&'a Restaurant> {
    let mut seen: HashSet<RestaurantId> = HashSet::with_capacity(strict.len());
    strict
        .iter()
        .copied()
        .chain(filter_by_cuisine(pool, cuisine))
        .filter(|restaurant| seen.insert(restaurant.id))
        .collect()
}

fn matches_cuisine(restaurant: &Restaurant, cuisine: &str) -> bool {
    contains_ignore_case(&restaurant.cuisine, cuisine)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}
