//! Parameters for a single recommendation request.

use geo::Coord;
use thiserror::Error;

use crate::Constraints;

/// Default search radius around the user.
pub const DEFAULT_RADIUS_KM: f64 = 7.0;
/// Default number of recommendations.
pub const DEFAULT_TOP_N: usize = 5;
/// Default budget for two.
pub const DEFAULT_MAX_PRICE: u32 = 500;

/// Errors returned by [`RecommendationRequest::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    /// The radius was negative or not finite.
    #[error("search radius must be a finite, non-negative number of kilometres, got {radius_km}")]
    InvalidRadius {
        /// Rejected radius.
        radius_km: f64,
    },
    /// Zero results were requested.
    #[error("at least one recommendation must be requested")]
    ZeroTopN,
    /// The user location is outside WGS84 bounds.
    #[error("user location ({latitude}, {longitude}) is not a valid latitude/longitude")]
    InvalidLocation {
        /// Rejected latitude.
        latitude: f64,
        /// Rejected longitude.
        longitude: f64,
    },
}

/// What the user asked for.
///
/// Optional text fields treat blank strings as absent.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use forkcast_core::RecommendationRequest;
///
/// let request = RecommendationRequest::new("Italian", 800)
///     .with_liked_restaurant("Pizza Hut")
///     .with_occasion("")
///     .with_user_location(Coord { x: 77.59, y: 12.97 });
///
/// assert_eq!(request.liked_restaurant(), Some("Pizza Hut"));
/// assert_eq!(request.occasion(), None);
/// assert_eq!(request.top_n, 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    /// Free-text name of a restaurant the user enjoyed.
    pub liked_restaurant: Option<String>,
    /// Preferred cuisine; empty accepts every cuisine.
    pub cuisine: String,
    /// Budget for two.
    pub max_price: u32,
    /// Occasion such as "family" or "friends".
    pub occasion: Option<String>,
    /// Resolved user position (`x = longitude`, `y = latitude`).
    pub user_location: Option<Coord<f64>>,
    /// Search radius around `user_location`.
    pub radius_km: f64,
    /// Maximum number of recommendations.
    pub top_n: usize,
}

impl Default for RecommendationRequest {
    fn default() -> Self {
        Self {
            liked_restaurant: None,
            cuisine: String::new(),
            max_price: DEFAULT_MAX_PRICE,
            occasion: None,
            user_location: None,
            radius_km: DEFAULT_RADIUS_KM,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl RecommendationRequest {
    /// Request for `cuisine` within `max_price`, using default radius and size.
    pub fn new(cuisine: impl Into<String>, max_price: u32) -> Self {
        Self {
            cuisine: cuisine.into(),
            max_price,
            ..Self::default()
        }
    }

    /// Set the liked restaurant.
    #[must_use]
    pub fn with_liked_restaurant(mut self, liked: impl Into<String>) -> Self {
        self.liked_restaurant = Some(liked.into());
        self
    }

    /// Set the occasion.
    #[must_use]
    pub fn with_occasion(mut self, occasion: impl Into<String>) -> Self {
        self.occasion = Some(occasion.into());
        self
    }

    /// Set the user location.
    #[must_use]
    pub const fn with_user_location(mut self, location: Coord<f64>) -> Self {
        self.user_location = Some(location);
        self
    }

    /// Set the search radius.
    #[must_use]
    pub const fn with_radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }

    /// Set the result size.
    #[must_use]
    pub const fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Liked restaurant, if non-blank.
    #[must_use]
    pub fn liked_restaurant(&self) -> Option<&str> {
        non_blank(self.liked_restaurant.as_deref())
    }

    /// Occasion, if non-blank.
    #[must_use]
    pub fn occasion(&self) -> Option<&str> {
        non_blank(self.occasion.as_deref())
    }

    /// Hard constraints derived from the request.
    #[must_use]
    pub fn constraints(&self) -> Constraints {
        let mut constraints = Constraints::new(self.cuisine.trim(), self.max_price);
        if let Some(occasion) = self.occasion() {
            constraints = constraints.with_occasion(occasion);
        }
        constraints
    }

    /// Check numeric parameters.
    ///
    /// # Errors
    /// Returns [`RequestError`] for a negative or non-finite radius, a zero
    /// `top_n`, or a location outside WGS84 bounds.
    pub fn validate(&self) -> Result<(), RequestError> {
        if !self.radius_km.is_finite() || self.radius_km < 0.0 {
            return Err(RequestError::InvalidRadius {
                radius_km: self.radius_km,
            });
        }
        if self.top_n == 0 {
            return Err(RequestError::ZeroTopN);
        }
        if let Some(location) = self.user_location
            && !is_valid_location(location)
        {
            return Err(RequestError::InvalidLocation {
                latitude: location.y,
                longitude: location.x,
            });
        }
        Ok(())
    }
}

fn is_valid_location(location: Coord<f64>) -> bool {
    (-90.0..=90.0).contains(&location.y) && (-180.0..=180.0).contains(&location.x)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_mirror_the_documented_values() {
        let request = RecommendationRequest::default();
        assert_eq!(request.radius_km, DEFAULT_RADIUS_KM);
        assert_eq!(request.top_n, DEFAULT_TOP_N);
        assert_eq!(request.max_price, DEFAULT_MAX_PRICE);
        assert!(request.validate().is_ok());
    }

    #[rstest]
    fn blank_text_fields_are_absent() {
        let request = RecommendationRequest::new(" Italian ", 500)
            .with_liked_restaurant("   ")
            .with_occasion("\t");
        assert_eq!(request.liked_restaurant(), None);
        assert_eq!(request.occasion(), None);
        assert_eq!(request.constraints(), Constraints::new("Italian", 500));
    }

    #[rstest]
    fn occasion_flows_into_constraints() {
        let request = RecommendationRequest::new("Chinese", 900).with_occasion("family");
        assert_eq!(request.constraints().occasion.as_deref(), Some("family"));
    }

    #[rstest]
    #[case(RecommendationRequest::default().with_radius_km(-1.0))]
    #[case(RecommendationRequest::default().with_radius_km(f64::NAN))]
    fn invalid_radius_is_rejected(#[case] request: RecommendationRequest) {
        assert!(matches!(
            request.validate(),
            Err(RequestError::InvalidRadius { .. })
        ));
    }

    #[rstest]
    fn zero_top_n_is_rejected() {
        let request = RecommendationRequest::default().with_top_n(0);
        assert_eq!(request.validate(), Err(RequestError::ZeroTopN));
    }

    #[rstest]
    #[case(Coord { x: 0.0, y: 91.0 })]
    #[case(Coord { x: -181.0, y: 0.0 })]
    #[case(Coord { x: f64::NAN, y: 0.0 })]
    fn out_of_range_location_is_rejected(#[case] location: Coord<f64>) {
        let request = RecommendationRequest::default().with_user_location(location);
        assert!(matches!(
            request.validate(),
            Err(RequestError::InvalidLocation { .. })
        ));
    }
}
