//! LocationIQ forward-geocoding response types.
//!
//! See: <https://docs.locationiq.com/reference/search>

use serde::Deserialize;

/// One search result. Coordinates arrive as decimal strings.
#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    /// Latitude in decimal degrees.
    pub lat: String,
    /// Longitude in decimal degrees.
    pub lon: String,
    /// Human-readable address of the match.
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// Error description, e.g. `"Unable to geocode"`.
    pub error: String,
}

impl ErrorBody {
    /// Report whether the service simply found no match.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.error.eq_ignore_ascii_case("unable to geocode")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialise_search_results() {
        let json = r#"[
            {"place_id": "1", "lat": "12.9716", "lon": "77.5946",
             "display_name": "Bengaluru, Karnataka, India"},
            {"place_id": "2", "lat": "13.0", "lon": "77.6"}
        ]"#;

        let places: Vec<Place> = serde_json::from_str(json).expect("should deserialise");

        assert_eq!(places.len(), 2);
        assert_eq!(places[0].lat, "12.9716");
        assert_eq!(places[1].display_name, None);
    }

    #[test]
    fn deserialise_error_body() {
        let missing: ErrorBody =
            serde_json::from_str(r#"{"error": "Unable to geocode"}"#).expect("should deserialise");
        assert!(missing.is_not_found());

        let rejected: ErrorBody =
            serde_json::from_str(r#"{"error": "Invalid key"}"#).expect("should deserialise");
        assert!(!rejected.is_not_found());
    }
}
