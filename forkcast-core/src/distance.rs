//! Great-circle distance between WGS84 coordinates.

use geo::Coord;

/// Mean Earth radius used by [`haversine_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance in kilometres between two coordinates using the haversine formula.
///
/// Coordinates use `x = longitude` and `y = latitude`, in decimal degrees.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use forkcast_core::haversine_km;
///
/// let origin = Coord { x: 0.0, y: 0.0 };
/// let east = Coord { x: 0.1, y: 0.0 };
/// let km = haversine_km(origin, east);
/// assert!((km - 11.119).abs() < 0.01);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the haversine formula is floating-point trigonometry"
)]
pub fn haversine_km(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let d_lat = (b.y - a.y).to_radians();
    let d_lon = (b.x - a.x).to_radians();
    let half_chord = (d_lat / 2.0).sin().powi(2)
        + a.y.to_radians().cos() * b.y.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let angle = 2.0 * half_chord.sqrt().atan2((1.0 - half_chord).sqrt());
    EARTH_RADIUS_KM * angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TOLERANCE_KM: f64 = 0.01;

    #[rstest]
    #[case(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.1, y: 0.0 }, 11.119)]
    #[case(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.05, y: 0.0 }, 5.559)]
    // London to Paris.
    #[case(Coord { x: -0.1278, y: 51.5074 }, Coord { x: 2.3522, y: 48.8566 }, 343.56)]
    fn known_distances(#[case] a: Coord<f64>, #[case] b: Coord<f64>, #[case] expected: f64) {
        let km = haversine_km(a, b);
        assert!(
            (km - expected).abs() < TOLERANCE_KM * expected.max(1.0),
            "expected {expected} km, got {km}"
        );
    }

    #[rstest]
    fn same_point_is_zero() {
        let p = Coord { x: 77.5946, y: 12.9716 };
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[rstest]
    fn antipodes_are_half_the_circumference() {
        let km = haversine_km(Coord { x: 0.0, y: 0.0 }, Coord { x: 180.0, y: 0.0 });
        assert!((km - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < TOLERANCE_KM);
    }
}
