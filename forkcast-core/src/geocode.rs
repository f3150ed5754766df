//! Address-to-coordinate resolution boundary.
//!
//! The pipeline only needs a position. Implementations report why a lookup
//! failed, but [`resolve_location`] collapses every failure into "no
//! coordinates" after logging the cause.

use geo::Coord;
use log::{info, warn};
use thiserror::Error;

/// Errors from [`Geocoder::geocode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    /// The address was blank.
    #[error("address is empty")]
    EmptyAddress,
    /// The service answered but had no match.
    #[error("no coordinates found for {address:?}")]
    NotFound {
        /// Address that was looked up.
        address: String,
    },
    /// The request did not complete in time.
    #[error("geocoding request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u64,
    },
    /// The service returned an error status.
    #[error("geocoding service returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
    },
    /// The request failed before a response arrived.
    #[error("geocoding request failed: {message}")]
    Transport {
        /// Error description.
        message: String,
    },
    /// The response body could not be interpreted.
    #[error("geocoding response was malformed: {message}")]
    Malformed {
        /// Error description.
        message: String,
    },
}

/// Resolve a free-text address to a position.
///
/// Returned coordinates use `x = longitude` and `y = latitude`.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use forkcast_core::{GeocodeError, Geocoder};
///
/// struct Origin;
///
/// impl Geocoder for Origin {
///     fn geocode(&self, address: &str) -> Result<Coord<f64>, GeocodeError> {
///         if address.trim().is_empty() {
///             return Err(GeocodeError::EmptyAddress);
///         }
///         Ok(Coord { x: 0.0, y: 0.0 })
///     }
/// }
///
/// assert_eq!(Origin.geocode("anywhere")?, Coord { x: 0.0, y: 0.0 });
/// # Ok::<(), GeocodeError>(())
/// ```
pub trait Geocoder {
    /// Return the position of `address`.
    ///
    /// Implementations must return `Err(GeocodeError::EmptyAddress)` for a
    /// blank address without contacting any service.
    fn geocode(&self, address: &str) -> Result<Coord<f64>, GeocodeError>;
}

/// Geocode `address`, logging and discarding any failure.
pub fn resolve_location<G>(geocoder: &G, address: &str) -> Option<Coord<f64>>
where
    G: Geocoder + ?Sized,
{
    match geocoder.geocode(address) {
        Ok(location) => Some(location),
        Err(err @ (GeocodeError::EmptyAddress | GeocodeError::NotFound { .. })) => {
            info!("could not resolve address: {err}");
            None
        }
        Err(err) => {
            warn!("geocoding failed for {address:?}: {err}");
            None
        }
    }
}
