//! HTTP geocoding against the LocationIQ search API.
//!
//! This module provides [`HttpGeocoder`], an implementation of
//! [`forkcast_core::Geocoder`] that resolves free-text addresses to
//! coordinates. The synchronous trait is implemented by blocking on async
//! HTTP calls internally, keeping the recommendation pipeline usable from
//! synchronous code.
//!
//! # Example
//!
//! ```no_run
//! use forkcast_core::{Geocoder, resolve_location};
//! use forkcast_data::geocode::{HttpGeocoder, HttpGeocoderConfig};
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpGeocoderConfig::new("pk.example")
//!     .with_timeout(Duration::from_secs(5))
//!     .with_user_agent("my-app/1.0");
//! let geocoder = HttpGeocoder::with_config(config)?;
//!
//! if let Some(position) = resolve_location(&geocoder, "Koramangala, Bengaluru") {
//!     println!("lat {} lon {}", position.y, position.x);
//! }
//! # Ok(())
//! # }
//! ```

mod locationiq;
mod provider;

pub use provider::{
    DEFAULT_BASE_URL, DEFAULT_USER_AGENT, GeocoderBuildError, HttpGeocoder, HttpGeocoderConfig,
};
