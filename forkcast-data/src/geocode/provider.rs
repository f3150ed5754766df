//! HTTP [`Geocoder`] backed by the LocationIQ search API.
//!
//! The [`Geocoder`] trait is synchronous so the recommendation pipeline stays
//! free of async. This client bridges to `reqwest` by blocking on a Tokio
//! runtime it owns, or on the caller's multi-threaded runtime when there is
//! one. Inside a `current_thread` runtime the request is driven from a scoped
//! helper thread so the caller's runtime is never re-entered.

use std::thread;
use std::time::Duration;

use forkcast_core::{GeocodeError, Geocoder};
use geo::Coord;
use log::debug;
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::locationiq::{ErrorBody, Place};

/// Default LocationIQ endpoint.
pub const DEFAULT_BASE_URL: &str = "https://us1.locationiq.com";

/// Default user agent for geocoding requests.
pub const DEFAULT_USER_AGENT: &str = "forkcast-geocoder/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

const HTTP_NOT_FOUND: u16 = 404;

/// Errors raised while constructing an [`HttpGeocoder`].
#[derive(Debug, Error)]
pub enum GeocoderBuildError {
    /// The API key was blank.
    #[error("a LocationIQ API key is required")]
    MissingApiKey,
    /// The base URL could not be parsed.
    #[error("invalid geocoder base URL {base_url:?}: {source}")]
    InvalidBaseUrl {
        /// Rejected URL.
        base_url: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Configuration for [`HttpGeocoder`].
#[derive(Clone)]
pub struct HttpGeocoderConfig {
    /// Service root, e.g. `"https://us1.locationiq.com"`.
    pub base_url: String,
    /// LocationIQ access token.
    pub api_key: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl std::fmt::Debug for HttpGeocoderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGeocoderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl HttpGeocoderConfig {
    /// Configuration for `api_key` against the default endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Set the service root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Forward geocoder using `GET {base_url}/v1/search?key=..&q=..&format=json`.
///
/// The first search result wins. A `404` with `"Unable to geocode"`, or an
/// empty result list, is reported as [`GeocodeError::NotFound`]. There are no
/// retries.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime, requests run on the geocoder's own runtime.
/// Inside a multi-threaded runtime the caller's handle is used through
/// [`tokio::task::block_in_place`]. Inside a `current_thread` runtime the
/// geocoder's own runtime is driven from a scoped thread, blocking the caller
/// until the request completes. The owned runtime is shut down in the
/// background on drop, so the geocoder may be dropped from async code.
///
/// # Examples
/// ```no_run
/// use forkcast_core::Geocoder;
/// use forkcast_data::geocode::{HttpGeocoder, HttpGeocoderConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let geocoder = HttpGeocoder::with_config(HttpGeocoderConfig::new("pk.test"))?;
/// let position = geocoder.geocode("MG Road, Bengaluru")?;
/// println!("{}, {}", position.y, position.x);
/// # Ok(())
/// # }
/// ```
pub struct HttpGeocoder {
    client: Client,
    config: HttpGeocoderConfig,
    search_url: Url,
    runtime: Option<Runtime>,
}

impl std::fmt::Debug for HttpGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGeocoder")
            .field("config", &self.config)
            .field("search_url", &self.search_url.as_str())
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl HttpGeocoder {
    /// Geocoder for `api_key` with the default configuration.
    ///
    /// # Errors
    /// See [`HttpGeocoder::with_config`].
    pub fn new(api_key: impl Into<String>) -> Result<Self, GeocoderBuildError> {
        Self::with_config(HttpGeocoderConfig::new(api_key))
    }

    /// Geocoder with explicit configuration.
    ///
    /// # Errors
    /// Returns [`GeocoderBuildError`] for a blank key, an unparsable base URL,
    /// or when the HTTP client or runtime cannot be built.
    pub fn with_config(config: HttpGeocoderConfig) -> Result<Self, GeocoderBuildError> {
        if config.api_key.trim().is_empty() {
            return Err(GeocoderBuildError::MissingApiKey);
        }
        let endpoint = format!("{}/v1/search", config.base_url.trim_end_matches('/'));
        let search_url =
            Url::parse(&endpoint).map_err(|source| GeocoderBuildError::InvalidBaseUrl {
                base_url: config.base_url.clone(),
                source,
            })?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(GeocoderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(GeocoderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            search_url,
            runtime: Some(runtime),
        })
    }

    /// Full search URL for `address`, including the API key.
    fn search_url(&self, address: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("key", &self.config.api_key)
            .append_pair("q", address)
            .append_pair("format", "json");
        url
    }

    fn own_runtime(&self) -> Result<&Runtime, GeocodeError> {
        self.runtime.as_ref().ok_or_else(|| GeocodeError::Transport {
            message: "geocoder runtime has been shut down".to_owned(),
        })
    }

    /// Drive the request on the owned runtime from a scoped thread.
    fn fetch_on_helper_thread(&self, address: &str) -> Result<Coord<f64>, GeocodeError> {
        let runtime = self.own_runtime()?;
        thread::scope(|scope| {
            scope
                .spawn(|| runtime.block_on(self.fetch_async(address)))
                .join()
                .unwrap_or_else(|_| {
                    Err(GeocodeError::Transport {
                        message: "geocoding thread panicked".to_owned(),
                    })
                })
        })
    }

    async fn fetch_async(&self, address: &str) -> Result<Coord<f64>, GeocodeError> {
        let response = self
            .client
            .get(self.search_url(address))
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err))?;
        interpret_response(status, &body, address)
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error) -> GeocodeError {
        if error.is_timeout() {
            return GeocodeError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return GeocodeError::Http {
                status: status.as_u16(),
                message: redact(&error.to_string(), &self.config.api_key),
            };
        }
        GeocodeError::Transport {
            message: redact(&error.to_string(), &self.config.api_key),
        }
    }
}

impl Geocoder for HttpGeocoder {
    fn geocode(&self, address: &str) -> Result<Coord<f64>, GeocodeError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeocodeError::EmptyAddress);
        }
        debug!("geocoding {address:?}");

        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(self.fetch_async(address)))
            }
            Ok(_) => self.fetch_on_helper_thread(address),
            Err(_) => self.own_runtime()?.block_on(self.fetch_async(address)),
        }
    }
}

impl Drop for HttpGeocoder {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Map a LocationIQ status and body onto a position or [`GeocodeError`].
fn interpret_response(
    status: u16,
    body: &str,
    address: &str,
) -> Result<Coord<f64>, GeocodeError> {
    if !(200..300).contains(&status) {
        let error = serde_json::from_str::<ErrorBody>(body).ok();
        if status == HTTP_NOT_FOUND && error.as_ref().is_none_or(ErrorBody::is_not_found) {
            return Err(GeocodeError::NotFound {
                address: address.to_owned(),
            });
        }
        return Err(GeocodeError::Http {
            status,
            message: error.map_or_else(|| body.trim().to_owned(), |e| e.error),
        });
    }

    let places: Vec<Place> =
        serde_json::from_str(body).map_err(|err| GeocodeError::Malformed {
            message: err.to_string(),
        })?;
    let place = places.first().ok_or_else(|| GeocodeError::NotFound {
        address: address.to_owned(),
    })?;
    let position = parse_place(place)?;
    debug!(
        "resolved {address:?} to {} ({}, {})",
        place.display_name.as_deref().unwrap_or("<unnamed>"),
        position.y,
        position.x
    );
    Ok(position)
}

fn parse_place(place: &Place) -> Result<Coord<f64>, GeocodeError> {
    let parse = |value: &str, field: &str| {
        value
            .trim()
            .parse::<f64>()
            .map_err(|err| GeocodeError::Malformed {
                message: format!("{field} {value:?}: {err}"),
            })
    };
    let y = parse(&place.lat, "lat")?;
    let x = parse(&place.lon, "lon")?;
    if !(-90.0..=90.0).contains(&y) || !(-180.0..=180.0).contains(&x) {
        return Err(GeocodeError::Malformed {
            message: format!("coordinates ({y}, {x}) are out of range"),
        });
    }
    Ok(Coord { x, y })
}

fn redact(message: &str, secret: &str) -> String {
    if secret.is_empty() {
        return message.to_owned();
    }
    message.replace(secret, "<redacted>")
}
