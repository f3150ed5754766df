//! Recommend command implementation for the forkcast CLI.

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, ValueEnum};
use forkcast_core::{
    AppContext, DEFAULT_MAX_PRICE, DEFAULT_RADIUS_KM, DEFAULT_TOP_N, Geocoder, MatchOutcome,
    NoRecommendation, RankingMode, RecommendationRequest, Recommendations,
};
use forkcast_data::geocode::DEFAULT_BASE_URL;
use forkcast_data::{HttpGeocoder, HttpGeocoderConfig, load_catalog, read_similarity_index};
use geo::Coord;
use log::debug;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::{
    ARG_ADDRESS, ARG_ARTEFACTS_DIR, ARG_BUDGET, ARG_CATALOG, ARG_CUISINE, ARG_FORMAT,
    ARG_GEOCODER_URL, ARG_LAT, ARG_LIKED, ARG_LOCATIONIQ_KEY, ARG_LON, ARG_OCCASION,
    ARG_RADIUS_KM, ARG_SIMILARITY_INDEX, ARG_TOP_N, CliError, ENV_LAT, ENV_LOCATIONIQ_KEY,
    ENV_LON,
};

/// Largest accepted budget for two.
pub(crate) const MAX_BUDGET: u32 = 3000;
pub(crate) const DEFAULT_CATALOG_FILE: &str = "catalog.json";
pub(crate) const DEFAULT_SIMILARITY_INDEX_FILE: &str = "similarity.bin";

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum OutputFormat {
    /// One line per restaurant, or the reason nothing was found.
    #[default]
    Text,
    /// A single JSON document.
    Json,
}

/// CLI arguments for the `recommend` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Recommend restaurants near an address or a latitude/longitude \
                 pair. The catalog (catalog.json) and similarity index \
                 (similarity.bin) are read from the artefacts directory unless \
                 overridden. Addresses are resolved through LocationIQ.",
    about = "Recommend nearby restaurants"
)]
#[ortho_config(prefix = "FORKCAST")]
pub(crate) struct RecommendArgs {
    /// Directory containing the default artefact filenames.
    #[arg(long = ARG_ARTEFACTS_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) artefacts_dir: Option<Utf8PathBuf>,
    /// Override the path to the catalog JSON (`catalog.json`).
    #[arg(long = ARG_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
    /// Override the path to the similarity index (`similarity.bin`).
    #[arg(long = ARG_SIMILARITY_INDEX, value_name = "path")]
    #[serde(default)]
    pub(crate) similarity_index: Option<Utf8PathBuf>,
    /// Free-text address to search around.
    #[arg(long = ARG_ADDRESS, value_name = "text")]
    #[serde(default)]
    pub(crate) address: Option<String>,
    /// Latitude to search around; takes precedence over --address.
    #[arg(long = ARG_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude to search around; takes precedence over --address.
    #[arg(long = ARG_LON, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
    /// Preferred cuisine; omit to accept any.
    #[arg(long = ARG_CUISINE, value_name = "text")]
    #[serde(default)]
    pub(crate) cuisine: Option<String>,
    /// Maximum price for two (0 to 3000, default 500).
    #[arg(long = ARG_BUDGET, value_name = "amount")]
    #[serde(default)]
    pub(crate) budget: Option<u32>,
    /// Occasion keyword matched against restaurant notes.
    #[arg(long = ARG_OCCASION, value_name = "text")]
    #[serde(default)]
    pub(crate) occasion: Option<String>,
    /// Name of a restaurant you enjoyed.
    #[arg(long = ARG_LIKED, value_name = "name")]
    #[serde(default)]
    pub(crate) liked: Option<String>,
    /// Search radius in kilometres (default 7).
    #[arg(long = ARG_RADIUS_KM, value_name = "km")]
    #[serde(default)]
    pub(crate) radius_km: Option<f64>,
    /// Number of recommendations (default 5).
    #[arg(long = ARG_TOP_N, value_name = "count")]
    #[serde(default)]
    pub(crate) top_n: Option<usize>,
    /// LocationIQ access token, required with --address.
    #[arg(long = ARG_LOCATIONIQ_KEY, value_name = "token")]
    #[serde(default)]
    pub(crate) locationiq_key: Option<String>,
    /// Base URL of the LocationIQ service.
    #[arg(long = ARG_GEOCODER_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) geocoder_url: Option<String>,
    /// Output format.
    #[arg(long = ARG_FORMAT, value_enum, value_name = "format")]
    #[serde(default)]
    pub(crate) format: Option<OutputFormat>,
}

impl RecommendArgs {
    pub(crate) fn into_config(self) -> Result<RecommendConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RecommendConfig::try_from(merged)
    }
}

/// Resolved `recommend` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecommendConfig {
    /// Path to the catalog JSON.
    pub(crate) catalog: Utf8PathBuf,
    /// Path to the persisted similarity index.
    pub(crate) similarity_index: Utf8PathBuf,
    /// Address to geocode; `None` when coordinates were given or nothing was.
    pub(crate) address: Option<String>,
    /// Request handed to the pipeline.
    pub(crate) request: RecommendationRequest,
    /// LocationIQ token, present whenever `address` is.
    pub(crate) locationiq_key: Option<String>,
    /// LocationIQ service root.
    pub(crate) geocoder_url: String,
    /// Output format.
    pub(crate) format: OutputFormat,
}

impl RecommendConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.catalog, ARG_CATALOG)?;
        require_existing(&self.similarity_index, ARG_SIMILARITY_INDEX)?;
        Ok(())
    }
}

/// Map a missing or non-file input path to the matching [`CliError`].
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match forkcast_data::fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl TryFrom<RecommendArgs> for RecommendConfig {
    type Error = CliError;

    fn try_from(args: RecommendArgs) -> Result<Self, Self::Error> {
        let artefacts_dir = args.artefacts_dir.unwrap_or_else(|| Utf8PathBuf::from("."));
        let catalog = args
            .catalog
            .unwrap_or_else(|| artefacts_dir.join(DEFAULT_CATALOG_FILE));
        let similarity_index = args
            .similarity_index
            .unwrap_or_else(|| artefacts_dir.join(DEFAULT_SIMILARITY_INDEX_FILE));

        let budget = args.budget.unwrap_or(DEFAULT_MAX_PRICE);
        if budget > MAX_BUDGET {
            return Err(CliError::BudgetOutOfRange {
                value: budget,
                max: MAX_BUDGET,
            });
        }

        let mut request = RecommendationRequest::new(args.cuisine.unwrap_or_default(), budget)
            .with_radius_km(args.radius_km.unwrap_or(DEFAULT_RADIUS_KM))
            .with_top_n(args.top_n.unwrap_or(DEFAULT_TOP_N));
        if let Some(liked) = args.liked {
            request = request.with_liked_restaurant(liked);
        }
        if let Some(occasion) = args.occasion {
            request = request.with_occasion(occasion);
        }

        let coordinates = match (args.lat, args.lon) {
            (Some(lat), Some(lon)) => Some(Coord { x: lon, y: lat }),
            (Some(_), None) => {
                return Err(CliError::MissingArgument {
                    field: ARG_LON,
                    env: ENV_LON,
                });
            }
            (None, Some(_)) => {
                return Err(CliError::MissingArgument {
                    field: ARG_LAT,
                    env: ENV_LAT,
                });
            }
            (None, None) => None,
        };
        let mut address = args.address.filter(|text| !text.trim().is_empty());
        if let Some(location) = coordinates {
            if address.take().is_some() {
                debug!("coordinates given; the address will not be geocoded");
            }
            request = request.with_user_location(location);
        }
        request.validate()?;

        let locationiq_key = args.locationiq_key.filter(|key| !key.trim().is_empty());
        if address.is_some() && locationiq_key.is_none() {
            return Err(CliError::MissingArgument {
                field: ARG_LOCATIONIQ_KEY,
                env: ENV_LOCATIONIQ_KEY,
            });
        }

        Ok(Self {
            catalog,
            similarity_index,
            address,
            request,
            locationiq_key,
            geocoder_url: args
                .geocoder_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            format: args.format.unwrap_or_default(),
        })
    }
}

/// Builds the geocoder for the current recommend invocation.
pub(super) trait GeocoderBuilder {
    fn build(&self, config: &RecommendConfig) -> Result<Box<dyn Geocoder>, CliError>;
}

pub(super) struct LocationIqGeocoderBuilder;

impl GeocoderBuilder for LocationIqGeocoderBuilder {
    fn build(&self, config: &RecommendConfig) -> Result<Box<dyn Geocoder>, CliError> {
        let api_key = config
            .locationiq_key
            .clone()
            .ok_or(CliError::MissingArgument {
                field: ARG_LOCATIONIQ_KEY,
                env: ENV_LOCATIONIQ_KEY,
            })?;
        let geocoder_config =
            HttpGeocoderConfig::new(api_key).with_base_url(config.geocoder_url.clone());
        let geocoder =
            HttpGeocoder::with_config(geocoder_config).map_err(|source| {
                CliError::BuildGeocoder {
                    base_url: config.geocoder_url.clone(),
                    source,
                }
            })?;
        Ok(Box::new(geocoder))
    }
}

pub(super) fn run_recommend(args: RecommendArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_recommend_with(args, &LocationIqGeocoderBuilder, &mut stdout)
}

pub(super) fn run_recommend_with(
    args: RecommendArgs,
    builder: &dyn GeocoderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_recommend_config(args)?;
    let context = load_context(&config)?;
    let recommender = context.recommender();
    let outcome = match config.address.as_deref() {
        Some(address) => {
            let geocoder = builder.build(&config)?;
            recommender.recommend_at(&*geocoder, address, &config.request)
        }
        None => recommender.recommend(&config.request),
    };
    match config.format {
        OutputFormat::Text => write_text(writer, &outcome),
        OutputFormat::Json => write_json(writer, &outcome),
    }
}

fn resolve_recommend_config(args: RecommendArgs) -> Result<RecommendConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Load and cross-check the catalog and similarity index.
pub(super) fn load_context(config: &RecommendConfig) -> Result<AppContext, CliError> {
    let catalog = load_catalog(&config.catalog)?;
    let index =
        read_similarity_index(&config.similarity_index).map_err(CliError::ReadSimilarityIndex)?;
    Ok(AppContext::new(catalog, index)?)
}

type Outcome<'a> = Result<Recommendations<'a>, NoRecommendation>;

/// Render `outcome` as one line per restaurant, or the reason string.
pub(super) fn write_text(writer: &mut dyn Write, outcome: &Outcome<'_>) -> Result<(), CliError> {
    match outcome {
        Ok(found) => {
            for restaurant in found.restaurants() {
                writeln!(
                    writer,
                    "{}: {} - {} - Rating: {} - Location: {}",
                    restaurant.name,
                    restaurant.signature_dishes,
                    restaurant.price_for_two,
                    restaurant.rating,
                    restaurant.location
                )
                .map_err(CliError::WriteOutput)?;
            }
        }
        Err(reason) => writeln!(writer, "{reason}").map_err(CliError::WriteOutput)?,
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum LikedReport<'a> {
    NotRequested,
    NotConsulted,
    Matched { name: &'a str, confidence: u8 },
    Unreliable { best: Option<&'a str>, confidence: Option<u8> },
}

impl<'a> From<&'a MatchOutcome> for LikedReport<'a> {
    fn from(outcome: &'a MatchOutcome) -> Self {
        match outcome {
            MatchOutcome::NotRequested => Self::NotRequested,
            MatchOutcome::NotConsulted => Self::NotConsulted,
            MatchOutcome::Matched(found) => Self::Matched {
                name: &found.name,
                confidence: found.confidence,
            },
            MatchOutcome::Unreliable { best } => Self::Unreliable {
                best: best.as_ref().map(|candidate| candidate.name.as_str()),
                confidence: best.as_ref().map(|candidate| candidate.confidence),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct EntryReport<'a> {
    name: &'a str,
    cuisine: &'a str,
    signature_dishes: &'a str,
    price_for_two: u32,
    rating: f32,
    location: &'a str,
    score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    similarity: Option<f32>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Report<'a> {
    Recommended {
        mode: RankingMode,
        relaxed: bool,
        liked: LikedReport<'a>,
        restaurants: Vec<EntryReport<'a>>,
    },
    NoRecommendation {
        reason: String,
    },
}

impl<'a> Report<'a> {
    fn new(outcome: &'a Outcome<'_>) -> Self {
        match outcome {
            Ok(found) => Self::Recommended {
                mode: found.mode,
                relaxed: found.relaxed,
                liked: LikedReport::from(&found.liked),
                restaurants: found
                    .entries
                    .iter()
                    .map(|entry| EntryReport {
                        name: &entry.restaurant.name,
                        cuisine: &entry.restaurant.cuisine,
                        signature_dishes: &entry.restaurant.signature_dishes,
                        price_for_two: entry.restaurant.price_for_two,
                        rating: entry.restaurant.rating,
                        location: &entry.restaurant.location,
                        score: entry.score,
                        similarity: entry.similarity,
                    })
                    .collect(),
            },
            Err(reason) => Self::NoRecommendation {
                reason: reason.to_string(),
            },
        }
    }
}

/// Render `outcome` as a pretty-printed JSON document.
pub(super) fn write_json(writer: &mut dyn Write, outcome: &Outcome<'_>) -> Result<(), CliError> {
    let payload =
        serde_json::to_string_pretty(&Report::new(outcome)).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RecommendConfig, CliError> {
    let merged = RecommendArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RecommendConfig::try_from(merged)
}
