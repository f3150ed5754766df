//! Command-line interface for forkcast restaurant recommendations.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod build_index;
mod error;
mod logging;
mod recommend;

pub use error::CliError;
pub use logging::init_logging;

use build_index::{BuildIndexArgs, run_build_index};
use recommend::{RecommendArgs, run_recommend};

pub(crate) const ARG_CATALOG: &str = "catalog";
pub(crate) const ARG_SIMILARITY_INDEX: &str = "similarity-index";
pub(crate) const ARG_ARTEFACTS_DIR: &str = "artefacts-dir";
pub(crate) const ARG_ADDRESS: &str = "address";
pub(crate) const ARG_LAT: &str = "lat";
pub(crate) const ARG_LON: &str = "lon";
pub(crate) const ARG_CUISINE: &str = "cuisine";
pub(crate) const ARG_BUDGET: &str = "budget";
pub(crate) const ARG_OCCASION: &str = "occasion";
pub(crate) const ARG_LIKED: &str = "liked";
pub(crate) const ARG_RADIUS_KM: &str = "radius-km";
pub(crate) const ARG_TOP_N: &str = "top-n";
pub(crate) const ARG_LOCATIONIQ_KEY: &str = "locationiq-key";
pub(crate) const ARG_GEOCODER_URL: &str = "geocoder-url";
pub(crate) const ARG_FORMAT: &str = "format";
pub(crate) const ARG_OUTPUT: &str = "output";

pub(crate) const ENV_LAT: &str = "FORKCAST_CMDS_RECOMMEND_LAT";
pub(crate) const ENV_LON: &str = "FORKCAST_CMDS_RECOMMEND_LON";
pub(crate) const ENV_LOCATIONIQ_KEY: &str = "FORKCAST_CMDS_RECOMMEND_LOCATIONIQ_KEY";
pub(crate) const ENV_BUILD_INDEX_CATALOG: &str = "FORKCAST_CMDS_BUILD_INDEX_CATALOG";

/// Run the forkcast CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments or configuration are invalid, when
/// artefacts cannot be loaded or written, or when output cannot be printed.
/// A request that simply yields nothing to recommend is not an error.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Recommend(args) => run_recommend(args),
        Command::BuildIndex(args) => run_build_index(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "forkcast",
    about = "Recommend nearby restaurants from a prepared catalog",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Recommend restaurants near an address or coordinates.
    Recommend(RecommendArgs),
    /// Precompute the similarity index for a catalog.
    BuildIndex(BuildIndexArgs),
}

#[cfg(test)]
mod tests;
