//! Build-index command: precompute and persist the similarity matrix.

use camino::Utf8PathBuf;
use clap::Parser;
use forkcast_data::{TfIdfBuilder, load_catalog, write_similarity_index};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::recommend::{DEFAULT_SIMILARITY_INDEX_FILE, require_existing};
use crate::{ARG_CATALOG, ARG_OUTPUT, CliError, ENV_BUILD_INDEX_CATALOG};

/// CLI arguments for the `build-index` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Compute TF-IDF similarity between every pair of catalog \
                 entries and write the matrix next to the catalog, or to \
                 --output when given.",
    about = "Precompute the similarity index"
)]
#[ortho_config(prefix = "FORKCAST")]
pub(crate) struct BuildIndexArgs {
    /// Path to the catalog JSON.
    #[arg(long = ARG_CATALOG, value_name = "path")]
    #[serde(default)]
    pub(crate) catalog: Option<Utf8PathBuf>,
    /// Where to write the index (defaults to `similarity.bin` beside the
    /// catalog).
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl BuildIndexArgs {
    fn into_config(self) -> Result<BuildIndexConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        BuildIndexConfig::try_from(merged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BuildIndexConfig {
    pub(crate) catalog: Utf8PathBuf,
    pub(crate) output: Utf8PathBuf,
}

impl TryFrom<BuildIndexArgs> for BuildIndexConfig {
    type Error = CliError;

    fn try_from(args: BuildIndexArgs) -> Result<Self, Self::Error> {
        let catalog = args.catalog.ok_or(CliError::MissingArgument {
            field: ARG_CATALOG,
            env: ENV_BUILD_INDEX_CATALOG,
        })?;
        let output = args.output.unwrap_or_else(|| {
            catalog
                .parent()
                .map_or_else(Utf8PathBuf::new, |dir| dir.to_path_buf())
                .join(DEFAULT_SIMILARITY_INDEX_FILE)
        });
        Ok(Self { catalog, output })
    }
}

pub(super) fn run_build_index(args: BuildIndexArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_build_index_with(args, &mut stdout)
}

pub(super) fn run_build_index_with(
    args: BuildIndexArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    build_index(&config, writer)
}

pub(super) fn build_index(
    config: &BuildIndexConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    require_existing(&config.catalog, ARG_CATALOG)?;
    let catalog = load_catalog(&config.catalog)?;
    let matrix = TfIdfBuilder::new()
        .build(&catalog)
        .map_err(CliError::BuildSimilarityIndex)?;
    write_similarity_index(&config.output, &matrix).map_err(CliError::WriteSimilarityIndex)?;
    info!("indexed {} restaurants", catalog.len());
    writeln!(
        writer,
        "wrote {0}x{0} similarity index to {1}",
        matrix.size(),
        config.output
    )
    .map_err(CliError::WriteOutput)
}
