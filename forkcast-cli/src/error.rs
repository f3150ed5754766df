//! Error types emitted by the forkcast CLI.
//!
//! Keep this error type reasonably small, as every CLI helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use forkcast_core::{ContextError, RequestError, SimilarityError};
use forkcast_data::{ArtefactError, CatalogLoadError, GeocoderBuildError};
use thiserror::Error;

/// Errors emitted by the forkcast CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name without the leading dashes.
        field: &'static str,
        /// Environment variable that can supply the value.
        env: &'static str,
    },
    /// A referenced input path does not exist.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Flag naming the input.
        field: &'static str,
        /// Path that was checked.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Flag naming the input.
        field: &'static str,
        /// Path that was checked.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Flag naming the input.
        field: &'static str,
        /// Path that was checked.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The budget is outside the accepted range.
    #[error("budget {value} is outside the accepted range 0..={max}")]
    BudgetOutOfRange {
        /// Requested budget.
        value: u32,
        /// Largest accepted budget.
        max: u32,
    },
    /// The resolved request parameters were rejected.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),
    /// Loading the catalog failed.
    #[error(transparent)]
    LoadCatalog(#[from] CatalogLoadError),
    /// Loading the similarity index failed.
    #[error("failed to load similarity index: {0}")]
    ReadSimilarityIndex(#[source] ArtefactError),
    /// The catalog and similarity index do not belong together.
    #[error("{source} (rebuild the index with `forkcast build-index`)")]
    MismatchedArtefacts {
        /// Dimension check failure.
        #[from]
        source: ContextError,
    },
    /// Computing the similarity matrix failed.
    #[error("failed to build similarity index: {0}")]
    BuildSimilarityIndex(#[source] SimilarityError),
    /// Persisting the similarity matrix failed.
    #[error("failed to write similarity index: {0}")]
    WriteSimilarityIndex(#[source] ArtefactError),
    /// Constructing the geocoder failed.
    #[error("failed to build geocoder for {base_url:?}: {source}")]
    BuildGeocoder {
        /// Configured service root.
        base_url: String,
        /// Construction failure.
        #[source]
        source: GeocoderBuildError,
    },
    /// Serialising the JSON report failed.
    #[error("failed to serialise recommendations: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
