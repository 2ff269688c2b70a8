//! Error types emitted by the Wayfarer CLI.
//!
//! Planning failures are boxed so `Result<_, CliError>` stays small under
//! `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use wayfarer_core::ValidationError;
use wayfarer_data::ProviderBuildError;
use wayfarer_planner::ServiceError;

/// Errors emitted by the Wayfarer CLI.
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
        /// Flag name.
        field: &'static str,
        /// Environment variable name.
        env: &'static str,
    },
    /// An option holds a value the planner cannot use.
    #[error("invalid {field}: {reason}")]
    InvalidArgument {
        /// Flag name.
        field: &'static str,
        /// What is wrong with the value.
        reason: &'static str,
    },
    /// The request path does not exist.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Flag name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// The request path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Flag name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// The request path could not be inspected.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Flag name.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the plan request file failed.
    #[error("failed to open plan request at {path:?}: {source}")]
    OpenPlanRequest {
        /// Request path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Plan request JSON could not be decoded.
    #[error("failed to parse plan request JSON at {path:?}: {source}")]
    ParsePlanRequest {
        /// Request path.
        path: Utf8PathBuf,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },
    /// The plan request failed validation.
    #[error("plan request in {path:?} failed validation: {source}")]
    InvalidPlanRequest {
        /// Request path.
        path: Utf8PathBuf,
        /// First validation failure.
        #[source]
        source: ValidationError,
    },
    /// Constructing the OSRM distance provider failed.
    #[error("failed to build distance provider for {base_url:?}: {source}")]
    BuildDistanceProvider {
        /// Configured base URL.
        base_url: String,
        /// Construction error.
        #[source]
        source: ProviderBuildError,
    },
    /// Constructing the narrative provider failed.
    #[error("failed to build narrative provider for {base_url:?}: {source}")]
    BuildNarrativeProvider {
        /// Configured base URL.
        base_url: String,
        /// Construction error.
        #[source]
        source: ProviderBuildError,
    },
    /// Planning failed on both the optimised and the narrative path.
    #[error("planning failed: {source}")]
    Plan {
        /// Service error.
        #[source]
        source: Box<ServiceError>,
    },
    /// Serialising the plan response failed.
    #[error("failed to serialise plan response: {0}")]
    SerialisePlanResponse(#[source] serde_json::Error),
    /// Writing the plan output failed.
    #[error("failed to write plan output: {0}")]
    WritePlanOutput(#[source] std::io::Error),
}
