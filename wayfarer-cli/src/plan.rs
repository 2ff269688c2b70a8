//! Plan command implementation for the Wayfarer CLI.

use std::fs::File;
use std::io::{BufReader, Write};
use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use wayfarer_core::{
    DistanceProvider, InMemorySessionStore, RecommendationProvider, SessionStore, UsageMetrics,
    UsageSnapshot,
};
use wayfarer_data::{
    ChatNarrativeConfig, ChatNarrativeProvider, HttpDistanceProvider, HttpDistanceProviderConfig,
};
use wayfarer_planner::{
    DEFAULT_PROXY_THRESHOLD, DEFAULT_TIME_BUDGET, ItineraryService, Orchestrator,
    OrchestratorConfig, OptimizerConfig, PlanRequest, PlanResponse, ServiceError,
};

use crate::{
    ARG_NARRATIVE_API_KEY, ARG_NARRATIVE_BASE_URL, ARG_NARRATIVE_MODEL, ARG_OSRM_BASE_URL,
    ARG_PLAN_REQUEST, ARG_PROXY_THRESHOLD, ARG_TIME_BUDGET_SECS, CliError, ENV_PLAN_REQUEST,
};

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Plan an itinerary for the spots listed in a JSON plan \
                 request. Travel times come from an OSRM table service; if \
                 optimisation fails or runs out of time, a chat-completions \
                 model writes a narrative plan instead.",
    about = "Plan an itinerary from a JSON request"
)]
#[ortho_config(prefix = "WAYFARER")]
pub(crate) struct PlanArgs {
    /// Path to a JSON file containing a plan request.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Base URL of the chat-completions API used for narrative fallbacks.
    #[arg(long = ARG_NARRATIVE_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) narrative_base_url: Option<String>,
    /// Model requested from the chat-completions API.
    #[arg(long = ARG_NARRATIVE_MODEL, value_name = "name")]
    #[serde(default)]
    pub(crate) narrative_model: Option<String>,
    /// Bearer token for the chat-completions API.
    #[arg(long = ARG_NARRATIVE_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) narrative_api_key: Option<String>,
    /// Seconds the optimised pipeline may run before falling back.
    #[arg(long = ARG_TIME_BUDGET_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) time_budget_secs: Option<u64>,
    /// Largest spot count that still requests a full provider matrix.
    #[arg(long = ARG_PROXY_THRESHOLD, value_name = "count")]
    #[serde(default)]
    pub(crate) proxy_threshold: Option<usize>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Resolved `plan` command configuration.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct PlanConfig {
    /// Path to the JSON request file.
    pub(crate) request_path: Utf8PathBuf,
    /// Base URL for the OSRM table service.
    pub(crate) osrm_base_url: String,
    /// Base URL for the chat-completions API.
    pub(crate) narrative_base_url: String,
    /// Narrative model name.
    pub(crate) narrative_model: String,
    /// Narrative bearer token.
    pub(crate) narrative_api_key: Option<String>,
    /// Pipeline time budget.
    pub(crate) time_budget: Duration,
    /// Full-matrix spot limit.
    pub(crate) proxy_threshold: usize,
}

impl std::fmt::Debug for PlanConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanConfig")
            .field("request_path", &self.request_path)
            .field("osrm_base_url", &self.osrm_base_url)
            .field("narrative_base_url", &self.narrative_base_url)
            .field("narrative_model", &self.narrative_model)
            .field(
                "narrative_api_key",
                &self.narrative_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("time_budget", &self.time_budget)
            .field("proxy_threshold", &self.proxy_threshold)
            .finish()
    }
}

impl PlanConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.request_path, ARG_PLAN_REQUEST)
    }

    pub(crate) fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig::default()
            .with_time_budget(self.time_budget)
            .with_optimizer(OptimizerConfig::default().with_proxy_threshold(self.proxy_threshold))
    }

    fn narrative_config(&self) -> ChatNarrativeConfig {
        let config = ChatNarrativeConfig::new(self.narrative_base_url.clone())
            .with_model(self.narrative_model.clone());
        match &self.narrative_api_key {
            Some(key) => config.with_api_key(key.clone()),
            None => config,
        }
    }
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => Ok(()),
        Ok(_) => Err(CliError::SourcePathNotFile {
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

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_PLAN_REQUEST,
            env: ENV_PLAN_REQUEST,
        })?;

        let time_budget = match args.time_budget_secs {
            Some(0) => {
                return Err(CliError::InvalidArgument {
                    field: ARG_TIME_BUDGET_SECS,
                    reason: "the time budget must be at least one second",
                });
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIME_BUDGET,
        };

        let narrative_defaults = ChatNarrativeConfig::default();
        Ok(Self {
            request_path,
            osrm_base_url: args
                .osrm_base_url
                .unwrap_or_else(|| HttpDistanceProviderConfig::default().base_url),
            narrative_base_url: args
                .narrative_base_url
                .unwrap_or(narrative_defaults.base_url),
            narrative_model: args.narrative_model.unwrap_or(narrative_defaults.model),
            narrative_api_key: args.narrative_api_key,
            time_budget,
            proxy_threshold: args.proxy_threshold.unwrap_or(DEFAULT_PROXY_THRESHOLD),
        })
    }
}

/// Plans validated requests for the CLI.
pub(crate) trait Planner {
    fn plan(&self, request: PlanRequest) -> Result<PlanResponse, ServiceError>;

    fn usage(&self) -> UsageSnapshot;
}

impl<D, R, S> Planner for ItineraryService<D, R, S>
where
    D: DistanceProvider + Send + Sync + 'static,
    R: RecommendationProvider,
    S: SessionStore,
{
    fn plan(&self, request: PlanRequest) -> Result<PlanResponse, ServiceError> {
        Self::plan(self, request)
    }

    fn usage(&self) -> UsageSnapshot {
        self.metrics()
    }
}

/// Builds a planner for the current plan invocation.
pub(crate) trait PlanServiceBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn Planner>, CliError>;
}

pub(crate) struct DefaultPlanServiceBuilder;

impl PlanServiceBuilder for DefaultPlanServiceBuilder {
    fn build(&self, config: &PlanConfig) -> Result<Box<dyn Planner>, CliError> {
        let provider = HttpDistanceProvider::new(config.osrm_base_url.clone()).map_err(
            |source| CliError::BuildDistanceProvider {
                base_url: config.osrm_base_url.clone(),
                source,
            },
        )?;
        let recommender =
            ChatNarrativeProvider::with_config(config.narrative_config()).map_err(|source| {
                CliError::BuildNarrativeProvider {
                    base_url: config.narrative_base_url.clone(),
                    source,
                }
            })?;
        let orchestrator = Orchestrator::with_config(
            provider,
            recommender,
            config.orchestrator_config(),
            Arc::new(UsageMetrics::default()),
        );
        Ok(Box::new(ItineraryService::new(
            orchestrator,
            InMemorySessionStore::default(),
        )))
    }
}

pub(crate) fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let builder = DefaultPlanServiceBuilder;
    run_plan_with(args, &builder, &mut stdout)
}

pub(crate) fn run_plan_with(
    args: PlanArgs,
    builder: &dyn PlanServiceBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let response = execute_plan(args, builder)?;
    write_plan_response(writer, &response)
}

fn execute_plan(
    args: PlanArgs,
    builder: &dyn PlanServiceBuilder,
) -> Result<PlanResponse, CliError> {
    let config = resolve_plan_config(args)?;
    let request = load_plan_request(&config.request_path)?;
    request
        .validate()
        .map_err(|source| CliError::InvalidPlanRequest {
            path: config.request_path.clone(),
            source,
        })?;
    log::info!(
        "planning {} spots in {} for session {}",
        request.selected_spots.len(),
        request.city,
        request.session_id
    );
    let planner = builder.build(&config)?;
    let response = planner.plan(request).map_err(|source| CliError::Plan {
        source: Box::new(source),
    })?;
    if response.fallback_used {
        log::warn!("optimised planning failed; returning a narrative itinerary");
    }
    log::debug!("usage: {:?}", planner.usage());
    Ok(response)
}

fn resolve_plan_config(args: PlanArgs) -> Result<PlanConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

/// Loads a JSON-encoded [`PlanRequest`] from disk.
pub(crate) fn load_plan_request(path: &Utf8Path) -> Result<PlanRequest, CliError> {
    let file = File::open(path).map_err(|source| CliError::OpenPlanRequest {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParsePlanRequest {
        path: path.to_path_buf(),
        source,
    })
}

fn write_plan_response(writer: &mut dyn Write, response: &PlanResponse) -> Result<(), CliError> {
    let payload =
        serde_json::to_string_pretty(response).map_err(CliError::SerialisePlanResponse)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WritePlanOutput)?;
    writer.write_all(b"\n").map_err(CliError::WritePlanOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}
