//! Command-line interface for planning Wayfarer itineraries.
//!
//! `wayfarer plan <request.json>` reads a JSON plan request, runs it through
//! the itinerary service backed by an OSRM table service and a
//! chat-completions narrative provider, and prints the response as JSON.
//! Options layer from CLI flags, `WAYFARER_*` environment variables and
//! configuration files.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod plan;

pub use error::CliError;

use plan::{PlanArgs, run_plan};

pub(crate) const ARG_PLAN_REQUEST: &str = "request-path";
pub(crate) const ARG_OSRM_BASE_URL: &str = "osrm-base-url";
pub(crate) const ARG_NARRATIVE_BASE_URL: &str = "narrative-base-url";
pub(crate) const ARG_NARRATIVE_MODEL: &str = "narrative-model";
pub(crate) const ARG_NARRATIVE_API_KEY: &str = "narrative-api-key";
pub(crate) const ARG_TIME_BUDGET_SECS: &str = "time-budget-secs";
pub(crate) const ARG_PROXY_THRESHOLD: &str = "proxy-threshold";
pub(crate) const ENV_PLAN_REQUEST: &str = "WAYFARER_CMDS_PLAN_REQUEST_PATH";

/// Run the Wayfarer CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments, configuration, the request or
/// planning fail.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Plan(args) => run_plan(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "wayfarer",
    about = "Plan multi-day travel itineraries from selected spots",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan an itinerary from a JSON request file.
    Plan(PlanArgs),
}

#[cfg(test)]
mod tests;
