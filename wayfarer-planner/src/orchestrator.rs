//! Optimise-then-schedule pipeline with a narrative fallback.
//!
//! [`Orchestrator::plan`] runs the route optimiser and schedule builder on a
//! worker thread bounded by a wall-clock budget. Any pipeline error, or
//! running out of time, switches to the [`RecommendationProvider`]. Work left
//! on a timed-out worker is discarded.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use wayfarer_core::{
    DistanceProvider, Itinerary, OptimizationOptions, Point, RecommendationError,
    RecommendationProvider, UsageMetrics,
};

use crate::{OptimizeError, OptimizerConfig, RouteOptimizer, ScheduleBuilder, ScheduleError};

/// Wall-clock budget for one pipeline run.
pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_secs(5);

/// Configuration for [`Orchestrator`].
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Maximum time the optimise-and-schedule pipeline may take.
    pub time_budget: Duration,
    /// Optimiser settings.
    pub optimizer: OptimizerConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            time_budget: DEFAULT_TIME_BUDGET,
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl OrchestratorConfig {
    /// Set the pipeline time budget.
    #[must_use]
    pub const fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    /// Set the optimiser configuration.
    #[must_use]
    pub const fn with_optimizer(mut self, optimizer: OptimizerConfig) -> Self {
        self.optimizer = optimizer;
        self
    }
}

/// Why the structured pipeline did not produce an itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Route optimisation failed.
    #[error(transparent)]
    Optimize(#[from] OptimizeError),
    /// Schedule construction failed.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    /// The pipeline exceeded its time budget.
    #[error("pipeline exceeded its {}ms budget", budget.as_millis())]
    Timeout {
        /// Budget that was exceeded.
        budget: Duration,
    },
    /// The worker thread could not be started or stopped unexpectedly.
    #[error("pipeline worker failed: {message}")]
    Worker {
        /// Failure detail.
        message: String,
    },
    /// The pipeline produced no items.
    #[error("pipeline produced an empty itinerary")]
    Empty,
}

/// Returned when neither the pipeline nor the fallback produced a plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("itinerary planning is unavailable, please try again later")]
pub struct PlanUnavailable {
    /// Pipeline failure that triggered the fallback.
    pub pipeline: PipelineError,
    /// Fallback failure.
    pub fallback: RecommendationError,
}

/// Errors returned by [`Orchestrator::plan`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// Both the pipeline and the narrative fallback failed.
    #[error(transparent)]
    Unavailable(#[from] PlanUnavailable),
}

/// A produced itinerary and whether it came from the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOutcome {
    /// The itinerary.
    pub itinerary: Itinerary,
    /// Whether the narrative fallback produced it.
    pub fallback_used: bool,
}

/// Composes optimiser, schedule builder and narrative fallback.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use wayfarer_core::test_support::{StubDistanceProvider, StubRecommendationProvider, grid_points};
/// use wayfarer_core::OptimizationOptions;
/// use wayfarer_planner::Orchestrator;
///
/// let orchestrator = Orchestrator::new(
///     StubDistanceProvider::with_uniform(300),
///     StubRecommendationProvider::default(),
/// );
/// let outcome = orchestrator.plan(&grid_points(3, 0.01), "Kyoto", &OptimizationOptions::default())?;
/// assert!(!outcome.fallback_used);
/// assert_eq!(outcome.itinerary.items.len(), 3);
/// # Ok::<(), wayfarer_planner::PlanError>(())
/// ```
#[derive(Debug)]
pub struct Orchestrator<D, R> {
    optimizer: Arc<RouteOptimizer<D>>,
    builder: ScheduleBuilder,
    recommender: R,
    time_budget: Duration,
    metrics: Arc<UsageMetrics>,
}

impl<D, R> Orchestrator<D, R>
where
    D: DistanceProvider + Send + Sync + 'static,
    R: RecommendationProvider,
{
    /// Orchestrator with default configuration and private metrics.
    pub fn new(provider: D, recommender: R) -> Self {
        Self::with_config(
            provider,
            recommender,
            OrchestratorConfig::default(),
            Arc::new(UsageMetrics::default()),
        )
    }

    /// Orchestrator with explicit configuration and shared metrics.
    pub fn with_config(
        provider: D,
        recommender: R,
        config: OrchestratorConfig,
        metrics: Arc<UsageMetrics>,
    ) -> Self {
        let optimizer = RouteOptimizer::with_config(provider, config.optimizer)
            .with_metrics(Arc::clone(&metrics));
        Self {
            optimizer: Arc::new(optimizer),
            builder: ScheduleBuilder::default(),
            recommender,
            time_budget: config.time_budget,
            metrics,
        }
    }

    /// Replace the schedule builder.
    #[must_use]
    pub fn with_schedule_builder(mut self, builder: ScheduleBuilder) -> Self {
        self.builder = builder;
        self
    }

    /// Shared usage counters.
    #[must_use]
    pub const fn metrics(&self) -> &Arc<UsageMetrics> {
        &self.metrics
    }

    /// The route optimiser.
    #[must_use]
    pub fn optimizer(&self) -> &RouteOptimizer<D> {
        &self.optimizer
    }

    /// The narrative fallback provider.
    #[must_use]
    pub const fn recommender(&self) -> &R {
        &self.recommender
    }

    /// Produce an itinerary for `points` in `city`.
    ///
    /// Returns the structured itinerary when the pipeline finishes within
    /// budget, otherwise the narrative fallback with `fallback_used` set.
    ///
    /// # Errors
    /// Returns [`PlanError::Unavailable`] only when the fallback fails too.
    pub fn plan(
        &self,
        points: &[Point],
        city: &str,
        options: &OptimizationOptions,
    ) -> Result<PlanOutcome, PlanError> {
        self.metrics.record_pipeline_run();
        log::info!("planning {} spots in {city}", points.len());
        match self.run_pipeline(points, city, options) {
            Ok(itinerary) => Ok(PlanOutcome {
                itinerary,
                fallback_used: false,
            }),
            Err(pipeline) => self.fall_back(points, city, pipeline),
        }
    }

    fn run_pipeline(
        &self,
        points: &[Point],
        city: &str,
        options: &OptimizationOptions,
    ) -> Result<Itinerary, PipelineError> {
        let (sender, receiver) = mpsc::channel();
        let optimizer = Arc::clone(&self.optimizer);
        let builder = self.builder.clone();
        let owned_points = points.to_vec();
        let owned_options = options.clone();
        let owned_city = city.to_owned();

        thread::Builder::new()
            .name("wayfarer-pipeline".to_owned())
            .spawn(move || {
                let result = build_itinerary(
                    &optimizer,
                    &builder,
                    &owned_points,
                    &owned_city,
                    &owned_options,
                );
                if sender.send(result).is_err() {
                    log::debug!("pipeline finished after its budget; result discarded");
                }
            })
            .map_err(|err| PipelineError::Worker {
                message: err.to_string(),
            })?;

        match receiver.recv_timeout(self.time_budget) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                self.metrics.record_timeout();
                Err(PipelineError::Timeout {
                    budget: self.time_budget,
                })
            }
            Err(RecvTimeoutError::Disconnected) => Err(PipelineError::Worker {
                message: "worker exited without a result".to_owned(),
            }),
        }
    }

    fn fall_back(
        &self,
        points: &[Point],
        city: &str,
        pipeline: PipelineError,
    ) -> Result<PlanOutcome, PlanError> {
        log::warn!("itinerary pipeline failed ({pipeline}); using narrative fallback");
        self.metrics.record_fallback();
        let narrative = self
            .recommender
            .narrative_itinerary(points, city)
            .and_then(|narrative| {
                if narrative.is_empty() {
                    Err(RecommendationError::EmptyResponse)
                } else {
                    Ok(narrative)
                }
            });
        match narrative {
            Ok(narrative) => Ok(PlanOutcome {
                itinerary: narrative.into_itinerary(city),
                fallback_used: true,
            }),
            Err(fallback) => {
                log::error!("narrative fallback failed: {fallback}");
                self.metrics.record_failure();
                Err(PlanUnavailable { pipeline, fallback }.into())
            }
        }
    }
}

fn build_itinerary<D: DistanceProvider>(
    optimizer: &RouteOptimizer<D>,
    builder: &ScheduleBuilder,
    points: &[Point],
    city: &str,
    options: &OptimizationOptions,
) -> Result<Itinerary, PipelineError> {
    let route = optimizer.optimize(points, options)?;
    let items = builder.build(points, &route, options)?;
    if items.is_empty() {
        return Err(PipelineError::Empty);
    }
    Ok(Itinerary::from_items(city, items, Some(route)))
}
