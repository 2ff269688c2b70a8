//! Route ordering, day scheduling and itinerary orchestration.
//!
//! [`RouteOptimizer`] orders points with a nearest-neighbour walk over a
//! travel-time matrix, [`ScheduleBuilder`] turns that order into timed days
//! with meal breaks, and [`Orchestrator`] runs both inside a time budget,
//! falling back to a narrative provider when the pipeline fails.
//! [`ItineraryService`] adds request validation and session storage on top.

#![forbid(unsafe_code)]

mod optimizer;
mod orchestrator;
mod schedule;
mod service;

pub use optimizer::{
    DEFAULT_PROXY_THRESHOLD, OptimizeError, OptimizerConfig, RouteOptimizer,
    nearest_neighbour_order,
};
pub use orchestrator::{
    DEFAULT_TIME_BUDGET, Orchestrator, OrchestratorConfig, PipelineError, PlanError, PlanOutcome,
    PlanUnavailable,
};
pub use schedule::{
    DEFAULT_MEAL_WINDOWS, MealWindow, ScheduleBuilder, ScheduleError, UNKNOWN_LOCATION_NOTE,
    navigation_url,
};
pub use service::{ItineraryService, PlanRequest, PlanResponse, ServiceError};
