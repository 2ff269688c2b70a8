//! Facade crate for the Wayfarer itinerary planner.
//!
//! This crate re-exports the core domain types and the planning pipeline, and
//! exposes the OSRM and chat-completions adapters behind the `http` feature.

#![forbid(unsafe_code)]

pub use wayfarer_core::{
    CachingDistanceProvider, ClockTime, DistanceError, DistanceMatrix, DistanceProvider,
    HaversineProxy, InMemorySessionStore, Itinerary, MatrixEntry, NarrativeItinerary,
    OptimizationOptions, Point, RecommendationError, RecommendationProvider, Route,
    ScheduleItem, SessionRecord, SessionStore, SessionUpdate, TravelMode, UsageMetrics,
    UsageSnapshot, ValidationError,
};
pub use wayfarer_planner::{
    ItineraryService, Orchestrator, OrchestratorConfig, OptimizerConfig, PlanError,
    PlanOutcome, PlanRequest, PlanResponse, RouteOptimizer, ScheduleBuilder, ServiceError,
};

#[cfg(feature = "http")]
pub use wayfarer_data::{
    ChatNarrativeConfig, ChatNarrativeProvider, HttpDistanceProvider,
    HttpDistanceProviderConfig, ProviderBuildError,
};
