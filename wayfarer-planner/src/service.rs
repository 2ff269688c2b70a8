//! Request-level entry point: validate, plan and remember.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wayfarer_core::{
    DistanceProvider, Itinerary, OptimizationOptions, Point, RecommendationProvider,
    SessionRecord, SessionStore, SessionUpdate, UsageMetrics, UsageSnapshot, ValidationError,
    validate_points,
};

use crate::{Orchestrator, PlanError};

/// Body of an itinerary request.
///
/// Options sit alongside the request fields on the wire:
///
/// ```
/// use wayfarer_planner::PlanRequest;
///
/// let request = PlanRequest::from_json(r#"{
///     "sessionId": "abc",
///     "city": "Kyoto",
///     "selectedSpots": [{"id": 1, "name": "Kinkaku-ji", "location": {"x": 135.729, "y": 35.039}}],
///     "travelMode": "transit",
///     "startTime": "10:00"
/// }"#)?;
/// assert_eq!(request.options.first_day_start().to_string(), "10:00");
/// # Ok::<(), wayfarer_core::ValidationError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    /// Session the resulting itinerary is stored under.
    pub session_id: String,
    /// City being planned.
    pub city: String,
    /// Spots to visit.
    pub selected_spots: Vec<Point>,
    /// Planning options.
    #[serde(flatten)]
    pub options: OptimizationOptions,
}

impl PlanRequest {
    /// Decode a JSON request body.
    ///
    /// # Errors
    /// Returns [`ValidationError::Malformed`] when the body does not decode,
    /// including badly formatted times and unknown travel modes.
    pub fn from_json(body: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(body).map_err(|err| ValidationError::Malformed {
            message: err.to_string(),
        })
    }

    /// Check every field against its limits.
    ///
    /// # Errors
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.session_id.trim().is_empty() {
            return Err(ValidationError::BlankSessionId);
        }
        if self.city.trim().is_empty() {
            return Err(ValidationError::BlankCity);
        }
        validate_points(&self.selected_spots)?;
        self.options.validate()
    }
}

/// Result of a successful plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    /// The itinerary.
    pub itinerary: Itinerary,
    /// Whether the narrative fallback produced it.
    pub fallback_used: bool,
}

/// Errors returned by [`ItineraryService::plan`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The request was rejected before planning.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Planning failed on both paths.
    #[error(transparent)]
    Unavailable(#[from] PlanError),
}

/// Validates requests, runs the orchestrator and records sessions.
#[derive(Debug)]
pub struct ItineraryService<D, R, S> {
    orchestrator: Orchestrator<D, R>,
    sessions: S,
}

impl<D, R, S> ItineraryService<D, R, S>
where
    D: DistanceProvider + Send + Sync + 'static,
    R: RecommendationProvider,
    S: SessionStore,
{
    /// Wrap an orchestrator and a session store.
    pub const fn new(orchestrator: Orchestrator<D, R>, sessions: S) -> Self {
        Self {
            orchestrator,
            sessions,
        }
    }

    /// Plan `request` and store the result under its session id.
    ///
    /// Expired sessions are purged before the write. Nothing is stored when
    /// validation or planning fails.
    ///
    /// # Errors
    /// Returns [`ServiceError::Validation`] for bad input and
    /// [`ServiceError::Unavailable`] when no itinerary could be produced.
    pub fn plan(&self, request: PlanRequest) -> Result<PlanResponse, ServiceError> {
        request.validate()?;
        let outcome = self.orchestrator.plan(
            &request.selected_spots,
            &request.city,
            &request.options,
        )?;
        self.sessions.purge_expired();
        self.sessions.set(
            &request.session_id,
            SessionUpdate {
                city: Some(request.city),
                selected_spots: Some(request.selected_spots),
                options: Some(request.options),
                itinerary: Some(outcome.itinerary.clone()),
                fallback_used: Some(outcome.fallback_used),
            },
        );
        Ok(PlanResponse {
            itinerary: outcome.itinerary,
            fallback_used: outcome.fallback_used,
        })
    }

    /// Stored state for `session_id`, if still live.
    #[must_use]
    pub fn session(&self, session_id: &str) -> Option<SessionRecord> {
        self.sessions.get(session_id)
    }

    /// Current usage counters.
    #[must_use]
    pub fn metrics(&self) -> UsageSnapshot {
        self.orchestrator.metrics().snapshot()
    }

    /// Shared usage counters.
    #[must_use]
    pub const fn usage(&self) -> &std::sync::Arc<UsageMetrics> {
        self.orchestrator.metrics()
    }

    /// The wrapped orchestrator.
    #[must_use]
    pub const fn orchestrator(&self) -> &Orchestrator<D, R> {
        &self.orchestrator
    }
}
