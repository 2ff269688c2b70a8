//! Core domain types for the Wayfarer itinerary planner.
//!
//! This crate defines the values that flow through planning (points,
//! distance matrices, routes, schedules and itineraries), the options that
//! steer it, and the collaborator traits the planner depends on:
//! [`DistanceProvider`], [`RecommendationProvider`] and [`SessionStore`].
//! Concrete network adapters live in `wayfarer-data`; the algorithms live in
//! `wayfarer-planner`.

#![forbid(unsafe_code)]

mod clock;
pub mod distance;
mod metrics;
mod narrative;
mod options;
mod point;
mod route;
mod schedule;
mod session;
mod travel_mode;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{ClockTime, ClockTimeError, MINUTES_PER_DAY, minutes_ceil};
pub use distance::{
    CachingDistanceProvider, DistanceError, DistanceMatrix, DistanceProvider, HaversineProxy,
    MatrixEntry, MatrixError, haversine_meters, resolved_coordinates,
};
pub use metrics::{UsageMetrics, UsageSnapshot};
pub use narrative::{NarrativeItinerary, RecommendationError, RecommendationProvider};
pub use options::{
    BREAK_MINUTES, DEFAULT_DAY_END, DEFAULT_START_TIME, MAX_POINTS, OptimizationOptions,
    VISIT_MINUTES, ValidationError, validate_points,
};
pub use point::Point;
pub use route::{Leg, Route};
pub use schedule::{
    ItemKind, Itinerary, Meal, ScheduleItem, TravelLeg, day_marker, itinerary_title,
};
pub use session::{
    DEFAULT_SESSION_TTL, InMemorySessionStore, SessionRecord, SessionStore, SessionUpdate,
};
pub use travel_mode::{ParseTravelModeError, TravelMode};

/// Serialise a [`std::time::Duration`] as whole seconds.
pub(crate) mod serde_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(
        duration: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
