//! Network adapters for the Wayfarer planner.
//!
//! Responsibilities:
//! - Fetch travel-time and distance matrices from OSRM ([`routing`]).
//! - Fetch narrative fallback plans from a chat-completions API
//!   ([`narrative`]).
//!
//! Boundaries:
//! - Do not encode planning rules (they live in `wayfarer-planner`).
//! - Expose the synchronous collaborator traits from `wayfarer-core`; async
//!   HTTP stays internal.
//!
//! Invariants:
//! - Transient HTTP failures are retried inside the adapter.
//! - No global mutable state.

#![forbid(unsafe_code)]

mod blocking;
pub mod narrative;
pub mod routing;

pub use narrative::{ChatNarrativeConfig, ChatNarrativeProvider};
pub use routing::{
    HttpDistanceProvider, HttpDistanceProviderConfig, OsrmProfiles, ProviderBuildError,
    RetryPolicy,
};
