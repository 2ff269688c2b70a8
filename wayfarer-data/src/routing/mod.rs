//! HTTP distance providers for routing services.
//!
//! [`HttpDistanceProvider`] implements [`wayfarer_core::DistanceProvider`] on
//! top of the OSRM Table API. The trait is synchronous, so the provider blocks
//! on its async HTTP calls internally and stays usable from plain threads.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use wayfarer_data::routing::{HttpDistanceProvider, HttpDistanceProviderConfig, RetryPolicy};
//!
//! let config = HttpDistanceProviderConfig::new("http://localhost:5000")
//!     .with_timeout(Duration::from_secs(5))
//!     .with_retry(RetryPolicy::new(4, Duration::from_millis(100), Duration::from_secs(1)))
//!     .with_user_agent("my-app/1.0");
//! let provider = HttpDistanceProvider::with_config(config)?;
//! # let _ = provider;
//! # Ok::<(), wayfarer_data::routing::ProviderBuildError>(())
//! ```

mod osrm;
mod provider;
mod retry;

pub use provider::{
    DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, HttpDistanceProvider, HttpDistanceProviderConfig,
    OsrmProfiles, ProviderBuildError,
};
pub use retry::RetryPolicy;
