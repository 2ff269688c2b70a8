//! Usage counters shared by the planning pipeline.
//!
//! Construct one [`UsageMetrics`] per host process and hand it to components
//! by `Arc`. There is no global instance.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Atomic counters recording pipeline activity.
///
/// # Examples
/// ```
/// use wayfarer_core::UsageMetrics;
///
/// let metrics = UsageMetrics::default();
/// metrics.record_pipeline_run();
/// metrics.record_fallback();
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.pipeline_runs, 1);
/// assert_eq!(snapshot.fallbacks, 1);
/// metrics.reset();
/// assert_eq!(metrics.snapshot().pipeline_runs, 0);
/// ```
#[derive(Debug, Default)]
pub struct UsageMetrics {
    pipeline_runs: AtomicU64,
    provider_matrices: AtomicU64,
    proxy_matrices: AtomicU64,
    fallbacks: AtomicU64,
    timeouts: AtomicU64,
    failures: AtomicU64,
}

/// Point-in-time copy of [`UsageMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSnapshot {
    /// Optimise-and-schedule pipelines started.
    pub pipeline_runs: u64,
    /// Matrices requested from a distance provider.
    pub provider_matrices: u64,
    /// Matrices estimated by the straight-line proxy.
    pub proxy_matrices: u64,
    /// Plans served by the narrative fallback.
    pub fallbacks: u64,
    /// Pipelines that exceeded their time budget.
    pub timeouts: u64,
    /// Requests where the fallback also failed.
    pub failures: u64,
}

impl UsageMetrics {
    /// Count a pipeline start.
    pub fn record_pipeline_run(&self) {
        self.pipeline_runs.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a provider matrix request.
    pub fn record_provider_matrix(&self) {
        self.provider_matrices.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a proxy matrix.
    pub fn record_proxy_matrix(&self) {
        self.proxy_matrices.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a narrative fallback.
    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a pipeline timeout.
    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a request that produced no itinerary.
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter.
    #[must_use]
    pub fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            pipeline_runs: self.pipeline_runs.load(Ordering::Relaxed),
            provider_matrices: self.provider_matrices.load(Ordering::Relaxed),
            proxy_matrices: self.proxy_matrices.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    /// Zero every counter.
    pub fn reset(&self) {
        for counter in [
            &self.pipeline_runs,
            &self.provider_matrices,
            &self.proxy_matrices,
            &self.fallbacks,
            &self.timeouts,
            &self.failures,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
