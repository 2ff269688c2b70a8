//! Exponential-backoff retry for outbound HTTP calls.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Bounded retry schedule.
///
/// Attempt `n` (one-based) that fails transiently is followed by a sleep of
/// `initial_backoff * 2^(n-1)`, capped at `max_backoff`.
///
/// ```
/// use std::time::Duration;
/// use wayfarer_data::routing::RetryPolicy;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.backoff(1), Duration::from_millis(200));
/// assert_eq!(policy.backoff(2), Duration::from_millis(400));
/// assert_eq!(policy.backoff(10), Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; at least one is always made.
    pub max_attempts: u32,
    /// Sleep after the first failure.
    pub initial_backoff: Duration,
    /// Upper bound on any single sleep.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// A policy with explicit bounds.
    #[must_use]
    pub const fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff,
            max_backoff,
        }
    }

    /// A single attempt with no retries.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Sleep after failed attempt `attempt` (one-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1_u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempt
    /// budget runs out. Only errors for which `is_transient` holds are
    /// retried; the last error is returned.
    ///
    /// # Errors
    /// Returns the error of the final attempt.
    pub async fn run<T, E, F, Fut>(
        &self,
        label: &str,
        is_transient: impl Fn(&E) -> bool,
        mut operation: F,
    ) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts && is_transient(&err) => {
                    let delay = self.backoff(attempt);
                    log::warn!(
                        "{label} attempt {attempt}/{} failed ({err}); retrying in {}ms",
                        self.max_attempts,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt = attempt.saturating_add(1);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::cell::Cell;
    use wayfarer_core::DistanceError;

    fn network_error() -> DistanceError {
        DistanceError::NetworkError {
            url: "http://osrm.test".to_owned(),
            message: "reset".to_owned(),
        }
    }

    fn quick(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    #[rstest]
    #[case(1, 200)]
    #[case(2, 400)]
    #[case(3, 800)]
    #[case(4, 1600)]
    #[case(5, 2000)]
    #[case(40, 2000)]
    fn backoff_doubles_up_to_the_cap(#[case] attempt: u32, #[case] millis: u64) {
        assert_eq!(
            RetryPolicy::default().backoff(attempt),
            Duration::from_millis(millis)
        );
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let calls = Cell::new(0);
        let result = quick(3)
            .run("table", DistanceError::is_transient, || {
                calls.set(calls.get() + 1);
                let outcome = if calls.get() < 3 {
                    Err(network_error())
                } else {
                    Ok(calls.get())
                };
                async move { outcome }
            })
            .await;
        assert_eq!(result, Ok(3));
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = Cell::new(0);
        let result: Result<(), _> = quick(2)
            .run("table", DistanceError::is_transient, || {
                calls.set(calls.get() + 1);
                async { Err(network_error()) }
            })
            .await;
        assert_eq!(result, Err(network_error()));
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let calls = Cell::new(0);
        let result: Result<(), _> = quick(5)
            .run("table", DistanceError::is_transient, || {
                calls.set(calls.get() + 1);
                async {
                    Err(DistanceError::ParseError {
                        message: "bad json".to_owned(),
                    })
                }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }
}
