use thiserror::Error;

use super::matrix::MatrixError;

/// Errors from [`crate::distance::DistanceProvider::distance_matrix`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistanceError {
    /// No points were provided.
    ///
    /// Callers should pre-filter input to avoid this condition.
    #[error("at least one point is required")]
    EmptyInput,
    /// A point without a coordinate was passed to the provider.
    #[error("point {id} has no resolved location")]
    UnresolvedPoint {
        /// Identifier of the offending point.
        id: u64,
    },
    /// The routing service did not answer in time.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The routing service answered with a non-success HTTP status.
    #[error("request to {url} failed with HTTP {status}: {message}")]
    HttpError {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail.
        message: String,
    },
    /// The request could not be delivered.
    #[error("network error contacting {url}: {message}")]
    NetworkError {
        /// Request URL.
        url: String,
        /// Error detail.
        message: String,
    },
    /// The routing service reported an application-level error.
    #[error("routing service error {code}: {message}")]
    ServiceError {
        /// Service status code.
        code: String,
        /// Error detail.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Error detail.
        message: String,
    },
    /// The returned matrix was malformed.
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

impl DistanceError {
    /// Whether repeating the same request may succeed.
    ///
    /// Timeouts, network failures, HTTP 429 and HTTP 5xx are transient.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::NetworkError { .. } => true,
            Self::HttpError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
