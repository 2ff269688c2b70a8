//! OSRM Table service response types.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#table-service>

use serde::Deserialize;

/// OSRM Table API response.
///
/// `code` is `"Ok"` on success; otherwise `message` explains the failure and
/// the matrices are absent.
#[derive(Debug, Deserialize)]
pub struct TableResponse {
    /// Status code, e.g. `"Ok"`, `"InvalidQuery"` or `"NoTable"`.
    pub code: String,

    /// Error detail when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Durations in seconds; `None` cells have no route.
    pub durations: Option<Vec<Vec<Option<f64>>>>,

    /// Distances in metres, present when requested via `annotations`.
    pub distances: Option<Vec<Vec<Option<f64>>>>,
}

impl TableResponse {
    /// Whether OSRM reported success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}
