//! [`DistanceProvider`] backed by OSRM's Table API.
//!
//! One batched `table` request returns both durations and distances for all
//! pairs. Transient failures are retried here, so callers see at most one
//! error per matrix.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tokio::runtime::Runtime;
use url::Url;
use wayfarer_core::{
    DistanceError, DistanceMatrix, DistanceProvider, MatrixEntry, Point, TravelMode,
    resolved_coordinates,
};

use super::osrm::TableResponse;
use super::retry::RetryPolicy;
use crate::blocking;

/// Errors raised while constructing an HTTP adapter.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// The base URL could not be parsed or cannot carry a path.
    #[error("invalid base URL {url}: {message}")]
    InvalidBaseUrl {
        /// Offending URL.
        url: String,
        /// Parser detail.
        message: String,
    },
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Default user agent for outbound requests.
pub const DEFAULT_USER_AGENT: &str = "wayfarer/0.1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// OSRM profile name used for each travel mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsrmProfiles {
    /// Profile for [`TravelMode::Walking`].
    pub walking: String,
    /// Profile for [`TravelMode::Driving`].
    pub driving: String,
    /// Profile for [`TravelMode::Transit`]; OSRM has no transit graph.
    pub transit: String,
}

impl Default for OsrmProfiles {
    fn default() -> Self {
        Self {
            walking: "foot".to_owned(),
            driving: "driving".to_owned(),
            transit: "driving".to_owned(),
        }
    }
}

impl OsrmProfiles {
    /// Profile for `mode`.
    #[must_use]
    pub fn profile(&self, mode: TravelMode) -> &str {
        match mode {
            TravelMode::Walking => &self.walking,
            TravelMode::Driving => &self.driving,
            TravelMode::Transit => &self.transit,
        }
    }
}

/// Configuration for [`HttpDistanceProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpDistanceProviderConfig {
    /// OSRM base URL, e.g. `"http://localhost:5000"`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
    /// Retry schedule for transient failures.
    pub retry: RetryPolicy,
    /// Mode to profile mapping.
    pub profiles: OsrmProfiles,
}

impl Default for HttpDistanceProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_owned(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            retry: RetryPolicy::default(),
            profiles: OsrmProfiles::default(),
        }
    }
}

impl HttpDistanceProviderConfig {
    /// Configuration pointing at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the profile mapping.
    #[must_use]
    pub fn with_profiles(mut self, profiles: OsrmProfiles) -> Self {
        self.profiles = profiles;
        self
    }
}

/// OSRM-backed distance provider.
///
/// Owns a current-thread Tokio runtime reused across calls; see
/// [`DistanceProvider::distance_matrix`] for runtime requirements.
///
/// ```no_run
/// use geo::Coord;
/// use wayfarer_core::{DistanceProvider, Point, TravelMode};
/// use wayfarer_data::routing::HttpDistanceProvider;
///
/// let provider = HttpDistanceProvider::new("http://localhost:5000")?;
/// let points = [
///     Point::new(1, "Kinkaku-ji", Coord { x: 135.729, y: 35.039 }),
///     Point::new(2, "Ginkaku-ji", Coord { x: 135.798, y: 35.027 }),
/// ];
/// let matrix = provider.distance_matrix(&points, TravelMode::Walking)?;
/// println!("{:?}", matrix.entry(0, 1));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct HttpDistanceProvider {
    client: Client,
    base_url: Url,
    config: HttpDistanceProviderConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for HttpDistanceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDistanceProvider")
            .field("base_url", &self.base_url.as_str())
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl HttpDistanceProvider {
    /// Provider for `base_url` with default settings.
    ///
    /// # Errors
    /// Returns [`ProviderBuildError`] if the URL is invalid or the client or
    /// runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpDistanceProviderConfig::new(base_url))
    }

    /// Provider with explicit configuration.
    ///
    /// # Errors
    /// Returns [`ProviderBuildError`] if the URL is invalid or the client or
    /// runtime fails to build.
    pub fn with_config(config: HttpDistanceProviderConfig) -> Result<Self, ProviderBuildError> {
        let base_url = parse_base_url(&config.base_url)?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = blocking::owned_runtime().map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            base_url,
            config,
            runtime,
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpDistanceProviderConfig {
        &self.config
    }

    /// `{base}/table/v1/{profile}/{lon,lat;...}?annotations=duration,distance`.
    fn table_url(&self, points: &[Point], mode: TravelMode) -> Result<String, DistanceError> {
        let coords = resolved_coordinates(points)?
            .iter()
            .map(|coord| format!("{},{}", coord.x, coord.y))
            .collect::<Vec<_>>()
            .join(";");
        Ok(format!(
            "{}/table/v1/{}/{coords}?annotations=duration,distance",
            self.base_url.as_str().trim_end_matches('/'),
            self.config.profiles.profile(mode),
        ))
    }

    async fn fetch_table(&self, url: &str) -> Result<TableResponse, DistanceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        response
            .json()
            .await
            .map_err(|err| DistanceError::ParseError {
                message: err.to_string(),
            })
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> DistanceError {
        if error.is_timeout() {
            return DistanceError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return DistanceError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        DistanceError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ProviderBuildError> {
    let url = Url::parse(raw).map_err(|err| ProviderBuildError::InvalidBaseUrl {
        url: raw.to_owned(),
        message: err.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ProviderBuildError::InvalidBaseUrl {
            url: raw.to_owned(),
            message: "URL cannot carry a path".to_owned(),
        });
    }
    Ok(url)
}

/// Convert a Table response into a matrix for `mode`.
///
/// Null, negative and non-finite durations are unreachable. Missing or
/// invalid distances fall back to zero metres.
pub(crate) fn convert_response(
    response: TableResponse,
    mode: TravelMode,
) -> Result<DistanceMatrix, DistanceError> {
    if !response.is_ok() {
        return Err(DistanceError::ServiceError {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }
    let durations = response
        .durations
        .ok_or_else(|| DistanceError::ParseError {
            message: "OSRM response missing durations array".to_owned(),
        })?;
    let distances = response.distances.unwrap_or_default();

    let entries = durations
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            row.into_iter()
                .enumerate()
                .map(|(j, cell)| {
                    let duration = cell
                        .filter(|secs| secs.is_finite() && *secs >= 0.0)
                        .map(Duration::from_secs_f64)?;
                    let meters = distances
                        .get(i)
                        .and_then(|distance_row| distance_row.get(j))
                        .copied()
                        .flatten()
                        .map_or(0, whole_meters);
                    Some(MatrixEntry::new(duration, meters))
                })
                .collect()
        })
        .collect();
    Ok(DistanceMatrix::new(mode, entries)?)
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions,
    reason = "distance is checked finite and non-negative before rounding"
)]
fn whole_meters(meters: f64) -> u64 {
    if meters.is_finite() && meters >= 0.0 {
        meters.round() as u64
    } else {
        0
    }
}

impl DistanceProvider for HttpDistanceProvider {
    /// Fetch the matrix with one batched Table request.
    ///
    /// Works from plain threads and from inside either Tokio runtime flavour.
    fn distance_matrix(
        &self,
        points: &[Point],
        mode: TravelMode,
    ) -> Result<DistanceMatrix, DistanceError> {
        if points.is_empty() {
            return Err(DistanceError::EmptyInput);
        }
        let table_url = self.table_url(points, mode)?;
        log::debug!("requesting {}x{} {mode} table", points.len(), points.len());
        let url = table_url.as_str();
        let future = self
            .config
            .retry
            .run("OSRM table", DistanceError::is_transient, move || {
                self.fetch_table(url)
            });
        let response = blocking::block_on(&self.runtime, future)?;
        convert_response(response, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use wayfarer_core::test_support::{point, unresolved_point};

    #[fixture]
    fn sample_points() -> Vec<Point> {
        vec![point(1, -0.1, 51.5), point(2, -0.2, 51.6)]
    }

    fn ok_response(
        durations: Vec<Vec<Option<f64>>>,
        distances: Option<Vec<Vec<Option<f64>>>>,
    ) -> TableResponse {
        TableResponse {
            code: "Ok".to_owned(),
            message: None,
            durations: Some(durations),
            distances,
        }
    }

    #[rstest]
    #[case(TravelMode::Walking, "foot")]
    #[case(TravelMode::Driving, "driving")]
    #[case(TravelMode::Transit, "driving")]
    fn table_url_uses_the_mode_profile(
        sample_points: Vec<Point>,
        #[case] mode: TravelMode,
        #[case] profile: &str,
    ) {
        let provider = HttpDistanceProvider::new("http://osrm.example.com").expect("provider");
        let url = provider.table_url(&sample_points, mode).expect("url");
        assert_eq!(
            url,
            format!(
                "http://osrm.example.com/table/v1/{profile}/-0.1,51.5;-0.2,51.6?annotations=duration,distance"
            )
        );
    }

    #[rstest]
    fn table_url_keeps_base_path(sample_points: Vec<Point>) {
        let provider = HttpDistanceProvider::new("http://osrm.example.com/osrm/").expect("provider");
        let url = provider
            .table_url(&sample_points, TravelMode::Walking)
            .expect("url");
        assert!(url.starts_with("http://osrm.example.com/osrm/table/v1/foot/"));
    }

    #[rstest]
    fn table_url_rejects_unresolved_points() {
        let provider = HttpDistanceProvider::new("http://osrm.example.com").expect("provider");
        let err = provider
            .table_url(&[point(1, 0.0, 0.0), unresolved_point(7)], TravelMode::Walking)
            .expect_err("unresolved");
        assert_eq!(err, DistanceError::UnresolvedPoint { id: 7 });
    }

    #[rstest]
    #[case("not a url")]
    #[case("mailto:osrm@example.com")]
    fn invalid_base_urls_are_rejected(#[case] base: &str) {
        assert!(matches!(
            HttpDistanceProvider::new(base),
            Err(ProviderBuildError::InvalidBaseUrl { .. })
        ));
    }

    #[rstest]
    fn converts_durations_and_distances() {
        let response = ok_response(
            vec![vec![Some(0.0), Some(120.5)], vec![Some(118.0), Some(0.0)]],
            Some(vec![vec![Some(0.0), Some(950.4)], vec![Some(940.6), Some(0.0)]]),
        );
        let matrix = convert_response(response, TravelMode::Walking).expect("matrix");
        assert_eq!(matrix.mode(), TravelMode::Walking);
        assert!(!matrix.is_approximate());
        assert_eq!(
            matrix.entry(0, 1),
            Some(MatrixEntry::new(Duration::from_secs_f64(120.5), 950))
        );
        assert_eq!(
            matrix.entry(1, 0),
            Some(MatrixEntry::new(Duration::from_secs(118), 941))
        );
    }

    #[rstest]
    fn invalid_durations_are_unreachable() {
        let response = ok_response(
            vec![
                vec![Some(0.0), Some(-1.0), Some(f64::NAN)],
                vec![None, Some(0.0), Some(f64::INFINITY)],
                vec![Some(100.0), Some(200.0), Some(0.0)],
            ],
            None,
        );
        let matrix = convert_response(response, TravelMode::Driving).expect("matrix");
        assert_eq!(matrix.entry(0, 1), None);
        assert_eq!(matrix.entry(0, 2), None);
        assert_eq!(matrix.entry(1, 0), None);
        assert_eq!(matrix.entry(1, 2), None);
        assert_eq!(
            matrix.entry(2, 1),
            Some(MatrixEntry::new(Duration::from_secs(200), 0))
        );
    }

    #[rstest]
    fn service_errors_carry_code_and_message() {
        let response = TableResponse {
            code: "InvalidQuery".to_owned(),
            message: Some("Too many coordinates".to_owned()),
            durations: None,
            distances: None,
        };
        let err = convert_response(response, TravelMode::Walking).expect_err("should fail");
        assert_eq!(
            err,
            DistanceError::ServiceError {
                code: "InvalidQuery".to_owned(),
                message: "Too many coordinates".to_owned(),
            }
        );
    }

    #[rstest]
    fn missing_durations_are_a_parse_error() {
        let response = TableResponse {
            code: "Ok".to_owned(),
            message: None,
            durations: None,
            distances: None,
        };
        let err = convert_response(response, TravelMode::Walking).expect_err("should fail");
        assert!(matches!(err, DistanceError::ParseError { .. }));
    }

    #[rstest]
    fn ragged_tables_are_rejected() {
        let response = ok_response(vec![vec![Some(0.0), Some(1.0)], vec![Some(0.0)]], None);
        let err = convert_response(response, TravelMode::Walking).expect_err("should fail");
        assert!(matches!(err, DistanceError::Matrix(_)));
    }

    #[rstest]
    fn empty_input_returns_error() {
        let provider = HttpDistanceProvider::new("http://localhost:5000").expect("provider");
        let err = provider
            .distance_matrix(&[], TravelMode::Walking)
            .expect_err("should fail");
        assert_eq!(err, DistanceError::EmptyInput);
    }

    #[rstest]
    fn config_builder_pattern() {
        let config = HttpDistanceProviderConfig::new("http://example.com")
            .with_timeout(Duration::from_secs(60))
            .with_user_agent("test-agent/1.0")
            .with_retry(RetryPolicy::none());
        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "test-agent/1.0");
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.profiles, OsrmProfiles::default());
    }
}
