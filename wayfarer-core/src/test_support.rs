//! Deterministic collaborators and point builders for unit and behaviour
//! tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use geo::Coord;

use crate::{
    DistanceError, DistanceMatrix, DistanceProvider, MatrixEntry, NarrativeItinerary, Point,
    RecommendationError, RecommendationProvider, TravelMode,
};

/// A resolved point named `"Spot {id}"` at longitude `x`, latitude `y`.
#[must_use]
pub fn point(id: u64, x: f64, y: f64) -> Point {
    Point::new(id, format!("Spot {id}"), Coord { x, y })
}

/// A point without coordinates.
#[must_use]
pub fn unresolved_point(id: u64) -> Point {
    Point::unresolved(id, format!("Spot {id}"), "address unknown")
}

/// `count` points spaced `step` degrees apart on a serpentine grid around
/// central Kyoto.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    clippy::integer_division,
    clippy::integer_division_remainder_used,
    reason = "grid offsets are small integer multiples of the step"
)]
pub fn grid_points(count: u64, step: f64) -> Vec<Point> {
    const COLUMNS: u64 = 5;
    (0..count)
        .map(|id| {
            let row = id / COLUMNS;
            let col = if row % 2 == 0 {
                id % COLUMNS
            } else {
                COLUMNS - 1 - id % COLUMNS
            };
            point(id, 135.76 + col as f64 * step, 35.0 + row as f64 * step)
        })
        .collect()
}

#[derive(Debug, Clone)]
enum MatrixResponse {
    Matrix(DistanceMatrix),
    Seconds(Vec<Vec<Option<u64>>>),
    Uniform(Duration),
    Error(DistanceError),
}

/// Distance provider returning canned data and counting calls.
#[derive(Debug)]
pub struct StubDistanceProvider {
    response: MatrixResponse,
    calls: AtomicUsize,
    largest_request: AtomicUsize,
}

impl StubDistanceProvider {
    fn new(response: MatrixResponse) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            largest_request: AtomicUsize::new(0),
        }
    }

    /// Always return `matrix`.
    #[must_use]
    pub fn with_matrix(matrix: DistanceMatrix) -> Self {
        Self::new(MatrixResponse::Matrix(matrix))
    }

    /// Build the matrix from travel seconds; `None` marks an unreachable pair.
    ///
    /// Distances are ten metres per second of travel.
    #[must_use]
    pub fn with_seconds(rows: Vec<Vec<Option<u64>>>) -> Self {
        Self::new(MatrixResponse::Seconds(rows))
    }

    /// Every off-diagonal pair takes `secs` seconds, for any number of points.
    #[must_use]
    pub fn with_uniform(secs: u64) -> Self {
        Self::new(MatrixResponse::Uniform(Duration::from_secs(secs)))
    }

    /// Always fail with `error`.
    #[must_use]
    pub fn with_error(error: DistanceError) -> Self {
        Self::new(MatrixResponse::Error(error))
    }

    /// Number of matrix requests served.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Largest number of points in a single request.
    #[must_use]
    pub fn largest_request(&self) -> usize {
        self.largest_request.load(Ordering::SeqCst)
    }
}

fn entry_from_secs(secs: u64) -> MatrixEntry {
    MatrixEntry::new(Duration::from_secs(secs), secs.saturating_mul(10))
}

impl DistanceProvider for StubDistanceProvider {
    fn distance_matrix(
        &self,
        points: &[Point],
        mode: TravelMode,
    ) -> Result<DistanceMatrix, DistanceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.largest_request.fetch_max(points.len(), Ordering::SeqCst);
        match &self.response {
            MatrixResponse::Matrix(matrix) => Ok(matrix.clone()),
            MatrixResponse::Seconds(rows) => {
                let entries = rows
                    .iter()
                    .map(|row| row.iter().map(|cell| cell.map(entry_from_secs)).collect())
                    .collect();
                Ok(DistanceMatrix::new(mode, entries)?)
            }
            MatrixResponse::Uniform(duration) => {
                let n = points.len();
                let leg = entry_from_secs(duration.as_secs());
                let entries = (0..n)
                    .map(|i| {
                        (0..n)
                            .map(|j| Some(if i == j { MatrixEntry::ZERO } else { leg }))
                            .collect()
                    })
                    .collect();
                Ok(DistanceMatrix::new(mode, entries)?)
            }
            MatrixResponse::Error(error) => Err(error.clone()),
        }
    }
}

/// Distance provider that sleeps before answering with uniform legs.
#[derive(Debug)]
pub struct SlowDistanceProvider {
    delay: Duration,
    inner: StubDistanceProvider,
}

impl SlowDistanceProvider {
    /// Sleep for `delay` on every request.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: StubDistanceProvider::with_uniform(300),
        }
    }

    /// Number of requests received.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.inner.calls()
    }
}

impl DistanceProvider for SlowDistanceProvider {
    fn distance_matrix(
        &self,
        points: &[Point],
        mode: TravelMode,
    ) -> Result<DistanceMatrix, DistanceError> {
        thread::sleep(self.delay);
        self.inner.distance_matrix(points, mode)
    }
}

#[derive(Debug, Clone)]
enum NarrativeResponse {
    Text(String),
    Error(RecommendationError),
}

/// Recommendation provider returning canned text and counting calls.
#[derive(Debug)]
pub struct StubRecommendationProvider {
    response: NarrativeResponse,
    calls: AtomicUsize,
}

impl StubRecommendationProvider {
    /// Answer with `text`, parsed by [`NarrativeItinerary::from_text`].
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            response: NarrativeResponse::Text(text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with `error`.
    #[must_use]
    pub const fn with_error(error: RecommendationError) -> Self {
        Self {
            response: NarrativeResponse::Error(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of narrative requests served.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for StubRecommendationProvider {
    fn default() -> Self {
        Self::with_text("Wander the old town, then visit each selected spot at your own pace.")
    }
}

impl RecommendationProvider for StubRecommendationProvider {
    fn narrative_itinerary(
        &self,
        _points: &[Point],
        _city: &str,
    ) -> Result<NarrativeItinerary, RecommendationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            NarrativeResponse::Text(text) => Ok(NarrativeItinerary::from_text(text)),
            NarrativeResponse::Error(error) => Err(error.clone()),
        }
    }
}
