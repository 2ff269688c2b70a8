//! Memoising wrapper around another distance provider.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::{Point, TravelMode};

use super::error::DistanceError;
use super::matrix::DistanceMatrix;
use super::provider::{DistanceProvider, resolved_coordinates};

/// Coordinates are keyed at micro-degree precision (~0.1 m).
const KEY_SCALE: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    mode: TravelMode,
    coords: Vec<(i64, i64)>,
}

impl CacheKey {
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        reason = "coordinates are quantised to integers for hashing"
    )]
    fn new(points: &[Point], mode: TravelMode) -> Result<Self, DistanceError> {
        let coords = resolved_coordinates(points)?
            .into_iter()
            .map(|c| ((c.x * KEY_SCALE).round() as i64, (c.y * KEY_SCALE).round() as i64))
            .collect();
        Ok(Self { mode, coords })
    }
}

/// Caches matrices returned by an inner provider.
///
/// The cache is owned by whoever constructs it; there is no process-wide
/// state. Only successful matrices are stored. Call [`Self::clear`] to reset.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::{CachingDistanceProvider, DistanceProvider, HaversineProxy, Point, TravelMode};
///
/// let provider = CachingDistanceProvider::new(HaversineProxy::default());
/// let points = vec![
///     Point::new(1, "a", Coord { x: 0.0, y: 0.0 }),
///     Point::new(2, "b", Coord { x: 0.01, y: 0.0 }),
/// ];
/// provider.distance_matrix(&points, TravelMode::Walking)?;
/// provider.distance_matrix(&points, TravelMode::Walking)?;
/// assert_eq!(provider.len(), 1);
/// # Ok::<(), wayfarer_core::DistanceError>(())
/// ```
#[derive(Debug)]
pub struct CachingDistanceProvider<P> {
    inner: P,
    cache: Mutex<HashMap<CacheKey, DistanceMatrix>>,
}

impl<P> CachingDistanceProvider<P> {
    /// Wrap `inner` with an empty cache.
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached matrices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the cache holds no matrices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached matrix.
    pub fn clear(&self) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Borrow the wrapped provider.
    pub const fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: DistanceProvider> DistanceProvider for CachingDistanceProvider<P> {
    fn distance_matrix(
        &self,
        points: &[Point],
        mode: TravelMode,
    ) -> Result<DistanceMatrix, DistanceError> {
        let key = CacheKey::new(points, mode)?;
        if let Some(hit) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            log::debug!("distance matrix cache hit for {} points", points.len());
            return Ok(hit.clone());
        }
        let matrix = self.inner.distance_matrix(points, mode)?;
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, matrix.clone());
        Ok(matrix)
    }
}
