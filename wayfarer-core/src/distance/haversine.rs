//! Straight-line travel estimates.
//!
//! Uses great-circle distance and a per-mode speed to estimate travel time.
//! Less accurate than a routing service (ignores streets and timetables) but
//! always available and free of external calls.

use std::time::Duration;

use geo::Coord;

use crate::{Point, TravelMode};

use super::error::DistanceError;
use super::matrix::{DistanceMatrix, MatrixEntry};
use super::provider::{DistanceProvider, resolved_coordinates};

/// Mean Earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two WGS84 coordinates, in metres.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::haversine_meters;
///
/// // Kyoto Station to Kiyomizu-dera, roughly 2.4 km apart.
/// let d = haversine_meters(Coord { x: 135.7588, y: 34.9858 }, Coord { x: 135.7850, y: 34.9949 });
/// assert!((2_000.0..3_000.0).contains(&d));
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "great-circle distance is inherently floating point"
)]
pub fn haversine_meters(from: Coord<f64>, to: Coord<f64>) -> f64 {
    let lat1 = from.y.to_radians();
    let lat2 = to.y.to_radians();
    let delta_lat = (to.y - from.y).to_radians();
    let delta_lng = (to.x - from.x).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Distance provider estimating every pair from straight-line distance.
///
/// Matrices are flagged approximate. Speeds default to
/// [`TravelMode::proxy_speed_kmh`] and can be overridden per instance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HaversineProxy {
    speed_override_kmh: Option<f64>,
}

impl HaversineProxy {
    /// Use a fixed speed for every travel mode.
    #[must_use]
    pub const fn with_speed_kmh(speed_kmh: f64) -> Self {
        Self {
            speed_override_kmh: Some(speed_kmh),
        }
    }

    /// Estimate one leg between two coordinates.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use geo::Coord;
    /// use wayfarer_core::{HaversineProxy, TravelMode};
    ///
    /// let proxy = HaversineProxy::with_speed_kmh(36.0);
    /// let leg = proxy.estimate(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 0.0 }, TravelMode::Driving);
    /// assert_eq!(leg.duration, Duration::ZERO);
    /// ```
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "metres and seconds are rounded from non-negative floating-point estimates"
    )]
    pub fn estimate(&self, from: Coord<f64>, to: Coord<f64>, mode: TravelMode) -> MatrixEntry {
        let meters = haversine_meters(from, to);
        let speed_kmh = self
            .speed_override_kmh
            .filter(|speed| speed.is_finite() && *speed > 0.0)
            .unwrap_or_else(|| mode.proxy_speed_kmh());
        let meters_per_second = speed_kmh * 1000.0 / 3600.0;
        let seconds = (meters / meters_per_second).round();
        MatrixEntry::new(Duration::from_secs(seconds as u64), meters.round() as u64)
    }
}

impl DistanceProvider for HaversineProxy {
    fn distance_matrix(
        &self,
        points: &[Point],
        mode: TravelMode,
    ) -> Result<DistanceMatrix, DistanceError> {
        let coords = resolved_coordinates(points)?;
        let entries = coords
            .iter()
            .enumerate()
            .map(|(i, from)| {
                coords
                    .iter()
                    .enumerate()
                    .map(|(j, to)| {
                        Some(if i == j {
                            MatrixEntry::ZERO
                        } else {
                            self.estimate(*from, *to, mode)
                        })
                    })
                    .collect()
            })
            .collect();
        Ok(DistanceMatrix::new(mode, entries)?.into_approximate())
    }
}
