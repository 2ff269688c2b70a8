//! Distance provider trait.

use std::sync::Arc;

use geo::Coord;

use crate::{Point, TravelMode};

use super::error::DistanceError;
use super::matrix::DistanceMatrix;

/// Fetch pairwise travel durations and distances for a set of points.
///
/// Implementers must return a square `n×n` matrix where `n == points.len()`.
/// `matrix.entry(i, j)` is the leg from `points[i]` to `points[j]`. Pairs the
/// provider cannot route come back as missing entries rather than failing the
/// whole call. Retrying transient failures is the provider's responsibility.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use wayfarer_core::{
///     DistanceError, DistanceMatrix, DistanceProvider, MatrixEntry, Point, TravelMode,
/// };
///
/// struct Unreachable;
///
/// impl DistanceProvider for Unreachable {
///     fn distance_matrix(
///         &self,
///         points: &[Point],
///         mode: TravelMode,
///     ) -> Result<DistanceMatrix, DistanceError> {
///         if points.is_empty() {
///             return Err(DistanceError::EmptyInput);
///         }
///         let n = points.len();
///         Ok(DistanceMatrix::new(mode, vec![vec![None; n]; n])?)
///     }
/// }
///
/// let point = Point::new(1, "Pier", Coord { x: 0.0, y: 0.0 });
/// let matrix = Unreachable.distance_matrix(&[point], TravelMode::Walking)?;
/// assert_eq!(matrix.entry(0, 0), Some(MatrixEntry::ZERO));
/// # Ok::<(), DistanceError>(())
/// ```
pub trait DistanceProvider {
    /// Return the matrix for `points` travelling by `mode`.
    ///
    /// Implementations must return `Err(DistanceError::EmptyInput)` when
    /// `points` is empty.
    fn distance_matrix(
        &self,
        points: &[Point],
        mode: TravelMode,
    ) -> Result<DistanceMatrix, DistanceError>;
}

impl<T: DistanceProvider + ?Sized> DistanceProvider for &T {
    fn distance_matrix(
        &self,
        points: &[Point],
        mode: TravelMode,
    ) -> Result<DistanceMatrix, DistanceError> {
        (**self).distance_matrix(points, mode)
    }
}

impl<T: DistanceProvider + ?Sized> DistanceProvider for Arc<T> {
    fn distance_matrix(
        &self,
        points: &[Point],
        mode: TravelMode,
    ) -> Result<DistanceMatrix, DistanceError> {
        (**self).distance_matrix(points, mode)
    }
}

/// Collect the coordinates of `points`, failing on the first unresolved one.
///
/// # Errors
/// Returns [`DistanceError::EmptyInput`] for an empty slice and
/// [`DistanceError::UnresolvedPoint`] when a point lacks a usable location.
pub fn resolved_coordinates(points: &[Point]) -> Result<Vec<Coord<f64>>, DistanceError> {
    if points.is_empty() {
        return Err(DistanceError::EmptyInput);
    }
    points
        .iter()
        .map(|point| match point.location {
            Some(coord) if point.is_resolved() => Ok(coord),
            _ => Err(DistanceError::UnresolvedPoint { id: point.id }),
        })
        .collect()
}
