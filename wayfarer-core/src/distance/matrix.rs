//! Square matrices of travel durations and distances.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::TravelMode;

/// Travel cost of one directed leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixEntry {
    /// Travel duration.
    #[serde(rename = "durationSecs", with = "crate::serde_secs")]
    pub duration: Duration,
    /// Travel distance in metres.
    pub distance_meters: u64,
}

impl MatrixEntry {
    /// A zero-cost entry, used on the diagonal.
    pub const ZERO: Self = Self {
        duration: Duration::ZERO,
        distance_meters: 0,
    };

    /// Construct an entry.
    #[must_use]
    pub const fn new(duration: Duration, distance_meters: u64) -> Self {
        Self {
            duration,
            distance_meters,
        }
    }
}

/// Errors raised by [`DistanceMatrix::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// A row length differed from the number of rows.
    #[error("matrix row {row} has {len} entries, expected {expected}")]
    NotSquare {
        /// Offending row index.
        row: usize,
        /// Actual row length.
        len: usize,
        /// Number of rows.
        expected: usize,
    },
    /// A diagonal entry carried a non-zero cost.
    #[error("matrix diagonal entry {index} is not zero")]
    NonZeroDiagonal {
        /// Offending diagonal index.
        index: usize,
    },
    /// The matrix size did not match the number of requested points.
    #[error("matrix has {actual} rows but {expected} points were requested")]
    DimensionMismatch {
        /// Number of requested points.
        expected: usize,
        /// Number of matrix rows.
        actual: usize,
    },
}

/// Pairwise travel data for one optimisation run.
///
/// `entry(i, j)` is the leg from the i-th to the j-th point. Missing entries
/// are unreachable pairs. The diagonal is always zero and the matrix is not
/// mutated after construction.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use wayfarer_core::{DistanceMatrix, MatrixEntry, TravelMode};
///
/// let leg = MatrixEntry::new(Duration::from_secs(300), 400);
/// let matrix = DistanceMatrix::new(
///     TravelMode::Walking,
///     vec![vec![Some(MatrixEntry::ZERO), Some(leg)], vec![None, Some(MatrixEntry::ZERO)]],
/// )?;
/// assert_eq!(matrix.entry(0, 1), Some(leg));
/// assert_eq!(matrix.entry(1, 0), None);
/// # Ok::<(), wayfarer_core::MatrixError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceMatrix {
    mode: TravelMode,
    entries: Vec<Vec<Option<MatrixEntry>>>,
    approximate: bool,
}

impl DistanceMatrix {
    /// Validate and construct a matrix from provider data.
    ///
    /// A missing diagonal entry is filled with [`MatrixEntry::ZERO`].
    ///
    /// # Errors
    /// Returns [`MatrixError::NotSquare`] for ragged input and
    /// [`MatrixError::NonZeroDiagonal`] when a point is not zero away from
    /// itself.
    pub fn new(
        mode: TravelMode,
        mut entries: Vec<Vec<Option<MatrixEntry>>>,
    ) -> Result<Self, MatrixError> {
        let expected = entries.len();
        for (row, cells) in entries.iter_mut().enumerate() {
            if cells.len() != expected {
                return Err(MatrixError::NotSquare {
                    row,
                    len: cells.len(),
                    expected,
                });
            }
            if let Some(cell) = cells.get_mut(row) {
                match cell {
                    Some(entry) if entry.duration != Duration::ZERO => {
                        return Err(MatrixError::NonZeroDiagonal { index: row });
                    }
                    Some(entry) => entry.distance_meters = 0,
                    None => *cell = Some(MatrixEntry::ZERO),
                }
            }
        }
        Ok(Self {
            mode,
            entries,
            approximate: false,
        })
    }

    /// Flag the matrix as estimated rather than measured.
    #[must_use]
    pub fn into_approximate(mut self) -> Self {
        self.approximate = true;
        self
    }

    /// Travel mode the matrix was computed for.
    #[must_use]
    pub const fn mode(&self) -> TravelMode {
        self.mode
    }

    /// Whether entries are proxy estimates.
    #[must_use]
    pub const fn is_approximate(&self) -> bool {
        self.approximate
    }

    /// Number of points covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the matrix covers no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Leg from `from` to `to`, or `None` when unreachable or out of range.
    #[must_use]
    pub fn entry(&self, from: usize, to: usize) -> Option<MatrixEntry> {
        self.entries.get(from).and_then(|row| row.get(to)).copied().flatten()
    }

    /// Number of off-diagonal pairs with a usable entry.
    #[must_use]
    pub fn reachable_pairs(&self) -> usize {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(j, cell)| *j != i && cell.is_some())
                    .count()
            })
            .sum()
    }

    /// Check the matrix covers exactly `points` points.
    ///
    /// # Errors
    /// Returns [`MatrixError::DimensionMismatch`] on a size mismatch.
    pub fn ensure_len(&self, points: usize) -> Result<(), MatrixError> {
        if self.len() == points {
            Ok(())
        } else {
            Err(MatrixError::DimensionMismatch {
                expected: points,
                actual: self.len(),
            })
        }
    }
}
