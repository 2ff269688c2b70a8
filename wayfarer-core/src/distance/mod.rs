//! Pairwise travel durations and distances between points.
//!
//! The [`DistanceProvider`] trait abstracts retrieval of a [`DistanceMatrix`]
//! for a slice of [`Point`](crate::Point) values and a
//! [`TravelMode`](crate::TravelMode). Entries are optional: a missing entry
//! means the provider could not route that pair, and consumers treat it as
//! unreachable.
//!
//! [`HaversineProxy`] estimates a matrix from straight-line distances without
//! any external calls, and [`CachingDistanceProvider`] memoises the matrices of
//! another provider.

mod cache;
mod error;
mod haversine;
mod matrix;
mod provider;

pub use cache::CachingDistanceProvider;
pub use error::DistanceError;
pub use haversine::{HaversineProxy, haversine_meters};
pub use matrix::{DistanceMatrix, MatrixEntry, MatrixError};
pub use provider::{DistanceProvider, resolved_coordinates};
