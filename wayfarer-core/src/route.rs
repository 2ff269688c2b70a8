//! Ordered visiting sequences.
//!
//! A [`Route`] is a Hamiltonian path over the resolved points of a request
//! (it does not return to the start), followed by any unresolved points the
//! optimiser could not place.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One travel leg between consecutive stops of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    /// Index of the departure point in the request.
    pub from: usize,
    /// Index of the arrival point in the request.
    pub to: usize,
    /// Travel duration.
    #[serde(rename = "durationSecs", with = "crate::serde_secs")]
    pub duration: Duration,
    /// Travel distance in metres.
    pub distance_meters: u64,
    /// Whether the leg was estimated because the provider had no entry.
    pub estimated: bool,
}

/// An ordered permutation of request points with aggregate travel costs.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use wayfarer_core::{Leg, Route};
///
/// let leg = Leg { from: 0, to: 1, duration: Duration::from_secs(300), distance_meters: 350, estimated: false };
/// let route = Route::from_legs(vec![0, 1], vec![leg], vec![2], false);
///
/// assert_eq!(route.visit_order().collect::<Vec<_>>(), vec![0, 1, 2]);
/// assert_eq!(route.total_travel_time, Duration::from_secs(300));
/// assert!(route.is_unresolved(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Optimised visiting order over resolved points.
    pub order: Vec<usize>,
    /// Legs between consecutive entries of `order`.
    pub legs: Vec<Leg>,
    /// Unresolved points appended after the optimised order.
    pub unresolved: Vec<usize>,
    /// Sum of leg durations.
    #[serde(rename = "totalTravelSecs", with = "crate::serde_secs")]
    pub total_travel_time: Duration,
    /// Sum of leg distances in metres.
    pub total_distance_meters: u64,
    /// Whether legs came from straight-line estimates instead of a provider.
    pub approximate: bool,
}

impl Route {
    /// Build a route and aggregate its leg totals.
    #[must_use]
    pub fn from_legs(
        order: Vec<usize>,
        legs: Vec<Leg>,
        unresolved: Vec<usize>,
        approximate: bool,
    ) -> Self {
        let total_travel_time = legs.iter().map(|leg| leg.duration).sum();
        let total_distance_meters = legs.iter().map(|leg| leg.distance_meters).sum();
        Self {
            order,
            legs,
            unresolved,
            total_travel_time,
            total_distance_meters,
            approximate,
        }
    }

    /// A route visiting nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every point index in visiting order, unresolved points last.
    pub fn visit_order(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().chain(self.unresolved.iter()).copied()
    }

    /// Total number of stops, including unresolved ones.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.order.len() + self.unresolved.len()
    }

    /// Whether the route has no stops.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The leg leaving the stop at `position` in [`Self::visit_order`].
    #[must_use]
    pub fn leg_after(&self, position: usize) -> Option<&Leg> {
        self.legs.get(position)
    }

    /// Whether `point_index` was appended as an unresolved location.
    #[must_use]
    pub fn is_unresolved(&self, point_index: usize) -> bool {
        self.unresolved.contains(&point_index)
    }
}
