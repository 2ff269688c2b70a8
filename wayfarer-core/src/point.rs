//! Selectable locations fed into route optimisation.

use geo::Coord;
use serde::{Deserialize, Serialize};

/// A spot the traveller selected.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. A point
/// without a `location` is unresolved: the optimiser leaves it out of the
/// ordering and appends it to the end of the route.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::Point;
///
/// let point = Point::new(1, "Fushimi Inari", Coord { x: 135.7727, y: 34.9671 })
///     .with_category("shrine")
///     .with_visit_minutes(90);
///
/// assert!(point.is_resolved());
/// assert_eq!(point.visit_minutes, Some(90));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    /// Caller-supplied identifier, unique within one request.
    pub id: u64,
    /// Display name of the spot.
    pub name: String,
    /// Resolved geographic position, if known.
    #[serde(default)]
    pub location: Option<Coord<f64>>,
    /// Free-text address used when no coordinate could be resolved.
    #[serde(default)]
    pub address: Option<String>,
    /// Spot category, e.g. `"museum"`.
    #[serde(default)]
    pub category: Option<String>,
    /// Short description carried through to the itinerary.
    #[serde(default)]
    pub description: Option<String>,
    /// Visit duration override for this spot, in minutes.
    #[serde(default)]
    pub visit_minutes: Option<u16>,
}

impl Point {
    /// Construct a resolved point at `location`.
    pub fn new(id: u64, name: impl Into<String>, location: Coord<f64>) -> Self {
        Self {
            id,
            name: name.into(),
            location: Some(location),
            address: None,
            category: None,
            description: None,
            visit_minutes: None,
        }
    }

    /// Construct a point known only by its textual address.
    ///
    /// # Examples
    /// ```
    /// use wayfarer_core::Point;
    ///
    /// let point = Point::unresolved(7, "Hidden bar", "somewhere in Gion");
    /// assert!(!point.is_resolved());
    /// ```
    pub fn unresolved(id: u64, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            location: None,
            address: Some(address.into()),
            category: None,
            description: None,
            visit_minutes: None,
        }
    }

    /// Attach a category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Override the visit duration for this spot.
    #[must_use]
    pub const fn with_visit_minutes(mut self, minutes: u16) -> Self {
        self.visit_minutes = Some(minutes);
        self
    }

    /// Whether the point carries a usable, finite coordinate.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.location
            .is_some_and(|coord| coord.x.is_finite() && coord.y.is_finite())
    }
}
