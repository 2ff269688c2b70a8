//! Planning options and request validation.

use std::collections::{BTreeMap, HashSet};
use std::ops::RangeInclusive;

use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ClockTime, Point, TravelMode};

/// Most spots accepted in a single request.
pub const MAX_POINTS: usize = 40;

/// Accepted visit durations in minutes.
pub const VISIT_MINUTES: RangeInclusive<u16> = 15..=480;

/// Accepted meal break durations in minutes.
pub const BREAK_MINUTES: RangeInclusive<u16> = 0..=180;

/// Day start used when no time is supplied (09:00).
pub const DEFAULT_START_TIME: ClockTime = ClockTime::from_minutes(9 * 60);

/// Day end used when no time is supplied (20:00).
pub const DEFAULT_DAY_END: ClockTime = ClockTime::from_minutes(20 * 60);

const DEFAULT_VISIT_MINUTES: u16 = 60;
const DEFAULT_BREAK_MINUTES: u16 = 60;

/// Rejected planning input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The request selected no spots.
    #[error("at least one spot must be selected")]
    NoSpots,
    /// The request selected more spots than supported.
    #[error("{count} spots selected, at most {max} are supported")]
    TooManySpots {
        /// Number of spots supplied.
        count: usize,
        /// Maximum accepted.
        max: usize,
    },
    /// Two spots shared an identifier.
    #[error("spot id {id} appears more than once")]
    DuplicateSpotId {
        /// Repeated identifier.
        id: u64,
    },
    /// The default visit duration was out of range.
    #[error("visit duration {minutes} min is outside 15..=480")]
    VisitDurationOutOfRange {
        /// Supplied duration.
        minutes: u16,
    },
    /// A spot-level visit duration was out of range.
    #[error("spot {id} visit duration {minutes} min is outside 15..=480")]
    SpotDurationOutOfRange {
        /// Spot identifier.
        id: u64,
        /// Supplied duration.
        minutes: u16,
    },
    /// A category visit duration was out of range.
    #[error("category {category:?} visit duration {minutes} min is outside 15..=480")]
    CategoryDurationOutOfRange {
        /// Category name.
        category: String,
        /// Supplied duration.
        minutes: u16,
    },
    /// The meal break duration was out of range.
    #[error("break duration {minutes} min is outside 0..=180")]
    BreakDurationOutOfRange {
        /// Supplied duration.
        minutes: u16,
    },
    /// The daily window closes before it opens.
    #[error("daily window {start}-{end} is empty")]
    EmptyDailyWindow {
        /// Opening time.
        start: ClockTime,
        /// Closing time.
        end: ClockTime,
    },
    /// No city name was given.
    #[error("city must not be blank")]
    BlankCity,
    /// No session identifier was given.
    #[error("session id must not be blank")]
    BlankSessionId,
    /// The request could not be decoded, e.g. a time not in `HH:MM` form.
    #[error("malformed request: {message}")]
    Malformed {
        /// Decoder message.
        message: String,
    },
}

/// Options shared by the optimiser and the schedule builder.
///
/// Every field has a default, so `{}` deserialises to a usable value.
///
/// # Examples
/// ```
/// use wayfarer_core::{OptimizationOptions, TravelMode};
///
/// let options: OptimizationOptions = serde_json::from_str(r#"{ "travelMode": "transit" }"#)?;
/// assert_eq!(options.travel_mode, TravelMode::Transit);
/// assert_eq!(options.first_day_start().to_string(), "09:00");
/// assert_eq!(options.day_end().to_string(), "20:00");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptimizationOptions {
    /// Mode used between spots.
    pub travel_mode: TravelMode,
    /// First arrival on day one when no `daily_start_time` is given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<ClockTime>,
    /// Default minutes spent at each spot.
    #[serde(alias = "visitDuration")]
    pub visit_duration_minutes: u16,
    /// Whether to reserve lunch and dinner breaks.
    pub include_breaks: bool,
    /// Whether overflowing stops move to following days.
    pub multi_day: bool,
    /// Where the traveller stays; the route starts at the nearest spot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotel_location: Option<Coord<f64>>,
    /// First arrival on every day; defaults to 09:00 after day one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_start_time: Option<ClockTime>,
    /// Latest departure on any day; defaults to 20:00.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_end_time: Option<ClockTime>,
    /// Visit minutes by spot category.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub category_durations: BTreeMap<String, u16>,
    /// Minutes reserved for each meal break.
    pub break_duration_minutes: u16,
}

impl Default for OptimizationOptions {
    fn default() -> Self {
        Self {
            travel_mode: TravelMode::default(),
            start_time: None,
            visit_duration_minutes: DEFAULT_VISIT_MINUTES,
            include_breaks: true,
            multi_day: true,
            hotel_location: None,
            daily_start_time: None,
            daily_end_time: None,
            category_durations: BTreeMap::new(),
            break_duration_minutes: DEFAULT_BREAK_MINUTES,
        }
    }
}

impl OptimizationOptions {
    /// Set the travel mode.
    #[must_use]
    pub const fn with_travel_mode(mut self, mode: TravelMode) -> Self {
        self.travel_mode = mode;
        self
    }

    /// Set the day-one start time.
    #[must_use]
    pub const fn with_start_time(mut self, start: ClockTime) -> Self {
        self.start_time = Some(start);
        self
    }

    /// Set the default visit duration.
    #[must_use]
    pub const fn with_visit_duration(mut self, minutes: u16) -> Self {
        self.visit_duration_minutes = minutes;
        self
    }

    /// Enable or disable meal breaks.
    #[must_use]
    pub const fn with_breaks(mut self, include: bool) -> Self {
        self.include_breaks = include;
        self
    }

    /// Enable or disable splitting across days.
    #[must_use]
    pub const fn with_multi_day(mut self, multi_day: bool) -> Self {
        self.multi_day = multi_day;
        self
    }

    /// Override the daily window.
    #[must_use]
    pub const fn with_daily_window(mut self, start: ClockTime, end: ClockTime) -> Self {
        self.daily_start_time = Some(start);
        self.daily_end_time = Some(end);
        self
    }

    /// Set the hotel location.
    #[must_use]
    pub const fn with_hotel_location(mut self, location: Coord<f64>) -> Self {
        self.hotel_location = Some(location);
        self
    }

    /// Set the visit duration for a category.
    #[must_use]
    pub fn with_category_duration(mut self, category: impl Into<String>, minutes: u16) -> Self {
        self.category_durations.insert(category.into(), minutes);
        self
    }

    /// Set the meal break duration.
    #[must_use]
    pub const fn with_break_duration(mut self, minutes: u16) -> Self {
        self.break_duration_minutes = minutes;
        self
    }

    /// Opening time of day one.
    ///
    /// An explicit `daily_start_time` wins over `start_time`.
    ///
    /// # Examples
    /// ```
    /// use wayfarer_core::OptimizationOptions;
    ///
    /// let options: OptimizationOptions =
    ///     serde_json::from_str(r#"{ "startTime": "07:45", "dailyStartTime": "10:00" }"#)?;
    /// assert_eq!(options.first_day_start().to_string(), "10:00");
    /// assert_eq!(options.later_day_start().to_string(), "10:00");
    /// # Ok::<(), serde_json::Error>(())
    /// ```
    #[must_use]
    pub fn first_day_start(&self) -> ClockTime {
        self.daily_start_time
            .or(self.start_time)
            .unwrap_or(DEFAULT_START_TIME)
    }

    /// Opening time of every later day.
    ///
    /// `start_time` only applies to the arrival day.
    #[must_use]
    pub fn later_day_start(&self) -> ClockTime {
        self.daily_start_time.unwrap_or(DEFAULT_START_TIME)
    }

    /// Closing time of every day.
    #[must_use]
    pub fn day_end(&self) -> ClockTime {
        self.daily_end_time.unwrap_or(DEFAULT_DAY_END)
    }

    /// Minutes to spend at `point`.
    ///
    /// A spot's own duration wins over its category's, which wins over the
    /// default.
    ///
    /// # Examples
    /// ```
    /// use geo::Coord;
    /// use wayfarer_core::{OptimizationOptions, Point};
    ///
    /// let options = OptimizationOptions::default().with_category_duration("museum", 120);
    /// let museum = Point::new(1, "Museum", Coord { x: 0.0, y: 0.0 }).with_category("museum");
    /// let cafe = Point::new(2, "Cafe", Coord { x: 0.0, y: 0.0 }).with_visit_minutes(30);
    /// assert_eq!(options.visit_minutes_for(&museum), 120);
    /// assert_eq!(options.visit_minutes_for(&cafe), 30);
    /// ```
    #[must_use]
    pub fn visit_minutes_for(&self, point: &Point) -> u32 {
        let minutes = point
            .visit_minutes
            .or_else(|| {
                point
                    .category
                    .as_ref()
                    .and_then(|category| self.category_durations.get(category).copied())
            })
            .unwrap_or(self.visit_duration_minutes);
        u32::from(minutes)
    }

    /// Check option ranges and the daily window.
    ///
    /// # Errors
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !VISIT_MINUTES.contains(&self.visit_duration_minutes) {
            return Err(ValidationError::VisitDurationOutOfRange {
                minutes: self.visit_duration_minutes,
            });
        }
        if let Some((category, minutes)) = self
            .category_durations
            .iter()
            .find(|(_, minutes)| !VISIT_MINUTES.contains(minutes))
        {
            return Err(ValidationError::CategoryDurationOutOfRange {
                category: category.clone(),
                minutes: *minutes,
            });
        }
        if !BREAK_MINUTES.contains(&self.break_duration_minutes) {
            return Err(ValidationError::BreakDurationOutOfRange {
                minutes: self.break_duration_minutes,
            });
        }
        let end = self.day_end();
        for start in [self.first_day_start(), self.later_day_start()] {
            if end <= start {
                return Err(ValidationError::EmptyDailyWindow { start, end });
            }
        }
        Ok(())
    }
}

/// Check the selected spots of a request.
///
/// # Errors
/// Rejects empty or oversized selections, repeated identifiers and spot
/// durations outside [`VISIT_MINUTES`].
pub fn validate_points(points: &[Point]) -> Result<(), ValidationError> {
    if points.is_empty() {
        return Err(ValidationError::NoSpots);
    }
    if points.len() > MAX_POINTS {
        return Err(ValidationError::TooManySpots {
            count: points.len(),
            max: MAX_POINTS,
        });
    }
    let mut seen = HashSet::with_capacity(points.len());
    for point in points {
        if !seen.insert(point.id) {
            return Err(ValidationError::DuplicateSpotId { id: point.id });
        }
        if let Some(minutes) = point.visit_minutes.filter(|m| !VISIT_MINUTES.contains(m)) {
            return Err(ValidationError::SpotDurationOutOfRange {
                id: point.id,
                minutes,
            });
        }
    }
    Ok(())
}
