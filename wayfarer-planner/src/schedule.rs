//! Turning an ordered route into timed, multi-day schedule items.
//!
//! The builder walks the route once. Each stop's arrival is the previous
//! departure plus travel; when a stop would finish after the daily end the
//! day closes and the next one opens at its start time with no carry-over.
//! A stop that cannot fit even on an empty day is still placed there. A meal
//! break is reserved when the way to a stop crosses an unserved meal window.
//!
//! When the first stop does not fit the rest of the arrival day, it moves to
//! day 2 and day 1 stays empty.

use geo::Coord;
use thiserror::Error;
use wayfarer_core::{
    ClockTime, Leg, Meal, OptimizationOptions, Point, Route, ScheduleItem, TravelLeg, TravelMode,
    day_marker, minutes_ceil,
};

/// Note attached to stops whose location could not be resolved.
pub const UNKNOWN_LOCATION_NOTE: &str =
    "Unknown location: travel time to this stop is not included";

/// A meal and the clock window it is served in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MealWindow {
    /// Meal served.
    pub meal: Meal,
    /// Window opening time.
    pub start: ClockTime,
    /// Window closing time.
    pub end: ClockTime,
}

impl MealWindow {
    /// Whether `time` falls within `[start, end)`.
    #[must_use]
    pub fn contains(&self, time: ClockTime) -> bool {
        self.start <= time && time < self.end
    }

    /// Whether the gap from `left_at` to `arrival` reaches into the window.
    ///
    /// # Examples
    /// ```
    /// use wayfarer_core::ClockTime;
    /// use wayfarer_planner::DEFAULT_MEAL_WINDOWS;
    ///
    /// let lunch = DEFAULT_MEAL_WINDOWS[0];
    /// let at = |h: u32| ClockTime::from_minutes(h * 60);
    /// assert!(lunch.crossed_between(at(11), at(14)));
    /// assert!(lunch.crossed_between(at(12), at(12)));
    /// assert!(!lunch.crossed_between(at(13), at(14)));
    /// ```
    #[must_use]
    pub fn crossed_between(&self, left_at: ClockTime, arrival: ClockTime) -> bool {
        left_at < self.end && self.start <= arrival
    }
}

/// Lunch 12:00-13:00 and dinner 18:00-19:00.
pub const DEFAULT_MEAL_WINDOWS: [MealWindow; 2] = [
    MealWindow {
        meal: Meal::Lunch,
        start: ClockTime::from_minutes(12 * 60),
        end: ClockTime::from_minutes(13 * 60),
    },
    MealWindow {
        meal: Meal::Dinner,
        start: ClockTime::from_minutes(18 * 60),
        end: ClockTime::from_minutes(19 * 60),
    },
];

/// Errors returned by [`ScheduleBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The route referenced a point the request does not contain.
    #[error("route references point index {index} but only {len} points were given")]
    PointOutOfRange {
        /// Offending index.
        index: usize,
        /// Number of points supplied.
        len: usize,
    },
}

/// Builds schedule items from a route.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::{OptimizationOptions, Point, Route};
/// use wayfarer_planner::ScheduleBuilder;
///
/// let points = vec![Point::new(1, "Castle", Coord { x: 0.0, y: 0.0 })];
/// let route = Route::from_legs(vec![0], Vec::new(), Vec::new(), false);
/// let items = ScheduleBuilder::default().build(&points, &route, &OptimizationOptions::default())?;
/// assert_eq!(items[0].arrival.to_string(), "09:00");
/// assert_eq!(items[0].departure.to_string(), "10:00");
/// # Ok::<(), wayfarer_planner::ScheduleError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleBuilder {
    meal_windows: Vec<MealWindow>,
}

impl Default for ScheduleBuilder {
    fn default() -> Self {
        Self::with_meal_windows(DEFAULT_MEAL_WINDOWS.to_vec())
    }
}

/// Mutable state for the day being filled.
struct DayCursor {
    day: u32,
    clock: ClockTime,
    has_visit: bool,
    served: Vec<Meal>,
    last_visit: Option<usize>,
}

impl DayCursor {
    const fn open(day: u32, clock: ClockTime) -> Self {
        Self {
            day,
            clock,
            has_visit: false,
            served: Vec::new(),
            last_visit: None,
        }
    }
}

impl ScheduleBuilder {
    /// Builder reserving breaks in the given windows.
    #[must_use]
    pub const fn with_meal_windows(meal_windows: Vec<MealWindow>) -> Self {
        Self { meal_windows }
    }

    /// Meal windows in use.
    #[must_use]
    pub fn meal_windows(&self) -> &[MealWindow] {
        &self.meal_windows
    }

    /// Schedule every stop of `route` over `points`.
    ///
    /// # Errors
    /// Returns [`ScheduleError::PointOutOfRange`] when the route does not
    /// belong to `points`.
    pub fn build(
        &self,
        points: &[Point],
        route: &Route,
        options: &OptimizationOptions,
    ) -> Result<Vec<ScheduleItem>, ScheduleError> {
        let day_end = options.day_end();
        let mut items: Vec<ScheduleItem> = Vec::with_capacity(route.len());
        let mut cursor = DayCursor::open(1, options.first_day_start());
        let mut inbound: Option<&Leg> = None;

        for (position, index) in route.visit_order().enumerate() {
            let point = points.get(index).ok_or(ScheduleError::PointOutOfRange {
                index,
                len: points.len(),
            })?;
            let visit_minutes = options.visit_minutes_for(point);
            let travel_minutes = inbound.map_or(0, |leg| minutes_ceil(leg.duration));
            let left_at = cursor.clock;
            let arrival = left_at.plus_minutes(travel_minutes);

            let overflows = arrival.plus_minutes(visit_minutes) > day_end;
            let fits_fresh_day = options.later_day_start().plus_minutes(visit_minutes) <= day_end;
            if options.multi_day && overflows && (cursor.has_visit || fits_fresh_day) {
                log::debug!(
                    "closing day {} at {}; {} would end after {day_end}",
                    cursor.day,
                    cursor.clock,
                    point.name
                );
                cursor = DayCursor::open(cursor.day + 1, options.later_day_start());
            } else {
                if let (Some(leg), Some(previous)) = (inbound, cursor.last_visit)
                    && let Some(item) = items.get_mut(previous)
                {
                    item.travel_to_next =
                        Some(travel_leg(points, leg, options.travel_mode, route.approximate));
                }
                cursor.clock = arrival;
            }

            if options.include_breaks && cursor.has_visit {
                self.insert_break(&mut items, &mut cursor, options, left_at, visit_minutes);
            }

            let departure = cursor.clock.plus_minutes(visit_minutes);
            let mut item =
                ScheduleItem::visit(cursor.day, point.name.clone(), cursor.clock, departure);
            item.point_id = Some(point.id);
            item.point_index = Some(index);
            if !cursor.has_visit {
                item.day_marker = Some(day_marker(cursor.day));
            }
            if route.is_unresolved(index) {
                item.notes = Some(UNKNOWN_LOCATION_NOTE.to_owned());
            }
            cursor.last_visit = Some(items.len());
            cursor.has_visit = true;
            cursor.clock = departure;
            items.push(item);
            inbound = route.leg_after(position);
        }
        Ok(items)
    }

    /// Reserve a meal between the previous departure `left_at` and the
    /// arrival held in `cursor.clock`, delaying the arrival by the break.
    fn insert_break(
        &self,
        items: &mut Vec<ScheduleItem>,
        cursor: &mut DayCursor,
        options: &OptimizationOptions,
        left_at: ClockTime,
        next_visit_minutes: u32,
    ) {
        let break_minutes = u32::from(options.break_duration_minutes);
        if break_minutes == 0 {
            return;
        }
        let arrival = cursor.clock;
        let Some(window) = self
            .meal_windows
            .iter()
            .find(|w| !cursor.served.contains(&w.meal) && w.crossed_between(left_at, arrival))
        else {
            return;
        };
        let delayed = arrival.plus_minutes(break_minutes);
        if delayed.plus_minutes(next_visit_minutes) > options.day_end() {
            return;
        }
        let start = left_at.max(window.start);
        items.push(ScheduleItem::meal_break(
            cursor.day,
            window.meal,
            start,
            start.plus_minutes(break_minutes),
        ));
        cursor.served.push(window.meal);
        cursor.clock = delayed;
    }
}

fn travel_leg(points: &[Point], leg: &Leg, mode: TravelMode, approximate: bool) -> TravelLeg {
    let from = points.get(leg.from).and_then(|p| p.location);
    let to = points.get(leg.to).and_then(|p| p.location);
    TravelLeg {
        mode,
        duration_minutes: minutes_ceil(leg.duration),
        distance_meters: leg.distance_meters,
        estimated: leg.estimated || approximate,
        navigation_url: from.zip(to).map(|(a, b)| navigation_url(a, b, mode)),
    }
}

/// Directions link from `from` to `to` for `mode`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use wayfarer_core::TravelMode;
/// use wayfarer_planner::navigation_url;
///
/// let url = navigation_url(Coord { x: 2.35, y: 48.85 }, Coord { x: 2.29, y: 48.86 }, TravelMode::Walking);
/// assert!(url.contains("origin=48.85,2.35"));
/// assert!(url.ends_with("travelmode=walking"));
/// ```
#[must_use]
pub fn navigation_url(from: Coord<f64>, to: Coord<f64>, mode: TravelMode) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&origin={},{}&destination={},{}&travelmode={}",
        from.y,
        from.x,
        to.y,
        to.x,
        mode.as_str()
    )
}
