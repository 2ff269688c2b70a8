//! Scheduled itineraries.
//!
//! An [`Itinerary`] is an ordered list of [`ScheduleItem`]s grouped into days.
//! Items are either visits to a selected spot or meal breaks. The struct is
//! built fresh for every planning request and never edited afterwards.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{ClockTime, Route, TravelMode};

/// Meal windows the schedule builder may reserve time for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Meal {
    /// Midday meal.
    Lunch,
    /// Evening meal.
    Dinner,
}

impl Meal {
    /// Display label used for break items.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lunch => "Lunch break",
            Self::Dinner => "Dinner break",
        }
    }
}

/// What a schedule item represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ItemKind {
    /// Time spent at a selected spot.
    Visit,
    /// A meal break inserted between visits.
    MealBreak {
        /// Which meal the break serves.
        meal: Meal,
    },
}

/// Travel from one scheduled visit to the next one on the same day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelLeg {
    /// Mode used for the leg.
    pub mode: TravelMode,
    /// Travel time in whole minutes, rounded up.
    pub duration_minutes: u32,
    /// Travel distance in metres.
    pub distance_meters: u64,
    /// Whether the leg is a straight-line estimate.
    pub estimated: bool,
    /// Directions link between the two spots, when both are located.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation_url: Option<String>,
}

/// One entry of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    /// One-based day index.
    pub day: u32,
    /// Spot name or break label.
    pub name: String,
    /// Identifier of the visited point, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_id: Option<u64>,
    /// Index of the visited point in the request, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_index: Option<usize>,
    /// Visit or break.
    pub kind: ItemKind,
    /// Arrival time.
    pub arrival: ClockTime,
    /// Departure time.
    pub departure: ClockTime,
    /// Travel to the next visit on the same day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_to_next: Option<TravelLeg>,
    /// Free-text notes, e.g. an unknown-location warning.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// `"Day N"` on the first item of each day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_marker: Option<String>,
}

impl ScheduleItem {
    /// A visit item without travel, notes or day marker.
    pub fn visit(
        day: u32,
        name: impl Into<String>,
        arrival: ClockTime,
        departure: ClockTime,
    ) -> Self {
        Self {
            day,
            name: name.into(),
            point_id: None,
            point_index: None,
            kind: ItemKind::Visit,
            arrival,
            departure,
            travel_to_next: None,
            notes: None,
            day_marker: None,
        }
    }

    /// A meal break item.
    #[must_use]
    pub fn meal_break(day: u32, meal: Meal, arrival: ClockTime, departure: ClockTime) -> Self {
        Self {
            kind: ItemKind::MealBreak { meal },
            ..Self::visit(day, meal.label(), arrival, departure)
        }
    }

    /// Whether this item is a visit rather than a break.
    #[must_use]
    pub const fn is_visit(&self) -> bool {
        matches!(self.kind, ItemKind::Visit)
    }

    /// Minutes between arrival and departure.
    #[must_use]
    pub const fn duration_minutes(&self) -> u32 {
        self.departure.minutes_since(self.arrival)
    }
}

/// Label placed on the first item of `day`.
#[must_use]
pub fn day_marker(day: u32) -> String {
    format!("Day {day}")
}

/// Title for an itinerary spanning `days` days in `city`.
///
/// # Examples
/// ```
/// use wayfarer_core::itinerary_title;
///
/// assert_eq!(itinerary_title("Kyoto", 1), "Day trip in Kyoto");
/// assert_eq!(itinerary_title("Kyoto", 3), "3-day itinerary for Kyoto");
/// ```
#[must_use]
pub fn itinerary_title(city: &str, days: u32) -> String {
    if days <= 1 {
        format!("Day trip in {city}")
    } else {
        format!("{days}-day itinerary for {city}")
    }
}

/// A planned trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    /// Human-readable title.
    pub title: String,
    /// City the trip takes place in.
    pub city: String,
    /// Number of distinct days covered by `items`.
    pub day_count: u32,
    /// Sum over days of last departure minus first arrival.
    pub total_duration_minutes: u32,
    /// Scheduled items in chronological order.
    pub items: Vec<ScheduleItem>,
    /// Route the schedule was built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
    /// Unstructured plan text from a narrative fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

impl Itinerary {
    /// Assemble an itinerary from scheduled items, deriving its metadata.
    ///
    /// # Examples
    /// ```
    /// use wayfarer_core::{ClockTime, Itinerary, ScheduleItem};
    ///
    /// let items = vec![
    ///     ScheduleItem::visit(1, "Castle", ClockTime::from_minutes(540), ClockTime::from_minutes(600)),
    ///     ScheduleItem::visit(2, "Garden", ClockTime::from_minutes(540), ClockTime::from_minutes(630)),
    /// ];
    /// let itinerary = Itinerary::from_items("Kyoto", items, None);
    /// assert_eq!(itinerary.day_count, 2);
    /// assert_eq!(itinerary.total_duration_minutes, 150);
    /// assert_eq!(itinerary.title, "2-day itinerary for Kyoto");
    /// ```
    pub fn from_items(
        city: impl Into<String>,
        items: Vec<ScheduleItem>,
        route: Option<Route>,
    ) -> Self {
        let city_name = city.into();
        let day_count = count_days(&items);
        Self {
            title: itinerary_title(&city_name, day_count),
            total_duration_minutes: total_minutes(&items),
            day_count,
            city: city_name,
            items,
            route,
            narrative: None,
        }
    }

    /// An itinerary holding only free-text narrative.
    pub fn from_narrative_text(city: impl Into<String>, text: impl Into<String>) -> Self {
        let mut itinerary = Self::from_items(city, Vec::new(), None);
        itinerary.narrative = Some(text.into());
        itinerary
    }

    /// Whether the itinerary has neither items nor narrative text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
            && self
                .narrative
                .as_deref()
                .is_none_or(|text| text.trim().is_empty())
    }

    /// Items scheduled on `day`.
    pub fn items_on_day(&self, day: u32) -> impl Iterator<Item = &ScheduleItem> + '_ {
        self.items.iter().filter(move |item| item.day == day)
    }
}

fn count_days(items: &[ScheduleItem]) -> u32 {
    let days: BTreeSet<u32> = items.iter().map(|item| item.day).collect();
    u32::try_from(days.len()).unwrap_or(u32::MAX)
}

fn total_minutes(items: &[ScheduleItem]) -> u32 {
    let mut total = 0_u32;
    let mut rest = items;
    while let Some(first) = rest.first() {
        let same_day = rest.iter().take_while(|item| item.day == first.day).count();
        let (day, tail) = rest.split_at(same_day);
        let end = day.iter().map(|item| item.departure).max().unwrap_or(first.arrival);
        total = total.saturating_add(end.minutes_since(first.arrival));
        rest = tail;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn at(minutes: u32) -> ClockTime {
        ClockTime::from_minutes(minutes)
    }

    #[rstest]
    fn meal_break_carries_label_and_kind() {
        let item = ScheduleItem::meal_break(1, Meal::Lunch, at(720), at(780));
        assert_eq!(item.name, "Lunch break");
        assert!(!item.is_visit());
        assert_eq!(item.duration_minutes(), 60);
    }

    #[rstest]
    fn single_day_itinerary_is_a_day_trip() {
        let items = vec![
            ScheduleItem::visit(1, "A", at(540), at(600)),
            ScheduleItem::visit(1, "B", at(615), at(675)),
        ];
        let itinerary = Itinerary::from_items("Lisbon", items, None);
        assert_eq!(itinerary.title, "Day trip in Lisbon");
        assert_eq!(itinerary.day_count, 1);
        assert_eq!(itinerary.total_duration_minutes, 135);
        assert_eq!(itinerary.items_on_day(1).count(), 2);
    }

    #[rstest]
    fn narrative_only_itinerary_is_not_empty() {
        let itinerary = Itinerary::from_narrative_text("Porto", "Walk the Ribeira.");
        assert!(!itinerary.is_empty());
        assert_eq!(itinerary.day_count, 0);
        assert!(Itinerary::from_narrative_text("Porto", "  ").is_empty());
    }

    #[rstest]
    fn serialises_kind_as_tagged_object() {
        let item = ScheduleItem::meal_break(2, Meal::Dinner, at(1080), at(1140));
        let json = serde_json::to_value(&item).expect("serialise");
        assert_eq!(json["kind"]["type"], "mealBreak");
        assert_eq!(json["kind"]["meal"], "dinner");
        assert_eq!(json["arrival"], "18:00");
        assert!(json.get("travelToNext").is_none());
    }
}
