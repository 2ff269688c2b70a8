//! Narrative fallback itineraries.
//!
//! A [`RecommendationProvider`] turns an unordered spot list into plan text.
//! [`NarrativeItinerary::from_text`] either parses that text completely into
//! schedule items or keeps it verbatim; it never yields half-typed results.
//!
//! The accepted line grammar is:
//!
//! ```text
//! Day 2
//! 09:00-10:30 Kinkaku-ji
//! 11:00 - 12:00 | Ryoan-ji
//! ```

use thiserror::Error;

use crate::schedule::day_marker;
use crate::{ClockTime, Itinerary, Point, ScheduleItem};

/// Errors from [`RecommendationProvider::narrative_itinerary`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecommendationError {
    /// The provider returned no usable text.
    #[error("recommendation provider returned an empty response")]
    EmptyResponse,
    /// The provider did not answer in time.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The provider answered with a non-success HTTP status.
    #[error("request to {url} failed with HTTP {status}: {message}")]
    HttpError {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail.
        message: String,
    },
    /// The request could not be delivered.
    #[error("network error contacting {url}: {message}")]
    NetworkError {
        /// Request URL.
        url: String,
        /// Error detail.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse recommendation response: {message}")]
    ParseError {
        /// Error detail.
        message: String,
    },
    /// No provider is available.
    #[error("recommendation provider unavailable: {message}")]
    Unavailable {
        /// Error detail.
        message: String,
    },
}

impl RecommendationError {
    /// Whether repeating the same request may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::NetworkError { .. } => true,
            Self::HttpError { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Produces loosely structured plans when optimisation cannot run.
pub trait RecommendationProvider {
    /// Suggest a plan visiting `points` in `city`.
    ///
    /// # Errors
    /// Returns [`RecommendationError`] when no text can be produced.
    fn narrative_itinerary(
        &self,
        points: &[Point],
        city: &str,
    ) -> Result<NarrativeItinerary, RecommendationError>;
}

impl<T: RecommendationProvider + ?Sized> RecommendationProvider for &T {
    fn narrative_itinerary(
        &self,
        points: &[Point],
        city: &str,
    ) -> Result<NarrativeItinerary, RecommendationError> {
        (**self).narrative_itinerary(points, city)
    }
}

impl<T: RecommendationProvider + ?Sized> RecommendationProvider for std::sync::Arc<T> {
    fn narrative_itinerary(
        &self,
        points: &[Point],
        city: &str,
    ) -> Result<NarrativeItinerary, RecommendationError> {
        (**self).narrative_itinerary(points, city)
    }
}

/// Result of a narrative provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrativeItinerary {
    /// Text that parsed completely into schedule items.
    Parsed(Vec<ScheduleItem>),
    /// Text kept verbatim because it did not parse.
    Raw(String),
}

impl NarrativeItinerary {
    /// Parse plan text, degrading to [`Self::Raw`] on any unparseable line.
    ///
    /// # Examples
    /// ```
    /// use wayfarer_core::NarrativeItinerary;
    ///
    /// let parsed = NarrativeItinerary::from_text("Day 1\n09:00-10:00 Castle\n10:30-11:30 | Garden");
    /// let NarrativeItinerary::Parsed(items) = parsed else { panic!("expected items") };
    /// assert_eq!(items.len(), 2);
    /// assert_eq!(items[1].name, "Garden");
    ///
    /// let raw = NarrativeItinerary::from_text("Start with the castle, then relax.");
    /// assert!(matches!(raw, NarrativeItinerary::Raw(_)));
    /// ```
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        parse_schedule(text).map_or_else(|| Self::Raw(text.trim().to_owned()), Self::Parsed)
    }

    /// Whether there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Parsed(items) => items.is_empty(),
            Self::Raw(text) => text.trim().is_empty(),
        }
    }

    /// Wrap the narrative in an [`Itinerary`] for `city`.
    #[must_use]
    pub fn into_itinerary(self, city: &str) -> Itinerary {
        match self {
            Self::Parsed(items) => Itinerary::from_items(city, items, None),
            Self::Raw(text) => Itinerary::from_narrative_text(city, text),
        }
    }
}

fn parse_schedule(text: &str) -> Option<Vec<ScheduleItem>> {
    let mut day = 1;
    let mut marked = 0;
    let mut items = Vec::new();
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(number) = parse_day_heading(line) {
            day = number;
            continue;
        }
        let mut item = parse_item(line, day)?;
        if marked != day {
            item.day_marker = Some(day_marker(day));
            marked = day;
        }
        items.push(item);
    }
    (!items.is_empty()).then_some(items)
}

fn parse_day_heading(line: &str) -> Option<u32> {
    let (word, rest) = line.split_once(char::is_whitespace)?;
    if !word.eq_ignore_ascii_case("day") {
        return None;
    }
    let number = rest.trim().trim_end_matches(':').trim();
    number.parse().ok().filter(|n| *n > 0)
}

fn parse_item(line: &str, day: u32) -> Option<ScheduleItem> {
    let (start, rest) = line.split_once('-')?;
    let arrival: ClockTime = start.trim().parse().ok()?;
    let after_dash = rest.trim_start();
    let end_len = after_dash
        .find(|c: char| !(c.is_ascii_digit() || c == ':'))
        .unwrap_or(after_dash.len());
    let (end, tail) = after_dash.split_at(end_len);
    let departure: ClockTime = end.parse().ok()?;
    if departure < arrival {
        return None;
    }
    let name = tail
        .trim_start()
        .trim_start_matches(['|', '-'])
        .trim();
    if name.is_empty() {
        return None;
    }
    Some(ScheduleItem::visit(day, name, arrival, departure))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parses_days_and_separators() {
        let text = "Day 1\n09:00-10:00 Castle\n\nDay 2:\n09:30 - 11:00 | Market\n11:15-12:00 - Temple";
        let NarrativeItinerary::Parsed(items) = NarrativeItinerary::from_text(text) else {
            panic!("text should parse");
        };
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].day_marker.as_deref(), Some("Day 1"));
        assert_eq!(items[1].day, 2);
        assert_eq!(items[1].day_marker.as_deref(), Some("Day 2"));
        assert_eq!(items[1].name, "Market");
        assert_eq!(items[2].name, "Temple");
        assert!(items[2].day_marker.is_none());
        assert_eq!(items[1].arrival.to_string(), "09:30");
        assert_eq!(items[1].departure.to_string(), "11:00");
    }

    #[rstest]
    fn items_before_any_heading_land_on_day_one() {
        let NarrativeItinerary::Parsed(items) =
            NarrativeItinerary::from_text("10:00-11:00 Harbour")
        else {
            panic!("text should parse");
        };
        assert_eq!(items[0].day, 1);
        assert_eq!(items[0].day_marker.as_deref(), Some("Day 1"));
    }

    #[rstest]
    #[case("Morning: castle. Afternoon: garden.")]
    #[case("09:00-10:00 Castle\nthen wander around")]
    #[case("11:00-10:00 Backwards")]
    #[case("09:00-10:00")]
    #[case("Day 1")]
    fn anything_unparseable_stays_raw(#[case] text: &str) {
        assert_eq!(
            NarrativeItinerary::from_text(text),
            NarrativeItinerary::Raw(text.trim().to_owned())
        );
    }

    #[rstest]
    fn raw_text_becomes_a_narrative_itinerary() {
        let itinerary = NarrativeItinerary::Raw("See the sights.".to_owned()).into_itinerary("Oslo");
        assert!(itinerary.items.is_empty());
        assert_eq!(itinerary.narrative.as_deref(), Some("See the sights."));
        assert!(!itinerary.is_empty());
    }

    #[rstest]
    fn parsed_items_become_a_structured_itinerary() {
        let itinerary = NarrativeItinerary::from_text("Day 1\n09:00-10:00 A\nDay 2\n09:00-09:45 B")
            .into_itinerary("Oslo");
        assert_eq!(itinerary.day_count, 2);
        assert_eq!(itinerary.title, "2-day itinerary for Oslo");
    }
}
