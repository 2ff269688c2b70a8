//! Wall-clock times of day used by schedules.
//!
//! A [`ClockTime`] counts minutes from midnight of the schedule day. Values
//! past `23:59` only arise when a single visit overruns the daily window; they
//! render with hours above 23 (e.g. `25:30`) rather than wrapping.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minutes in a calendar day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A time of day with minute precision.
///
/// # Examples
/// ```
/// use wayfarer_core::ClockTime;
///
/// let start: ClockTime = "09:00".parse()?;
/// let later = start.plus_minutes(90);
/// assert_eq!(later.to_string(), "10:30");
/// assert!(later > start);
/// # Ok::<(), wayfarer_core::ClockTimeError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u32);

/// Errors raised while parsing `HH:MM` strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockTimeError {
    /// The input was not two colon-separated numeric fields.
    #[error("time {0:?} is not in 24-hour HH:MM format")]
    Malformed(String),
    /// Hours or minutes were outside `00:00..=23:59`.
    #[error("time {0:?} is out of range")]
    OutOfRange(String),
}

impl ClockTime {
    /// Midnight.
    pub const MIDNIGHT: Self = Self(0);

    /// Build a time from hours and minutes within a single day.
    ///
    /// # Errors
    /// Returns [`ClockTimeError::OutOfRange`] when `hours > 23` or
    /// `minutes > 59`.
    pub fn from_hm(hours: u32, minutes: u32) -> Result<Self, ClockTimeError> {
        if hours > 23 || minutes > 59 {
            return Err(ClockTimeError::OutOfRange(format!("{hours:02}:{minutes:02}")));
        }
        Ok(Self(hours * 60 + minutes))
    }

    /// Build a time from minutes after midnight. Values may exceed one day.
    #[must_use]
    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes)
    }

    /// Minutes after midnight.
    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.0
    }

    /// Advance by a number of minutes.
    #[must_use]
    pub const fn plus_minutes(self, minutes: u32) -> Self {
        Self(self.0.saturating_add(minutes))
    }

    /// Advance by a travel duration, rounding partial minutes up.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use wayfarer_core::ClockTime;
    ///
    /// let t = ClockTime::from_minutes(600).plus_duration(Duration::from_secs(61));
    /// assert_eq!(t.minutes(), 602);
    /// ```
    #[must_use]
    pub fn plus_duration(self, duration: Duration) -> Self {
        self.plus_minutes(minutes_ceil(duration))
    }

    /// Minutes elapsed from `earlier` to `self`, saturating at zero.
    #[must_use]
    pub const fn minutes_since(self, earlier: Self) -> u32 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Whole minutes covering `duration`, rounding partial minutes up.
#[must_use]
pub fn minutes_ceil(duration: Duration) -> u32 {
    let minutes = duration.as_secs().div_ceil(60);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hours, minutes) = (self.0 / 60, self.0 % 60);
        write!(f, "{hours:02}:{minutes:02}")
    }
}

impl FromStr for ClockTime {
    type Err = ClockTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let malformed = || ClockTimeError::Malformed(s.to_owned());
        let (hours, minutes) = trimmed.split_once(':').ok_or_else(malformed)?;
        let well_formed = |field: &str| {
            (1..=2).contains(&field.len()) && field.bytes().all(|b| b.is_ascii_digit())
        };
        if !well_formed(hours) || minutes.len() != 2 || !well_formed(minutes) {
            return Err(malformed());
        }
        let h: u32 = hours.parse().map_err(|_| malformed())?;
        let m: u32 = minutes.parse().map_err(|_| malformed())?;
        Self::from_hm(h, m).map_err(|_| ClockTimeError::OutOfRange(s.to_owned()))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ClockTimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}
