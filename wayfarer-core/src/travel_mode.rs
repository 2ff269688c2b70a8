//! Travel modes supported by the planner.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the traveller moves between spots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    /// On foot.
    #[default]
    Walking,
    /// By car or taxi.
    Driving,
    /// By public transport.
    Transit,
}

/// Error returned when parsing an unknown travel mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown travel mode {0:?} (expected walking, driving or transit)")]
pub struct ParseTravelModeError(pub String);

impl TravelMode {
    /// Lowercase identifier used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Walking => "walking",
            Self::Driving => "driving",
            Self::Transit => "transit",
        }
    }

    /// Assumed average speed used by straight-line travel estimates.
    #[must_use]
    pub const fn proxy_speed_kmh(self) -> f64 {
        match self {
            Self::Walking => 5.0,
            Self::Transit => 20.0,
            Self::Driving => 30.0,
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = ParseTravelModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walking" | "walk" => Ok(Self::Walking),
            "driving" | "drive" | "car" => Ok(Self::Driving),
            "transit" | "public" => Ok(Self::Transit),
            _ => Err(ParseTravelModeError(s.to_owned())),
        }
    }
}
