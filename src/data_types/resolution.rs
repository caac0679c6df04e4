use super::axis::TimeRange;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const MINUTE_MS: i64 = 60_000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Slot width of a series. Every item of a series starts on a slot boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "30m")]
    Minute30,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "1w")]
    Week1,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown resolution: {0}")]
pub struct UnknownResolution(pub String);

impl Resolution {
    pub const ALL: [Resolution; 8] = [
        Resolution::Minute1,
        Resolution::Minute5,
        Resolution::Minute15,
        Resolution::Minute30,
        Resolution::Hour1,
        Resolution::Hour4,
        Resolution::Day1,
        Resolution::Week1,
    ];

    pub fn as_millis(&self) -> i64 {
        match self {
            Self::Minute1 => MINUTE_MS,
            Self::Minute5 => 5 * MINUTE_MS,
            Self::Minute15 => 15 * MINUTE_MS,
            Self::Minute30 => 30 * MINUTE_MS,
            Self::Hour1 => HOUR_MS,
            Self::Hour4 => 4 * HOUR_MS,
            Self::Day1 => DAY_MS,
            Self::Week1 => 7 * DAY_MS,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::milliseconds(self.as_millis())
    }

    /// `n` slots as a duration.
    pub fn slots(&self, n: i64) -> Duration {
        Duration::milliseconds(self.as_millis().saturating_mul(n))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minute1 => "1m",
            Self::Minute5 => "5m",
            Self::Minute15 => "15m",
            Self::Minute30 => "30m",
            Self::Hour1 => "1h",
            Self::Hour4 => "4h",
            Self::Day1 => "1d",
            Self::Week1 => "1w",
        }
    }

    /// Floors `t` to the start of its slot (epoch aligned).
    ///
    /// Weekly slots are aligned on Mondays, the epoch itself being a Thursday.
    pub fn align(&self, t: DateTime<Utc>) -> DateTime<Utc> {
        let ms = t.timestamp_millis();
        let aligned = match self {
            Self::Week1 => {
                let monday_offset = 4 * DAY_MS;
                (ms - monday_offset).div_euclid(self.as_millis()) * self.as_millis() + monday_offset
            }
            _ => ms.div_euclid(self.as_millis()) * self.as_millis(),
        };
        Utc.timestamp_millis_opt(aligned).single().unwrap_or(t)
    }

    /// Start of the slot following the one containing `t`.
    pub fn next_slot(&self, t: DateTime<Utc>) -> DateTime<Utc> {
        self.align(t) + self.duration()
    }

    /// Widens `range` outward to whole slots.
    pub fn align_range(&self, range: &TimeRange) -> TimeRange {
        let start = self.align(range.start());
        let end = if self.align(range.end()) == range.end() {
            range.end()
        } else {
            self.next_slot(range.end())
        };
        TimeRange::new(start, end).unwrap_or(*range)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = UnknownResolution;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownResolution(s.to_string()))
    }
}
