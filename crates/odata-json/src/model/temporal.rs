//! Temporal scalar types.
//!
//! Each type parses from and displays as its OData wire form.

use std::fmt;
use std::str::FromStr;

use crate::util::datetime::{
    self, DateTimeParseError, days_from_civil, days_in_month, valid_nanos,
};

/// A calendar date (Edm.Date), stored as days since 1970-01-01.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Date {
    days: i32,
}

impl Date {
    /// Creates a date from days since the Unix epoch.
    pub fn from_days(days: i32) -> Self {
        Self { days }
    }

    /// Creates a date from civil year, month and day; `None` if invalid.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
            return None;
        }
        Some(Self {
            days: days_from_civil(year, month, day),
        })
    }

    pub fn days(&self) -> i32 {
        self.days
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&datetime::format_date(self.days))
    }
}

impl FromStr for Date {
    type Err = DateTimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        datetime::parse_date(s).map(Self::from_days)
    }
}

/// An instant (Edm.DateTimeOffset), normalized to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateTimeOffset {
    epoch_seconds: i64,
    nanos: u32,
}

impl DateTimeOffset {
    /// Creates an instant from UTC seconds since the epoch and nanoseconds.
    pub fn new(epoch_seconds: i64, nanos: u32) -> Option<Self> {
        valid_nanos(nanos).then_some(Self {
            epoch_seconds,
            nanos,
        })
    }

    /// Creates an instant from UTC civil components.
    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Option<Self> {
        let date = Date::from_ymd(year, month, day)?;
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        let secs = date.days as i64 * 86_400 + (hour * 3600 + minute * 60 + second) as i64;
        Self::new(secs, 0)
    }

    /// Returns a copy with the given sub-second nanoseconds.
    pub fn with_nanos(self, nanos: u32) -> Option<Self> {
        Self::new(self.epoch_seconds, nanos)
    }

    pub fn epoch_seconds(&self) -> i64 {
        self.epoch_seconds
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }
}

impl fmt::Display for DateTimeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&datetime::format_datetime_offset(self.epoch_seconds, self.nanos))
    }
}

impl FromStr for DateTimeOffset {
    type Err = DateTimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (epoch_seconds, nanos) = datetime::parse_datetime_offset(s)?;
        Ok(Self {
            epoch_seconds,
            nanos,
        })
    }
}

/// A time of day (Edm.TimeOfDay).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeOfDay {
    seconds: u32,
    nanos: u32,
}

impl TimeOfDay {
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Option<Self> {
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        Some(Self {
            seconds: hour * 3600 + minute * 60 + second,
            nanos: 0,
        })
    }

    pub fn with_nanos(self, nanos: u32) -> Option<Self> {
        valid_nanos(nanos).then_some(Self { nanos, ..self })
    }

    pub fn seconds_of_day(&self) -> u32 {
        self.seconds
    }

    pub fn nanos(&self) -> u32 {
        self.nanos
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&datetime::format_time_of_day(self.seconds, self.nanos))
    }
}

impl FromStr for TimeOfDay {
    type Err = DateTimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (seconds, nanos) = datetime::parse_time_of_day(s)?;
        Ok(Self { seconds, nanos })
    }
}

/// A signed day-time duration (Edm.Duration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Duration {
    negative: bool,
    magnitude: std::time::Duration,
}

impl Duration {
    /// Creates a non-negative duration.
    pub fn from_std(magnitude: std::time::Duration) -> Self {
        Self {
            negative: false,
            magnitude,
        }
    }

    /// Creates a duration of whole seconds; negative input yields a negative duration.
    pub fn from_secs(seconds: i64) -> Self {
        Self {
            negative: seconds < 0,
            magnitude: std::time::Duration::from_secs(seconds.unsigned_abs()),
        }
    }

    /// Returns the duration with its sign flipped.
    pub fn negated(self) -> Self {
        Self {
            negative: !self.negative,
            ..self
        }
    }

    pub fn is_negative(&self) -> bool {
        self.negative && !self.magnitude.is_zero()
    }

    pub fn magnitude(&self) -> std::time::Duration {
        self.magnitude
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&datetime::format_duration(
            self.is_negative(),
            self.magnitude.as_secs(),
            self.magnitude.subsec_nanos(),
        ))
    }
}

impl FromStr for Duration {
    type Err = DateTimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, secs, nanos) = datetime::parse_duration(s)?;
        Ok(Self {
            negative,
            magnitude: std::time::Duration::new(secs, nanos),
        })
    }
}
