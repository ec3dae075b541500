//! Wall-clock timestamps with second granularity.

use chrono::{Duration, NaiveDateTime, Timelike, Utc};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Wire format for timestamps.
const WIRE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Error returned when a timestamp string does not parse.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid timestamp {value:?}: expected YYYY-MM-DD HH:MM:SS")]
pub struct TimestampError {
    /// The rejected input.
    pub value: String,
}

/// A server-local wall-clock timestamp with second granularity.
///
/// Timestamps order conflict resolution: the mutation with the newer
/// asserted timestamp overrides prior state. On the wire they are
/// `YYYY-MM-DD HH:MM:SS` strings; sub-second precision is deliberately
/// not represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Returns the current server time, truncated to whole seconds.
    pub fn now() -> Self {
        let now = Utc::now().naive_utc();
        Self(now.with_nanosecond(0).unwrap_or(now))
    }

    /// Returns the Unix epoch (1970-01-01 00:00:00).
    ///
    /// Used as the cutoff when a caller asks for "everything".
    pub fn epoch() -> Self {
        Self(NaiveDateTime::default())
    }

    /// Parses a timestamp from its wire form.
    pub fn parse(value: &str) -> Result<Self, TimestampError> {
        NaiveDateTime::parse_from_str(value, WIRE_FORMAT)
            .map(Self)
            .map_err(|_| TimestampError {
                value: value.to_string(),
            })
    }

    /// Returns this timestamp shifted forward by whole days.
    ///
    /// Saturates at the representable range rather than wrapping.
    pub fn plus_days(self, days: i64) -> Self {
        self.0
            .checked_add_signed(Duration::days(days))
            .map(Self)
            .unwrap_or(self)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::epoch()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(WIRE_FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_roundtrip() {
        let ts = Timestamp::parse("2024-03-01 12:30:45").unwrap();
        assert_eq!(ts.to_string(), "2024-03-01 12:30:45");
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Timestamp::parse("not a time").is_err());
        assert!(Timestamp::parse("2024-03-01").is_err());
        assert!(Timestamp::parse("2024-03-01T12:30:45Z").is_err());
    }

    #[test]
    fn ordering_follows_wall_clock() {
        let earlier = Timestamp::parse("2024-03-01 12:00:00").unwrap();
        let later = Timestamp::parse("2024-03-01 12:00:01").unwrap();
        assert!(earlier < later);
        assert!(earlier < Timestamp::now());
    }

    #[test]
    fn now_has_second_granularity() {
        let a = Timestamp::now();
        let reparsed = Timestamp::parse(&a.to_string()).unwrap();
        assert_eq!(a, reparsed);
    }

    #[test]
    fn epoch_is_minimal() {
        assert_eq!(Timestamp::epoch().to_string(), "1970-01-01 00:00:00");
        assert!(Timestamp::epoch() < Timestamp::now());
    }

    #[test]
    fn plus_days_shifts_forward() {
        let ts = Timestamp::parse("2024-03-01 12:00:00").unwrap();
        assert_eq!(ts.plus_days(30).to_string(), "2024-03-31 12:00:00");
    }
}
