//! # Timestamp Value Object
//!
//! UTC instant used for departure and arrival times.
//!
//! Upstream providers encode times inconsistently: some send RFC 3339 with an
//! offset, others send a naive local `YYYY-MM-DDTHH:MM:SS`. [`Timestamp::parse`]
//! accepts both and normalizes to UTC so offers from different sources compare
//! on one axis.
//!
//! # Examples
//!
//! ```
//! use flight_aggregator::domain::value_objects::timestamp::Timestamp;
//!
//! let depart = Timestamp::parse("2025-10-01T08:45:00").unwrap();
//! let arrive = Timestamp::parse("2025-10-01T10:55:00Z").unwrap();
//!
//! assert!(arrive.is_after(&depart));
//! assert_eq!(depart.minutes_until(&arrive), Some(130));
//! ```

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Naive layout used by providers that omit the UTC offset.
const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A UTC instant.
///
/// Serializes as an RFC 3339 string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from Unix seconds.
    ///
    /// Returns `None` if the value is out of range.
    #[must_use]
    pub fn from_secs(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Parses a provider timestamp.
    ///
    /// Accepts RFC 3339 (any offset, converted to UTC) and the naive
    /// `YYYY-MM-DDTHH:MM:SS` layout, which is interpreted as UTC. Fractional
    /// seconds are accepted in both forms.
    ///
    /// Returns `None` for anything else.
    ///
    /// # Examples
    ///
    /// ```
    /// use flight_aggregator::domain::value_objects::timestamp::Timestamp;
    ///
    /// let a = Timestamp::parse("2025-10-01T10:00:00+02:00").unwrap();
    /// let b = Timestamp::parse("2025-10-01T08:00:00").unwrap();
    /// assert_eq!(a, b);
    /// assert!(Timestamp::parse("yesterday").is_none());
    /// ```
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Some(Self(dt.with_timezone(&Utc)));
        }
        let naive = NaiveDateTime::parse_from_str(input, NAIVE_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f"))
            .ok()?;
        Some(Self(Utc.from_utc_datetime(&naive)))
    }

    /// Returns the Unix timestamp in seconds.
    #[inline]
    #[must_use]
    pub fn timestamp_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Adds minutes to the timestamp (can be negative).
    #[must_use]
    pub fn add_minutes(&self, minutes: i64) -> Self {
        Self(self.0 + Duration::minutes(minutes))
    }

    /// Returns true if this timestamp is after another.
    #[inline]
    #[must_use]
    pub fn is_after(&self, other: &Self) -> bool {
        self.0 > other.0
    }

    /// Whole minutes from `self` to `other`.
    ///
    /// Returns `None` when `other` is earlier than `self`.
    #[must_use]
    pub fn minutes_until(&self, other: &Self) -> Option<u32> {
        let minutes = (other.0 - self.0).num_minutes();
        u32::try_from(minutes).ok()
    }

    /// Returns the underlying DateTime.
    #[inline]
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod parsing {
        use super::*;

        #[test]
        fn rfc3339_with_offset_is_normalized() {
            let ts = Timestamp::parse("2025-10-01T10:00:00+02:00").unwrap();
            assert_eq!(ts.to_string(), "2025-10-01T08:00:00+00:00");
        }

        #[test]
        fn naive_is_utc() {
            let ts = Timestamp::parse("2025-10-01T08:45:00").unwrap();
            assert_eq!(ts.to_string(), "2025-10-01T08:45:00+00:00");
        }

        #[test]
        fn naive_with_fraction() {
            assert!(Timestamp::parse("2025-10-01T08:45:00.250").is_some());
        }

        #[test]
        fn surrounding_whitespace_is_ignored() {
            assert!(Timestamp::parse(" 2025-10-01T08:45:00Z ").is_some());
        }

        #[test]
        fn garbage_is_rejected() {
            assert!(Timestamp::parse("").is_none());
            assert!(Timestamp::parse("2025-10-01").is_none());
            assert!(Timestamp::parse("not a time").is_none());
        }
    }

    mod arithmetic {
        use super::*;

        #[test]
        fn add_minutes() {
            let ts = Timestamp::from_secs(0).unwrap();
            assert_eq!(ts.add_minutes(2).timestamp_secs(), 120);
            assert_eq!(ts.add_minutes(-1).timestamp_secs(), -60);
        }

        #[test]
        fn minutes_until_forward_and_backward() {
            let a = Timestamp::from_secs(0).unwrap();
            let b = a.add_minutes(95);
            assert_eq!(a.minutes_until(&b), Some(95));
            assert_eq!(b.minutes_until(&a), None);
        }

        #[test]
        fn ordering() {
            let a = Timestamp::from_secs(1000).unwrap();
            let b = Timestamp::from_secs(2000).unwrap();
            assert!(a < b);
            assert!(b.is_after(&a));
        }
    }

    #[test]
    fn serializes_as_rfc3339_string() {
        let ts = Timestamp::from_secs(1_704_067_200).unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2024-01-01T00:00:00Z\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }
}
