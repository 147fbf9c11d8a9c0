//! # Search Query
//!
//! The `(origin, destination, date)` triple that identifies one aggregation.
//!
//! A [`SearchQuery`] is both the request handed to every provider and the key
//! under which the merged result is cached. The date is kept as the caller
//! supplied it: it is only checked for non-emptiness and is passed to the
//! upstreams verbatim.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::airport::AirportCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Departure date as supplied by the caller, e.g. `2025-10-01`.
///
/// # Examples
///
/// ```
/// use flight_aggregator::domain::value_objects::DepartureDate;
///
/// assert_eq!(DepartureDate::new(" 2025-10-01 ").unwrap().as_str(), "2025-10-01");
/// assert!(DepartureDate::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DepartureDate(String);

impl DepartureDate {
    /// Creates a departure date from free-form text.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyDate` if the trimmed input is empty.
    pub fn new(date: &str) -> DomainResult<Self> {
        let trimmed = date.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyDate);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the date as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DepartureDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DepartureDate {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<DepartureDate> for String {
    fn from(date: DepartureDate) -> Self {
        date.0
    }
}

/// A route and date to aggregate offers for.
///
/// Equality and hashing cover all three fields, so two queries that differ
/// only in the date are cached independently.
///
/// # Examples
///
/// ```
/// use flight_aggregator::domain::value_objects::SearchQuery;
///
/// let query = SearchQuery::parse("ams", "bcn", "2025-10-01").unwrap();
/// assert_eq!(query.to_string(), "AMS|BCN|2025-10-01");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchQuery {
    origin: AirportCode,
    destination: AirportCode,
    date: DepartureDate,
}

impl SearchQuery {
    /// Creates a query from already validated parts.
    #[must_use]
    pub fn new(origin: AirportCode, destination: AirportCode, date: DepartureDate) -> Self {
        Self {
            origin,
            destination,
            date,
        }
    }

    /// Validates and normalizes raw request parameters.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAirportCode` for a bad origin or
    /// destination and `DomainError::EmptyDate` for a blank date.
    pub fn parse(origin: &str, destination: &str, date: &str) -> DomainResult<Self> {
        Ok(Self {
            origin: AirportCode::new(origin)?,
            destination: AirportCode::new(destination)?,
            date: DepartureDate::new(date)?,
        })
    }

    /// Returns the origin airport.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &AirportCode {
        &self.origin
    }

    /// Returns the destination airport.
    #[inline]
    #[must_use]
    pub fn destination(&self) -> &AirportCode {
        &self.destination
    }

    /// Returns the departure date.
    #[inline]
    #[must_use]
    pub fn date(&self) -> &DepartureDate {
        &self.date
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.origin, self.destination, self.date)
    }
}
