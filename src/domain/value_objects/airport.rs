//! # Airport Code
//!
//! Three-letter IATA airport code, normalized to uppercase.

use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An IATA airport code such as `AMS` or `JFK`.
///
/// # Invariants
///
/// - Exactly three ASCII letters
/// - Always uppercase
///
/// # Examples
///
/// ```
/// use flight_aggregator::domain::value_objects::AirportCode;
///
/// let code = AirportCode::new(" ams ").unwrap();
/// assert_eq!(code.as_str(), "AMS");
///
/// assert!(AirportCode::new("AM").is_err());
/// assert!(AirportCode::new("A1S").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AirportCode(String);

impl AirportCode {
    /// Parses and normalizes an airport code.
    ///
    /// Surrounding whitespace is trimmed and letters are uppercased.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAirportCode` unless the trimmed input is
    /// exactly three ASCII letters.
    pub fn new(code: &str) -> DomainResult<Self> {
        let trimmed = code.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidAirportCode(code.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Returns the code as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AirportCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AirportCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<AirportCode> for String {
    fn from(code: AirportCode) -> Self {
        code.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(AirportCode::new("gru").unwrap().as_str(), "GRU");
        assert_eq!(AirportCode::new("\tJfK\n").unwrap().as_str(), "JFK");
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(AirportCode::new("").is_err());
        assert!(AirportCode::new("AB").is_err());
        assert!(AirportCode::new("ABCD").is_err());
    }

    #[test]
    fn rejects_non_letters() {
        assert!(AirportCode::new("A1C").is_err());
        assert!(AirportCode::new("A C").is_err());
        assert!(AirportCode::new("ÄBC").is_err());
    }

    #[test]
    fn serde_validates() {
        let code: AirportCode = serde_json::from_str("\"bcn\"").unwrap();
        assert_eq!(code.as_str(), "BCN");
        assert!(serde_json::from_str::<AirportCode>("\"barcelona\"").is_err());
    }
}
