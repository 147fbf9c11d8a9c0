//! # Price and Currency
//!
//! Decimal offer amounts and ISO 4217 currency codes.
//!
//! Prices are held as [`Decimal`] so that comparisons between providers are
//! exact; the wire representation is a JSON number.

use crate::domain::errors::{DomainError, DomainResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A non-negative monetary amount.
///
/// # Examples
///
/// ```
/// use flight_aggregator::domain::value_objects::Price;
/// use rust_decimal::Decimal;
///
/// let a = Price::parse("149.99").unwrap();
/// let b = Price::new(Decimal::new(150, 0)).unwrap();
/// assert!(a < b);
/// assert!(Price::parse("-1").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Creates a price, rejecting negative amounts.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPrice` if `amount` is negative.
    pub fn new(amount: Decimal) -> DomainResult<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(DomainError::invalid_price(amount.to_string()));
        }
        Ok(Self(amount.normalize()))
    }

    /// Parses a decimal string such as `"123.45"`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPrice` if the string is not a decimal
    /// number or is negative.
    pub fn parse(amount: &str) -> DomainResult<Self> {
        let value = Decimal::from_str(amount.trim())
            .map_err(|e| DomainError::invalid_price(format!("{amount:?}: {e}")))?;
        Self::new(value)
    }

    /// Builds a price from whole units plus billionths, the split encoding
    /// some upstreams use (`units: 123, nanos: 450000000` is `123.45`).
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPrice` if the result is negative.
    pub fn from_units_and_nanos(units: i64, nanos: i64) -> DomainResult<Self> {
        let amount = Decimal::from(units) + Decimal::new(nanos, 9);
        Self::new(amount)
    }

    /// Returns the decimal amount.
    #[inline]
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

/// Three-letter ISO 4217 currency code, uppercase.
///
/// # Examples
///
/// ```
/// use flight_aggregator::domain::value_objects::CurrencyCode;
///
/// assert_eq!(CurrencyCode::new("eur").unwrap().as_str(), "EUR");
/// assert!(CurrencyCode::new("EURO").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses and normalizes a currency code.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCurrency` unless the trimmed input is
    /// exactly three ASCII letters.
    pub fn new(code: &str) -> DomainResult<Self> {
        let trimmed = code.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidCurrency(code.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    /// Euro, the currency every adapter requests by default.
    #[must_use]
    pub fn eur() -> Self {
        Self("EUR".to_string())
    }

    /// Returns the code as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}
