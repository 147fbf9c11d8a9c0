//! # Domain Errors
//!
//! Validation failures raised while constructing domain values.
//!
//! Every constructor in the domain layer validates its input and reports
//! problems through [`DomainError`]. The API layer surfaces these as
//! validation errors; they never reach the aggregation engine.
//!
//! # Examples
//!
//! ```
//! use flight_aggregator::domain::errors::DomainError;
//! use flight_aggregator::domain::value_objects::AirportCode;
//!
//! let err = AirportCode::new("AMSX").unwrap_err();
//! assert!(matches!(err, DomainError::InvalidAirportCode(_)));
//! ```

use thiserror::Error;

/// Error type for domain validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Airport code is not three ASCII letters.
    #[error("invalid airport code: {0:?} (expected three letters, e.g. AMS)")]
    InvalidAirportCode(String),

    /// Departure date is missing.
    #[error("departure date must not be empty")]
    EmptyDate,

    /// Currency code is not three ASCII letters.
    #[error("invalid currency code: {0:?}")]
    InvalidCurrency(String),

    /// Price is negative or not representable.
    #[error("invalid price: {0}")]
    InvalidPrice(String),

    /// Provider identifier is empty.
    #[error("provider identifier must not be empty")]
    EmptyProviderId,

    /// Offer fields are inconsistent.
    #[error("invalid offer: {0}")]
    InvalidOffer(String),

    /// A count or range parameter is out of bounds.
    #[error("value out of range: {0}")]
    OutOfRange(String),
}

impl DomainError {
    /// Creates an invalid offer error.
    #[must_use]
    pub fn invalid_offer(message: impl Into<String>) -> Self {
        Self::InvalidOffer(message.into())
    }

    /// Creates an invalid price error.
    #[must_use]
    pub fn invalid_price(message: impl Into<String>) -> Self {
        Self::InvalidPrice(message.into())
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_offending_value() {
        let err = DomainError::InvalidAirportCode("A1".to_string());
        assert!(err.to_string().contains("\"A1\""));
    }

    #[test]
    fn helper_constructors() {
        assert_eq!(
            DomainError::invalid_offer("x"),
            DomainError::InvalidOffer("x".to_string())
        );
        assert_eq!(
            DomainError::invalid_price("-1"),
            DomainError::InvalidPrice("-1".to_string())
        );
    }
}
