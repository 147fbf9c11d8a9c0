//! # Application Errors
//!
//! Error types for the application layer.
//!
//! These errors represent failures surfaced to callers of the service:
//! bad input, failed aggregations, authentication failures and
//! configuration problems.
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError
//! ├── Domain(DomainError)             - Invalid airport code, date, ...
//! ├── Validation(String)              - Missing or malformed parameters
//! ├── Aggregation(AggregationError)   - Provider failure, deadline, no offers
//! ├── Unauthorized(String)            - Missing, invalid or expired credentials
//! ├── Configuration(ConfigError)      - Startup configuration problems
//! └── Internal(String)                - Anything else
//! ```
//!
//! # Examples
//!
//! ```
//! use flight_aggregator::application::error::ApplicationError;
//!
//! let err = ApplicationError::validation("origin is required");
//! assert_eq!(err.code(), "validation_error");
//! assert!(err.is_client_error());
//! ```

use crate::application::services::offer_aggregation::AggregationError;
use crate::domain::errors::DomainError;
use crate::infrastructure::config::ConfigError;
use thiserror::Error;

/// Application layer error.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain value failed validation.
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Request validation failed.
    #[error("{0}")]
    Validation(String),

    /// Aggregation failed.
    #[error("{0}")]
    Aggregation(#[from] AggregationError),

    /// Authentication failure.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Configuration could not be loaded.
    #[error("{0}")]
    Configuration(#[from] ConfigError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Stable machine-readable code for error bodies.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Domain(_) | Self::Validation(_) => "validation_error",
            Self::Aggregation(AggregationError::ProviderFailed { .. }) => "provider_failed",
            Self::Aggregation(AggregationError::DeadlineExceeded { .. }) => "deadline_exceeded",
            Self::Aggregation(AggregationError::NoOffers) => "no_offers",
            Self::Unauthorized(_) => "unauthorized",
            Self::Configuration(_) => "configuration_error",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Returns true if the caller is at fault.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Domain(_) | Self::Validation(_) | Self::Unauthorized(_)
        )
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::providers::ProviderError;

    #[test]
    fn domain_errors_are_validation() {
        let err: ApplicationError = DomainError::EmptyDate.into();
        assert_eq!(err.code(), "validation_error");
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "departure date must not be empty");
    }

    #[test]
    fn aggregation_codes() {
        let err: ApplicationError = AggregationError::NoOffers.into();
        assert_eq!(err.code(), "no_offers");
        assert_eq!(err.to_string(), "no offers found");
        assert!(!err.is_client_error());

        let err: ApplicationError = AggregationError::ProviderFailed {
            provider: "duffel".to_string(),
            source: ProviderError::timeout("slow"),
        }
        .into();
        assert_eq!(err.code(), "provider_failed");
        assert!(err.to_string().contains("duffel"));
    }

    #[test]
    fn unauthorized_message() {
        let err = ApplicationError::unauthorized("missing token");
        assert_eq!(err.to_string(), "unauthorized: missing token");
    }
}
