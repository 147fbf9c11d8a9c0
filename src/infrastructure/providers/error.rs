//! # Provider Errors
//!
//! Error types for flight provider operations.
//!
//! Every adapter maps its upstream faults (transport errors, HTTP status
//! codes of 300 and above, malformed bodies, missing credentials) onto
//! [`ProviderError`]. The aggregation engine attaches the provider name when
//! it surfaces one of these to a caller.
//!
//! # Examples
//!
//! ```
//! use flight_aggregator::infrastructure::providers::error::ProviderError;
//!
//! let error = ProviderError::missing_credentials("client id not configured");
//! assert!(error.is_client_error());
//!
//! let error = ProviderError::timeout("request timed out after 5000ms");
//! assert!(!error.is_client_error());
//! ```

use thiserror::Error;

/// Error type for provider adapter operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Request timed out.
    #[error("provider timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
    },

    /// The caller's deadline passed or the search was cancelled.
    #[error("provider search cancelled: {message}")]
    Cancelled {
        /// Error message.
        message: String,
    },

    /// Network or connection error.
    #[error("provider connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Authentication or authorization failure.
    #[error("provider authentication error: {message}")]
    Authentication {
        /// Error message.
        message: String,
    },

    /// Adapter is not configured with the credentials it needs.
    #[error("provider credentials missing: {message}")]
    MissingCredentials {
        /// Error message.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("provider rate limit exceeded: {message}")]
    RateLimited {
        /// Error message.
        message: String,
    },

    /// Invalid request parameters.
    #[error("provider invalid request: {message}")]
    InvalidRequest {
        /// Error message.
        message: String,
    },

    /// Upstream answered with an unexpected HTTP status.
    #[error("provider returned HTTP {status}: {message}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Error message or response body excerpt.
        message: String,
    },

    /// Response body could not be decoded or reported a failure.
    #[error("provider protocol error: {message}")]
    Protocol {
        /// Error message.
        message: String,
    },

    /// Internal adapter error.
    #[error("provider internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl ProviderError {
    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Creates a cancellation error.
    #[must_use]
    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Creates a missing credentials error.
    #[must_use]
    pub fn missing_credentials(message: impl Into<String>) -> Self {
        Self::MissingCredentials {
            message: message.into(),
        }
    }

    /// Creates a rate limited error.
    #[must_use]
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Creates an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates an upstream status error.
    #[must_use]
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if the fault lies with the request or configuration
    /// rather than the upstream.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest { .. }
                | Self::Authentication { .. }
                | Self::MissingCredentials { .. }
        )
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_not_client_error() {
        assert!(!ProviderError::timeout("test").is_client_error());
        assert!(!ProviderError::upstream(503, "down").is_client_error());
    }

    #[test]
    fn missing_credentials_is_client_error() {
        let error = ProviderError::missing_credentials("no token");
        assert!(error.is_client_error());
    }

    #[test]
    fn cancelled_is_not_client_error() {
        let error = ProviderError::cancelled("deadline");
        assert!(!error.is_client_error());
    }

    #[test]
    fn display_format() {
        let error = ProviderError::upstream(502, "bad gateway");
        let display = error.to_string();
        assert!(display.contains("502"));
        assert!(display.contains("bad gateway"));
    }
}
