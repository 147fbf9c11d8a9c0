//! # Identifiers
//!
//! String-based identifier for offer sources.

use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the provider an offer came from, e.g. `amadeus`.
///
/// # Examples
///
/// ```
/// use flight_aggregator::domain::value_objects::ProviderId;
///
/// let id = ProviderId::new("duffel");
/// assert_eq!(id.as_str(), "duffel");
/// assert!(ProviderId::try_new("  ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    /// Creates a provider identifier without validation.
    ///
    /// Intended for compile-time constant names owned by adapters.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a provider identifier, rejecting blank input.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyProviderId` if `id` is blank.
    pub fn try_new(id: impl Into<String>) -> DomainResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::EmptyProviderId);
        }
        Ok(Self(id))
    }

    /// Returns the identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
