//! # Flight Provider Trait
//!
//! Port definition for upstream flight-inventory sources.
//!
//! This module defines the [`FlightProvider`] trait that every adapter
//! implements, and the [`SearchContext`] handed to it: the query plus the
//! deadline shared by all providers taking part in one fan-out.
//!
//! # Examples
//!
//! ```ignore
//! use flight_aggregator::infrastructure::providers::traits::{FlightProvider, SearchContext};
//! use flight_aggregator::infrastructure::providers::error::ProviderResult;
//!
//! #[derive(Debug)]
//! struct MyProvider;
//!
//! #[async_trait::async_trait]
//! impl FlightProvider for MyProvider {
//!     fn name(&self) -> &str { "my-provider" }
//!
//!     async fn search(&self, ctx: &SearchContext) -> ProviderResult<Vec<FlightOffer>> {
//!         let timeout = ctx.remaining()?;
//!         // ... call the upstream with `timeout`
//!     }
//! }
//! ```

use crate::domain::entities::FlightOffer;
use crate::domain::value_objects::SearchQuery;
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Per-query input for a provider search.
///
/// All providers taking part in one aggregation receive the same deadline.
/// Adapters use [`remaining`](Self::remaining) to bound their own HTTP calls
/// so they return promptly instead of running past it.
#[derive(Debug, Clone)]
pub struct SearchContext {
    query: SearchQuery,
    deadline: Instant,
}

impl SearchContext {
    /// Creates a context for `query` that expires at `deadline`.
    #[must_use]
    pub fn new(query: SearchQuery, deadline: Instant) -> Self {
        Self { query, deadline }
    }

    /// Creates a context expiring `timeout` from now.
    #[must_use]
    pub fn with_timeout(query: SearchQuery, timeout: Duration) -> Self {
        Self::new(query, Instant::now() + timeout)
    }

    /// Returns the query.
    #[inline]
    #[must_use]
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Returns the shared deadline.
    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Returns true once the deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Time left before the deadline.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Cancelled` if the deadline has already passed.
    pub fn remaining(&self) -> ProviderResult<Duration> {
        let now = Instant::now();
        if now >= self.deadline {
            return Err(ProviderError::cancelled("search deadline exceeded"));
        }
        Ok(self.deadline - now)
    }
}

/// Trait defining the interface for flight providers.
///
/// One implementation exists per upstream. The engine holds providers as
/// shared `Arc<dyn FlightProvider>` for the lifetime of the process and calls
/// them concurrently, both with each other and across unrelated queries.
///
/// # Contract
///
/// - Returning `Ok(vec![])` means the upstream has no inventory for the route;
///   it is not a failure.
/// - When the context deadline passes, return promptly with
///   `ProviderError::Cancelled` rather than continuing.
/// - Transport, authentication and parsing faults are `ProviderError`s; the
///   engine pairs them with [`name`](Self::name) when reporting.
#[async_trait]
pub trait FlightProvider: Send + Sync + fmt::Debug {
    /// Returns the provider name, used as the offers' `provider` field.
    fn name(&self) -> &str;

    /// Searches the upstream for offers matching the context's query.
    ///
    /// # Errors
    ///
    /// - `ProviderError::Cancelled` - Deadline passed
    /// - `ProviderError::MissingCredentials` - Adapter not configured
    /// - `ProviderError::Upstream` - Unexpected HTTP status
    /// - `ProviderError::Protocol` - Malformed response body
    async fn search(&self, ctx: &SearchContext) -> ProviderResult<Vec<FlightOffer>>;
}
