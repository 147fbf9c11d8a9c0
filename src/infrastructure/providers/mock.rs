//! # Mock Provider
//!
//! In-process [`FlightProvider`] with scripted behaviour.
//!
//! Serves fixed offers after an optional delay, or fails with a configured
//! error, and counts how often it was called. Used by tests, benchmarks and
//! the `mock` entry of `providers.enabled` for running the service without
//! upstream credentials.
//!
//! # Examples
//!
//! ```
//! use flight_aggregator::infrastructure::providers::mock::MockProvider;
//! use flight_aggregator::domain::value_objects::Price;
//! use std::time::Duration;
//!
//! let provider = MockProvider::new("p1")
//!     .with_offer(Price::parse("200").unwrap(), 120)
//!     .with_delay(Duration::from_millis(50));
//! assert_eq!(provider.calls(), 0);
//! ```

use crate::domain::entities::FlightOffer;
use crate::domain::value_objects::{CurrencyCode, Price, ProviderId, Timestamp};
use crate::infrastructure::providers::error::{ProviderError, ProviderResult};
use crate::infrastructure::providers::traits::{FlightProvider, SearchContext};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Departure used by [`MockProvider::with_offer`]: 2025-10-01T08:00:00Z.
pub const DEFAULT_DEPARTURE_SECS: i64 = 1_759_305_600;

/// Scripted provider for tests and demos.
#[derive(Debug)]
pub struct MockProvider {
    id: ProviderId,
    offers: Vec<FlightOffer>,
    delay: Duration,
    failure: Option<ProviderError>,
    calls: AtomicUsize,
}

impl MockProvider {
    /// Creates a provider that returns no offers.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ProviderId::new(name),
            offers: Vec::new(),
            delay: Duration::ZERO,
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Adds an EUR offer at the default departure time.
    #[must_use]
    pub fn with_offer(self, price: Price, duration_minutes: u32) -> Self {
        let depart = Timestamp::from_secs(DEFAULT_DEPARTURE_SECS).unwrap_or_else(Timestamp::now);
        self.with_offer_at(price, duration_minutes, depart)
    }

    /// Adds an EUR offer departing at `depart_at`.
    #[must_use]
    pub fn with_offer_at(mut self, price: Price, duration_minutes: u32, depart_at: Timestamp) -> Self {
        let offer = FlightOffer::scheduled(
            self.id.clone(),
            price,
            CurrencyCode::eur(),
            duration_minutes,
            depart_at,
        );
        self.offers.push(offer);
        self
    }

    /// Adds prebuilt offers as-is.
    #[must_use]
    pub fn with_offers(mut self, offers: impl IntoIterator<Item = FlightOffer>) -> Self {
        self.offers.extend(offers);
        self
    }

    /// Delays every response.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fails every search with `error` (after the delay).
    #[must_use]
    pub fn with_failure(mut self, error: ProviderError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Returns how many searches have started.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns the scripted offers.
    #[inline]
    #[must_use]
    pub fn offers(&self) -> &[FlightOffer] {
        &self.offers
    }
}

#[async_trait]
impl FlightProvider for MockProvider {
    fn name(&self) -> &str {
        self.id.as_str()
    }

    async fn search(&self, ctx: &SearchContext) -> ProviderResult<Vec<FlightOffer>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            let ready = tokio::time::Instant::now() + self.delay;
            if ready > ctx.deadline() {
                tokio::time::sleep_until(ctx.deadline()).await;
                return Err(ProviderError::cancelled(format!(
                    "{} did not answer before the deadline",
                    self.id
                )));
            }
            tokio::time::sleep_until(ready).await;
        }

        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(self.offers.clone()),
        }
    }
}
