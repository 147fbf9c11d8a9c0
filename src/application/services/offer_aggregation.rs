//! # Offer Aggregation Engine
//!
//! Fans a query out to every registered provider and ranks the merged offers.
//!
//! This module provides the [`OfferAggregationEngine`], which:
//! - Serves repeated queries from a TTL cache
//! - Queries all providers concurrently under one shared deadline
//! - Fails the whole search on the first provider failure or on the deadline
//! - Ranks the merged offers and caches the result
//!
//! # Examples
//!
//! ```ignore
//! let engine = OfferAggregationEngine::new(providers, AggregationConfig::default());
//! let result = engine.search(&SearchQuery::parse("AMS", "BCN", "2025-10-01")?).await?;
//! println!("cheapest: {}", result.cheapest);
//! ```

use crate::application::services::cache::OfferCache;
use crate::application::services::ranking::AggregationResult;
use crate::domain::entities::FlightOffer;
use crate::domain::value_objects::SearchQuery;
use crate::infrastructure::providers::{ProviderError, SearchContext, SharedProvider};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{Instrument, debug, error, info, instrument, warn};

/// Configuration for offer aggregation.
#[derive(Debug, Clone)]
pub struct AggregationConfig {
    /// Deadline for one fan-out, measured from the cache miss.
    pub search_timeout: Duration,
    /// Lifetime of a cached result.
    pub cache_ttl: Duration,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            search_timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(30),
        }
    }
}

impl AggregationConfig {
    /// Creates a configuration with the given search timeout.
    #[must_use]
    pub fn with_timeout(search_timeout: Duration) -> Self {
        Self {
            search_timeout,
            ..Default::default()
        }
    }

    /// Sets the cache TTL.
    #[must_use]
    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }
}

/// Error type for aggregation operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    /// A provider failed; the first failure observed is reported.
    #[error("provider {provider} failed: {source}")]
    ProviderFailed {
        /// Name of the failing provider.
        provider: String,
        /// What went wrong.
        #[source]
        source: ProviderError,
    },

    /// Not every provider answered before the deadline.
    #[error("search timed out after {timeout_ms}ms")]
    DeadlineExceeded {
        /// Deadline budget in milliseconds.
        timeout_ms: u64,
    },

    /// Every provider answered, with no offers between them.
    #[error("no offers found")]
    NoOffers,
}

impl AggregationError {
    /// Returns the failing provider's name, if a provider failed.
    #[must_use]
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::ProviderFailed { provider, .. } => Some(provider),
            _ => None,
        }
    }
}

/// Result type for aggregation operations.
pub type AggregationOutcome = Result<Arc<AggregationResult>, AggregationError>;

/// Engine for collecting and ranking offers from multiple providers.
///
/// Shared across requests behind an `Arc`. No single-flight coalescing:
/// concurrent misses on one query each run their own fan-out.
#[derive(Debug)]
pub struct OfferAggregationEngine {
    providers: Vec<SharedProvider>,
    cache: OfferCache,
    config: AggregationConfig,
}

impl OfferAggregationEngine {
    /// Creates an engine over `providers`, in registration order.
    #[must_use]
    pub fn new(providers: Vec<SharedProvider>, config: AggregationConfig) -> Self {
        Self {
            providers,
            cache: OfferCache::new(),
            config,
        }
    }

    /// Searches with the engine's own timeout as the only deadline.
    ///
    /// # Errors
    ///
    /// See [`search_within`](Self::search_within).
    pub async fn search(&self, query: &SearchQuery) -> AggregationOutcome {
        self.search_within(query, None).await
    }

    /// Searches, bounded by the earlier of `caller_deadline` and the
    /// configured search timeout.
    ///
    /// # Errors
    ///
    /// - `ProviderFailed` if any provider fails
    /// - `DeadlineExceeded` if any provider is still running at the deadline
    /// - `NoOffers` if all providers succeed without offers
    ///
    /// Failures are never cached.
    #[instrument(skip_all, fields(query = %query))]
    pub async fn search_within(
        &self,
        query: &SearchQuery,
        caller_deadline: Option<Instant>,
    ) -> AggregationOutcome {
        if let Some(cached) = self.cache.get_value(query) {
            debug!("Serving cached result");
            return Ok(cached);
        }

        let started = Instant::now();
        let own_deadline = started + self.config.search_timeout;
        let deadline = caller_deadline.map_or(own_deadline, |d| d.min(own_deadline));

        let offers = self.collect_offers(query, started, deadline).await?;
        let offer_count = offers.len();
        let result = Arc::new(AggregationResult::rank(offers).ok_or(AggregationError::NoOffers)?);

        info!(
            providers = self.providers.len(),
            offers = offer_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Aggregated offers"
        );

        self.cache
            .put(query.clone(), Arc::clone(&result), self.config.cache_ttl);
        Ok(result)
    }

    /// Runs every provider concurrently and concatenates their offers in
    /// registration order.
    async fn collect_offers(
        &self,
        query: &SearchQuery,
        started: Instant,
        deadline: Instant,
    ) -> Result<Vec<FlightOffer>, AggregationError> {
        let ctx = Arc::new(SearchContext::new(query.clone(), deadline));
        let mut tasks = JoinSet::new();
        let mut task_index = HashMap::with_capacity(self.providers.len());

        for (index, provider) in self.providers.iter().enumerate() {
            let provider = Arc::clone(provider);
            let ctx = Arc::clone(&ctx);
            let handle =
                tasks.spawn(async move { (index, provider.search(&ctx).await) }.in_current_span());
            task_index.insert(handle.id(), index);
        }

        let mut slots: Vec<Option<Vec<FlightOffer>>> = vec![None; self.providers.len()];

        let joined = tokio::time::timeout_at(deadline, async {
            while let Some(joined) = tasks.join_next().await {
                let (index, outcome) = match joined {
                    Ok(done) => done,
                    Err(join_error) => {
                        let index = task_index.get(&join_error.id()).copied().unwrap_or_default();
                        (
                            index,
                            Err(ProviderError::internal(format!("provider task failed: {join_error}"))),
                        )
                    }
                };
                match outcome {
                    Ok(offers) => {
                        if let Some(slot) = slots.get_mut(index) {
                            *slot = Some(offers);
                        }
                    }
                    Err(source) => return Err((index, source)),
                }
            }
            Ok(())
        })
        .await;

        let budget_ms = deadline.saturating_duration_since(started).as_millis() as u64;
        let failure = match joined {
            Ok(Ok(())) => None,
            // Adapters bound their requests by the same deadline, so their own
            // timeout can fire before ours. Anything failing once it has passed
            // counts against the deadline.
            Ok(Err(_)) | Err(_) if Instant::now() >= deadline => {
                Some(AggregationError::DeadlineExceeded { timeout_ms: budget_ms })
            }
            Ok(Err((index, source))) => Some(AggregationError::ProviderFailed {
                provider: self.provider_name(index).to_string(),
                source,
            }),
            Err(_elapsed) => Some(AggregationError::DeadlineExceeded { timeout_ms: budget_ms }),
        };

        if let Some(error) = failure {
            tasks.abort_all();
            match &error {
                AggregationError::ProviderFailed { provider, source }
                    if source.is_client_error() =>
                {
                    error!(
                        %provider,
                        error = %error,
                        "Provider rejected the request, check its configuration"
                    );
                }
                _ => warn!(error = %error, pending = tasks.len(), "Search failed"),
            }
            return Err(error);
        }

        Ok(slots.into_iter().flatten().flatten().collect())
    }

    fn provider_name(&self, index: usize) -> &str {
        self.providers
            .get(index)
            .map_or("unknown", |provider| provider.name())
    }

    /// Returns the registered provider names, in registration order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Returns the result cache.
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &OfferCache {
        &self.cache
    }

    /// Returns the current configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Price;
    use crate::infrastructure::providers::{FlightProvider, MockProvider, ProviderResult};
    use async_trait::async_trait;

    fn query() -> SearchQuery {
        SearchQuery::parse("AMS", "BCN", "2025-10-01").unwrap()
    }

    fn price(amount: &str) -> Price {
        Price::parse(amount).unwrap()
    }

    fn engine(providers: &[Arc<MockProvider>], config: AggregationConfig) -> OfferAggregationEngine {
        let providers = providers
            .iter()
            .map(|p| Arc::clone(p) as SharedProvider)
            .collect();
        OfferAggregationEngine::new(providers, config)
    }

    /// Ignores the deadline entirely.
    #[derive(Debug)]
    struct StubbornProvider;

    #[async_trait]
    impl FlightProvider for StubbornProvider {
        fn name(&self) -> &str {
            "stubborn"
        }

        async fn search(&self, _ctx: &SearchContext) -> ProviderResult<Vec<FlightOffer>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }
    }

    mod ranking {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn three_provider_scenario() {
            let providers = [
                Arc::new(MockProvider::new("P1").with_offer(price("200"), 120)),
                Arc::new(MockProvider::new("P2").with_offer(price("150"), 90)),
                Arc::new(MockProvider::new("P3").with_offer(price("300"), 60)),
            ];
            let engine = engine(&providers, AggregationConfig::default());

            let result = engine.search(&query()).await.unwrap();

            assert_eq!(result.cheapest.provider().as_str(), "P2");
            assert_eq!(result.fastest.provider().as_str(), "P3");
            assert_eq!(result.all.len(), 3);
            assert_eq!(result.all.first().unwrap().provider().as_str(), "P2");
        }

        #[tokio::test(start_paused = true)]
        async fn ties_follow_registration_order_not_latency() {
            let providers = [
                Arc::new(
                    MockProvider::new("slow")
                        .with_offer(price("100"), 90)
                        .with_delay(Duration::from_millis(500)),
                ),
                Arc::new(MockProvider::new("fast").with_offer(price("100"), 90)),
            ];
            let engine = engine(&providers, AggregationConfig::default());

            let result = engine.search(&query()).await.unwrap();

            assert_eq!(result.cheapest.provider().as_str(), "slow");
            assert_eq!(result.fastest.provider().as_str(), "slow");
        }

        #[tokio::test(start_paused = true)]
        async fn all_providers_empty_is_no_offers() {
            let providers = [Arc::new(MockProvider::new("a")), Arc::new(MockProvider::new("b"))];
            let engine = engine(&providers, AggregationConfig::default());

            let err = engine.search(&query()).await.unwrap_err();

            assert_eq!(err, AggregationError::NoOffers);
            assert_eq!(err.to_string(), "no offers found");
            assert!(engine.cache().is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn no_providers_is_no_offers() {
            let engine = OfferAggregationEngine::new(Vec::new(), AggregationConfig::default());
            assert_eq!(
                engine.search(&query()).await.unwrap_err(),
                AggregationError::NoOffers
            );
        }
    }

    mod caching {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn hit_skips_providers() {
            let provider = Arc::new(MockProvider::new("p").with_offer(price("99"), 60));
            let engine = engine(&[Arc::clone(&provider)], AggregationConfig::default());

            let first = engine.search(&query()).await.unwrap();
            let second = engine.search(&query()).await.unwrap();

            assert_eq!(provider.calls(), 1);
            assert!(Arc::ptr_eq(&first, &second));
        }

        #[tokio::test(start_paused = true)]
        async fn entry_expires_after_ttl() {
            let provider = Arc::new(MockProvider::new("p").with_offer(price("99"), 60));
            let config = AggregationConfig::default().with_cache_ttl(Duration::from_secs(1));
            let engine = engine(&[Arc::clone(&provider)], config);

            let first = engine.search(&query()).await.unwrap();
            assert_eq!(provider.calls(), 1);
            engine.search(&query()).await.unwrap();
            assert_eq!(provider.calls(), 1);

            tokio::time::advance(Duration::from_millis(1100)).await;
            let third = engine.search(&query()).await.unwrap();

            assert_eq!(provider.calls(), 2);
            assert_eq!(*first, *third);
        }

        #[tokio::test(start_paused = true)]
        async fn distinct_queries_are_cached_separately() {
            let provider = Arc::new(MockProvider::new("p").with_offer(price("99"), 60));
            let engine = engine(&[Arc::clone(&provider)], AggregationConfig::default());

            engine.search(&query()).await.unwrap();
            engine
                .search(&SearchQuery::parse("AMS", "BCN", "2025-10-02").unwrap())
                .await
                .unwrap();

            assert_eq!(provider.calls(), 2);
            assert_eq!(engine.cache().len(), 2);
        }
    }

    mod concurrency {
        use super::*;
        use futures::future::join_all;

        #[tokio::test(start_paused = true)]
        async fn concurrent_misses_each_fan_out() {
            let provider = Arc::new(
                MockProvider::new("p")
                    .with_offer(price("99"), 60)
                    .with_delay(Duration::from_millis(100)),
            );
            let engine = engine(&[Arc::clone(&provider)], AggregationConfig::default());
            let query = query();

            let outcomes = join_all((0..4).map(|_| engine.search(&query))).await;

            assert!(outcomes.iter().all(Result::is_ok));
            assert_eq!(provider.calls(), 4);
            assert_eq!(engine.cache().len(), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn search_after_concurrent_misses_is_a_hit() {
            let provider = Arc::new(
                MockProvider::new("p")
                    .with_offer(price("99"), 60)
                    .with_delay(Duration::from_millis(100)),
            );
            let engine = engine(&[Arc::clone(&provider)], AggregationConfig::default());
            let query = query();

            join_all((0..3).map(|_| engine.search(&query))).await;
            engine.search(&query).await.unwrap();

            assert_eq!(provider.calls(), 3);
        }
    }

    mod failures {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn any_failure_fails_the_search_and_skips_cache() {
            let providers = [
                Arc::new(MockProvider::new("ok").with_offer(price("100"), 60)),
                Arc::new(MockProvider::new("broken").with_failure(ProviderError::upstream(500, "boom"))),
            ];
            let engine = engine(&providers, AggregationConfig::default());

            let err = engine.search(&query()).await.unwrap_err();

            assert_eq!(err.provider(), Some("broken"));
            assert!(err.to_string().contains("boom"));
            assert!(engine.cache().is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn failure_does_not_wait_for_slow_providers() {
            let providers = [
                Arc::new(
                    MockProvider::new("slow")
                        .with_offer(price("100"), 60)
                        .with_delay(Duration::from_secs(5)),
                ),
                Arc::new(
                    MockProvider::new("broken")
                        .with_failure(ProviderError::connection("refused"))
                        .with_delay(Duration::from_millis(100)),
                ),
            ];
            let engine = engine(&providers, AggregationConfig::default());
            let started = Instant::now();

            let err = engine.search(&query()).await.unwrap_err();

            assert_eq!(err.provider(), Some("broken"));
            assert_eq!(started.elapsed(), Duration::from_millis(100));
        }

        #[tokio::test(start_paused = true)]
        async fn deadline_applies_even_to_providers_that_ignore_it() {
            let providers: Vec<SharedProvider> = vec![
                Arc::new(MockProvider::new("quick").with_offer(price("100"), 60)),
                Arc::new(StubbornProvider),
            ];
            let engine = OfferAggregationEngine::new(
                providers,
                AggregationConfig::with_timeout(Duration::from_secs(2)),
            );
            let started = Instant::now();

            let err = engine.search(&query()).await.unwrap_err();

            assert_eq!(err, AggregationError::DeadlineExceeded { timeout_ms: 2000 });
            assert_eq!(started.elapsed(), Duration::from_secs(2));
            assert!(engine.cache().is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn provider_cancelled_at_deadline_reports_deadline() {
            let providers = [Arc::new(
                MockProvider::new("slow")
                    .with_offer(price("100"), 60)
                    .with_delay(Duration::from_secs(30)),
            )];
            let engine = engine(&providers, AggregationConfig::with_timeout(Duration::from_secs(1)));

            let err = engine.search(&query()).await.unwrap_err();

            assert_eq!(err, AggregationError::DeadlineExceeded { timeout_ms: 1000 });
        }

        /// Bounds its own wait by the remaining budget, the way the HTTP
        /// adapters do, and reports its own timeout.
        #[derive(Debug)]
        struct SelfTimingProvider;

        #[async_trait]
        impl FlightProvider for SelfTimingProvider {
            fn name(&self) -> &str {
                "self-timing"
            }

            async fn search(&self, ctx: &SearchContext) -> ProviderResult<Vec<FlightOffer>> {
                let budget = ctx.remaining()?;
                match tokio::time::timeout(budget, std::future::pending::<()>()).await {
                    Ok(()) => Ok(Vec::new()),
                    Err(_) => Err(ProviderError::timeout(format!(
                        "request timed out after {}ms",
                        budget.as_millis()
                    ))),
                }
            }
        }

        #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
        async fn provider_timing_out_with_the_deadline_reports_deadline() {
            for _ in 0..20 {
                let providers: Vec<SharedProvider> = vec![
                    Arc::new(SelfTimingProvider),
                    Arc::new(SelfTimingProvider),
                    Arc::new(SelfTimingProvider),
                ];
                let engine = OfferAggregationEngine::new(
                    providers,
                    AggregationConfig::with_timeout(Duration::from_millis(50)),
                );

                let err = engine.search(&query()).await.unwrap_err();

                assert_eq!(err, AggregationError::DeadlineExceeded { timeout_ms: 50 });
            }
        }

        #[tokio::test(start_paused = true)]
        async fn caller_deadline_wins_when_earlier() {
            let providers: Vec<SharedProvider> = vec![Arc::new(StubbornProvider)];
            let engine = OfferAggregationEngine::new(providers, AggregationConfig::default());
            let started = Instant::now();

            let err = engine
                .search_within(&query(), Some(started + Duration::from_millis(250)))
                .await
                .unwrap_err();

            assert_eq!(err, AggregationError::DeadlineExceeded { timeout_ms: 250 });
            assert_eq!(started.elapsed(), Duration::from_millis(250));
        }

        #[tokio::test(start_paused = true)]
        async fn panicking_provider_is_reported_by_name() {
            #[derive(Debug)]
            struct Panicky;

            #[async_trait]
            impl FlightProvider for Panicky {
                fn name(&self) -> &str {
                    "panicky"
                }

                #[allow(clippy::panic)]
                async fn search(&self, _ctx: &SearchContext) -> ProviderResult<Vec<FlightOffer>> {
                    panic!("upstream library bug");
                }
            }

            let providers: Vec<SharedProvider> = vec![Arc::new(Panicky)];
            let engine = OfferAggregationEngine::new(providers, AggregationConfig::default());

            let err = engine.search(&query()).await.unwrap_err();
            assert_eq!(err.provider(), Some("panicky"));
        }
    }
}
