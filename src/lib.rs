//! # Flight Aggregator
//!
//! Concurrent flight offer aggregation across heterogeneous upstream
//! providers, with a time-bounded result cache and periodic push delivery
//! over Server-Sent Events and WebSocket.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │ api            axum router, JWT, SSE / WebSocket       │
//! ├────────────────────────────────────────────────────────┤
//! │ application    OfferAggregationEngine, TtlCache,       │
//! │                ranking, StreamingDeliverer             │
//! ├────────────────────────────────────────────────────────┤
//! │ domain         FlightOffer, SearchQuery, Price, ...    │
//! ├────────────────────────────────────────────────────────┤
//! │ infrastructure providers (Amadeus, Duffel, RapidAPI),  │
//! │                config, logging                         │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use flight_aggregator::application::services::{AggregationConfig, OfferAggregationEngine};
//! use flight_aggregator::domain::value_objects::{Price, SearchQuery};
//! use flight_aggregator::infrastructure::providers::{MockProvider, SharedProvider};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let providers: Vec<SharedProvider> = vec![
//!     Arc::new(MockProvider::new("p1").with_offer(Price::parse("200")?, 120)),
//!     Arc::new(MockProvider::new("p2").with_offer(Price::parse("150")?, 90)),
//! ];
//! let engine = OfferAggregationEngine::new(providers, AggregationConfig::default());
//!
//! let result = engine.search(&SearchQuery::parse("AMS", "BCN", "2025-10-01")?).await?;
//! assert_eq!(result.cheapest.provider().as_str(), "p2");
//! assert_eq!(result.all.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
