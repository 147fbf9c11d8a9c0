//! # Application Services
//!
//! Services that orchestrate domain logic and infrastructure.
//!
//! This module provides application-level services including:
//! - [`OfferAggregationEngine`]: Concurrent provider fan-out, ranking and caching
//! - [`AggregationResult`]: Cheapest, fastest and sorted offers
//! - [`TtlCache`]: Time-bounded result store
//! - [`StreamingDeliverer`]: Periodic push sessions for streaming clients

pub mod cache;
pub mod offer_aggregation;
pub mod ranking;
pub mod streaming;

pub use cache::{CacheEntry, OfferCache, TtlCache};
pub use offer_aggregation::{
    AggregationConfig, AggregationError, AggregationOutcome, OfferAggregationEngine,
};
pub use ranking::{AggregationResult, compare_offers};
pub use streaming::{StreamFrame, StreamingDeliverer};
