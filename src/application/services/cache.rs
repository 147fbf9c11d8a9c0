//! # Result Cache
//!
//! Time-bounded store for aggregation results, keyed by query.
//!
//! Reads treat an entry whose expiry has passed as absent but leave it in
//! place; it is overwritten by the next `put` for the same key. Storage is
//! therefore bounded by the number of distinct queries seen.
//!
//! Time comes from [`tokio::time::Instant`], so tests can drive expiry with
//! a paused clock.

use crate::application::services::ranking::AggregationResult;
use crate::domain::value_objects::SearchQuery;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// A stored value and the moment it stops being served.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Returns the stored value.
    #[inline]
    #[must_use]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Returns when the entry expires.
    #[inline]
    #[must_use]
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// True once `now` has reached the expiry.
    #[must_use]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Concurrent TTL map. Many readers, one writer at a time.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the live entry for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<CacheEntry<V>> {
        let now = Instant::now();
        self.entries
            .read()
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .cloned()
    }

    /// Returns the live value for `key`, if any.
    #[must_use]
    pub fn get_value(&self, key: &K) -> Option<V> {
        self.get(key).map(|entry| entry.value)
    }

    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    pub fn put(&self, key: K, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().insert(key, entry);
    }

    /// Number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True if nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Cache used by the aggregation engine.
pub type OfferCache = TtlCache<SearchQuery, Arc<AggregationResult>>;
