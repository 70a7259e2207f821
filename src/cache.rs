//! Result cache abstraction and the default TTL store.
//!
//! The pipeline only ever talks to a cache through [`ResultCache`], so any
//! store with `get`/`put`/`invalidate` (TTL, LRU, remote) can be substituted.
//!
//! [`TtlCache`] expires entries lazily: an entry older than the TTL is
//! removed by the `get` that observes it. There is no background sweep.

use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Key-value store consumed by the pipeline.
///
/// Implementations must be safe to share between concurrently running
/// pipeline invocations.
pub trait ResultCache<V>: Send + Sync {
    /// Returns the live value for `key`, if any.
    fn get(&self, key: &str) -> Option<V>;
    /// Stores `value`, replacing any previous entry and resetting its age.
    fn put(&self, key: &str, value: V);
    /// Removes `key` if present.
    fn invalidate(&self, key: &str);
}

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// In-memory TTL cache over a sharded concurrent map.
pub struct TtlCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    ttl: Duration,
}

impl<V> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, including expired ones not yet observed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}

impl<V: Clone + Send + Sync> ResultCache<V> for TtlCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        self.entries
            .remove_if(key, |_, entry| entry.inserted_at.elapsed() > self.ttl);
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    fn put(&self, key: &str, value: V) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }
}
