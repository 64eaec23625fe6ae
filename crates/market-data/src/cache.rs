//! Time-based response cache shared by the fetcher and the signal service.
//!
//! One keyspace holds two logical caches: upstream responses keyed by the
//! exact request URL, and analysis reports keyed by a `signal:` prefix. Each
//! entry carries its own nominal lifetime, so both can live side by side.
//!
//! Only successful results are stored. Entries that go stale stay in the map
//! until [`ResponseCache::sweep`] removes them once they are older than twice
//! their lifetime.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;

/// Default lifetime of cached price responses.
pub const DEFAULT_PRICE_TTL: Duration = Duration::from_secs(30);

/// Default lifetime of cached analysis reports.
pub const DEFAULT_SIGNAL_TTL: Duration = Duration::from_secs(60);

/// A cached JSON value.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    /// The cached payload, opaque to the cache.
    pub data: Value,
    /// When the payload was stored.
    pub timestamp: Instant,
    /// Nominal lifetime of this entry.
    pub ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self, now: Instant) -> bool {
        now.duration_since(self.timestamp) < self.ttl
    }

    fn is_expired_for_sweep(&self, now: Instant) -> bool {
        now.duration_since(self.timestamp) > self.ttl * 2
    }
}

/// Snapshot of the cache contents.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CacheStats {
    pub cache_size: usize,
    pub cached_keys: Vec<String>,
}

/// Thread-safe response cache.
#[derive(Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the entries, recovering from poison.
    ///
    /// A poisoned lock only means another request panicked mid-write; every
    /// write replaces a whole entry, so the map is still consistent.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Response cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Return the cached value for `key` if it is still within its lifetime.
    pub fn get_fresh(&self, key: &str) -> Option<Value> {
        let entries = self.lock_entries();
        let entry = entries.get(key)?;
        if entry.is_fresh(Instant::now()) {
            debug!("Cache hit for '{}'", key);
            Some(entry.data.clone())
        } else {
            None
        }
    }

    /// Store `data` under `key`, replacing any previous entry.
    pub fn insert(&self, key: impl Into<String>, data: Value, ttl: Duration) {
        let entry = CacheEntry {
            data,
            timestamp: Instant::now(),
            ttl,
        };
        self.lock_entries().insert(key.into(), entry);
    }

    /// Remove entries older than twice their lifetime.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock_entries();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_for_sweep(now));
        let removed = before - entries.len();
        if removed > 0 {
            debug!("Cache sweep removed {} stale entries", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    /// Current size and keys, sorted for stable output.
    pub fn stats(&self) -> CacheStats {
        let entries = self.lock_entries();
        let mut cached_keys: Vec<String> = entries.keys().cloned().collect();
        cached_keys.sort();
        CacheStats {
            cache_size: entries.len(),
            cached_keys,
        }
    }
}
