//! Shared Cache Handle
//!
//! Thread-safe, cloneable front for a `CacheStore`. Every operation takes one
//! coarse lock around the store; the lock is never held across an `.await`.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::cache::{CacheStats, CacheStore, Clock, TokioClock};

// == Expiring Cache ==
/// A cloneable handle to a shared expiring key-value cache.
///
/// Clones refer to the same store, so one handle can be given to a `Sweeper`
/// while others serve foreground reads and writes.
#[derive(Debug)]
pub struct ExpiringCache<V, C = TokioClock> {
    inner: Arc<Mutex<CacheStore<V, C>>>,
}

impl<V, C> Clone for ExpiringCache<V, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Clone> ExpiringCache<V, TokioClock> {
    /// Creates an empty cache using the tokio clock.
    pub fn new(default_ttl: Duration) -> Self {
        Self::from_store(CacheStore::new(default_ttl))
    }
}

impl<V: Clone, C: Clock> ExpiringCache<V, C> {
    /// Creates an empty cache with an explicit time source.
    pub fn with_clock(default_ttl: Duration, clock: C) -> Self {
        Self::from_store(CacheStore::with_clock(default_ttl, clock))
    }

    /// Wraps an existing store.
    pub fn from_store(store: CacheStore<V, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Returns the live value for `key`, removing it if it has expired.
    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.lock().get(key)
    }

    /// Stores `value` with the default TTL.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.inner.lock().set(key, value);
    }

    /// Stores `value` with an explicit TTL. A zero TTL stores nothing.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.inner.lock().set_with_ttl(key, value, ttl);
    }

    /// Removes `key` if present. Returns whether an entry was removed.
    pub fn delete(&self, key: &str) -> bool {
        self.inner.lock().delete(key)
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Removes all expired entries and returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.inner.lock().sweep()
    }

    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        self.inner.lock().ttl_remaining(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.lock().contains_key(key)
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    pub fn default_ttl(&self) -> Duration {
        self.inner.lock().default_ttl()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
