//! Cache Store Module
//!
//! Single-owner cache engine: HashMap storage with lazy expiry on read and a
//! full-scan sweep for entries that are never read again.

use std::collections::HashMap;
use std::time::Duration;

use crate::cache::{CacheEntry, CacheStats, Clock, TokioClock};

// == Cache Store ==
/// Key-value storage where every entry carries an absolute expiry instant.
///
/// All operations are total. A missing or expired key is reported as `None`,
/// never as an error.
#[derive(Debug)]
pub struct CacheStore<V, C = TokioClock> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Performance statistics
    stats: CacheStats,
    /// TTL applied by `set`
    default_ttl: Duration,
    /// Time source
    clock: C,
}

impl<V: Clone> CacheStore<V, TokioClock> {
    // == Constructor ==
    /// Creates a new CacheStore reading time from the tokio clock.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL applied to entries stored without an explicit one
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_clock(default_ttl, TokioClock)
    }
}

impl<V: Clone, C: Clock> CacheStore<V, C> {
    /// Creates a new CacheStore with an explicit time source.
    pub fn with_clock(default_ttl: Duration, clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl,
            clock,
        }
    }

    // == Get ==
    /// Retrieves a live value by key.
    ///
    /// An expired entry found here is removed before `None` is returned.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now();

        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                let value = entry.value.clone();
                self.stats.record_hit();
                return Some(value);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_expirations(1);
        }
        self.stats.record_miss();
        None
    }

    // == Set ==
    /// Stores a value under `key` with the default TTL.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let ttl = self.default_ttl;
        self.set_with_ttl(key, value, ttl);
    }

    /// Stores a value under `key`, replacing any previous entry and its expiry.
    ///
    /// A zero TTL stores nothing: the entry would already be expired, so the
    /// previous entry for `key` is removed instead.
    pub fn set_with_ttl(&mut self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();

        if ttl.is_zero() {
            self.entries.remove(&key);
            return;
        }

        let entry = CacheEntry::new(value, ttl, self.clock.now());
        self.entries.insert(key, entry);
    }

    // == Delete ==
    /// Removes the entry for `key`. Returns whether one was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Sweep ==
    /// Removes every entry whose expiry is at or before now.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&mut self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();

        self.entries.retain(|_, entry| !entry.is_expired(now));

        let removed = before - self.entries.len();
        self.stats.record_expirations(removed);
        removed
    }

    // == Inspection ==
    /// Remaining lifetime of a live entry, without touching stats.
    pub fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.ttl_remaining(now))
    }

    /// Whether an entry for `key` is physically stored, live or not.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Number of physically stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
