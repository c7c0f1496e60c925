//! Expiring Cache - an in-memory key-value cache with per-entry TTL
//!
//! Entries expire lazily on read and are swept periodically by a background
//! task. A memoizing JSON fetcher uses the cache to avoid redundant requests.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheStats, CacheStore, Clock, ExpiringCache, ManualClock, TokioClock};
pub use client::{cache_key, CachedFetcher, CachedResponse, Fetched, Origin, RequestOptions};
pub use config::Config;
pub use error::FetchError;
pub use tasks::Sweeper;
