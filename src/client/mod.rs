//! HTTP Client Module
//!
//! Memoized JSON fetching on top of the expiring cache: callers build a key
//! from URL plus options, read the cache first, and only cache successes.

mod fetcher;
mod key;

pub use fetcher::{CachedFetcher, CachedResponse, Fetched, Origin};
pub use key::{cache_key, RequestOptions};
