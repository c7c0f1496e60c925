//! Cache Module
//!
//! In-memory key-value caching with per-entry TTL, lazy expiry on read, and a
//! sweep for entries that are never read again.

use std::time::Duration;

mod clock;
mod entry;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, TokioClock};
pub use entry::CacheEntry;
pub use shared::ExpiringCache;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Default TTL applied when a caller does not choose one (1 minute)
pub const DEFAULT_TTL_MS: u64 = 60_000;

/// Default interval between background sweeps (5 minutes)
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

/// Longest TTL an entry can carry (about 100 years); longer TTLs are capped
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);
