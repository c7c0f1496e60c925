//! Background Tasks Module
//!
//! Contains background tasks owned by the process that runs the cache.
//!
//! # Tasks
//! - Expiry Sweep: removes expired cache entries at a configured interval

mod sweeper;

pub use sweeper::Sweeper;
