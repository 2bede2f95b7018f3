//! Mini LRU - A bounded in-process LRU cache
//!
//! Provides least-recently-used eviction with optional per-entry TTL, a size
//! budget, disposal hooks, dump/load snapshots and a tokio autopurge task.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheStats, DisposeReason, LruCache, RemainingTtl};
pub use clock::{Clock, ManualClock, MonotonicClock, WallClock};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use tasks::spawn_autopurge_task;
