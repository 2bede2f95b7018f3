//! Error types for the cache
//!
//! Provides unified error handling using thiserror. Misses and stale reads
//! are not errors; only bad configuration and bad per-call sizes/ttls are.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// `max` is unusable and no `max_size` or default `ttl` bounds the cache
    #[error("Invalid capacity: {0}")]
    InvalidCapacity(String),

    /// Entry size is zero, missing while sizes are tracked, or given while they are not
    #[error("Invalid size: {0}")]
    InvalidSize(String),

    /// TTL is out of range or not an integer
    #[error("Invalid TTL: {0}")]
    InvalidTtl(String),

    /// `max_size` is out of range or not an integer
    #[error("Invalid max_size: {0}")]
    InvalidMaxSize(String),

    /// `max_entry_size` is out of range or not an integer
    #[error("Invalid max_entry_size: {0}")]
    InvalidMaxEntrySize(String),

    /// A size calculation was configured on a cache that does not track sizes
    #[error("Invalid size_calculation: {0}")]
    InvalidSizeCalculation(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
