//! Cache Entry Module
//!
//! Defines the contents of an occupied slot: key, value and the size/TTL
//! metadata the budget and staleness checks read.

use std::fmt;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    /// The key this entry is indexed under
    pub key: K,
    /// The stored value
    pub value: V,
    /// Admitted size (0 if sizes are not tracked)
    pub size: usize,
    /// Time to live in milliseconds (0 = never expires)
    pub ttl: u64,
    /// Time the entry was admitted or last had its age reset, in milliseconds
    pub start: i64,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    pub fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            size: 0,
            ttl: 0,
            start: 0,
        }
    }

    // == Expires At ==
    /// Last instant at which the entry is still fresh, or None if it never expires.
    pub fn expires_at(&self) -> Option<i64> {
        (self.ttl > 0).then(|| self.start.saturating_add(self.ttl as i64))
    }

    // == Is Stale ==
    /// Checks if the entry has outlived its TTL.
    ///
    /// Boundary condition: at exactly `start + ttl` the entry is still fresh;
    /// it turns stale one millisecond later.
    pub fn is_stale(&self, now: i64) -> bool {
        match self.expires_at() {
            Some(expires) => expires < now,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining TTL. Goes negative once the entry is stale.
    pub fn remaining_ttl(&self, now: i64) -> RemainingTtl {
        match self.expires_at() {
            Some(expires) => RemainingTtl::Millis(expires.saturating_sub(now)),
            None => RemainingTtl::Unbounded,
        }
    }

    /// Milliseconds since `start`.
    pub fn age(&self, now: i64) -> u64 {
        now.saturating_sub(self.start).max(0) as u64
    }
}

// == Remaining TTL ==
/// Result of a remaining-TTL query.
///
/// `Millis(0)` is also what an absent key reports. Orders so that every
/// finite value sorts below `Unbounded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RemainingTtl {
    /// Milliseconds left to live; negative once stale
    Millis(i64),
    /// The entry has no TTL
    Unbounded,
}

impl RemainingTtl {
    /// Returns the finite number of milliseconds, if any.
    pub fn as_millis(self) -> Option<i64> {
        match self {
            RemainingTtl::Millis(ms) => Some(ms),
            RemainingTtl::Unbounded => None,
        }
    }

    /// Returns the value as a float, with `Unbounded` mapped to infinity.
    pub fn as_f64(self) -> f64 {
        match self {
            RemainingTtl::Millis(ms) => ms as f64,
            RemainingTtl::Unbounded => f64::INFINITY,
        }
    }
}

impl fmt::Display for RemainingTtl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemainingTtl::Millis(ms) => write!(f, "{}ms", ms),
            RemainingTtl::Unbounded => write!(f, "Infinity"),
        }
    }
}
