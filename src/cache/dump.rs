//! Dump Module
//!
//! Snapshot shape produced by `dump` and consumed by `load`.

use serde::{Deserialize, Serialize};

/// Ordered `(key, entry)` pairs, most recently used first.
pub type Dump<K, V> = Vec<(K, DumpEntry<V>)>;

// == Dump Entry ==
/// One entry of a dump. TTL fields are present only for entries with a TTL,
/// `size` only when the cache tracks sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpEntry<V> {
    pub value: V,
    /// Full TTL in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    /// Milliseconds between the entry's start and the moment of the dump
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

impl<V> DumpEntry<V> {
    /// Remaining TTL at dump time, negative if the entry was already stale.
    pub fn remaining_ttl(&self) -> Option<i64> {
        let ttl = i64::try_from(self.ttl?).unwrap_or(i64::MAX);
        let age = i64::try_from(self.age.unwrap_or(0)).unwrap_or(i64::MAX);
        Some(ttl.saturating_sub(age))
    }
}
