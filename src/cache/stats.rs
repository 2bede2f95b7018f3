//! Cache Statistics Module
//!
//! Counters for lookups, removals by reason and rejected admissions.

use serde::Serialize;

use crate::cache::DisposeReason;

// == Cache Stats ==
/// Point-in-time cache metrics, serializable for export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a value (stale values served with `allow_stale` included)
    pub hits: u64,
    /// Lookups that returned nothing
    pub misses: u64,
    /// Entries pushed out by count or size pressure, or popped
    pub evictions: u64,
    /// Stale entries removed, lazily or by a purge sweep
    pub expirations: u64,
    /// `set` calls dropped because the entry could never fit
    pub rejections: u64,
    /// Occupied slots when the snapshot was taken
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total lookups recorded.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    // == Hit Rate ==
    /// hits / lookups, or 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            lookups => self.hits as f64 / lookups as f64,
        }
    }

    // == Recording ==
    pub(crate) fn record_lookup(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }

    /// Counts a removal. Only pressure and expiry are tracked; explicit
    /// deletes, clears and overwrites are the caller's own doing.
    pub(crate) fn record_removal(&mut self, reason: DisposeReason) {
        match reason {
            DisposeReason::Evict => self.evictions += 1,
            DisposeReason::Expire => self.expirations += 1,
            DisposeReason::Delete | DisposeReason::Clear | DisposeReason::Set => {}
        }
    }

    pub(crate) fn record_rejection(&mut self) {
        self.rejections += 1;
    }

    /// Copy of the counters stamped with the current entry count.
    pub(crate) fn snapshot(&self, total_entries: usize) -> Self {
        Self {
            total_entries,
            ..self.clone()
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_before_any_lookup() {
        let stats = CacheStats::new();
        assert_eq!(stats.lookups(), 0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        for hit in [true, true, true, false] {
            stats.record_lookup(hit);
        }
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_removals_counted_by_reason() {
        let mut stats = CacheStats::new();
        for reason in [
            DisposeReason::Evict,
            DisposeReason::Evict,
            DisposeReason::Expire,
            DisposeReason::Delete,
            DisposeReason::Clear,
            DisposeReason::Set,
        ] {
            stats.record_removal(reason);
        }
        assert_eq!(stats.evictions, 2);
        assert_eq!(stats.expirations, 1);
    }

    #[test]
    fn test_snapshot_stamps_entry_count() {
        let mut stats = CacheStats::new();
        stats.record_rejection();

        let snapshot = stats.snapshot(42);
        assert_eq!(snapshot.total_entries, 42);
        assert_eq!(snapshot.rejections, 1);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_stats_serialize() {
        let mut stats = CacheStats::new();
        stats.record_lookup(true);
        let json = serde_json::to_value(stats.snapshot(3)).unwrap();
        assert_eq!(json["hits"], 1);
        assert_eq!(json["total_entries"], 3);
    }
}
