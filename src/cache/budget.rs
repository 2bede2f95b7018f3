//! Size Budget Module
//!
//! Running total of admitted entry sizes plus the checks that decide whether
//! an entry may be admitted and how much must be evicted to make room.

use std::sync::Arc;

use crate::error::{CacheError, Result};

/// Computes an entry's size from its value and key. Must return a positive integer.
pub type SizeCalculation<K, V> = Arc<dyn Fn(&V, &K) -> usize + Send + Sync>;

// == Size Budget ==
#[derive(Debug, Clone, Default)]
pub struct SizeBudget {
    max_size: usize,
    max_entry_size: usize,
    total: usize,
}

impl SizeBudget {
    pub fn new(max_size: usize, max_entry_size: usize) -> Self {
        Self {
            max_size,
            max_entry_size,
            total: 0,
        }
    }

    /// True if entries carry a size at all.
    pub fn tracks(&self) -> bool {
        self.max_size > 0 || self.max_entry_size > 0
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Sum of sizes over occupied slots.
    pub fn total(&self) -> usize {
        self.total
    }

    // == Resolve Size ==
    /// Works out the size of an incoming entry.
    ///
    /// An explicit size wins over the calculation. With size tracking off,
    /// supplying either is an error and the size is 0.
    pub fn resolve<K, V>(
        &self,
        key: &K,
        value: &V,
        size: Option<usize>,
        calculation: Option<&SizeCalculation<K, V>>,
    ) -> Result<usize> {
        if !self.tracks() {
            if size.is_some() || calculation.is_some() {
                return Err(CacheError::InvalidSize(
                    "cannot set a size without max_size or max_entry_size on the cache".to_string(),
                ));
            }
            return Ok(0);
        }

        let size = match (size, calculation) {
            (Some(size), _) => size,
            (None, Some(calculate)) => calculate(value, key),
            (None, None) => {
                return Err(CacheError::InvalidSize(
                    "size_calculation or size must be set when tracking sizes".to_string(),
                ))
            }
        };
        if size == 0 {
            return Err(CacheError::InvalidSize(
                "size must be a positive integer".to_string(),
            ));
        }
        Ok(size)
    }

    // == Admission ==
    /// True if an entry of `size` can ever fit. Oversized entries are dropped, not stored.
    pub fn admits(&self, size: usize) -> bool {
        let entry_cap = if self.max_entry_size > 0 {
            self.max_entry_size
        } else {
            self.max_size
        };
        (entry_cap == 0 || size <= entry_cap) && (self.max_size == 0 || size <= self.max_size)
    }

    /// True if adding `incoming` would overrun the budget.
    pub fn needs_room_for(&self, incoming: usize) -> bool {
        self.max_size > 0 && self.total + incoming > self.max_size
    }

    pub fn add(&mut self, size: usize) {
        self.total += size;
    }

    pub fn remove(&mut self, size: usize) {
        self.total -= size;
    }

    pub fn clear(&mut self) {
        self.total = 0;
    }
}
