//! Slot Store Module
//!
//! Index-addressed arena of cache entries with a LIFO free list. Indices are
//! stable for as long as an entry is occupied; the most recently released
//! index is always the next one handed out.

use crate::cache::CacheEntry;

// == Slot Store ==
#[derive(Debug)]
pub struct SlotStore<K, V> {
    slots: Vec<Option<CacheEntry<K, V>>>,
    free: Vec<usize>,
    len: usize,
    /// Hard limit on allocated slots (0 = unbounded)
    limit: usize,
}

impl<K, V> SlotStore<K, V> {
    pub fn new(limit: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            limit,
        }
    }

    // == Allocate ==
    /// Stores `entry` in a free slot and returns its index.
    ///
    /// Reuses the most recently released index first, otherwise grows the
    /// store. Hands the entry back when every slot up to the limit is
    /// occupied; the caller must evict before retrying.
    pub fn allocate(&mut self, entry: CacheEntry<K, V>) -> Result<usize, CacheEntry<K, V>> {
        let index = match self.free.pop() {
            Some(index) => index,
            None if self.limit == 0 || self.slots.len() < self.limit => {
                self.slots.push(None);
                self.slots.len() - 1
            }
            None => return Err(entry),
        };
        self.slots[index] = Some(entry);
        self.len += 1;
        Ok(index)
    }

    // == Release ==
    /// Empties slot `index` and pushes it onto the free list.
    pub fn release(&mut self, index: usize) -> Option<CacheEntry<K, V>> {
        let entry = self.slots.get_mut(index)?.take()?;
        self.free.push(index);
        self.len -= 1;
        Some(entry)
    }

    pub fn get(&self, index: usize) -> Option<&CacheEntry<K, V>> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut CacheEntry<K, V>> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True when no slot can be handed out without evicting first.
    pub fn is_full(&self) -> bool {
        self.limit != 0 && self.len >= self.limit
    }

    /// Number of slots ever allocated (occupied + free).
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }

    /// Drops every slot and forgets all indices.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }
}
