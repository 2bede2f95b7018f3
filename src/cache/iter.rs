//! Iterator Module
//!
//! Lazy, read-only walks over the recency list. Every walk samples the clock
//! once when created and skips stale entries unless asked not to; nothing is
//! removed while walking.

use crate::cache::lru::RecencyList;
use crate::cache::slots::SlotStore;

// == Indexes ==
/// Slot indices in recency order (head-to-tail, or tail-to-head when reversed).
pub struct Indexes<'a, K, V> {
    recency: &'a RecencyList,
    slots: &'a SlotStore<K, V>,
    cursor: Option<usize>,
    reverse: bool,
    allow_stale: bool,
    now: i64,
}

impl<'a, K, V> Indexes<'a, K, V> {
    pub(crate) fn new(
        recency: &'a RecencyList,
        slots: &'a SlotStore<K, V>,
        reverse: bool,
        allow_stale: bool,
        now: i64,
    ) -> Self {
        let cursor = if reverse {
            recency.tail()
        } else {
            recency.head()
        };
        Self {
            recency,
            slots,
            cursor,
            reverse,
            allow_stale,
            now,
        }
    }
}

impl<K, V> Clone for Indexes<'_, K, V> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<K, V> Iterator for Indexes<'_, K, V> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            let index = self.cursor?;
            self.cursor = if self.reverse {
                self.recency.prev(index)
            } else {
                self.recency.next(index)
            };
            let fresh = self
                .slots
                .get(index)
                .is_some_and(|entry| !entry.is_stale(self.now));
            if self.allow_stale || fresh {
                return Some(index);
            }
        }
    }
}

// == Entries ==
/// `(key, value)` pairs in recency order.
pub struct Entries<'a, K, V> {
    indexes: Indexes<'a, K, V>,
}

impl<'a, K, V> Entries<'a, K, V> {
    pub(crate) fn new(indexes: Indexes<'a, K, V>) -> Self {
        Self { indexes }
    }
}

impl<K, V> Clone for Entries<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            indexes: self.indexes.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Entries<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let slots = self.indexes.slots;
        self.indexes
            .by_ref()
            .find_map(|index| slots.get(index).map(|entry| (&entry.key, &entry.value)))
    }
}

// == Keys ==
pub struct Keys<'a, K, V> {
    entries: Entries<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(entries: Entries<'a, K, V>) -> Self {
        Self { entries }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.entries.next().map(|(key, _)| key)
    }
}

// == Values ==
pub struct Values<'a, K, V> {
    entries: Entries<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(entries: Entries<'a, K, V>) -> Self {
        Self { entries }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.entries.next().map(|(_, value)| value)
    }
}
