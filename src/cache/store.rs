//! Cache Store Module
//!
//! Main cache engine combining the slot store, recency list, TTL tracker and
//! size budget behind one validated facade.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::mem;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::cache::iter::{Entries, Indexes, Keys, Values};
use crate::cache::lru::RecencyList;
use crate::cache::options::{Policy, ReadPolicy};
use crate::cache::slots::SlotStore;
use crate::cache::ttl::TtlTracker;
use crate::cache::{
    CacheEntry, CacheStats, DisposeReason, Disposer, Dump, DumpEntry, GetOptions, HasOptions,
    IterOptions, PeekOptions, RemainingTtl, SetOptions, SizeBudget, SizeCalculation,
};
use crate::clock::{Clock, MonotonicClock};
use crate::config::{CacheConfig, MAX_SAFE_INTEGER};
use crate::error::{CacheError, Result};

// == LRU Cache ==
/// Bounded LRU cache with optional TTL expiry and size budget.
///
/// Entries live in an index-addressed slot store; recency is a doubly-linked
/// list threaded through slot indices; a key map points into the slots.
/// Every operation is O(1) apart from `purge_stale`, `clear`, `dump`/`load`
/// and the iterators, which are linear in the number of entries.
pub struct LruCache<K, V> {
    key_index: HashMap<K, usize>,
    slots: SlotStore<K, V>,
    recency: RecencyList,
    ttl: TtlTracker,
    budget: SizeBudget,
    disposer: Disposer<K, V>,
    stats: CacheStats,
    policy: Policy,
    max: usize,
    size_calculation: Option<SizeCalculation<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates a cache reading time from a monotonic clock.
    pub fn new(config: CacheConfig<K, V>) -> Result<Self> {
        Self::with_clock(config, MonotonicClock::new())
    }

    /// Creates a cache reading time from `clock`.
    pub fn with_clock<C>(config: CacheConfig<K, V>, clock: C) -> Result<Self>
    where
        C: Clock + 'static,
    {
        config.validate()?;
        let policy = Policy::from(&config);
        Ok(Self {
            key_index: HashMap::new(),
            slots: SlotStore::new(config.max),
            recency: RecencyList::new(),
            ttl: TtlTracker::new(Arc::new(clock), config.ttl_resolution, config.ttl_autopurge),
            budget: SizeBudget::new(config.max_size, config.max_entry_size),
            disposer: Disposer::new(config.dispose, config.dispose_after),
            stats: CacheStats::new(),
            policy,
            max: config.max,
            size_calculation: config.size_calculation,
        })
    }

    // == Set ==
    /// Stores a key-value pair with the cache's default options.
    pub fn set(&mut self, key: K, value: V) -> Result<&mut Self> {
        self.set_with(key, value, SetOptions::default())
    }

    /// Stores a key-value pair, moving it to the head of the recency list.
    ///
    /// An existing key has its value replaced (disposing the old one unless
    /// `no_dispose_on_set`) and its age reset unless `no_update_ttl`. A new
    /// key evicts from the tail as needed to respect `max` and `max_size`.
    /// An entry too large to ever fit is dropped without error.
    pub fn set_with(&mut self, key: K, value: V, opts: SetOptions<K, V>) -> Result<&mut Self> {
        let calculation = opts
            .size_calculation
            .as_ref()
            .or(self.size_calculation.as_ref());
        let size = self.budget.resolve(&key, &value, opts.size, calculation)?;
        let ttl = opts.ttl.unwrap_or(self.policy.ttl);
        if ttl > MAX_SAFE_INTEGER {
            return Err(CacheError::InvalidTtl(format!(
                "ttl must not exceed {}",
                MAX_SAFE_INTEGER
            )));
        }

        if !self.budget.admits(size) {
            debug!("Rejected oversized entry: size={}", size);
            self.stats.record_rejection();
            return Ok(self);
        }

        let start = opts.start.unwrap_or_else(|| self.ttl.clock_now());
        let no_update_ttl = opts.no_update_ttl.unwrap_or(self.policy.no_update_ttl);
        let no_dispose_on_set = opts
            .no_dispose_on_set
            .unwrap_or(self.policy.no_dispose_on_set);

        let expires_at = match self.index_of(&key) {
            Some(index) => {
                self.recency.move_to_head(index);
                let Some(entry) = self.slots.get_mut(index) else {
                    return Ok(self);
                };
                let old_value = mem::replace(&mut entry.value, value);
                let old_size = mem::replace(&mut entry.size, size);
                if !no_update_ttl {
                    entry.ttl = ttl;
                    entry.start = start;
                }
                let expires_at = entry.expires_at();

                self.budget.remove(old_size);
                if !no_dispose_on_set {
                    self.disposer.replaced(old_value, key, DisposeReason::Set);
                }
                self.make_room(size, Some(index));
                self.budget.add(size);
                trace!("Updated entry at slot {}", index);
                expires_at
            }
            None => {
                while self.slots.is_full() {
                    if !self.evict_tail() {
                        break;
                    }
                }
                let entry = CacheEntry {
                    key: key.clone(),
                    value,
                    size,
                    ttl,
                    start,
                };
                let Ok(index) = self.slots.allocate(entry) else {
                    return Ok(self);
                };
                self.make_room(size, Some(index));
                self.recency.move_to_head(index);
                self.key_index.insert(key, index);
                self.budget.add(size);
                trace!("Admitted entry at slot {}", index);
                self.slots.get(index).and_then(CacheEntry::expires_at)
            }
        };

        if let Some(expires_at) = expires_at {
            self.ttl.schedule(expires_at);
        }
        self.settle();
        Ok(self)
    }

    // == Get ==
    /// Retrieves a value by key with the cache's default options.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_with(key, GetOptions::default())
    }

    /// Retrieves a value by key and marks it most recently used.
    ///
    /// A stale entry is returned only with `allow_stale`, and is removed
    /// either way unless `no_delete_on_stale_get` is in effect.
    pub fn get_with<Q>(&mut self, key: &Q, opts: GetOptions) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let read = self.policy.get(opts);
        self.read(key, read, true)
    }

    // == Peek ==
    /// Retrieves a value without touching the recency order.
    pub fn peek<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.peek_with(key, PeekOptions::default())
    }

    pub fn peek_with<Q>(&mut self, key: &Q, opts: PeekOptions) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let read = self.policy.peek(opts);
        self.read(key, read, false)
    }

    fn read<Q>(&mut self, key: &Q, read: ReadPolicy, promote: bool) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(index) = self.index_of(key) else {
            self.stats.record_lookup(false);
            return None;
        };

        if self.is_stale(index) {
            let value = if read.allow_stale {
                self.slots.get(index).map(|entry| entry.value.clone())
            } else {
                None
            };
            if !read.no_delete_on_stale_get {
                self.remove_index(index, DisposeReason::Expire);
                self.settle();
            }
            self.stats.record_lookup(value.is_some());
            return value;
        }

        if promote {
            self.recency.move_to_head(index);
        }
        if read.update_age {
            self.refresh_age(index);
        }
        self.stats.record_lookup(true);
        self.slots.get(index).map(|entry| entry.value.clone())
    }

    // == Has ==
    /// Returns true if the key is present and fresh. Never removes anything.
    pub fn has<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.has_with(key, HasOptions::default())
    }

    pub fn has_with<Q>(&mut self, key: &Q, opts: HasOptions) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(index) = self.index_of(key) else {
            return false;
        };
        if self.is_stale(index) {
            return false;
        }
        if self.policy.has(opts) {
            self.refresh_age(index);
        }
        true
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(index) = self.index_of(key) else {
            return false;
        };
        self.remove_index(index, DisposeReason::Delete);
        self.settle();
        true
    }

    // == Pop ==
    /// Removes and returns the least recently used entry, stale or not.
    pub fn pop(&mut self) -> Option<(K, V)> {
        let index = self.recency.tail()?;
        let popped = self
            .slots
            .get(index)
            .map(|entry| (entry.key.clone(), entry.value.clone()));
        self.remove_index(index, DisposeReason::Evict);
        self.settle();
        popped
    }

    // == Clear ==
    /// Removes every entry, oldest first, disposing each with `Clear`.
    pub fn clear(&mut self) {
        let count = self.slots.len();
        let mut cursor = self.recency.tail();
        while let Some(index) = cursor {
            cursor = self.recency.prev(index);
            if let Some(entry) = self.slots.release(index) {
                self.disposer.removed(entry, DisposeReason::Clear);
            }
        }

        self.key_index.clear();
        self.slots.clear();
        self.recency.clear();
        self.budget.clear();
        self.ttl.cancel();
        self.ttl.invalidate();
        debug!("Cleared {} entries", count);
        self.settle();
    }

    // == Purge Stale ==
    /// Removes every stale entry. Returns whether anything was removed.
    pub fn purge_stale(&mut self) -> bool {
        if self.recency.is_empty() {
            return false;
        }
        let stale: Vec<usize> = self
            .rindexes(IterOptions { allow_stale: true })
            .filter(|&index| self.is_stale(index))
            .collect();

        for &index in &stale {
            self.remove_index(index, DisposeReason::Expire);
        }
        if !stale.is_empty() {
            debug!("Purged {} stale entries", stale.len());
        }

        if self.ttl.autopurge() {
            let soonest = self.soonest_expiry();
            self.ttl.reschedule(soonest);
        }
        self.settle();
        !stale.is_empty()
    }

    // == Autopurge Timer ==
    /// Runs the autopurge sweep if its deadline has passed.
    ///
    /// Hosts without a tokio runtime call this from their own loop; returns
    /// whether the sweep removed anything.
    pub fn tick(&mut self) -> bool {
        let now = self.ttl.clock_now();
        if !self.ttl.timer().is_due(now) {
            return false;
        }
        self.ttl.invalidate();
        self.purge_stale()
    }

    /// Time until the autopurge sweep is due, or None when it is not armed.
    pub fn next_purge_in(&self) -> Option<Duration> {
        let deadline = self.ttl.timer().deadline()?;
        let wait = deadline.saturating_sub(self.ttl.clock_now()).max(0);
        Some(Duration::from_millis(wait as u64))
    }

    // == Remaining TTL ==
    /// Milliseconds the key has left to live.
    ///
    /// `Unbounded` for an entry without a TTL, `Millis(0)` for an absent key,
    /// and negative once the entry is stale.
    pub fn get_remaining_ttl<Q>(&self, key: &Q) -> RemainingTtl
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index_of(key)
            .and_then(|index| self.slots.get(index))
            .map_or(RemainingTtl::Millis(0), |entry| {
                entry.remaining_ttl(self.ttl.now())
            })
    }

    // == Dump / Load ==
    /// Snapshots every entry, stale ones included, most recently used first.
    pub fn dump(&self) -> Dump<K, V> {
        let now = self.ttl.clock_now();
        let tracks_size = self.budget.tracks();
        self.indexes(IterOptions { allow_stale: true })
            .filter_map(|index| self.slots.get(index))
            .map(|entry| {
                let timed = entry.ttl > 0;
                (
                    entry.key.clone(),
                    DumpEntry {
                        value: entry.value.clone(),
                        ttl: timed.then_some(entry.ttl),
                        age: timed.then(|| entry.age(now)),
                        size: tracks_size.then_some(entry.size),
                    },
                )
            })
            .collect()
    }

    /// Replaces the contents with a dump, reproducing its recency order and ages.
    ///
    /// Every entry is checked before anything is touched, so an `Err` leaves
    /// the cache as it was.
    pub fn load(&mut self, dump: Dump<K, V>) -> Result<()> {
        for (key, entry) in &dump {
            self.check_dump_entry(key, entry)?;
        }

        self.clear();
        let now = self.ttl.clock_now();
        let count = dump.len();
        for (key, entry) in dump.into_iter().rev() {
            let opts = SetOptions {
                ttl: Some(entry.ttl.unwrap_or(0)),
                start: entry.age.map(|age| start_from_age(now, age)),
                size: entry.size,
                ..SetOptions::default()
            };
            self.set_with(key, entry.value, opts)?;
        }
        debug!("Loaded {} entries", count);
        Ok(())
    }

    /// Runs the checks `set_with` would fail on for one dumped entry.
    fn check_dump_entry(&self, key: &K, entry: &DumpEntry<V>) -> Result<()> {
        self.budget
            .resolve(key, &entry.value, entry.size, self.size_calculation.as_ref())?;
        match entry.ttl {
            Some(ttl) if ttl > MAX_SAFE_INTEGER => Err(CacheError::InvalidTtl(format!(
                "dumped ttl must not exceed {}",
                MAX_SAFE_INTEGER
            ))),
            _ => Ok(()),
        }
    }

    // == Find ==
    /// Returns the first fresh value, in recency order, matching `predicate`.
    ///
    /// The match is read back with `get`, so it is promoted like any other hit.
    pub fn find<F>(&mut self, mut predicate: F, opts: GetOptions) -> Option<V>
    where
        F: FnMut(&V, &K) -> bool,
    {
        let key = self
            .entries()
            .find(|(key, value)| predicate(*value, *key))
            .map(|(key, _)| key.clone())?;
        self.get_with(&key, opts)
    }
}

impl<K, V> LruCache<K, V> {
    // == Iteration ==
    /// Slot indices from most to least recently used.
    pub fn indexes(&self, opts: IterOptions) -> Indexes<'_, K, V> {
        Indexes::new(
            &self.recency,
            &self.slots,
            false,
            opts.allow_stale,
            self.ttl.now(),
        )
    }

    /// Slot indices from least to most recently used.
    pub fn rindexes(&self, opts: IterOptions) -> Indexes<'_, K, V> {
        Indexes::new(
            &self.recency,
            &self.slots,
            true,
            opts.allow_stale,
            self.ttl.now(),
        )
    }

    /// Fresh `(key, value)` pairs, most recently used first.
    pub fn entries(&self) -> Entries<'_, K, V> {
        Entries::new(self.indexes(IterOptions::default()))
    }

    /// Fresh `(key, value)` pairs, least recently used first.
    pub fn rentries(&self) -> Entries<'_, K, V> {
        Entries::new(self.rindexes(IterOptions::default()))
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.entries())
    }

    pub fn rkeys(&self) -> Keys<'_, K, V> {
        Keys::new(self.rentries())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.entries())
    }

    pub fn rvalues(&self) -> Values<'_, K, V> {
        Values::new(self.rentries())
    }

    /// Calls `f(value, key)` for every fresh entry, most recently used first.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&V, &K),
    {
        self.entries().for_each(|(key, value)| f(value, key));
    }

    /// Calls `f(value, key)` for every fresh entry, least recently used first.
    pub fn rfor_each<F>(&self, mut f: F)
    where
        F: FnMut(&V, &K),
    {
        self.rentries().for_each(|(key, value)| f(value, key));
    }

    // == Accessors ==
    /// Number of occupied slots, stale entries included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Sum of entry sizes (0 when sizes are not tracked).
    pub fn calculated_size(&self) -> usize {
        self.budget.total()
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn max_size(&self) -> usize {
        self.budget.max_size()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.slots.len())
    }

    // == Internals ==
    fn index_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        K: Eq + Hash,
    {
        self.key_index.get(key).copied()
    }

    fn is_stale(&self, index: usize) -> bool {
        let now = self.ttl.now();
        self.slots
            .get(index)
            .is_some_and(|entry| entry.is_stale(now))
    }

    fn refresh_age(&mut self, index: usize) {
        let now = self.ttl.clock_now();
        let Some(entry) = self.slots.get_mut(index) else {
            return;
        };
        entry.start = now;
        if let Some(expires_at) = entry.expires_at() {
            self.ttl.schedule(expires_at);
        }
    }

    fn soonest_expiry(&self) -> Option<i64> {
        self.recency
            .to_vec()
            .into_iter()
            .filter_map(|index| self.slots.get(index).and_then(CacheEntry::expires_at))
            .min()
    }

    /// Evicts from the tail until `incoming` fits the size budget, never
    /// evicting `keep`.
    fn make_room(&mut self, incoming: usize, keep: Option<usize>)
    where
        K: Eq + Hash,
    {
        while self.budget.needs_room_for(incoming) {
            match self.recency.tail() {
                Some(tail) if Some(tail) != keep => {
                    debug!("Evicting slot {}: size budget exceeded", tail);
                    self.remove_index(tail, DisposeReason::Evict);
                }
                _ => break,
            }
        }
    }

    fn evict_tail(&mut self) -> bool
    where
        K: Eq + Hash,
    {
        match self.recency.evict_tail() {
            Some(tail) => {
                debug!("Evicting slot {}: count limit {} reached", tail, self.max);
                self.remove_index(tail, DisposeReason::Evict);
                true
            }
            None => false,
        }
    }

    /// Unlinks, frees and disposes the entry at `index`.
    fn remove_index(&mut self, index: usize, reason: DisposeReason)
    where
        K: Eq + Hash,
    {
        self.recency.remove(index);
        let Some(entry) = self.slots.release(index) else {
            return;
        };
        self.key_index.remove(&entry.key);
        self.budget.remove(entry.size);

        trace!("Released slot {} ({})", index, reason);
        self.stats.record_removal(reason);
        self.disposer.removed(entry, reason);

        if self.slots.is_empty() {
            self.ttl.cancel();
        }
    }

    /// Finishes a mutation by flushing `dispose_after`.
    fn settle(&mut self) {
        debug_assert_eq!(self.recency.len(), self.slots.len());
        self.disposer.flush();
    }
}

/// Start time `age` milliseconds before `now`, clamped to the earliest
/// representable instant.
fn start_from_age(now: i64, age: u64) -> i64 {
    i64::try_from(age)
        .ok()
        .and_then(|age| now.checked_sub(age))
        .unwrap_or(i64::MIN)
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.slots.len())
            .field("allocated", &self.slots.allocated())
            .field("max", &self.max)
            .field("budget", &self.budget)
            .field("ttl", &self.ttl)
            .field("policy", &self.policy)
            .field("disposer", &self.disposer)
            .field("stats", &self.stats)
            .finish()
    }
}
