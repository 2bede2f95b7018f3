//! Disposal Notifier Module
//!
//! Two removal hooks: `dispose` runs the moment an entry leaves its slot,
//! `dispose_after` receives the removed entries once the whole mutation has
//! finished, in removal order.

use std::fmt;
use std::mem;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::CacheEntry;

// == Dispose Reason ==
/// Why an entry left the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisposeReason {
    /// Pushed out by count or size pressure, or popped
    Evict,
    /// Removed by `delete`
    Delete,
    /// Removed by `clear` or `load`
    Clear,
    /// Value replaced by `set` on an existing key
    Set,
    /// Removed because its TTL elapsed
    Expire,
}

impl fmt::Display for DisposeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DisposeReason::Evict => "evict",
            DisposeReason::Delete => "delete",
            DisposeReason::Clear => "clear",
            DisposeReason::Set => "set",
            DisposeReason::Expire => "expire",
        };
        f.write_str(name)
    }
}

/// Synchronous hook: `(value, key, reason)` while the entry is being removed.
pub type DisposeHook<K, V> = Arc<dyn Fn(&V, &K, DisposeReason) + Send + Sync>;

/// Deferred hook: takes ownership of `(value, key, reason)` after the mutation settles.
pub type DisposeAfterHook<K, V> = Arc<dyn Fn(V, K, DisposeReason) + Send + Sync>;

// == Disposer ==
pub struct Disposer<K, V> {
    dispose: Option<DisposeHook<K, V>>,
    dispose_after: Option<DisposeAfterHook<K, V>>,
    pending: Vec<(V, K, DisposeReason)>,
}

impl<K, V> Disposer<K, V> {
    pub fn new(
        dispose: Option<DisposeHook<K, V>>,
        dispose_after: Option<DisposeAfterHook<K, V>>,
    ) -> Self {
        Self {
            dispose,
            dispose_after,
            pending: Vec::new(),
        }
    }

    // == Removed ==
    /// Fires `dispose` for a removed entry and queues it for `dispose_after`.
    pub fn removed(&mut self, entry: CacheEntry<K, V>, reason: DisposeReason) {
        self.replaced(entry.value, entry.key, reason);
    }

    /// Same as [`removed`](Self::removed) for a value detached from its slot.
    pub fn replaced(&mut self, value: V, key: K, reason: DisposeReason) {
        if let Some(dispose) = &self.dispose {
            dispose(&value, &key, reason);
        }
        if self.dispose_after.is_some() {
            self.pending.push((value, key, reason));
        }
    }

    // == Flush ==
    /// Hands every queued removal to `dispose_after`, oldest first.
    pub fn flush(&mut self) {
        let Some(dispose_after) = self.dispose_after.clone() else {
            return;
        };
        for (value, key, reason) in mem::take(&mut self.pending) {
            dispose_after(value, key, reason);
        }
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl<K, V> fmt::Debug for Disposer<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposer")
            .field("dispose", &self.dispose.is_some())
            .field("dispose_after", &self.dispose_after.is_some())
            .field("pending", &self.pending.len())
            .finish()
    }
}
