//! Cache Module
//!
//! Provides a bounded in-memory LRU cache with optional TTL expiry, a size
//! budget and disposal hooks.

mod budget;
mod dispose;
mod dump;
mod entry;
mod iter;
mod lru;
mod options;
mod slots;
mod stats;
mod store;
mod ttl;


// Re-export public types
pub use budget::{SizeBudget, SizeCalculation};
pub use dispose::{DisposeAfterHook, DisposeHook, DisposeReason};
pub use dump::{Dump, DumpEntry};
pub use entry::{CacheEntry, RemainingTtl};
pub use iter::{Entries, Indexes, Keys, Values};
pub use options::{GetOptions, HasOptions, IterOptions, PeekOptions, Policy, SetOptions};
pub use stats::CacheStats;
pub use store::LruCache;

pub(crate) use dispose::Disposer;
