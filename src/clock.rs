//! Clock Module
//!
//! Time sources the cache reads "now" from. The engine only ever calls
//! [`Clock::now`], so tests can swap in a [`ManualClock`] and advance time
//! deterministically.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

// == Clock Trait ==
/// A source of the current time in milliseconds.
pub trait Clock: Send + Sync {
    /// Returns the current time in milliseconds.
    fn now(&self) -> u64;
}

// == Monotonic Clock ==
/// Milliseconds elapsed since the clock was created. Never goes backwards.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

// == Wall Clock ==
/// Unix epoch milliseconds. Can jump when the system time is adjusted.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    fn now(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

// == Manual Clock ==
/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a test can keep one handle
/// and hand another to the cache.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock reading `start` milliseconds.
    pub fn new(start: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Moves the clock forward by `ms` milliseconds.
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    /// Sets the clock to an absolute reading.
    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
