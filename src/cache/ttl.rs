//! TTL Tracker Module
//!
//! Samples the injected clock for staleness checks and owns the single
//! autopurge deadline.

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

use crate::clock::Clock;

// == Purge Timer ==
/// One cancellable deadline for the next proactive sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PurgeTimer {
    deadline: Option<i64>,
}

impl PurgeTimer {
    /// Arms the timer for `at`, keeping an earlier deadline if one is set.
    pub fn arm(&mut self, at: i64) {
        self.deadline = Some(self.deadline.map_or(at, |current| current.min(at)));
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<i64> {
        self.deadline
    }

    pub fn is_due(&self, now: i64) -> bool {
        self.deadline.is_some_and(|deadline| deadline <= now)
    }
}

// == TTL Tracker ==
pub struct TtlTracker {
    clock: Arc<dyn Clock>,
    /// Milliseconds a sampled time stays valid for staleness checks
    resolution: u64,
    cached_now: Cell<Option<i64>>,
    autopurge: bool,
    timer: PurgeTimer,
}

impl TtlTracker {
    pub fn new(clock: Arc<dyn Clock>, resolution: u64, autopurge: bool) -> Self {
        Self {
            clock,
            resolution,
            cached_now: Cell::new(None),
            autopurge,
            timer: PurgeTimer::default(),
        }
    }

    // == Now ==
    /// Current time for staleness checks.
    ///
    /// A sample is reused until `resolution` milliseconds have passed since it
    /// was taken; a resolution of 0 samples on every call.
    pub fn now(&self) -> i64 {
        let real = self.clock_now();
        if self.resolution == 0 {
            return real;
        }
        match self.cached_now.get() {
            Some(cached) if real.saturating_sub(cached) < self.resolution as i64 => cached,
            _ => {
                self.cached_now.set(Some(real));
                real
            }
        }
    }

    /// Current time straight from the clock, used when stamping `start`.
    pub fn clock_now(&self) -> i64 {
        self.clock.now() as i64
    }

    /// Forces the next `now()` to resample.
    pub fn invalidate(&self) {
        self.cached_now.set(None);
    }

    // == Autopurge Scheduling ==
    pub fn autopurge(&self) -> bool {
        self.autopurge
    }

    /// Arms the sweep for just after `expires_at` when autopurge is on.
    pub fn schedule(&mut self, expires_at: i64) {
        if self.autopurge {
            self.timer.arm(expires_at.saturating_add(1));
        }
    }

    /// Replaces the deadline with the one for `soonest_expiry`, or cancels it.
    pub fn reschedule(&mut self, soonest_expiry: Option<i64>) {
        self.timer.cancel();
        if let Some(expires_at) = soonest_expiry {
            self.schedule(expires_at);
        }
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
    }

    pub fn timer(&self) -> &PurgeTimer {
        &self.timer
    }
}

impl fmt::Debug for TtlTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlTracker")
            .field("resolution", &self.resolution)
            .field("cached_now", &self.cached_now.get())
            .field("autopurge", &self.autopurge)
            .field("timer", &self.timer)
            .finish()
    }
}
