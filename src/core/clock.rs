// src/core/clock.rs

//! Wall-clock sources used for uptime and window rollover decisions.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

/// A source of the current wall-clock time in whole seconds since the Unix epoch.
pub trait Clock: Send + Sync + Debug {
    fn now_epoch_secs(&self) -> u64;
}

/// The real system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_secs(&self) -> u64 {
        // Pre-epoch system time is treated as the epoch itself.
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// A clock that only moves when told to. Shared between threads.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start_epoch_secs: u64) -> Self {
        Self {
            now: AtomicU64::new(start_epoch_secs),
        }
    }

    /// Moves the clock forward by `secs` seconds.
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    /// Sets the clock to an absolute value. May move backwards.
    pub fn set(&self, epoch_secs: u64) {
        self.now.store(epoch_secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_epoch_secs(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
