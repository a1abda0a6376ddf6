// src/core/window.rs

//! Implements the fixed-window rollover that turns the window accumulators into the
//! published `requests_per_second` and `avg_response_time_ms` gauges.

use crate::core::state::{StatField, StatsState};
use tracing::debug;

/// The default length of an accumulation window, in seconds.
pub const DEFAULT_WINDOW_SECS: u64 = 60;

/// The values published by a single rollover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSummary {
    /// Requests that were accumulated in the closed window.
    pub window_requests: u64,
    /// Summed upstream latency of the closed window.
    pub window_response_time_ms: u64,
    pub requests_per_second: u64,
    pub avg_response_time_ms: u64,
    /// Start of the newly opened window.
    pub window_start_epoch_sec: u64,
}

impl WindowSummary {
    /// Computes the published gauges for a closed window.
    ///
    /// No requests publishes zero for both gauges. Requests with zero summed latency
    /// publish a zero average while the rate is still computed.
    pub fn compute(
        window_requests: u64,
        window_response_time_ms: u64,
        window_secs: u64,
        window_start_epoch_sec: u64,
    ) -> Self {
        let (requests_per_second, avg_response_time_ms) = if window_requests == 0 {
            (0, 0)
        } else if window_response_time_ms == 0 {
            (window_requests / window_secs, 0)
        } else {
            (
                window_requests / window_secs,
                window_response_time_ms / window_requests,
            )
        };

        Self {
            window_requests,
            window_response_time_ms,
            requests_per_second,
            avg_response_time_ms,
            window_start_epoch_sec,
        }
    }
}

/// Owns the rollover policy for the shared store.
#[derive(Debug, Clone, Copy)]
pub struct WindowAggregator {
    window_secs: u64,
}

impl Default for WindowAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SECS)
    }
}

impl WindowAggregator {
    /// Creates an aggregator with the given window length. A zero length is raised to
    /// one second so the rate division stays defined.
    pub fn new(window_secs: u64) -> Self {
        Self {
            window_secs: window_secs.max(1),
        }
    }

    pub fn window_secs(&self) -> u64 {
        self.window_secs
    }

    /// Rolls the window over if at least `window_secs` have passed since it opened.
    ///
    /// The elapsed check and the reset run under the store's rollover lock, so when
    /// several callers see an expired window at once exactly one of them rolls it and
    /// gets `Some`; the rest re-check against the fresh window start and get `None`.
    pub fn maybe_rollover(&self, stats: &StatsState, now_epoch_sec: u64) -> Option<WindowSummary> {
        let _guard = stats.lock_rollover();

        let window_start = stats.read(StatField::WindowStartEpochSec);
        // A clock that stepped backwards never closes a window.
        if now_epoch_sec.saturating_sub(window_start) < self.window_secs {
            return None;
        }

        Some(self.roll_locked(stats, now_epoch_sec))
    }

    /// Closes the current window unconditionally.
    pub fn force_rollover(&self, stats: &StatsState, now_epoch_sec: u64) -> WindowSummary {
        let _guard = stats.lock_rollover();
        self.roll_locked(stats, now_epoch_sec)
    }

    /// Must be called with the rollover lock held.
    fn roll_locked(&self, stats: &StatsState, now_epoch_sec: u64) -> WindowSummary {
        let window_requests = stats.take(StatField::WindowRequests);
        let window_response_time_ms = stats.take(StatField::WindowResponseTimeMs);

        // The window start only moves forward.
        let next_start = now_epoch_sec.max(stats.read(StatField::WindowStartEpochSec));

        let summary = WindowSummary::compute(
            window_requests,
            window_response_time_ms,
            self.window_secs,
            next_start,
        );

        stats.set(StatField::RequestsPerSecond, summary.requests_per_second);
        stats.set(StatField::AvgResponseTimeMs, summary.avg_response_time_ms);
        stats.set(StatField::WindowStartEpochSec, next_start);

        debug!(
            window_requests,
            window_response_time_ms,
            requests_per_second = summary.requests_per_second,
            avg_response_time_ms = summary.avg_response_time_ms,
            "Request statistics window rolled over."
        );

        summary
    }
}
