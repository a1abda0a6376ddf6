// src/core/state/stats.rs

//! Contains the shared counter store for request statistics.
//!
//! Every worker updates the same `StatsState` without coordination: each field is an
//! independent `AtomicU64` and increments are plain `fetch_add`s. The only mutual
//! exclusion lives in the rollover lock, which the window aggregator holds while it
//! reads and resets the window accumulators.

use crate::core::report::StatsSnapshot;
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{EnumCount as EnumCountMacro, EnumIter, IntoStaticStr};

/// Names every mutable counter, gauge and timestamp in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCountMacro, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum StatField {
    /// Lifetime completed requests that went through an upstream.
    RequestsTotal,
    /// Bytes sent to clients.
    BytesSentTotal,
    /// Bytes received from upstream responses.
    UpstreamBytesRecvTotal,
    /// Last computed request rate, published at rollover.
    RequestsPerSecond,
    /// Last computed average upstream latency, published at rollover.
    AvgResponseTimeMs,
    /// Requests accumulated in the current window.
    WindowRequests,
    /// Upstream latency accumulated in the current window.
    WindowResponseTimeMs,
    /// Wall-clock second the current window began.
    WindowStartEpochSec,
    Status20x,
    Status30x,
    Status40x,
    Status50x,
}

/// The subset of fields workers may add to. Gauges and the window start are only
/// written by the rollover writer, so they have no `Counter` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Counter {
    RequestsTotal,
    BytesSentTotal,
    UpstreamBytesRecvTotal,
    WindowRequests,
    WindowResponseTimeMs,
    Status20x,
    Status30x,
    Status40x,
    Status50x,
}

impl From<Counter> for StatField {
    fn from(counter: Counter) -> Self {
        match counter {
            Counter::RequestsTotal => StatField::RequestsTotal,
            Counter::BytesSentTotal => StatField::BytesSentTotal,
            Counter::UpstreamBytesRecvTotal => StatField::UpstreamBytesRecvTotal,
            Counter::WindowRequests => StatField::WindowRequests,
            Counter::WindowResponseTimeMs => StatField::WindowResponseTimeMs,
            Counter::Status20x => StatField::Status20x,
            Counter::Status30x => StatField::Status30x,
            Counter::Status40x => StatField::Status40x,
            Counter::Status50x => StatField::Status50x,
        }
    }
}

impl StatField {
    fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Holds all state and logic related to request statistics.
#[derive(Debug)]
pub struct StatsState {
    counters: [AtomicU64; StatField::COUNT],
    /// Process start time, captured once when the store is created.
    startup_epoch_sec: u64,
    /// Serializes window rollovers. Never taken by increments or reads.
    rollover_lock: Mutex<()>,
}

impl StatsState {
    /// Creates a new `StatsState` with zeroed counters. The first window opens at
    /// `startup_epoch_sec`.
    pub fn new(startup_epoch_sec: u64) -> Self {
        let state = Self {
            counters: std::array::from_fn(|_| AtomicU64::new(0)),
            startup_epoch_sec,
            rollover_lock: Mutex::new(()),
        };
        state.set(StatField::WindowStartEpochSec, startup_epoch_sec);
        state
    }

    /// Atomically adds `delta` to a counter. Wraps on overflow like the underlying
    /// `fetch_add`.
    pub fn increment(&self, counter: Counter, delta: u64) {
        self.counters[StatField::from(counter).index()].fetch_add(delta, Ordering::Relaxed);
    }

    /// Reads the current value of a field without blocking writers.
    pub fn read(&self, field: impl Into<StatField>) -> u64 {
        self.counters[field.into().index()].load(Ordering::Relaxed)
    }

    /// Overwrites a field. Reserved for the rollover writer, which calls it while
    /// holding the rollover lock.
    pub(crate) fn set(&self, field: StatField, value: u64) {
        self.counters[field.index()].store(value, Ordering::Relaxed);
    }

    /// Atomically reads a window accumulator and resets it to zero. Increments that
    /// land after the swap count toward the next window.
    pub(crate) fn take(&self, field: StatField) -> u64 {
        self.counters[field.index()].swap(0, Ordering::AcqRel)
    }

    pub(crate) fn lock_rollover(&self) -> MutexGuard<'_, ()> {
        self.rollover_lock.lock()
    }

    /// Gets the time the store was created.
    pub fn startup_epoch_sec(&self) -> u64 {
        self.startup_epoch_sec
    }

    /// Reads every field into a plain snapshot. Fields are read one at a time, so the
    /// result is not a single atomic view.
    pub fn snapshot(&self, now_epoch_sec: u64) -> StatsSnapshot {
        StatsSnapshot {
            uptime_secs: now_epoch_sec.saturating_sub(self.startup_epoch_sec),
            requests_total: self.read(StatField::RequestsTotal),
            bytes_sent_total: self.read(StatField::BytesSentTotal),
            upstream_bytes_recv_total: self.read(StatField::UpstreamBytesRecvTotal),
            requests_per_second: self.read(StatField::RequestsPerSecond),
            avg_response_time_ms: self.read(StatField::AvgResponseTimeMs),
            status_20x: self.read(StatField::Status20x),
            status_30x: self.read(StatField::Status30x),
            status_40x: self.read(StatField::Status40x),
            status_50x: self.read(StatField::Status50x),
        }
    }

    /// Returns `(name, value)` for every field, in declaration order.
    pub fn fields(&self) -> Vec<(&'static str, u64)> {
        StatField::iter()
            .map(|field| (field.name(), self.read(field)))
            .collect()
    }
}
