// src/core/recorder.rs

//! The per-request hook that feeds completed proxied requests into the counter store.

use crate::core::state::{Counter, StatsState};
use crate::core::window::WindowAggregator;

/// The outcome of one try at fetching a response from a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpstreamAttempt {
    /// Response status from the backend. Zero when no response was obtained.
    pub status: u16,
    /// Whole seconds part of the attempt's elapsed time.
    pub response_sec: i64,
    /// Millisecond part of the attempt's elapsed time.
    pub response_msec: i64,
    /// Bytes received from the backend for this attempt.
    pub response_length: u64,
}

impl UpstreamAttempt {
    pub fn new(status: u16, elapsed_ms: i64, response_length: u64) -> Self {
        Self {
            status,
            response_sec: elapsed_ms.div_euclid(1000),
            response_msec: elapsed_ms.rem_euclid(1000),
            response_length,
        }
    }

    /// Elapsed milliseconds for this attempt. Attempts without a status contribute
    /// nothing and negative durations from clock skew clamp to zero.
    pub fn elapsed_ms(&self) -> u64 {
        if self.status == 0 {
            return 0;
        }
        let ms = self
            .response_sec
            .saturating_mul(1000)
            .saturating_add(self.response_msec);
        ms.max(0) as u64
    }
}

/// Everything the recorder needs to know about a finished request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletedRequest {
    /// The response status sent to the client.
    pub status: u16,
    /// An explicitly set error status, which takes precedence over `status`.
    pub err_status: Option<u16>,
    /// Total bytes written to the client connection.
    pub bytes_sent: u64,
    /// Every upstream attempt made for this request, in order.
    pub upstream: Vec<UpstreamAttempt>,
}

impl CompletedRequest {
    /// The status used for classification.
    pub fn effective_status(&self) -> u16 {
        match self.err_status {
            Some(err) if err != 0 => err,
            _ => self.status,
        }
    }

    /// Bytes received across all attempts, saturating at `u64::MAX`.
    pub fn upstream_bytes(&self) -> u64 {
        self.upstream
            .iter()
            .map(|a| a.response_length)
            .fold(0, u64::saturating_add)
    }

    /// Upstream latency across all attempts, saturating at `u64::MAX`.
    pub fn upstream_time_ms(&self) -> u64 {
        self.upstream
            .iter()
            .map(UpstreamAttempt::elapsed_ms)
            .fold(0, u64::saturating_add)
    }
}

/// The narrow status ranges tracked by the store.
///
/// Only the first ten codes of each hundred are counted (200-209, 300-309, 400-409,
/// 500-509). Anything else, such as 210 or 410, is not tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    Ok20x,
    Redirect30x,
    ClientError40x,
    ServerError50x,
}

impl StatusClass {
    pub fn classify(status: u16) -> Option<Self> {
        match status {
            400..410 => Some(StatusClass::ClientError40x),
            500..510 => Some(StatusClass::ServerError50x),
            200..210 => Some(StatusClass::Ok20x),
            300..310 => Some(StatusClass::Redirect30x),
            _ => None,
        }
    }

    pub fn counter(self) -> Counter {
        match self {
            StatusClass::Ok20x => Counter::Status20x,
            StatusClass::Redirect30x => Counter::Status30x,
            StatusClass::ClientError40x => Counter::Status40x,
            StatusClass::ServerError50x => Counter::Status50x,
        }
    }
}

/// What the recorder did with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The request never reached an upstream; nothing was counted.
    Skipped,
    Recorded {
        status_class: Option<StatusClass>,
        /// Whether this call was the one that closed the window.
        rolled_over: bool,
    },
}

/// Records completed requests into a `StatsState`.
pub struct RequestRecorder;

impl RequestRecorder {
    /// Records one completed request. Must be called exactly once per request, after
    /// the response has been sent.
    pub fn record(
        stats: &StatsState,
        window: &WindowAggregator,
        now_epoch_sec: u64,
        request: &CompletedRequest,
    ) -> RecordOutcome {
        if request.upstream.is_empty() {
            return RecordOutcome::Skipped;
        }

        stats.increment(Counter::UpstreamBytesRecvTotal, request.upstream_bytes());
        stats.increment(Counter::WindowResponseTimeMs, request.upstream_time_ms());

        stats.increment(Counter::RequestsTotal, 1);
        stats.increment(Counter::BytesSentTotal, request.bytes_sent);
        stats.increment(Counter::WindowRequests, 1);

        let rolled_over = window.maybe_rollover(stats, now_epoch_sec).is_some();

        let status_class = StatusClass::classify(request.effective_status());
        if let Some(class) = status_class {
            stats.increment(class.counter(), 1);
        }

        RecordOutcome::Recorded {
            status_class,
            rolled_over,
        }
    }
}
