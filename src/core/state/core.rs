// src/core/state/core.rs

//! Defines the central `ServerState` struct, holding all shared process-wide state.

use super::stats::StatsState;
use crate::config::Config;
use crate::core::StubStatusError;
use crate::core::clock::{Clock, SystemClock};
use crate::core::recorder::{CompletedRequest, RecordOutcome, RequestRecorder};
use crate::core::report::StatsSnapshot;
use crate::core::window::{WindowAggregator, WindowSummary};
use std::sync::Arc;
use tracing::info;

/// The central struct holding all shared state.
///
/// Created once at startup and wrapped in an `Arc`. Every worker that completes a
/// request and every status request handler holds a clone of it for the life of the
/// process.
#[derive(Debug)]
pub struct ServerState {
    /// The validated configuration the process was started with.
    pub config: Config,
    /// The shared counter store.
    pub stats: StatsState,
    /// The rollover policy applied after every recorded request.
    pub window: WindowAggregator,
    clock: Arc<dyn Clock>,
}

impl ServerState {
    /// Initializes the shared state using the system clock. The startup time is
    /// captured here.
    pub fn initialize(config: Config) -> Result<Arc<Self>, StubStatusError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Initializes the shared state with an explicit clock source.
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Arc<Self>, StubStatusError> {
        if config.window.seconds == 0 {
            return Err(StubStatusError::Config(
                "window.seconds cannot be 0".to_string(),
            ));
        }

        let startup = clock.now_epoch_secs();
        let window = WindowAggregator::new(config.window.seconds);
        info!(
            "Request statistics initialized (startup {}, {}s window).",
            startup,
            window.window_secs()
        );

        Ok(Arc::new(Self {
            stats: StatsState::new(startup),
            window,
            config,
            clock,
        }))
    }

    pub fn now_epoch_secs(&self) -> u64 {
        self.clock.now_epoch_secs()
    }

    /// The hook called by the request pipeline once a request has completed.
    pub fn record_request(&self, request: &CompletedRequest) -> RecordOutcome {
        RequestRecorder::record(&self.stats, &self.window, self.now_epoch_secs(), request)
    }

    /// Closes the current window immediately, regardless of its age.
    pub fn force_rollover(&self) -> WindowSummary {
        self.window.force_rollover(&self.stats, self.now_epoch_secs())
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot(self.now_epoch_secs())
    }

    /// Renders the plaintext status report for the current moment.
    pub fn status_report(&self) -> Result<String, StubStatusError> {
        let mut body = String::with_capacity(256);
        self.snapshot().write_to(&mut body)?;
        Ok(body)
    }
}
