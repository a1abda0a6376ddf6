// src/core/mod.rs

//! The central module containing the request statistics core.

pub mod clock;
pub mod errors;
pub mod recorder;
pub mod report;
pub mod state;
pub mod window;

pub use errors::StubStatusError;
pub use recorder::{CompletedRequest, RecordOutcome, RequestRecorder, StatusClass, UpstreamAttempt};
pub use report::StatsSnapshot;
pub use window::{WindowAggregator, WindowSummary};
