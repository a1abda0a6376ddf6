// src/server/recording.rs

//! Feeds finished requests into the counter store.
//!
//! The host's handlers describe each proxied request by attaching a
//! `CompletedRequest` to the response extensions. This layer runs after the inner
//! service has produced the response, takes that extension off, and records it.
//! Responses without the extension never reached an upstream and are not counted.

use crate::core::recorder::{CompletedRequest, RecordOutcome};
use crate::core::state::ServerState;
use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use tracing::trace;

async fn recording_middleware(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    if let Some(completed) = response.extensions_mut().remove::<CompletedRequest>()
        && let RecordOutcome::Recorded {
            rolled_over: true, ..
        } = state.record_request(&completed)
    {
        trace!("Recording closed the statistics window.");
    }
    response
}

/// Wraps `inner` so every response carrying a `CompletedRequest` is recorded once.
pub fn with_request_recording(state: Arc<ServerState>, inner: Router) -> Router {
    inner.layer(middleware::from_fn_with_state(state, recording_middleware))
}
