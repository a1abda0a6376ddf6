// src/server/status_server.rs

//! Serves the plaintext status report over HTTP.
//!
//! The endpoint is an axum middleware rather than a route: requests under the
//! configured location are answered here, and anything the endpoint declines falls
//! through to the wrapped router.

use crate::core::StubStatusError;
use crate::core::state::ServerState;
use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error};

/// How a request relates to the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusRoute {
    /// The path is outside the endpoint's location.
    PassThrough,
    /// The path is ours but the method is neither GET nor HEAD.
    MethodNotAllowed,
    /// The path ends in `/`; the next handler gets the request.
    Declined,
    /// Render the report. HEAD only gets the headers.
    Serve { head_only: bool },
}

impl StatusRoute {
    pub fn resolve(method: &Method, path: &str, location: &str) -> Self {
        if !path.starts_with(location) {
            return StatusRoute::PassThrough;
        }
        if *method != Method::GET && *method != Method::HEAD {
            return StatusRoute::MethodNotAllowed;
        }
        if path.ends_with('/') {
            return StatusRoute::Declined;
        }
        StatusRoute::Serve {
            head_only: *method == Method::HEAD,
        }
    }
}

impl IntoResponse for StubStatusError {
    fn into_response(self) -> Response {
        match self {
            StubStatusError::MethodNotAllowed(_) => (
                StatusCode::METHOD_NOT_ALLOWED,
                [(header::ALLOW, "GET, HEAD")],
            )
                .into_response(),
            other => {
                error!("Status endpoint failed: {}", other);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Builds the status response. The content length is that of the rendered report for
/// both GET and HEAD.
pub fn build_status_response(
    state: &ServerState,
    head_only: bool,
) -> Result<Response, StubStatusError> {
    let report = state.status_report()?;
    let content_length = HeaderValue::from(report.len());
    let body = if head_only {
        Body::empty()
    } else {
        Body::from(report)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain")
        .header(header::CONTENT_LENGTH, content_length)
        .body(body)
        .map_err(|e| StubStatusError::Internal(e.to_string()))
}

/// Answers requests for the status location and forwards everything else.
async fn status_middleware(
    State(state): State<Arc<ServerState>>,
    request: Request,
    next: Next,
) -> Response {
    let route = StatusRoute::resolve(
        request.method(),
        request.uri().path(),
        &state.config.status.location,
    );

    match route {
        StatusRoute::PassThrough => next.run(request).await,
        StatusRoute::Declined => {
            debug!(
                "Status endpoint declined '{}', passing to next handler.",
                request.uri().path()
            );
            next.run(request).await
        }
        StatusRoute::MethodNotAllowed => {
            StubStatusError::MethodNotAllowed(request.method().to_string()).into_response()
        }
        StatusRoute::Serve { head_only } => match build_status_response(&state, head_only) {
            Ok(response) => response,
            Err(e) => e.into_response(),
        },
    }
}

/// Mounts the status endpoint in front of `inner`. When the endpoint is disabled the
/// router is returned unchanged.
pub fn with_status_endpoint(state: Arc<ServerState>, inner: Router) -> Router {
    if !state.config.status.enabled {
        return inner;
    }
    inner.layer(middleware::from_fn_with_state(state, status_middleware))
}
