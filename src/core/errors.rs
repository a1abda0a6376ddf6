// src/core/errors.rs

//! Defines the primary error type for the entire application.

use thiserror::Error;

/// The main error enum, representing every failure the status core can surface.
///
/// Counter updates and rollovers are total and never produce one of these; errors
/// only come out of configuration, report rendering and the transport edge.
#[derive(Error, Debug)]
pub enum StubStatusError {
    #[error("Failed to render status report")]
    Render,

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl From<std::fmt::Error> for StubStatusError {
    fn from(_: std::fmt::Error) -> Self {
        StubStatusError::Render
    }
}
