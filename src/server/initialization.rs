// src/server/initialization.rs

//! Builds the shared state and binds the listener before the server starts.

use super::context::ServerContext;
use crate::config::Config;
use crate::core::state::ServerState;
use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::info;

/// Initializes all server components before starting the serve loop.
pub async fn setup(config: Config) -> Result<ServerContext> {
    log_startup_info(&config);
    let (shutdown_tx, _) = broadcast::channel(1);

    let state = ServerState::initialize(config)?;

    let listener = TcpListener::bind((state.config.host.as_str(), state.config.port))
        .await
        .with_context(|| {
            format!(
                "Failed to bind {}:{}",
                state.config.host, state.config.port
            )
        })?;
    info!(
        "stubstatus listening on {}:{}",
        state.config.host, state.config.port
    );

    Ok(ServerContext {
        state,
        listener,
        shutdown_tx,
    })
}

/// Logs key configuration parameters at startup.
fn log_startup_info(config: &Config) {
    if config.status.enabled {
        info!("Status endpoint mounted at '{}'.", config.status.location);
    } else {
        info!("Status endpoint is disabled in the configuration.");
    }
    info!(
        "Request rate and latency averaged over {}s windows.",
        config.window.seconds
    );
}
