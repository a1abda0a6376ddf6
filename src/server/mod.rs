// src/server/mod.rs

use crate::config::Config;
use crate::core::state::ServerState;
use anyhow::Result;
use axum::Router;
use axum::http::StatusCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::broadcast;
use tracing::{error, info};

mod context;
mod initialization;
mod recording;
mod status_server;

pub use context::ServerContext;
pub use recording::with_request_recording;
pub use status_server::{StatusRoute, build_status_response, with_status_endpoint};

/// The main server startup function, orchestrating all setup phases.
pub async fn run(config: Config) -> Result<()> {
    // 1. Initialize shared state and bind the listener.
    let ctx = initialization::setup(config).await?;

    // 2. Translate process signals into the shutdown broadcast.
    let shutdown_tx = ctx.shutdown_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = wait_for_signal().await {
            error!("Failed to listen for shutdown signals: {}", e);
        }
        let _ = shutdown_tx.send(());
    });

    // 3. Serve until shutdown.
    let shutdown_rx = ctx.shutdown_tx.subscribe();
    let state = ctx.state.clone();
    serve(ctx.listener, ctx.state, default_router(), shutdown_rx).await?;

    for (name, value) in state.stats.fields() {
        info!("final {}: {}", name, value);
    }
    Ok(())
}

/// Serves `inner` until a shutdown message arrives. Responses from `inner` are
/// recorded, and the status endpoint (when enabled) sits in front of both.
pub async fn serve(
    listener: TcpListener,
    state: Arc<ServerState>,
    inner: Router,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<()> {
    let recorded = with_request_recording(state.clone(), inner);
    let app = with_status_endpoint(state, recorded);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_rx.recv().await.ok();
            info!("Server shutting down.");
        })
        .await?;
    Ok(())
}

/// The router requests fall through to when the status endpoint does not answer them.
fn default_router() -> Router {
    Router::new().fallback(|| async { StatusCode::NOT_FOUND })
}

async fn wait_for_signal() -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => info!("SIGINT received, initiating graceful shutdown."),
        _ = sigterm.recv() => info!("SIGTERM received, initiating graceful shutdown."),
    }
    Ok(())
}
