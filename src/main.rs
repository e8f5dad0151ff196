// =============================================================================
// Macro Pulse — Main Entry Point
// =============================================================================
//
// Serves the bullishness score, alerts and plain-text summary over REST.
// Each dashboard session keeps its own previous score so deltas never leak
// between users.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod alerts;
mod api;
mod app_state;
mod market_data;
mod runtime_config;
mod session;
mod signals;
mod summary;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::runtime_config::RuntimeConfig;

const DEFAULT_CONFIG_PATH: &str = "pulse_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║        Macro Pulse — Starting Up                        ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let config_path =
        std::env::var("PULSE_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());

    let mut config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config.apply_env_overrides();

    // ── 2. Application state ─────────────────────────────────────────────
    let state = Arc::new(
        AppState::new(config).context("invalid signal configuration, refusing to start")?,
    );

    for name in state.scorer.signal_names() {
        info!(signal = %name, "Scoring signal enabled");
    }

    // ── 3. Idle-session pruning ──────────────────────────────────────────
    let prune_state = state.clone();
    let prune_every = state.config.prune_interval_secs.max(1);
    let max_idle = state
        .config
        .session_idle_timeout()
        .context("invalid session idle timeout, refusing to start")?;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(prune_every));
        loop {
            interval.tick().await;
            if prune_state.sessions.prune_idle(max_idle) > 0 {
                prune_state.increment_version();
            }
        }
    });

    // ── 4. Start the API server ──────────────────────────────────────────
    let bind_addr = state.config.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    let app = api::rest::router(state.clone());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "API server failed");
        }
    });

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping gracefully");

    info!(
        sessions = state.sessions.len(),
        state_version = state.current_state_version(),
        "Macro Pulse shut down complete."
    );
    Ok(())
}
