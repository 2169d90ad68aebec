//! HTTP server entry point.
//!
//! Reads settings from the environment (and `.env`), builds the server state
//! and serves the analyze endpoint.

use std::sync::Arc;

use anyhow::{Context, Result};
use scribe_config::ServerSettings;
use scribe_server::{router, ServerState};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let settings = ServerSettings::from_env().context("invalid server settings")?;
    let state = ServerState::from_settings(&settings).context("failed to load chat definition")?;

    info!("Model: {}", state.model.name);
    info!("Chat: {} ({} agents, max {} rounds)", state.chat.name, state.chat.agents.len(), state.chat.max_round);
    for agent in &state.chat.agents {
        info!("  - {} ({})", agent.name, agent.kind);
    }
    if state.credentials.api_key().is_none() {
        warn!("{} is not set; /analyze will fail until it is", state.credentials.name());
    }

    let app = router(Arc::new(state));

    info!("Starting server on {}", settings.bind_addr);
    let listener = tokio::net::TcpListener::bind(settings.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
