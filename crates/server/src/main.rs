//! parodist HTTP server entry point.
//!
//! Boots the axum router on the configured address. Logs are JSON on stderr.

use anyhow::Result;
use parodist_client::ParodyPipeline;
use parodist_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod error;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    let config = AppConfig::load()?;
    if config.require_anthropic_api_key().is_err() {
        tracing::warn!("PARODIST_ANTHROPIC_API_KEY is not set; parody generation will fail until it is");
    }

    let pipeline = ParodyPipeline::from_config(&config)?;
    let state = AppState::new(pipeline, config.request_timeout(), config.max_body_bytes);

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, model = %config.model, browser_mode = ?config.browser.mode, "Starting parodist server");

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("parodist server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}
