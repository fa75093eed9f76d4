//! participation-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use participation_gateway::api;
use participation_gateway::app_state::AppState;
use participation_gateway::config::{GatewayConfig, LogFormat};
use participation_gateway::domain::EventBus;
use participation_gateway::persistence::{self, PostgresPersistence};
use participation_gateway::service::Stores;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env().context("invalid LISTEN_ADDR")?;
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting participation-gateway");

    // Build domain layer
    let stores = Stores::new();
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Optional journal
    let journal = if config.persistence_enabled {
        let journal = PostgresPersistence::connect(&config)
            .await
            .context("connecting to PostgreSQL")?;
        persistence::restore(&journal, &stores.users, &stores.events, &stores.requests)
            .await
            .context("restoring state from PostgreSQL")?;
        Some(journal)
    } else {
        tracing::info!("persistence disabled; running in memory");
        None
    };

    let app_state = AppState::new(stores, event_bus, journal);
    let app = api::build_app(app_state, Duration::from_secs(config.request_timeout_secs));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
