//! # soundbridge server
//!
//! HTTP API server for the bridge: keeps the speaker registry fresh and
//! serves devices, presets, and radio search to local frontends.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         bridge-server                                    │
//! │                                                                          │
//! │  Frontend ───► HTTP (8000) ───► DeviceService ───► SQLite               │
//! │                    │                  │                                  │
//! │                    │                  ▼                                  │
//! │                    │           Speakers (:8090)                          │
//! │                    ▼                                                     │
//! │              RadioDirectory ───► public radio directory                  │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod radio;
mod routes;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::radio::RadioDirectory;
use crate::routes::AppState;
use bridge_db::{Database, DbConfig};
use bridge_sync::DeviceService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    info!("Starting soundbridge server...");

    let config = ServerConfig::load()?;
    info!(
        addr = %config.http_addr(),
        db = %config.database_path.display(),
        fixture_mode = config.bridge.fixture_mode,
        "Configuration loaded"
    );

    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!("Database ready");

    let devices = DeviceService::new(&config.bridge, &db);
    let presets = db.presets();
    let radio = RadioDirectory::new(config.radio_api_base.clone());

    // Initial sync so the registry is warm before the first request.
    match devices.sync().await {
        Ok(report) => info!(
            discovered = report.discovered,
            synced = report.synced,
            failed = report.failed,
            "Initial sync complete"
        ),
        Err(e) => tracing::warn!(error = %e, "Initial sync failed, continuing"),
    }

    let state = Arc::new(AppState {
        db: db.clone(),
        devices,
        presets,
        radio,
    });

    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind(config.http_addr()).await?;
    info!(addr = %config.http_addr(), "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
