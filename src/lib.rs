//! Bhavstore - daily equity bar ingestion and analytics
//!
//! Ingests exchange bhavcopy CSV files (or single JSON records), validates
//! every row, stores the accepted bars and answers aggregate queries over
//! them through a small REST API.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod services;
pub mod state;
pub mod storage;

use api::ApiServer;
use config::ServerConfig;
use error::Result;
use state::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging, start the API server and serve until Ctrl-C
pub async fn run() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bhavstore=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting bhavstore...");

    let config = ServerConfig::from_env()?;
    let state = Arc::new(AppState::new(&config)?);

    tracing::info!("Application state initialized");

    let mut server = ApiServer::new(state, config.max_upload_bytes);
    server.start(&config.host, config.port).await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");

    server.stop();
    Ok(())
}
