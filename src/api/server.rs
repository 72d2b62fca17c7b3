//! HTTP server for ingestion and aggregation
//!
//! Provides:
//! - CSV / JSON ingestion (/upload)
//! - Aggregation queries (/api/*)

use crate::api::handlers;
use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Build the router with all routes and layers
pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ================================================================
        // Health check
        // ================================================================
        .route("/health", get(handlers::health_check))

        // ================================================================
        // Ingestion
        // POST /upload[?report=rows]
        // ================================================================
        .route("/upload", post(handlers::upload))

        // ================================================================
        // Aggregation API
        // ================================================================
        .route("/api/highest_volume", get(handlers::highest_volume))
        .route("/api/average_close", get(handlers::average_close))
        .route("/api/average_vwap", get(handlers::average_vwap))

        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// API server manager
pub struct ApiServer {
    state: Arc<AppState>,
    max_upload_bytes: usize,
    shutdown_tx: Option<oneshot::Sender<()>>,
    local_addr: Option<SocketAddr>,
}

impl ApiServer {
    /// Create a new server
    pub fn new(state: Arc<AppState>, max_upload_bytes: usize) -> Self {
        Self {
            state,
            max_upload_bytes,
            shutdown_tx: None,
            local_addr: None,
        }
    }

    /// Bind and start serving in a background task
    pub async fn start(&mut self, host: &str, port: u16) -> Result<SocketAddr> {
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid address: {}", e)))?;

        let app = build_router(self.state.clone(), self.max_upload_bytes);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        info!("Starting bhavstore API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("API server shutting down");
            });

            if let Err(e) = server.await {
                error!("API server error: {}", e);
            }
        });

        self.shutdown_tx = Some(shutdown_tx);
        self.local_addr = Some(local_addr);

        info!("bhavstore API server started successfully");
        info!("=== Endpoints ===");
        info!("  GET  http://{}/health", local_addr);
        info!("  POST http://{}/upload", local_addr);
        info!("  GET  http://{}/api/highest_volume", local_addr);
        info!("  GET  http://{}/api/average_close", local_addr);
        info!("  GET  http://{}/api/average_vwap", local_addr);

        Ok(local_addr)
    }

    /// Stop the server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            info!("API server stop signal sent");
        }
    }

    /// Check if server is running
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_and_stop() {
        let state = Arc::new(AppState::for_tests());
        let mut server = ApiServer::new(state, 1024);

        let addr = server.start("127.0.0.1", 0).await.unwrap();
        assert_ne!(addr.port(), 0);
        assert!(server.is_running());

        let stream = tokio::net::TcpStream::connect(addr).await;
        assert!(stream.is_ok());

        server.stop();
        assert!(!server.is_running());
    }

    #[tokio::test]
    async fn test_invalid_host_is_config_error() {
        let mut server = ApiServer::new(Arc::new(AppState::for_tests()), 1024);
        let err = server.start("not a host", 3000).await.unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
