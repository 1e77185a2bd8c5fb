//! Main application server.
//!
//! Provides the complete server application with signal handling
//! and graceful shutdown coordination.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::routing::get;
use axum::Router;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::registry::ConnectionRegistry;
use super::rest::create_rest_router;
use super::session::ws_handler;
use super::static_files::static_router;
use crate::Result;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Connected reload clients.
    pub registry: Arc<ConnectionRegistry>,
    /// Root of the watched (and served) tree.
    pub watch_root: Arc<PathBuf>,
    /// Number of directories registered with the OS watcher.
    pub watched_dirs: usize,
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}

impl AppState {
    /// Create state shared between the HTTP server and the dispatcher.
    #[must_use]
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        watch_root: PathBuf,
        watched_dirs: usize,
    ) -> Self {
        Self {
            registry,
            watch_root: Arc::new(watch_root),
            watched_dirs,
            started_at: Instant::now(),
        }
    }
}

/// Application server.
pub struct App {
    config: ServerConfig,
    state: AppState,
}

impl App {
    /// Create a new application.
    #[must_use]
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build the router with all endpoints.
    ///
    /// `/ws` upgrades to the notification stream, the REST routes serve
    /// health and stats, and everything else falls through to static
    /// file serving from the watch root.
    #[must_use]
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let ws = Router::new()
            .route("/ws", get(ws_handler))
            .with_state(self.state.clone());

        Router::new()
            .merge(ws)
            .merge(create_rest_router(self.state.clone()))
            .merge(static_router(self.state.clone()))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &axum::http::Request<_>| {
                        let method = request.method();
                        let uri = request.uri();

                        tracing::info_span!(
                            "http_request",
                            method = %method,
                            uri = %uri,
                        )
                    })
                    .on_response(
                        |response: &axum::response::Response,
                         _latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::debug!(
                                status = %response.status(),
                                "Request completed"
                            );
                        },
                    ),
            )
            .layer(cors)
    }

    /// Run the server until a shutdown signal arrives or `shutdown` is
    /// cancelled.
    ///
    /// On exit the token is cancelled so the dispatcher and discovery
    /// tasks stop with the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot bind or encounters a fatal
    /// error during execution.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| crate::Error::config(format!("invalid address: {e}")))?;

        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            crate::error::ServerError::BindFailed {
                address: addr.to_string(),
                reason: e.to_string(),
            }
        })?;

        tracing::info!(%addr, "Server listening");

        let token = shutdown.clone();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                tokio::select! {
                    () = shutdown_signal() => {}
                    () = token.cancelled() => {}
                }
                token.cancel();
            })
            .await
            .map_err(|e| crate::error::ServerError::Request(e.to_string()))?;

        tracing::info!("Server shut down gracefully");
        Ok(())
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
