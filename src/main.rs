//! Hot-reload server for QML development.
//!
//! Entry point for the hotwatch server.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use clap::Parser;
use hotwatch_server::discovery::DiscoveryResponder;
use hotwatch_server::protocol::DISCOVERY_PORT;
use hotwatch_server::server::{
    init_metrics, init_tracing, App, AppState, ConnectionRegistry, ServerConfig,
};
use hotwatch_server::watcher::{dispatch_events, FileWatcher};
use hotwatch_server::{Config, Result};
use tokio_util::sync::CancellationToken;

/// Hot-reload server for QML development
#[derive(Parser, Debug)]
#[command(name = "hotwatch-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory to watch and serve
    #[arg(short, long, env = "HOTWATCH_DIR", default_value = ".")]
    dir: std::path::PathBuf,

    /// Host address to bind to
    #[arg(long, env = "HOTWATCH_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "HOTWATCH_PORT", default_value = "8080")]
    port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "HOTWATCH_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, env = "HOTWATCH_LOG_JSON")]
    log_json: bool,

    /// IPv4 address to advertise in discovery replies (skips the
    /// interface scan; useful on multi-homed hosts)
    #[arg(long, env = "HOTWATCH_ADVERTISE_IP")]
    advertise_ip: Option<Ipv4Addr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.log_json);

    tracing::info!(
        "hotwatch-server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config {
        watch_dir: cli.dir,
        host: cli.host,
        port: cli.port,
        log_level: cli.log_level,
        advertise_ip: cli.advertise_ip,
    };

    tracing::debug!(?config, "Configuration loaded");

    config.validate()?;

    // Subscribe to the tree before anything can connect, so no client
    // ever races the initial scan.
    let watcher = FileWatcher::new(&config.watch_dir)?;
    let watched_dirs = watcher.watched_dirs().len();

    init_metrics();

    let registry = Arc::new(ConnectionRegistry::new());
    let shutdown = CancellationToken::new();

    // Discovery is best-effort: a taken UDP port disables it but never
    // stops the server.
    let discovery_addr = SocketAddr::from(([0, 0, 0, 0], DISCOVERY_PORT));
    match DiscoveryResponder::bind(discovery_addr, config.port, config.advertise_ip).await {
        Ok(responder) => {
            let token = shutdown.clone();
            tokio::spawn(responder.run(token));
        }
        Err(err) => {
            tracing::warn!(error = %err, "Discovery disabled");
        }
    }

    let dispatcher = tokio::spawn(dispatch_events(
        watcher,
        Arc::clone(&registry),
        shutdown.clone(),
    ));

    let state = AppState::new(
        Arc::clone(&registry),
        config.watch_dir.clone(),
        watched_dirs,
    );
    let server_config = ServerConfig {
        host: config.host,
        port: config.port,
    };

    let app = App::new(server_config, state);
    let result = app.run(shutdown).await;

    // Let the dispatcher wind down before exiting.
    let _ = dispatcher.await;

    result
}
