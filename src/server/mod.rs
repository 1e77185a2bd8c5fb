//! HTTP server, client sessions and observability.
//!
//! This module provides:
//! - WebSocket notification sessions on `/ws`
//! - Static file serving from the watch root
//! - Health, metrics and status endpoints using axum
//! - Tracing and Prometheus initialization

mod app;
pub mod metrics;
mod observability;
pub mod registry;
mod rest;
mod session;
mod static_files;

pub use app::{App, AppState, ServerConfig};
pub use metrics::init_metrics;
pub use observability::init_tracing;
pub use registry::ConnectionRegistry;
