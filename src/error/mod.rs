//! Error types and Result aliases for the hot-reload server.
//!
//! This module defines the error hierarchy used throughout the crate.
//! All public functions return `Result<T, Error>` or `Result<T>`.

use thiserror::Error;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for server operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// File watching error.
    #[error("watcher error: {0}")]
    Watcher(#[from] WatcherError),

    /// HTTP server error.
    #[error("server error: {0}")]
    Server(#[from] ServerError),

    /// Discovery responder error.
    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// File watcher errors.
#[derive(Error, Debug)]
pub enum WatcherError {
    /// Failed to create the OS watcher.
    #[error("failed to create watcher: {0}")]
    InitFailed(String),

    /// Failed to walk the watch root.
    #[error("failed to scan '{path}': {reason}")]
    ScanFailed { path: String, reason: String },
}

/// HTTP server errors.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Failed to bind to address.
    #[error("failed to bind to {address}: {reason}")]
    BindFailed { address: String, reason: String },

    /// Request handling error.
    #[error("request error: {0}")]
    Request(String),
}

/// Discovery responder errors.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Failed to bind the UDP socket.
    #[error("failed to bind discovery socket on {address}: {reason}")]
    BindFailed { address: String, reason: String },

    /// Failed to read the socket's local address.
    #[error("discovery socket has no local address: {0}")]
    NoLocalAddr(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl WatcherError {
    /// Create a scan-failure error for a path.
    pub fn scan_failed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ScanFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
