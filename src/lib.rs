//! Hot-reload notification server for QML development.
//!
//! Watches a directory tree for changes to QML sources, pushes change
//! notifications to connected clients over WebSocket, serves the files
//! themselves over HTTP and answers LAN discovery probes over UDP.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod discovery;
pub mod error;
pub mod protocol;
pub mod server;
pub mod watcher;

pub use config::Config;
pub use error::{Error, Result};
