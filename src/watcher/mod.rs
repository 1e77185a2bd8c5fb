//! File system watching and change dispatch.
//!
//! This module provides:
//! - Classification of tracked source files
//! - A startup scan that discovers directories to watch
//! - A notify-rs watcher over those directories
//! - A dispatcher that fans qualifying changes out to clients
//!
//! Watches are per-directory and non-recursive: the set of watched
//! directories is fixed by the startup scan, so files added to brand
//! new directories afterwards need a restart to be seen.

mod dispatcher;
mod filter;
mod scanner;
#[allow(clippy::module_inception)]
mod watcher;

pub use dispatcher::dispatch_events;
pub use filter::is_tracked_file;
pub use scanner::{scan_tree, ScanReport};
pub use watcher::{FileWatcher, WatchSignal};
