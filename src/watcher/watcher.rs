//! File system watcher using notify-rs.

use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::WatcherError;
use crate::watcher::scanner::scan_tree;
use crate::Result;

/// Capacity of the OS-event channel.
const SIGNAL_BUFFER: usize = 256;

/// A single item from the watch stream.
///
/// Events and errors arrive interleaved on one channel so that both
/// streams end together when the watcher is dropped.
#[derive(Debug)]
pub enum WatchSignal {
    /// A raw file system event.
    Event(notify::Event),
    /// A watch error reported by the OS backend.
    Error(notify::Error),
}

/// File system watcher over the directories discovered at startup.
///
/// Directories are registered non-recursively, one per directory that
/// held a tracked file when the scan ran. Directories created later are
/// not picked up; a restart re-scans.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    signal_rx: mpsc::Receiver<WatchSignal>,
    watched_dirs: Vec<PathBuf>,
}

impl FileWatcher {
    /// Scan `root` and start watching every directory that contains
    /// tracked files.
    ///
    /// Individual directories that cannot be registered are logged and
    /// skipped; startup continues with the rest.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be scanned or the OS watcher
    /// cannot be created.
    pub fn new(root: &Path) -> Result<Self> {
        let report = scan_tree(root)?;

        let (signal_tx, signal_rx) = mpsc::channel(SIGNAL_BUFFER);
        let mut watcher = notify::recommended_watcher(
            move |result: std::result::Result<notify::Event, notify::Error>| {
                let signal = match result {
                    Ok(event) => WatchSignal::Event(event),
                    Err(err) => WatchSignal::Error(err),
                };
                // Send fails only when the receiver is gone, i.e. we
                // are shutting down.
                let _ = signal_tx.blocking_send(signal);
            },
        )
        .map_err(|e| WatcherError::InitFailed(e.to_string()))?;

        let mut watched_dirs = Vec::with_capacity(report.watch_dirs.len());
        for dir in &report.watch_dirs {
            match watcher.watch(dir, RecursiveMode::NonRecursive) {
                Ok(()) => {
                    tracing::info!(path = %dir.display(), "Watching directory");
                    watched_dirs.push(dir.clone());
                }
                Err(err) => {
                    tracing::warn!(
                        path = %dir.display(),
                        error = %err,
                        "Failed to watch directory, skipping"
                    );
                }
            }
        }

        Ok(Self {
            _watcher: watcher,
            signal_rx,
            watched_dirs,
        })
    }

    /// Receive the next signal from the watch stream.
    ///
    /// Returns `None` once the watcher backend has shut down.
    pub async fn recv(&mut self) -> Option<WatchSignal> {
        self.signal_rx.recv().await
    }

    /// Directories registered with the OS watcher.
    #[must_use]
    pub fn watched_dirs(&self) -> &[PathBuf] {
        &self.watched_dirs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_new_registers_discovered_dirs() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("Main.qml"), b"").unwrap();
        fs::create_dir(tmp.path().join("ui")).unwrap();
        fs::write(tmp.path().join("ui/View.qml"), b"").unwrap();

        let watcher = FileWatcher::new(tmp.path()).unwrap();

        assert_eq!(watcher.watched_dirs().len(), 2);
    }

    #[test]
    fn test_new_with_no_tracked_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.txt"), b"").unwrap();

        let watcher = FileWatcher::new(tmp.path()).unwrap();

        assert!(watcher.watched_dirs().is_empty());
    }

    #[test]
    fn test_new_missing_root_fails() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("gone");

        assert!(FileWatcher::new(&missing).is_err());
    }
}
