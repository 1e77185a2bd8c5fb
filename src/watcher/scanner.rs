//! Startup scan that discovers which directories need watching.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Result, WatcherError};
use crate::watcher::filter::is_tracked_file;

/// Outcome of a startup scan of the watch root.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Directories containing at least one tracked file, deduplicated
    /// and in stable (lexicographic) order. Includes the root itself
    /// when it holds tracked files directly.
    pub watch_dirs: Vec<PathBuf>,
    /// Tracked files seen during the walk.
    pub files_matched: u64,
    /// Entries the walk could not read (permissions, dangling links).
    pub walk_errors: u64,
}

/// Walk `root` and collect the set of directories to watch.
///
/// Every directory that directly contains a tracked file is included
/// once. Unreadable entries below the root are logged and skipped; an
/// unreadable root is fatal because it means nothing can be watched.
pub fn scan_tree(root: &Path) -> Result<ScanReport> {
    let mut dirs = BTreeSet::new();
    let mut files_matched = 0u64;
    let mut walk_errors = 0u64;

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                // Depth 0 is the root itself; if that is unreadable
                // there is nothing to watch at all.
                if err.depth() == 0 {
                    return Err(WatcherError::scan_failed(
                        root.display().to_string(),
                        err.to_string(),
                    )
                    .into());
                }
                tracing::warn!(error = %err, "Skipping unreadable entry during scan");
                walk_errors += 1;
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        if !is_tracked_file(entry.path()) {
            continue;
        }

        files_matched += 1;
        if let Some(parent) = entry.path().parent() {
            dirs.insert(parent.to_path_buf());
        }
    }

    let report = ScanReport {
        watch_dirs: dirs.into_iter().collect(),
        files_matched,
        walk_errors,
    };

    tracing::info!(
        root = %root.display(),
        directories = report.watch_dirs.len(),
        files = report.files_matched,
        errors = report.walk_errors,
        "Startup scan complete"
    );

    Ok(report)
}
