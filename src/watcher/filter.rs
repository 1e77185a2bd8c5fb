//! Path classification for tracked source files.

use std::path::Path;

/// File extensions the service exists to watch. Intrinsic to the QML
/// workflow, deliberately not user-configurable.
const TRACKED_EXTENSIONS: &[&str] = &["qml", "js"];

/// Module manifest filename tracked by exact name, extension or not.
const MODULE_MANIFEST: &str = "qmldir";

/// Check whether a path is a tracked source file.
///
/// True iff the extension is `.qml` or `.js` (case-insensitive) or the
/// base filename is exactly `qmldir`. Pure and total: no I/O, no error
/// cases, directories and files are judged by name alone.
#[must_use]
pub fn is_tracked_file(path: &Path) -> bool {
    if path.file_name().and_then(|n| n.to_str()) == Some(MODULE_MANIFEST) {
        return true;
    }

    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            TRACKED_EXTENSIONS
                .iter()
                .any(|tracked| ext.eq_ignore_ascii_case(tracked))
        })
}
