//! Bridges the watch stream to connected clients.

use std::sync::Arc;

use notify::event::{EventKind, ModifyKind, RenameMode};
use tokio_util::sync::CancellationToken;

use crate::protocol::ChangeEvent;
use crate::server::metrics;
use crate::server::registry::ConnectionRegistry;
use crate::watcher::filter::is_tracked_file;
use crate::watcher::watcher::{FileWatcher, WatchSignal};

/// Pump the watch stream until the backend closes or shutdown is
/// requested.
pub async fn dispatch_events(
    mut watcher: FileWatcher,
    registry: Arc<ConnectionRegistry>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                tracing::info!("Dispatcher shutting down");
                break;
            }
            signal = watcher.recv() => {
                match signal {
                    Some(signal) => process_signal(&signal, &registry),
                    None => {
                        tracing::warn!("Watch stream ended");
                        break;
                    }
                }
            }
        }
    }
}

/// Handle one item from the watch stream.
///
/// Creations and content writes of tracked files fan out to clients;
/// everything else is dropped. Watch errors are logged and never
/// forwarded.
fn process_signal(signal: &WatchSignal, registry: &ConnectionRegistry) {
    match signal {
        WatchSignal::Event(event) => {
            if !is_relevant(&event.kind) {
                metrics::FS_EVENTS.with_label_values(&["ignored"]).inc();
                return;
            }

            let mut broadcast_any = false;
            for path in &event.paths {
                if !is_tracked_file(path) {
                    continue;
                }
                tracing::info!(path = %path.display(), "File changed");
                registry.broadcast(&ChangeEvent::file_changed(path));
                broadcast_any = true;
            }

            let disposition = if broadcast_any { "broadcast" } else { "ignored" };
            metrics::FS_EVENTS.with_label_values(&[disposition]).inc();
        }
        WatchSignal::Error(err) => {
            tracing::warn!(error = %err, "Watch error");
            metrics::FS_EVENTS.with_label_values(&["error"]).inc();
        }
    }
}

/// Event kinds that represent a file being created or written,
/// including a rename into place (how editors save atomically).
///
/// Only the moved-to half of a rename qualifies: the departing half is
/// a disappearance, and the paired both-ends event always accompanies
/// a moved-to for the same rename. Metadata touches and removals do
/// not trigger a reload.
fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(
                ModifyKind::Data(_) | ModifyKind::Any | ModifyKind::Name(RenameMode::To)
            )
    )
}
