//! Static file serving from the watched directory tree.
//!
//! The served tree is the watched tree itself: clients fetch the QML
//! sources they are told to reload straight from here. Paths are
//! resolved verbatim under the watch root; this server is meant for a
//! trusted development LAN, not the open internet.

use axum::extract::State;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;

use super::app::AppState;

/// File served for requests to `/`.
pub const DEFAULT_ENTRY_FILE: &str = "index.qml";

/// Create router serving files from the watch root.
pub fn static_router(state: AppState) -> Router {
    Router::new().fallback(serve_file).with_state(state)
}

/// Serve a file from the watch root, mapping `/` to the entry file.
async fn serve_file(State(state): State<AppState>, uri: Uri) -> Response {
    let requested = uri.path().trim_start_matches('/');
    let relative = if requested.is_empty() {
        DEFAULT_ENTRY_FILE
    } else {
        requested
    };
    let path = state.watch_root.join(relative);

    match tokio::fs::read(&path).await {
        Ok(contents) => {
            let mime = mime_guess::from_path(&path).first_or_text_plain();
            tracing::debug!(path = %path.display(), bytes = contents.len(), "File served");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.to_string())],
                contents,
            )
                .into_response()
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "File not found");
            StatusCode::NOT_FOUND.into_response()
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Failed to read file");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
