//! WebSocket client sessions.
//!
//! Each client runs through one lifecycle: upgrade, handshake,
//! registration, pump loop, teardown. The handshake goes out before
//! the client is registered, so the connected frame is always the
//! first thing a client receives and no broadcast can precede it.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use tokio::sync::mpsc;

use crate::protocol::{ChangeEvent, EventKind};
use crate::server::app::AppState;
use crate::server::registry::OUTBOUND_BUFFER;

/// Handle a WebSocket upgrade request on `/ws`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Drive an established WebSocket connection until either side closes.
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let handshake = match serde_json::to_string(&ChangeEvent::connected()) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::error!(error = %err, "Failed to serialize handshake");
            return;
        }
    };

    // A client we cannot even greet is never registered.
    if socket.send(Message::Text(handshake.into())).await.is_err() {
        tracing::debug!("Client hung up before handshake");
        return;
    }

    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_BUFFER);
    let client_id = state.registry.register(tx);

    loop {
        tokio::select! {
            // Forward queued change notifications to the client.
            queued = rx.recv() => {
                match queued {
                    Some(payload) => {
                        if socket.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    // Queue closed: the registry evicted us.
                    None => break,
                }
            }
            // Drain inbound traffic; clients only ever report errors.
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(event) = serde_json::from_str::<ChangeEvent>(text.as_str()) {
                            if event.kind == EventKind::Error {
                                tracing::warn!(
                                    client_id = %client_id,
                                    message = event.message.as_deref().unwrap_or(""),
                                    "Client reported error"
                                );
                            }
                        }
                    }
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    // Converges with broadcast-side eviction: whichever runs second
    // finds nothing left to remove.
    state.registry.unregister(client_id);
    tracing::debug!(client_id = %client_id, "Session closed");
}
