//! Wire protocol shared with live-view clients.
//!
//! Two surfaces live here:
//!
//! - the JSON event schema exchanged over the WebSocket channel, and
//! - the magic strings and port of the UDP discovery exchange.
//!
//! Both are compatibility contracts: field names, tag values, and magic
//! payloads must not change without breaking deployed clients.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// UDP port the discovery responder listens on.
pub const DISCOVERY_PORT: u16 = 45454;

/// Exact probe payload a client broadcasts to locate the server.
pub const DISCOVERY_PROBE: &[u8] = b"HotWatchDiscovery";

/// Prefix of the discovery reply, followed by the server's HTTP URL.
pub const DISCOVERY_REPLY_PREFIX: &str = "HotWatchServer:";

/// Sentinel `path` value carried by the `connected` handshake event.
/// Existing clients expect this exact marker.
pub const CONNECTED_SENTINEL: &str = "test";

/// Event tag, serialized as the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// Handshake sent once when a channel opens.
    Connected,
    /// A tracked file was created or modified.
    FileChanged,
    /// Advisory error report, only ever client-originated.
    Error,
}

/// A message on the duplex notification channel, in either direction.
///
/// Serializes to a self-describing JSON record so heterogeneous clients can
/// parse it without shared code:
///
/// ```text
/// {"type":"fileChanged","path":"/srv/qml/Main.qml"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Event tag.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Changed file for `fileChanged`, sentinel for `connected`, empty
    /// otherwise. Always serialized; tolerated missing on the inbound side.
    #[serde(default)]
    pub path: String,
    /// Free text, populated only for `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ChangeEvent {
    /// Handshake event sent to a client immediately after upgrade.
    #[must_use]
    pub fn connected() -> Self {
        Self {
            kind: EventKind::Connected,
            path: CONNECTED_SENTINEL.to_string(),
            message: None,
        }
    }

    /// Notification that a tracked file changed.
    #[must_use]
    pub fn file_changed(path: &Path) -> Self {
        Self {
            kind: EventKind::FileChanged,
            path: path.display().to_string(),
            message: None,
        }
    }

    /// Advisory error payload (the shape clients send; used in tests).
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Error,
            path: String::new(),
            message: Some(message.into()),
        }
    }
}
