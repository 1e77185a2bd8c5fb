//! Registry of connected reload clients.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::protocol::ChangeEvent;
use crate::server::metrics;

/// Capacity of each client's outbound queue. A client that lets this
/// many notifications pile up is treated as unreachable.
pub const OUTBOUND_BUFFER: usize = 32;

/// Shared set of connected clients.
///
/// All access goes through one mutex, so a broadcast pass sees a stable
/// set: clients added mid-pass get no partial delivery, and eviction is
/// atomic with the pass that discovered the failure. Each client is
/// notified at most once per event.
#[derive(Default)]
pub struct ConnectionRegistry {
    clients: Mutex<HashMap<Uuid, mpsc::Sender<String>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a client's outbound queue and return its id.
    pub fn register(&self, sender: mpsc::Sender<String>) -> Uuid {
        let id = Uuid::new_v4();
        let len = {
            let mut clients = self.clients.lock();
            clients.insert(id, sender);
            clients.len()
        };
        metrics::CLIENTS_CONNECTED.set(i64::try_from(len).unwrap_or(i64::MAX));
        tracing::info!(client_id = %id, clients = len, "Client registered");
        id
    }

    /// Remove a client. Safe to call more than once; returns whether
    /// the client was still present.
    pub fn unregister(&self, id: Uuid) -> bool {
        let (removed, len) = {
            let mut clients = self.clients.lock();
            let removed = clients.remove(&id).is_some();
            (removed, clients.len())
        };
        if removed {
            metrics::CLIENTS_CONNECTED.set(i64::try_from(len).unwrap_or(i64::MAX));
            tracing::info!(client_id = %id, clients = len, "Client unregistered");
        }
        removed
    }

    /// Send `event` to every connected client.
    ///
    /// The event is serialized once and pushed to each client's queue
    /// under the lock. Clients whose queue is full or closed are
    /// evicted on the spot; delivery continues to the rest. Returns the
    /// number of successful deliveries.
    pub fn broadcast(&self, event: &ChangeEvent) -> usize {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(error = %err, "Failed to serialize change event");
                return 0;
            }
        };

        let mut delivered = 0;
        let mut evicted = Vec::new();

        let mut clients = self.clients.lock();
        for (id, sender) in clients.iter() {
            match sender.try_send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(client_id = %id, "Client queue full, evicting");
                    evicted.push(*id);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!(client_id = %id, "Client queue closed, evicting");
                    evicted.push(*id);
                }
            }
        }
        for id in &evicted {
            // Dropping the sender closes the queue and ends the
            // client's session loop.
            clients.remove(id);
        }
        let len = clients.len();
        drop(clients);

        metrics::EVENTS_BROADCAST.inc();
        metrics::SEND_FAILURES.inc_by(evicted.len() as u64);
        metrics::CLIENTS_CONNECTED.set(i64::try_from(len).unwrap_or(i64::MAX));

        tracing::debug!(
            delivered,
            evicted = evicted.len(),
            "Change event broadcast"
        );
        delivered
    }

    /// Number of connected clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    /// Whether any client is connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn change() -> ChangeEvent {
        ChangeEvent::file_changed(Path::new("ui/Main.qml"))
    }

    #[test]
    fn test_register_and_len() {
        let registry = ConnectionRegistry::new();
        assert!(registry.is_empty());

        let (tx, _rx) = mpsc::channel(OUTBOUND_BUFFER);
        registry.register(tx);

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::channel(OUTBOUND_BUFFER);
        let id = registry.register(tx);

        assert!(registry.unregister(id));
        assert!(!registry.unregister(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_broadcast_reaches_every_client() {
        let registry = ConnectionRegistry::new();
        let mut receivers = Vec::new();
        for _ in 0..3 {
            let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
            registry.register(tx);
            receivers.push(rx);
        }

        let delivered = registry.broadcast(&change());

        assert_eq!(delivered, 3);
        for rx in &mut receivers {
            let payload = rx.try_recv().unwrap();
            assert!(payload.contains("\"fileChanged\""));
            // At most one notification per client per event.
            assert!(rx.try_recv().is_err());
        }
    }

    #[test]
    fn test_broadcast_to_empty_registry() {
        let registry = ConnectionRegistry::new();
        assert_eq!(registry.broadcast(&change()), 0);
    }

    #[test]
    fn test_closed_client_is_evicted_others_still_served() {
        let registry = ConnectionRegistry::new();

        let (dead_tx, dead_rx) = mpsc::channel(OUTBOUND_BUFFER);
        registry.register(dead_tx);
        drop(dead_rx);

        let (live_tx, mut live_rx) = mpsc::channel(OUTBOUND_BUFFER);
        registry.register(live_tx);

        let delivered = registry.broadcast(&change());

        assert_eq!(delivered, 1);
        assert_eq!(registry.len(), 1);
        assert!(live_rx.try_recv().is_ok());
    }

    #[test]
    fn test_full_queue_is_evicted_and_closed() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::channel(1);
        registry.register(tx);

        // First pass fills the queue, second finds it full.
        assert_eq!(registry.broadcast(&change()), 1);
        assert_eq!(registry.broadcast(&change()), 0);
        assert!(registry.is_empty());

        // The queued message survives, then the queue reads as closed
        // because the registry dropped its sender.
        assert!(rx.try_recv().is_ok());
        assert_eq!(rx.try_recv(), Err(mpsc::error::TryRecvError::Disconnected));
    }

    #[test]
    fn test_client_lost_between_broadcasts() {
        let registry = ConnectionRegistry::new();
        let (tx_a, rx_a) = mpsc::channel(OUTBOUND_BUFFER);
        let (tx_b, mut rx_b) = mpsc::channel(OUTBOUND_BUFFER);
        registry.register(tx_a);
        registry.register(tx_b);

        assert_eq!(registry.broadcast(&change()), 2);

        drop(rx_a);
        assert_eq!(registry.broadcast(&change()), 1);
        assert_eq!(registry.len(), 1);

        // B saw both events.
        assert!(rx_b.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
    }

    #[test]
    fn test_late_registration_misses_earlier_events() {
        let registry = ConnectionRegistry::new();
        registry.broadcast(&change());

        let (tx, mut rx) = mpsc::channel(OUTBOUND_BUFFER);
        registry.register(tx);

        assert!(rx.try_recv().is_err());
    }
}
