//! Prometheus metrics definitions.

use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter, IntCounterVec,
    IntGauge,
};

/// Currently connected reload clients.
pub static CLIENTS_CONNECTED: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "hotwatch_clients_connected",
        "Number of currently connected reload clients"
    )
    .unwrap()
});

/// Change events broadcast to clients.
pub static EVENTS_BROADCAST: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "hotwatch_events_broadcast_total",
        "Total change notifications broadcast to clients"
    )
    .unwrap()
});

/// Deliveries that failed and evicted the client.
pub static SEND_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "hotwatch_send_failures_total",
        "Total failed deliveries that evicted a client"
    )
    .unwrap()
});

/// File system events by disposition.
pub static FS_EVENTS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "hotwatch_fs_events_total",
        "File system events received, by disposition",
        &["disposition"]
    )
    .unwrap()
});

/// Discovery probes answered.
pub static DISCOVERY_PROBES: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "hotwatch_discovery_probes_total",
        "Total discovery probes answered"
    )
    .unwrap()
});

/// Initialize all metrics (call once at startup).
pub fn init_metrics() {
    // Access lazy statics to register them
    let _ = &*CLIENTS_CONNECTED;
    let _ = &*EVENTS_BROADCAST;
    let _ = &*SEND_FAILURES;
    let _ = &*FS_EVENTS;
    let _ = &*DISCOVERY_PROBES;

    tracing::debug!("Prometheus metrics initialized");
}
