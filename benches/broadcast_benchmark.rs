//! Performance benchmarks for the hot-reload broadcast path.
//!
//! **Benchmarks included:**
//! - `classify_path`: Path classification throughput on a mixed set of paths
//! - `serialize_event`: One-time JSON serialization of a change notification
//! - `broadcast`: Fan-out of a single change event at 1, 16 and 128 clients
//!
//! **Run benchmarks:**
//! ```bash
//! cargo bench                  # Run all benchmarks
//! cargo bench -- broadcast     # Fan-out only
//! ```
//!
//! The broadcast benchmark uses a fresh registry per iteration so queue
//! backpressure from earlier iterations cannot evict clients mid-measurement.

use std::path::{Path, PathBuf};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hotwatch_server::protocol::ChangeEvent;
use hotwatch_server::server::registry::OUTBOUND_BUFFER;
use hotwatch_server::server::ConnectionRegistry;
use hotwatch_server::watcher::is_tracked_file;
use tokio::sync::mpsc;

/// A registry with `clients` registered queues, plus the receivers that
/// keep those queues open.
fn populated_registry(clients: usize) -> (ConnectionRegistry, Vec<mpsc::Receiver<String>>) {
    let registry = ConnectionRegistry::new();
    let mut receivers = Vec::with_capacity(clients);
    for _ in 0..clients {
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        registry.register(tx);
        receivers.push(rx);
    }
    (registry, receivers)
}

/// Benchmark: path classification on a realistic mix of paths.
fn bench_classify_path(c: &mut Criterion) {
    let paths: Vec<PathBuf> = [
        "ui/Main.qml",
        "ui/components/Button.QML",
        "scripts/logic.js",
        "modules/Ui/qmldir",
        "assets/logo.png",
        "README.md",
        "build/Main.qml.bak",
        "deep/nested/tree/View.qml",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();

    c.bench_function("classify_path", |b| {
        b.iter(|| {
            for path in &paths {
                black_box(is_tracked_file(black_box(path)));
            }
        });
    });
}

/// Benchmark: serializing a change notification once.
fn bench_serialize_event(c: &mut Criterion) {
    let event = ChangeEvent::file_changed(Path::new("ui/components/Button.qml"));

    c.bench_function("serialize_event", |b| {
        b.iter(|| {
            let payload = serde_json::to_string(black_box(&event)).unwrap();
            black_box(payload);
        });
    });
}

/// Benchmark: broadcasting one event to N connected clients.
fn bench_broadcast(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast");
    group.sample_size(50);

    for clients in &[1usize, 16, 128] {
        group.bench_with_input(
            BenchmarkId::from_parameter(clients),
            clients,
            |b, &clients| {
                let event = ChangeEvent::file_changed(Path::new("ui/Main.qml"));
                b.iter_batched(
                    || populated_registry(clients),
                    |(registry, receivers)| {
                        let delivered = registry.broadcast(black_box(&event));
                        assert_eq!(delivered, clients);
                        black_box(receivers);
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_classify_path,
    bench_serialize_event,
    bench_broadcast,
);

criterion_main!(benches);
