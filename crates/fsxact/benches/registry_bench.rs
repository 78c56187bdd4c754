//! Benchmarks for registry acquire/release and the transaction cycle.

#![allow(missing_docs)]

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use fsxact::device::Device;
use fsxact::registry::BackendRegistry;
use fsxact::Env;
use fsxact_backend::backends::{MemJournalBackend, MemJournalConfig};

fn registry_with_backend() -> BackendRegistry {
    let registry = BackendRegistry::new();
    registry
        .register(Arc::new(MemJournalBackend::new("memjournal")))
        .expect("failed to register");
    registry
}

/// Benchmark the acquire/release hot path.
fn bench_acquire_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_acquire_release");
    group.throughput(Throughput::Elements(1));

    let registry = registry_with_backend();
    group.bench_function("acquire_release", |b| {
        b.iter(|| {
            let handle = registry.acquire(black_box("memjournal")).unwrap();
            drop(handle);
        });
    });

    group.finish();
}

/// Benchmark one full create/start/stop transaction cycle.
fn bench_txn_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("txn_cycle");
    group.throughput(Throughput::Elements(1));

    group.bench_function("commit", |b| {
        b.iter_batched(
            || {
                let registry = registry_with_backend();
                let handle = registry.acquire("memjournal").unwrap();
                Device::new("mds0", handle)
            },
            |device| {
                let env = Env::new();
                let mut txn = device.begin(&env).unwrap();
                txn.start(&env).unwrap();
                txn.stop(&env, 0).unwrap();
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Benchmark transaction creates against a bounded journal.
fn bench_bounded_journal(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounded_journal");

    for cap in [16, 256] {
        group.bench_function(format!("cycle_cap_{cap}"), |b| {
            let registry = BackendRegistry::new();
            registry
                .register(Arc::new(MemJournalBackend::with_config(
                    "memjournal",
                    MemJournalConfig { max_live_txns: cap },
                )))
                .expect("failed to register");
            let device = Device::new("mds0", registry.acquire("memjournal").unwrap());
            let env = Env::new();

            b.iter(|| {
                let mut txn = device.begin(&env).unwrap();
                txn.start(&env).unwrap();
                txn.stop(&env, 0).unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_acquire_release, bench_txn_cycle, bench_bounded_journal);
criterion_main!(benches);
