//! Benchmark for store throughput and full cycle runs.
//!
//! TARGET: a 100-cycle, 2-collector run well under a millisecond per cycle
//!
//! Run with: cargo bench --package nightshift_core --bench cycle_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nightshift_core::{CycleOrchestrator, InventoryStore, SimulationConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn benchmark_produce_drain(c: &mut Criterion) {
    let store = InventoryStore::new();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let mut group = c.benchmark_group("store");
    group.throughput(Throughput::Elements(1));
    group.bench_function("produce_then_drain", |b| {
        b.iter(|| {
            let produced = store.produce(&mut rng);
            black_box(store.drain(black_box(produced)))
        });
    });
    group.finish();
}

fn benchmark_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation");
    group.sample_size(20);

    for collectors in [1usize, 2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("100_cycles", collectors),
            &collectors,
            |b, &collectors| {
                b.iter(|| {
                    let mut config = SimulationConfig::uniform(100, collectors, 5, 42);
                    config.record_history = false;
                    let outcome = CycleOrchestrator::new(config)
                        .expect("valid config")
                        .run()
                        .expect("run completes");
                    black_box(outcome.total_collected())
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, benchmark_produce_drain, benchmark_full_run);
criterion_main!(benches);
