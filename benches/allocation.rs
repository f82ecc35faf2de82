use arena_heap::{FitStrategy, Heap};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Benchmark filling a 1 MiB arena with small allocations
fn bench_bulk_allocate(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_allocate");

    for (name, strategy) in [
        ("first_fit", FitStrategy::FirstFit),
        ("best_fit", FitStrategy::BestFit),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut heap = Heap::new();
                heap.set_strategy(strategy);
                // 64-byte payloads until the arena is exhausted
                while heap.allocate(black_box(64)).is_ok() {}
                black_box(&heap);
            });
        });
    }

    group.finish();
}

/// Benchmark allocate/release cycles that fragment and re-fill the heap
fn bench_alloc_release_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("alloc_release_cycle");

    for (name, strategy) in [
        ("first_fit", FitStrategy::FirstFit),
        ("best_fit", FitStrategy::BestFit),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut heap = Heap::new();
                heap.set_strategy(strategy);

                let mut payloads = Vec::new();
                for _ in 0..512 {
                    payloads.push(heap.allocate(256).unwrap());
                }

                // Punch holes, then satisfy smaller requests from them
                for payload in payloads.iter().step_by(2) {
                    heap.release(*payload).unwrap();
                }
                for _ in 0..256 {
                    heap.allocate(128).unwrap();
                }

                black_box(heap.stats());
            });
        });
    }

    group.finish();
}

/// Benchmark the diagnostics traversal over a fragmented heap
fn bench_stats(c: &mut Criterion) {
    let mut heap = Heap::new();
    let mut payloads = Vec::new();
    for _ in 0..1024 {
        payloads.push(heap.allocate(128).unwrap());
    }
    for payload in payloads.iter().step_by(2) {
        heap.release(*payload).unwrap();
    }

    c.bench_function("stats_fragmented", |b| {
        b.iter(|| black_box(heap.stats()));
    });
}

criterion_group!(
    benches,
    bench_bulk_allocate,
    bench_alloc_release_cycle,
    bench_stats
);
criterion_main!(benches);
