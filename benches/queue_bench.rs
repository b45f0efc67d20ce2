//! Benchmarks for the island queue.
//!
//! Benchmarks cover:
//! - Join/leave churn on a single island (admission window sliding)
//! - Island id allocation as the directory fills up
//! - A sweep cycle over many islands
//! - End-to-end joins through the async service

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;
use std::sync::Arc;

use island_queue::builders::ServiceBuilder;
use island_queue::config::TenantSettings;
use island_queue::core::{sweep_once, Directory, Island};
use island_queue::infra::InMemoryNotifier;
use island_queue::util::{Identity, IslandId, TenantId, MINUTE_MS};

use tokio::runtime::Runtime;

fn open_island(size: u8) -> Island {
    let mut island = Island::new(Identity::new(1, "owner"), None, IslandId::new("001"), TenantId(1), 0);
    island.open("BENCH", size).unwrap();
    island
}

// ============================================================================
// Admission window
// ============================================================================

fn bench_join_leave_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("join_leave_churn");

    for size in [10u64, 100, 1000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut island = open_island(3);
                for n in 0..size {
                    island.join(Identity::new(n + 2, "v"), 0, 0, false).unwrap();
                }
                for n in 0..size {
                    black_box(island.leave(island_queue::util::UserId(n + 2), 0));
                }
            });
        });
    }

    group.finish();
}

fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize_window");

    for size in [10u64, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut island = open_island(1);
            for n in 0..size {
                island.join(Identity::new(n + 2, "v"), 0, 0, false).unwrap();
            }
            b.iter(|| {
                black_box(island.update_admission_size(7, 0).unwrap());
                black_box(island.update_admission_size(1, 0).unwrap());
            });
        });
    }

    group.finish();
}

// ============================================================================
// Directory
// ============================================================================

fn bench_id_allocation(c: &mut Criterion) {
    let mut group = c.benchmark_group("id_allocation");

    for filled in [0u64, 500, 900] {
        group.bench_with_input(BenchmarkId::from_parameter(filled), &filled, |b, &filled| {
            let mut dir = Directory::new(3, 1000);
            dir.register_tenant(TenantId(1), TenantSettings::default());
            let mut rng = StdRng::seed_from_u64(11);
            for n in 0..filled {
                dir.create_island(Identity::new(n + 1, "o"), None, TenantId(1), 0, &mut rng)
                    .unwrap();
            }
            b.iter(|| black_box(dir.generate_unique_id(&mut rng).unwrap()));
        });
    }

    group.finish();
}

fn bench_sweep_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep_cycle");

    for islands in [10u64, 100] {
        group.throughput(Throughput::Elements(islands));
        group.bench_with_input(BenchmarkId::from_parameter(islands), &islands, |b, &islands| {
            b.iter_batched(
                || {
                    let mut dir = Directory::new(4, 1000);
                    dir.register_tenant(TenantId(1), TenantSettings::default());
                    let mut rng = StdRng::seed_from_u64(3);
                    for n in 0..islands {
                        let owner = n * 100 + 1;
                        let id = dir
                            .create_island(Identity::new(owner, "o"), None, TenantId(1), 0, &mut rng)
                            .unwrap()
                            .id()
                            .clone();
                        let island = dir.find_by_id_mut(&id).unwrap();
                        island.open("CODE", 3).unwrap();
                        for v in 1..20 {
                            island.join(Identity::new(owner + v, "v"), 0, 0, false).unwrap();
                        }
                    }
                    dir
                },
                |mut dir| black_box(sweep_once(&mut dir, 10, 31 * MINUTE_MS)),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

// ============================================================================
// Service
// ============================================================================

fn bench_service_joins(c: &mut Criterion) {
    let mut group = c.benchmark_group("service_joins");

    for visitors in [10u64, 100] {
        group.throughput(Throughput::Elements(visitors));
        group.bench_with_input(
            BenchmarkId::from_parameter(visitors),
            &visitors,
            |b, &visitors| {
                b.to_async(Runtime::new().unwrap()).iter(|| async move {
                    let service = ServiceBuilder::new()
                        .with_notifier(Arc::new(InMemoryNotifier::new()))
                        .build()
                        .unwrap();
                    service.register_tenant(TenantId(1)).await.unwrap();
                    let island = service
                        .create_and_open(Identity::new(1, "owner"), TenantId(1), "CODE".into(), None, None)
                        .await
                        .unwrap();
                    for n in 0..visitors {
                        black_box(service.join(Identity::new(n + 2, "v"), &island.id, 0).await.unwrap());
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_join_leave_churn,
    bench_resize,
    bench_id_allocation,
    bench_sweep_cycle,
    bench_service_joins
);
criterion_main!(benches);
