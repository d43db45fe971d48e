//! Performance benchmarks for dispatch_core using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dispatch_core::matching::{select_best, Candidate};
use dispatch_core::model::{Driver, Ride};
use dispatch_core::params::AssignmentConfig;
use dispatch_core::routing::{CachedRouteBackend, HaversineRouteBackend, DEFAULT_ROUTE_CACHE_CAPACITY};
use dispatch_core::scheduler::Scheduler;
use dispatch_core::test_helpers::{driver, ride, test_point_km};
use tokio::runtime::Runtime;

fn fleet(count: usize) -> Vec<Driver> {
    (0..count)
        .map(|i| {
            let angle = i as f64 * 0.7;
            let radius_km = 1.0 + (i % 6) as f64 * 1.5;
            let home = test_point_km(radius_km * angle.sin(), radius_km * angle.cos());
            driver(&format!("d{i}"), home, 2 + (i % 4) as u32, 0.1 + 0.02 * (i % 7) as f64)
        })
        .collect()
}

fn rides(count: usize) -> Vec<Ride> {
    (0..count)
        .map(|i| {
            let start = 5 * 60 + (i * 11) % (14 * 60);
            let end = start + 10 + (i * 17) % 40;
            let pickup = test_point_km(((i * 3) % 19) as f64 - 9.0, ((i * 7) % 15) as f64 - 7.0);
            let dropoff = test_point_km(((i * 5) % 13) as f64 - 6.0, ((i * 11) % 17) as f64 - 8.0);
            ride(
                &format!("r{i}"),
                &format!("{:02}:{:02}", start / 60, start % 60),
                &format!("{:02}:{:02}", end / 60, end % 60),
                pickup,
                dropoff,
                1 + (i % 4) as u32,
            )
        })
        .collect()
}

fn bench_assignment_run(c: &mut Criterion) {
    let runtime = Runtime::new().expect("tokio runtime");
    let scenarios = vec![("small", 20, 100), ("medium", 50, 400), ("large", 100, 1000)];

    let mut group = c.benchmark_group("assignment_run");
    group.sample_size(10);
    for (name, driver_count, ride_count) in scenarios {
        let drivers = fleet(driver_count);
        let rides = rides(ride_count);
        group.bench_with_input(
            BenchmarkId::from_parameter(name),
            &(drivers, rides),
            |b, (drivers, rides)| {
                b.to_async(&runtime).iter(|| async {
                    let scheduler =
                        Scheduler::new(HaversineRouteBackend::default(), &AssignmentConfig::default());
                    black_box(scheduler.assign(drivers, rides).await)
                });
            },
        );
    }
    group.finish();
}

fn bench_cached_backend(c: &mut Criterion) {
    let runtime = Runtime::new().expect("tokio runtime");
    let drivers = fleet(50);
    let rides = rides(400);

    let mut group = c.benchmark_group("route_cache");
    group.sample_size(10);
    group.bench_function("uncached", |b| {
        b.to_async(&runtime).iter(|| async {
            let scheduler =
                Scheduler::new(HaversineRouteBackend::default(), &AssignmentConfig::default());
            black_box(scheduler.assign(&drivers, &rides).await)
        });
    });
    group.bench_function("cached", |b| {
        b.to_async(&runtime).iter(|| async {
            let backend = CachedRouteBackend::new(
                HaversineRouteBackend::default(),
                DEFAULT_ROUTE_CACHE_CAPACITY,
            );
            let scheduler = Scheduler::new(backend, &AssignmentConfig::default());
            black_box(scheduler.assign(&drivers, &rides).await)
        });
    });
    group.finish();
}

fn bench_select_best(c: &mut Criterion) {
    let evaluations: Vec<Option<Candidate>> = (0..500)
        .map(|i| (i % 3 != 0).then(|| Candidate::new(i, 10.0 + (i % 17) as f64, (i % 5) as f64)))
        .collect();

    c.bench_function("select_best_500_drivers", |b| {
        b.iter(|| black_box(select_best(black_box(&evaluations))));
    });
}

criterion_group!(benches, bench_assignment_run, bench_cached_backend, bench_select_best);
criterion_main!(benches);
