//! Assign a synthetic day of rides to 40 drivers, with and without fairness, and print a summary.
//!
//! Run with: cargo run -p dispatch_core --example assign_run

use dispatch_core::matching::PenaltyCurve;
use dispatch_core::metrics::AssignmentResult;
use dispatch_core::model::{Driver, Ride};
use dispatch_core::params::AssignmentConfig;
use dispatch_core::routing::{CachedRouteBackend, HaversineRouteBackend, DEFAULT_ROUTE_CACHE_CAPACITY};
use dispatch_core::scheduler::{AssignmentError, Scheduler};
use dispatch_core::test_helpers::{driver, ride, test_point_km};

const NUM_DRIVERS: usize = 40;
const NUM_RIDES: usize = 300;

fn drivers() -> Vec<Driver> {
    (0..NUM_DRIVERS)
        .map(|i| {
            let angle = i as f64 * 0.61;
            let radius_km = 0.5 + (i % 8) as f64;
            let home = test_point_km(radius_km * angle.sin(), radius_km * angle.cos());
            driver(&format!("driver-{i:02}"), home, 3 + (i % 3) as u32, 0.12 + 0.01 * (i % 6) as f64)
        })
        .collect()
}

fn rides() -> Vec<Ride> {
    (0..NUM_RIDES)
        .map(|i| {
            let start = 6 * 60 + (i * 13) % (12 * 60);
            let end = start + 8 + (i * 7) % 45;
            let pickup = test_point_km(((i * 5) % 21) as f64 - 10.0, ((i * 3) % 17) as f64 - 8.0);
            let dropoff = test_point_km(((i * 7) % 19) as f64 - 9.0, ((i * 11) % 23) as f64 - 11.0);
            ride(
                &format!("ride-{i:03}"),
                &format!("{:02}:{:02}", start / 60, start % 60),
                &format!("{:02}:{:02}", end / 60, end % 60),
                pickup,
                dropoff,
                1 + (i % 5) as u32,
            )
        })
        .collect()
}

async fn run(config: &AssignmentConfig, drivers: &[Driver], rides: &[Ride]) -> Result<AssignmentResult, AssignmentError> {
    let backend = CachedRouteBackend::new(HaversineRouteBackend::default(), DEFAULT_ROUTE_CACHE_CAPACITY);
    Scheduler::new(backend, config).assign(drivers, rides).await
}

fn print_summary(label: &str, result: &AssignmentResult) {
    println!("--- {label} ---");
    println!("Drivers with rides: {}", result.assignments.len());
    println!("Assigned rides: {}", result.assigned_ride_count());
    println!("Unassigned rides: {}", result.unassigned_ride_ids.len());
    println!("Base cost: {:.2}", result.real_base_cost);
    println!("Penalty: {:.2}", result.total_penalty);
    println!("Total cost: {}", result.total_cost);
    if let Some(stats) = &result.fairness {
        println!(
            "Rides per driver: min={} max={} avg={:.2} std_dev={:.2}",
            stats.min, stats.max, stats.avg, stats.std_dev
        );
    }
    println!();
}

#[tokio::main]
async fn main() -> Result<(), AssignmentError> {
    let drivers = drivers();
    let rides = rides();

    let plain = run(&AssignmentConfig::default(), &drivers, &rides).await?;
    print_summary("Cost only", &plain);

    let fair_config = AssignmentConfig::default().with_fairness(PenaltyCurve::Quadratic, 2.0);
    let fair = run(&fair_config, &drivers, &rides).await?;
    print_summary("Quadratic fairness (weight 2)", &fair);

    Ok(())
}
