//! Deterministic city-scale fixtures around the shared test origin.

use dispatch_core::model::{Driver, Ride};
use dispatch_core::test_helpers::{driver, inactive_driver, ride, test_point_km};

/// Drivers spread on a ring around the origin with varied seats and fuel costs.
pub fn ring_fleet(count: usize) -> Vec<Driver> {
    (0..count)
        .map(|i| {
            let angle = i as f64 * 0.9;
            let radius_km = 1.0 + (i % 4) as f64 * 2.5;
            let home = test_point_km(radius_km * angle.sin(), radius_km * angle.cos());
            let id = format!("driver-{i:02}");
            if i % 7 == 6 {
                inactive_driver(&id, home, 4)
            } else {
                driver(&id, home, 2 + (i % 3) as u32, 0.15 + 0.05 * (i % 5) as f64)
            }
        })
        .collect()
}

/// Rides through the morning, some overlapping, with varied seat needs.
pub fn morning_rides(count: usize) -> Vec<Ride> {
    (0..count)
        .map(|i| {
            let start_minute = 6 * 60 + (i * 7) % 240;
            let duration = 10 + (i * 13) % 35;
            let end_minute = start_minute + duration;
            let pickup = test_point_km(((i * 3) % 11) as f64 - 5.0, ((i * 5) % 13) as f64 - 6.0);
            let dropoff = test_point_km(((i * 7) % 17) as f64 - 8.0, ((i * 2) % 9) as f64 - 4.0);
            ride(
                &format!("ride-{i:03}"),
                &clock(start_minute),
                &clock(end_minute),
                pickup,
                dropoff,
                1 + (i % 4) as u32,
            )
        })
        .collect()
}

pub fn clock(minute: usize) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}
