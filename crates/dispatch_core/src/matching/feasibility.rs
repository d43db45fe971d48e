//! Can a driver legally take a ride next?

use h3o::LatLng;

use crate::distance::DistanceProvider;
use crate::model::{Driver, Ride};
use crate::routing::RouteBackend;

/// Why a driver cannot serve a ride.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Infeasibility {
    Inactive,
    InsufficientSeats { capacity: u32, required: u32 },
    /// No usable road route to the pickup (filtered, failed or timed out).
    Unreachable,
    /// The driver would arrive after the ride starts.
    ArrivesLate { arrival_minute: f64, start_minute: u32 },
}

/// Where and when the driver becomes free: the end of `previous`, or home at midnight.
pub fn departure_point(driver: &Driver, previous: Option<&Ride>) -> (LatLng, u32) {
    match previous {
        Some(ride) => (ride.end_location, ride.end_time.minutes()),
        None => (driver.home, 0),
    }
}

/// Check activity, capacity and arrival-before-start, in that order.
///
/// Arriving exactly at the start time is feasible.
pub async fn check_feasibility<B: RouteBackend>(
    distances: &DistanceProvider<B>,
    driver: &Driver,
    ride: &Ride,
    previous: Option<&Ride>,
) -> Result<(), Infeasibility> {
    if !driver.is_active() {
        return Err(Infeasibility::Inactive);
    }
    if driver.seat_capacity < ride.seats_required {
        return Err(Infeasibility::InsufficientSeats {
            capacity: driver.seat_capacity,
            required: ride.seats_required,
        });
    }

    let (origin, available_minute) = departure_point(driver, previous);
    let travel_minutes = distances
        .road_travel_minutes(origin, ride.start_location)
        .await;
    if !travel_minutes.is_finite() {
        return Err(Infeasibility::Unreachable);
    }

    let arrival_minute = f64::from(available_minute) + travel_minutes;
    let start_minute = ride.start_time.minutes();
    if arrival_minute > f64::from(start_minute) {
        return Err(Infeasibility::ArrivesLate {
            arrival_minute,
            start_minute,
        });
    }
    Ok(())
}

pub async fn can_serve<B: RouteBackend>(
    distances: &DistanceProvider<B>,
    driver: &Driver,
    ride: &Ride,
    previous: Option<&Ride>,
) -> bool {
    check_feasibility(distances, driver, ride, previous)
        .await
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DriverStatus;
    use crate::params::AssignmentConfig;
    use crate::routing::{RouteLeg, TableRouteBackend};
    use crate::test_helpers::{driver, point, ride};

    fn provider(backend: TableRouteBackend) -> DistanceProvider<TableRouteBackend> {
        DistanceProvider::new(backend, &AssignmentConfig::default())
    }

    #[tokio::test]
    async fn inactive_driver_is_rejected_first() {
        let home = point(52.5, 13.4);
        let mut d = driver("d1", home, 4, 1.0);
        d.status = DriverStatus::Inactive;
        let r = ride("r1", "08:00", "08:20", home, home, 1);
        let distances = provider(TableRouteBackend::new());
        assert_eq!(
            check_feasibility(&distances, &d, &r, None).await,
            Err(Infeasibility::Inactive)
        );
    }

    #[tokio::test]
    async fn capacity_must_cover_seats() {
        let home = point(52.5, 13.4);
        let d = driver("d1", home, 2, 1.0);
        let r = ride("r1", "08:00", "08:20", home, home, 3);
        let distances = provider(TableRouteBackend::new());
        assert_eq!(
            check_feasibility(&distances, &d, &r, None).await,
            Err(Infeasibility::InsufficientSeats {
                capacity: 2,
                required: 3
            })
        );
    }

    #[tokio::test]
    async fn zero_slack_arrival_is_feasible() {
        let home = point(52.5, 13.4);
        let pickup = point(52.55, 13.45);
        let backend = TableRouteBackend::new().with_leg(home, pickup, RouteLeg::new(600.0, 5_000.0));
        let distances = provider(backend);
        let d = driver("d1", home, 4, 1.0);

        // 10 minutes of travel from midnight: exactly on time at 00:10.
        let on_time = ride("r1", "00:10", "00:30", pickup, home, 1);
        assert!(can_serve(&distances, &d, &on_time, None).await);

        let too_early = ride("r2", "00:09", "00:30", pickup, home, 1);
        assert!(matches!(
            check_feasibility(&distances, &d, &too_early, None).await,
            Err(Infeasibility::ArrivesLate { .. })
        ));
    }

    #[tokio::test]
    async fn previous_ride_sets_origin_and_availability() {
        let home = point(52.5, 13.4);
        let dropoff = point(52.6, 13.5);
        let pickup = point(52.62, 13.52);
        let backend = TableRouteBackend::new().with_leg(dropoff, pickup, RouteLeg::new(900.0, 3_000.0));
        let distances = provider(backend);
        let d = driver("d1", home, 4, 1.0);
        let previous = ride("r0", "08:00", "08:30", home, dropoff, 1);

        // 08:30 + 15 min = 08:45.
        let next = ride("r1", "08:45", "09:00", pickup, home, 1);
        assert!(can_serve(&distances, &d, &next, Some(&previous)).await);
        let clash = ride("r2", "08:44", "09:00", pickup, home, 1);
        assert!(!can_serve(&distances, &d, &clash, Some(&previous)).await);
    }

    #[tokio::test]
    async fn missing_route_is_unreachable() {
        let home = point(52.5, 13.4);
        let pickup = point(52.55, 13.45);
        let distances = provider(TableRouteBackend::new());
        let d = driver("d1", home, 4, 1.0);
        let r = ride("r1", "12:00", "12:30", pickup, home, 1);
        assert_eq!(
            check_feasibility(&distances, &d, &r, None).await,
            Err(Infeasibility::Unreachable)
        );
    }
}
