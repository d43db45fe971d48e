//! Test helpers for common fixtures.
//!
//! Shared by unit tests, integration tests, benches and examples so that
//! every fixture builds drivers and rides the same way.

use h3o::LatLng;

use crate::clock::parse_time_of_day;
use crate::model::{location, Driver, DriverStatus, Ride};
use crate::spatial::offset_km;

/// Berlin Mitte, the origin used across test files for consistency.
pub const TEST_ORIGIN: (f64, f64) = (52.52, 13.405);

/// Build a coordinate.
///
/// # Panics
///
/// Panics if the coordinate is out of range.
pub fn point(lat: f64, lon: f64) -> LatLng {
    location(lat, lon).expect("test coordinate should be valid")
}

/// The shared test origin as a `LatLng`.
pub fn test_origin() -> LatLng {
    point(TEST_ORIGIN.0, TEST_ORIGIN.1)
}

/// A point the given kilometres north/east of the test origin.
///
/// # Panics
///
/// Panics if the offset leaves the valid coordinate range.
pub fn test_point_km(north_km: f64, east_km: f64) -> LatLng {
    offset_km(test_origin(), north_km, east_km).expect("offset should stay in range")
}

/// An active driver.
///
/// # Panics
///
/// Panics if the arguments violate the driver model.
pub fn driver(id: &str, home: LatLng, seat_capacity: u32, fuel_cost_per_km: f64) -> Driver {
    Driver::new(id, DriverStatus::Active, seat_capacity, fuel_cost_per_km, home)
        .expect("test driver should be valid")
}

/// An inactive driver.
pub fn inactive_driver(id: &str, home: LatLng, seat_capacity: u32) -> Driver {
    Driver::new(id, DriverStatus::Inactive, seat_capacity, 0.0, home)
        .expect("test driver should be valid")
}

/// A ride with `"HH:mm"` start and end times.
///
/// # Panics
///
/// Panics on malformed times or if the ride violates the ride model.
pub fn ride(
    id: &str,
    start: &str,
    end: &str,
    start_location: LatLng,
    end_location: LatLng,
    seats_required: u32,
) -> Ride {
    let start_time = parse_time_of_day(start).expect("test start time should parse");
    let end_time = parse_time_of_day(end).expect("test end time should parse");
    Ride::new(
        id,
        start_time,
        end_time,
        start_location,
        end_location,
        seats_required,
    )
    .expect("test ride should be valid")
}
