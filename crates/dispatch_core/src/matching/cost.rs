//! Incremental monetary cost of appending a ride to a driver's schedule.
//!
//! Formula:
//!
//! ```text
//! time_cost = (empty_minutes + service_minutes) / 60 × hourly_rate
//! fuel_cost = fuel_cost_per_km × (empty_km + service_km)
//! base_cost = time_cost + fuel_cost
//! ```
//!
//! "Empty" travel runs from where the driver becomes free to the pickup; service
//! travel runs from pickup to dropoff. Any unreachable lookup makes the cost
//! infinite, so the driver can never win the ride.

use crate::distance::DistanceProvider;
use crate::model::{Driver, Ride};
use crate::params::{AssignmentConfig, DEFAULT_HOURLY_RATE};
use crate::routing::RouteBackend;

use super::feasibility::departure_point;

/// Components of one hypothetical assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBreakdown {
    pub empty_minutes: f64,
    pub empty_km: f64,
    pub service_minutes: f64,
    pub service_km: f64,
    pub time_cost: f64,
    pub fuel_cost: f64,
}

impl CostBreakdown {
    /// `time_cost + fuel_cost`; no fairness penalty.
    pub fn base_cost(&self) -> f64 {
        self.time_cost + self.fuel_cost
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CostModel {
    pub hourly_rate: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            hourly_rate: DEFAULT_HOURLY_RATE,
        }
    }
}

impl CostModel {
    pub fn new(hourly_rate: f64) -> Self {
        Self { hourly_rate }
    }

    pub fn from_config(config: &AssignmentConfig) -> Self {
        Self::new(config.hourly_rate)
    }

    /// Base cost of giving `ride` to `driver` after `previous`.
    pub async fn incremental_cost<B: RouteBackend>(
        &self,
        distances: &DistanceProvider<B>,
        driver: &Driver,
        ride: &Ride,
        previous: Option<&Ride>,
    ) -> f64 {
        self.breakdown(distances, driver, ride, previous)
            .await
            .base_cost()
    }

    pub async fn breakdown<B: RouteBackend>(
        &self,
        distances: &DistanceProvider<B>,
        driver: &Driver,
        ride: &Ride,
        previous: Option<&Ride>,
    ) -> CostBreakdown {
        let (empty_location, _) = departure_point(driver, previous);
        let (empty_minutes, empty_km, service_km) = futures::join!(
            distances.road_travel_minutes(empty_location, ride.start_location),
            distances.road_distance_km(empty_location, ride.start_location),
            distances.road_distance_km(ride.start_location, ride.end_location),
        );
        let service_minutes = f64::from(ride.service_minutes());

        CostBreakdown {
            empty_minutes,
            empty_km,
            service_minutes,
            service_km,
            time_cost: (empty_minutes + service_minutes) / 60.0 * self.hourly_rate,
            fuel_cost: driver.fuel_cost_per_km * (empty_km + service_km),
        }
    }
}
