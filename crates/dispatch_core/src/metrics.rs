//! Folding final schedules into the run summary.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::Ride;
use crate::scheduler::ScheduleBook;

/// Rides given to one driver, in commit order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverAssignment {
    pub driver_id: String,
    pub ride_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRideCount {
    pub driver_id: String,
    pub count: usize,
}

/// Distribution of ride counts over all drivers (including drivers with none).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FairnessStats {
    pub min: usize,
    pub max: usize,
    pub avg: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub counts_per_driver: Vec<DriverRideCount>,
}

/// Output of one assignment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResult {
    /// Drivers with at least one ride, in driver input order.
    pub assignments: Vec<DriverAssignment>,
    /// Sum of base costs (time + fuel) over all commits.
    pub real_base_cost: f64,
    /// Sum of the penalties in effect at each commit.
    pub total_penalty: f64,
    /// `real_base_cost + total_penalty`, rounded to a whole unit.
    pub total_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fairness: Option<FairnessStats>,
    /// Input rides absent from every assignment list, in input order.
    #[serde(default)]
    pub unassigned_ride_ids: Vec<String>,
}

impl AssignmentResult {
    pub fn assigned_ride_count(&self) -> usize {
        self.assignments.iter().map(|a| a.ride_ids.len()).sum()
    }

    /// Driver that received `ride_id`, if any.
    pub fn driver_for(&self, ride_id: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.ride_ids.iter().any(|id| id == ride_id))
            .map(|a| a.driver_id.as_str())
    }
}

/// Build the run summary from final schedules.
///
/// `rides` is the run input, used to list unassigned rides.
pub fn summarize(book: &ScheduleBook<'_>, rides: &[Ride], include_fairness: bool) -> AssignmentResult {
    let assignments: Vec<DriverAssignment> = book
        .schedules()
        .iter()
        .filter(|schedule| schedule.ride_count() > 0)
        .map(|schedule| DriverAssignment {
            driver_id: schedule.driver().id.clone(),
            ride_ids: schedule.rides().iter().map(|ride| ride.id.clone()).collect(),
        })
        .collect();

    let real_base_cost: f64 = book.schedules().iter().map(|s| s.base_cost()).sum();
    let total_penalty: f64 = book.schedules().iter().map(|s| s.penalty_cost()).sum();

    let assigned: HashSet<&str> = assignments
        .iter()
        .flat_map(|a| a.ride_ids.iter().map(String::as_str))
        .collect();
    let unassigned_ride_ids = rides
        .iter()
        .filter(|ride| !assigned.contains(ride.id.as_str()))
        .map(|ride| ride.id.clone())
        .collect();

    let fairness = include_fairness.then(|| {
        fairness_stats(
            book.schedules()
                .iter()
                .map(|s| DriverRideCount {
                    driver_id: s.driver().id.clone(),
                    count: s.ride_count(),
                })
                .collect(),
        )
    });

    AssignmentResult {
        assignments,
        real_base_cost,
        total_penalty,
        total_cost: (real_base_cost + total_penalty).round(),
        fairness,
        unassigned_ride_ids,
    }
}

/// Min, max, mean and population standard deviation of per-driver counts.
pub fn fairness_stats(counts_per_driver: Vec<DriverRideCount>) -> FairnessStats {
    if counts_per_driver.is_empty() {
        return FairnessStats {
            min: 0,
            max: 0,
            avg: 0.0,
            std_dev: 0.0,
            counts_per_driver,
        };
    }

    let n = counts_per_driver.len() as f64;
    let counts = counts_per_driver.iter().map(|c| c.count);
    let min = counts.clone().min().unwrap_or(0);
    let max = counts.clone().max().unwrap_or(0);
    let avg = counts.clone().sum::<usize>() as f64 / n;
    let variance = counts
        .map(|count| {
            let diff = count as f64 - avg;
            diff * diff
        })
        .sum::<f64>()
        / n;

    FairnessStats {
        min,
        max,
        avg,
        std_dev: variance.sqrt(),
        counts_per_driver,
    }
}
