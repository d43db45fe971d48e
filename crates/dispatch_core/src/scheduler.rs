//! Greedy single-pass assignment of rides to drivers.
//!
//! Rides are processed in chronological order (stable on input order). For each
//! ride every driver is evaluated against its current schedule; the feasible
//! driver with the lowest adjusted cost gets the ride, with ties going to the
//! driver that comes first in the input. Commits are final: nothing is ever
//! reassigned, and a ride without a feasible driver is simply left out.
//!
//! Driver evaluations for one ride only read schedule state, so they run
//! concurrently (bounded by `max_concurrent_evaluations`). The selection and the
//! commit happen afterwards, on the collected results in driver order.

use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::distance::DistanceProvider;
use crate::matching::{
    check_feasibility, modifier_for, select_best, Candidate, CostModel, CostModifier,
};
use crate::metrics::{summarize, AssignmentResult};
use crate::model::{Driver, Ride};
use crate::params::AssignmentConfig;
use crate::routing::RouteBackend;

/// Run input that cannot be assigned as given.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentError {
    #[error("driver id {0:?} appears more than once")]
    DuplicateDriver(String),
    #[error("ride id {0:?} appears more than once")]
    DuplicateRide(String),
}

/// One driver's committed rides and running totals.
#[derive(Debug, Clone)]
pub struct Schedule<'a> {
    driver: &'a Driver,
    rides: Vec<&'a Ride>,
    base_cost: f64,
    penalty_cost: f64,
}

impl<'a> Schedule<'a> {
    fn new(driver: &'a Driver) -> Self {
        Self {
            driver,
            rides: Vec::new(),
            base_cost: 0.0,
            penalty_cost: 0.0,
        }
    }

    pub fn driver(&self) -> &'a Driver {
        self.driver
    }

    /// Rides in commit order.
    pub fn rides(&self) -> &[&'a Ride] {
        &self.rides
    }

    pub fn ride_count(&self) -> usize {
        self.rides.len()
    }

    /// The most recently committed ride.
    pub fn previous_ride(&self) -> Option<&'a Ride> {
        self.rides.last().copied()
    }

    pub fn base_cost(&self) -> f64 {
        self.base_cost
    }

    pub fn penalty_cost(&self) -> f64 {
        self.penalty_cost
    }

    fn commit(&mut self, ride: &'a Ride, candidate: &Candidate) {
        self.rides.push(ride);
        self.base_cost += candidate.base_cost;
        self.penalty_cost += candidate.penalty;
    }
}

/// Schedules for every driver, in driver input order.
#[derive(Debug, Clone)]
pub struct ScheduleBook<'a> {
    schedules: Vec<Schedule<'a>>,
}

impl<'a> ScheduleBook<'a> {
    pub fn new(drivers: &'a [Driver]) -> Self {
        Self {
            schedules: drivers.iter().map(Schedule::new).collect(),
        }
    }

    pub fn schedules(&self) -> &[Schedule<'a>] {
        &self.schedules
    }

    pub fn get(&self, driver_index: usize) -> Option<&Schedule<'a>> {
        self.schedules.get(driver_index)
    }

    pub fn committed_rides(&self) -> usize {
        self.schedules.iter().map(Schedule::ride_count).sum()
    }

    fn commit(&mut self, ride: &'a Ride, candidate: &Candidate) {
        if let Some(schedule) = self.schedules.get_mut(candidate.driver_index) {
            schedule.commit(ride, candidate);
        }
    }
}

/// Rides sorted by start time; equal start times keep their input order.
pub fn chronological_order(rides: &[Ride]) -> Vec<&Ride> {
    let mut ordered: Vec<&Ride> = rides.iter().collect();
    ordered.sort_by_key(|ride| ride.start_time);
    ordered
}

/// The greedy assignment loop.
#[derive(Debug)]
pub struct Scheduler<B> {
    distances: DistanceProvider<B>,
    cost_model: CostModel,
    modifier: Box<dyn CostModifier>,
    max_concurrent_evaluations: usize,
}

impl<B: RouteBackend> Scheduler<B> {
    pub fn new(backend: B, config: &AssignmentConfig) -> Self {
        Self {
            distances: DistanceProvider::new(backend, config),
            cost_model: CostModel::from_config(config),
            modifier: modifier_for(config),
            max_concurrent_evaluations: config.max_concurrent_evaluations.max(1),
        }
    }

    /// Replace the fairness strategy chosen from the configuration.
    pub fn with_cost_modifier(mut self, modifier: Box<dyn CostModifier>) -> Self {
        self.modifier = modifier;
        self
    }

    pub fn distances(&self) -> &DistanceProvider<B> {
        &self.distances
    }

    pub fn cost_model(&self) -> &CostModel {
        &self.cost_model
    }

    pub fn cost_modifier(&self) -> &dyn CostModifier {
        self.modifier.as_ref()
    }

    /// Validate the input, run the greedy loop and summarize the schedules.
    pub async fn assign(
        &self,
        drivers: &[Driver],
        rides: &[Ride],
    ) -> Result<AssignmentResult, AssignmentError> {
        ensure_unique_ids(drivers, rides)?;
        info!(
            drivers = drivers.len(),
            rides = rides.len(),
            fairness = self.modifier.is_enabled(),
            "starting assignment run"
        );

        let book = self.run(drivers, rides).await;
        let result = summarize(&book, rides, self.modifier.is_enabled());

        info!(
            assigned = book.committed_rides(),
            unassigned = result.unassigned_ride_ids.len(),
            total_cost = result.total_cost,
            "assignment run finished"
        );
        Ok(result)
    }

    /// Process every ride in chronological order and return the final schedules.
    pub async fn run<'a>(&self, drivers: &'a [Driver], rides: &'a [Ride]) -> ScheduleBook<'a> {
        let mut book = ScheduleBook::new(drivers);
        for ride in chronological_order(rides) {
            self.step(&mut book, ride).await;
        }
        book
    }

    /// Evaluate all drivers for `ride` and commit it to the best one, if any.
    pub async fn step<'a>(&self, book: &mut ScheduleBook<'a>, ride: &'a Ride) -> Option<Candidate> {
        let evaluations = self.evaluate_ride(book, ride).await;
        let Some(best) = select_best(&evaluations) else {
            debug!(ride_id = %ride.id, "no feasible driver, ride left unassigned");
            return None;
        };

        book.commit(ride, &best);
        debug!(
            ride_id = %ride.id,
            driver_id = %book.schedules()[best.driver_index].driver().id,
            base_cost = best.base_cost,
            penalty = best.penalty,
            "ride committed"
        );
        Some(best)
    }

    /// One entry per driver, in driver order; `None` when the driver cannot serve `ride`.
    pub async fn evaluate_ride(&self, book: &ScheduleBook<'_>, ride: &Ride) -> Vec<Option<Candidate>> {
        stream::iter(book.schedules().iter().enumerate())
            .map(move |(driver_index, schedule)| self.evaluate(driver_index, schedule, ride))
            .buffered(self.max_concurrent_evaluations)
            .collect()
            .await
    }

    async fn evaluate(
        &self,
        driver_index: usize,
        schedule: &Schedule<'_>,
        ride: &Ride,
    ) -> Option<Candidate> {
        let driver = schedule.driver();
        let previous = schedule.previous_ride();

        if let Err(reason) = check_feasibility(&self.distances, driver, ride, previous).await {
            trace!(driver_id = %driver.id, ride_id = %ride.id, ?reason, "driver cannot serve ride");
            return None;
        }

        let base_cost = self
            .cost_model
            .incremental_cost(&self.distances, driver, ride, previous)
            .await;
        let penalty = self.modifier.penalty(schedule.ride_count());
        Some(Candidate::new(driver_index, base_cost, penalty))
    }
}

fn ensure_unique_ids(drivers: &[Driver], rides: &[Ride]) -> Result<(), AssignmentError> {
    let mut seen = HashSet::new();
    for driver in drivers {
        if !seen.insert(driver.id.as_str()) {
            return Err(AssignmentError::DuplicateDriver(driver.id.clone()));
        }
    }
    let mut seen = HashSet::new();
    for ride in rides {
        if !seen.insert(ride.id.as_str()) {
            return Err(AssignmentError::DuplicateRide(ride.id.clone()));
        }
    }
    Ok(())
}
