//! Drivers and rides: the immutable inputs of an assignment run.

use h3o::LatLng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::{MalformedTimeError, TimeOfDay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverStatus {
    Active,
    Inactive,
}

/// A fleet member that can serve rides.
#[derive(Debug, Clone, PartialEq)]
pub struct Driver {
    pub id: String,
    pub status: DriverStatus,
    pub seat_capacity: u32,
    pub fuel_cost_per_km: f64,
    pub home: LatLng,
}

/// A time-windowed transport request.
#[derive(Debug, Clone, PartialEq)]
pub struct Ride {
    pub id: String,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub start_location: LatLng,
    pub end_location: LatLng,
    pub seats_required: u32,
}

/// A driver or ride record that violates the data model.
///
/// These are data-quality defects: they abort processing and name the
/// offending record and field so the input can be fixed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("{record} {id:?}: field `{field}` {reason}")]
    InvalidField {
        record: &'static str,
        id: String,
        field: &'static str,
        reason: String,
    },
    #[error("{record} {id:?}: field `{field}` is not a valid time of day")]
    MalformedTime {
        record: &'static str,
        id: String,
        field: &'static str,
        #[source]
        source: MalformedTimeError,
    },
}

impl RecordError {
    pub(crate) fn invalid(
        record: &'static str,
        id: &str,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        RecordError::InvalidField {
            record,
            id: id.to_string(),
            field,
            reason: reason.into(),
        }
    }
}

/// Build a validated coordinate from latitude/longitude degrees.
pub fn location(lat: f64, lon: f64) -> Option<LatLng> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return None;
    }
    LatLng::new(lat, lon).ok()
}

impl Driver {
    pub fn new(
        id: impl Into<String>,
        status: DriverStatus,
        seat_capacity: u32,
        fuel_cost_per_km: f64,
        home: LatLng,
    ) -> Result<Self, RecordError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(RecordError::invalid("driver", &id, "id", "must not be empty"));
        }
        if seat_capacity == 0 {
            return Err(RecordError::invalid(
                "driver",
                &id,
                "seatCapacity",
                "must be at least 1",
            ));
        }
        if !fuel_cost_per_km.is_finite() || fuel_cost_per_km < 0.0 {
            return Err(RecordError::invalid(
                "driver",
                &id,
                "fuelCostPerKm",
                format!("must be a non-negative number, got {fuel_cost_per_km}"),
            ));
        }
        Ok(Self {
            id,
            status,
            seat_capacity,
            fuel_cost_per_km,
            home,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == DriverStatus::Active
    }
}

impl Ride {
    pub fn new(
        id: impl Into<String>,
        start_time: TimeOfDay,
        end_time: TimeOfDay,
        start_location: LatLng,
        end_location: LatLng,
        seats_required: u32,
    ) -> Result<Self, RecordError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(RecordError::invalid("ride", &id, "id", "must not be empty"));
        }
        if end_time < start_time {
            return Err(RecordError::invalid(
                "ride",
                &id,
                "endTime",
                format!("{end_time} is before startTime {start_time}"),
            ));
        }
        if seats_required == 0 {
            return Err(RecordError::invalid(
                "ride",
                &id,
                "seatsRequired",
                "must be at least 1",
            ));
        }
        Ok(Self {
            id,
            start_time,
            end_time,
            start_location,
            end_location,
            seats_required,
        })
    }

    /// Minutes between pickup and dropoff.
    pub fn service_minutes(&self) -> u32 {
        self.start_time.minutes_until(self.end_time).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::parse_time_of_day;

    fn here() -> LatLng {
        location(52.5, 13.4).expect("valid")
    }

    #[test]
    fn location_rejects_out_of_range() {
        assert!(location(91.0, 0.0).is_none());
        assert!(location(0.0, -180.5).is_none());
        assert!(location(f64::NAN, 0.0).is_none());
        assert!(location(-90.0, 180.0).is_some());
    }

    #[test]
    fn driver_rejects_zero_capacity() {
        let err = Driver::new("d1", DriverStatus::Active, 0, 1.0, here()).unwrap_err();
        assert!(matches!(
            err,
            RecordError::InvalidField { field: "seatCapacity", .. }
        ));
    }

    #[test]
    fn driver_rejects_negative_fuel_cost() {
        let err = Driver::new("d1", DriverStatus::Active, 4, -0.5, here()).unwrap_err();
        assert!(err.to_string().contains("fuelCostPerKm"));
    }

    #[test]
    fn ride_rejects_end_before_start() {
        let start = parse_time_of_day("10:00").unwrap();
        let end = parse_time_of_day("09:59").unwrap();
        let err = Ride::new("r1", start, end, here(), here(), 1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "ride \"r1\": field `endTime` 09:59 is before startTime 10:00"
        );
    }

    #[test]
    fn service_minutes_spans_the_window() {
        let start = parse_time_of_day("10:00").unwrap();
        let end = parse_time_of_day("10:20").unwrap();
        let ride = Ride::new("r1", start, end, here(), here(), 2).unwrap();
        assert_eq!(ride.service_minutes(), 20);
    }
}
