//! JSON driver and ride records and their conversion into validated models.
//!
//! Records mirror the external wire shape (`camelCase`, `"HH:mm"` times,
//! `{lat, lon}` locations). Conversion fails fast on the first invalid
//! record with a [`RecordError`] naming the record id and field.

use std::fs;
use std::path::{Path, PathBuf};

use h3o::LatLng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::{parse_time_of_day, TimeOfDay};
use crate::model::{location, Driver, DriverStatus, RecordError, Ride};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn to_lat_lng(self) -> Option<LatLng> {
        location(self.lat, self.lon)
    }
}

impl From<LatLng> for Coordinates {
    fn from(value: LatLng) -> Self {
        Self {
            lat: value.lat(),
            lon: value.lng(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRecord {
    pub id: String,
    pub status: DriverStatus,
    pub seat_capacity: i64,
    pub fuel_cost_per_km: f64,
    pub home_location: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideRecord {
    pub id: String,
    pub start_time: String,
    pub end_time: String,
    pub start_location: Coordinates,
    pub end_location: Coordinates,
    pub seats_required: i64,
}

/// Failure while reading a record file.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {what}: {source}")]
    Json {
        what: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Record(#[from] RecordError),
}

impl TryFrom<DriverRecord> for Driver {
    type Error = RecordError;

    fn try_from(record: DriverRecord) -> Result<Self, Self::Error> {
        let seat_capacity = positive_count("driver", &record.id, "seatCapacity", record.seat_capacity)?;
        let home = record.home_location.to_lat_lng().ok_or_else(|| {
            RecordError::invalid(
                "driver",
                &record.id,
                "homeLocation",
                format!("{:?} is not a valid coordinate", record.home_location),
            )
        })?;
        Driver::new(
            record.id,
            record.status,
            seat_capacity,
            record.fuel_cost_per_km,
            home,
        )
    }
}

impl TryFrom<RideRecord> for Ride {
    type Error = RecordError;

    fn try_from(record: RideRecord) -> Result<Self, Self::Error> {
        let start_time = ride_time(&record.id, "startTime", &record.start_time)?;
        let end_time = ride_time(&record.id, "endTime", &record.end_time)?;
        let start_location = ride_location(&record.id, "startLocation", record.start_location)?;
        let end_location = ride_location(&record.id, "endLocation", record.end_location)?;
        let seats_required =
            positive_count("ride", &record.id, "seatsRequired", record.seats_required)?;
        Ride::new(
            record.id,
            start_time,
            end_time,
            start_location,
            end_location,
            seats_required,
        )
    }
}

fn positive_count(
    record: &'static str,
    id: &str,
    field: &'static str,
    value: i64,
) -> Result<u32, RecordError> {
    u32::try_from(value)
        .ok()
        .filter(|count| *count >= 1)
        .ok_or_else(|| RecordError::invalid(record, id, field, format!("must be at least 1, got {value}")))
}

fn ride_time(id: &str, field: &'static str, text: &str) -> Result<TimeOfDay, RecordError> {
    parse_time_of_day(text).map_err(|source| RecordError::MalformedTime {
        record: "ride",
        id: id.to_string(),
        field,
        source,
    })
}

fn ride_location(
    id: &str,
    field: &'static str,
    coordinates: Coordinates,
) -> Result<LatLng, RecordError> {
    coordinates.to_lat_lng().ok_or_else(|| {
        RecordError::invalid(
            "ride",
            id,
            field,
            format!("{coordinates:?} is not a valid coordinate"),
        )
    })
}

/// Parse a JSON array of driver records.
pub fn parse_drivers(json: &str) -> Result<Vec<Driver>, InputError> {
    let records: Vec<DriverRecord> = serde_json::from_str(json).map_err(|source| InputError::Json {
        what: "driver records".to_string(),
        source,
    })?;
    Ok(records
        .into_iter()
        .map(Driver::try_from)
        .collect::<Result<Vec<_>, _>>()?)
}

/// Parse a JSON array of ride records.
pub fn parse_rides(json: &str) -> Result<Vec<Ride>, InputError> {
    let records: Vec<RideRecord> = serde_json::from_str(json).map_err(|source| InputError::Json {
        what: "ride records".to_string(),
        source,
    })?;
    Ok(records
        .into_iter()
        .map(Ride::try_from)
        .collect::<Result<Vec<_>, _>>()?)
}

pub fn load_drivers(path: impl AsRef<Path>) -> Result<Vec<Driver>, InputError> {
    parse_drivers(&read_file(path.as_ref())?)
}

pub fn load_rides(path: impl AsRef<Path>) -> Result<Vec<Ride>, InputError> {
    parse_rides(&read_file(path.as_ref())?)
}

fn read_file(path: &Path) -> Result<String, InputError> {
    fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })
}
