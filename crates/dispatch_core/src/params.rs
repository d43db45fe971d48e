//! Run configuration: typed options with documented defaults.
//!
//! Values are layered `defaults <- environment <- caller overrides`, resolved
//! once before a run starts and never mutated afterwards.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matching::penalty::PenaltyCurve;

/// Fixed monetary rate per hour of driver time.
pub const DEFAULT_HOURLY_RATE: f64 = 30.0;

/// Air-distance cut-off used when the prefilter is enabled.
pub const DEFAULT_MAX_AIR_DISTANCE_KM: f64 = 50.0;

pub const DEFAULT_FAIRNESS_WEIGHT: f64 = 1.0;

/// Deadline for a single backend lookup.
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 5_000;

/// Upper bound on driver evaluations in flight for one ride.
pub const DEFAULT_MAX_CONCURRENT_EVALUATIONS: usize = 8;

pub const ENV_USE_AIR_DISTANCE_FILTER: &str = "DISPATCH_USE_AIR_DISTANCE_FILTER";
pub const ENV_MAX_AIR_DISTANCE_KM: &str = "DISPATCH_MAX_AIR_DISTANCE_KM";
pub const ENV_FAIRNESS_MODE: &str = "DISPATCH_FAIRNESS_MODE";
pub const ENV_FAIRNESS_WEIGHT: &str = "DISPATCH_FAIRNESS_WEIGHT";
pub const ENV_PENALTY_CURVE: &str = "DISPATCH_PENALTY_CURVE";
pub const ENV_HOURLY_RATE: &str = "DISPATCH_HOURLY_RATE";
pub const ENV_LOOKUP_TIMEOUT_MS: &str = "DISPATCH_LOOKUP_TIMEOUT_MS";
pub const ENV_MAX_CONCURRENT_EVALUATIONS: &str = "DISPATCH_MAX_CONCURRENT_EVALUATIONS";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{variable}={value:?} is invalid: {reason}")]
    InvalidValue {
        variable: &'static str,
        value: String,
        reason: String,
    },
    #[error("`{field}` {reason}")]
    OutOfRange { field: &'static str, reason: String },
}

/// Options for one assignment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentConfig {
    /// Skip the road lookup when the air distance already exceeds `max_air_distance_km`.
    pub use_air_distance_filter: bool,
    pub max_air_distance_km: f64,
    /// Blend the load penalty into driver selection and report distribution stats.
    pub fairness_mode: bool,
    pub fairness_weight: f64,
    pub penalty_curve: PenaltyCurve,
    pub hourly_rate: f64,
    pub lookup_timeout_ms: u64,
    pub max_concurrent_evaluations: usize,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            use_air_distance_filter: false,
            max_air_distance_km: DEFAULT_MAX_AIR_DISTANCE_KM,
            fairness_mode: false,
            fairness_weight: DEFAULT_FAIRNESS_WEIGHT,
            penalty_curve: PenaltyCurve::default(),
            hourly_rate: DEFAULT_HOURLY_RATE,
            lookup_timeout_ms: DEFAULT_LOOKUP_TIMEOUT_MS,
            max_concurrent_evaluations: DEFAULT_MAX_CONCURRENT_EVALUATIONS,
        }
    }
}

/// Caller-supplied values that take precedence over defaults and environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigOverrides {
    pub use_air_distance_filter: Option<bool>,
    pub max_air_distance_km: Option<f64>,
    pub fairness_mode: Option<bool>,
    pub fairness_weight: Option<f64>,
    pub penalty_curve: Option<PenaltyCurve>,
    pub hourly_rate: Option<f64>,
    pub lookup_timeout_ms: Option<u64>,
    pub max_concurrent_evaluations: Option<usize>,
}

impl AssignmentConfig {
    /// Defaults layered with the process environment and then `overrides`.
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let config = Self::from_env()?.with_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Defaults layered with the `DISPATCH_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults layered with values from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = read_var(&lookup, ENV_USE_AIR_DISTANCE_FILTER, parse_flag)? {
            config.use_air_distance_filter = value;
        }
        if let Some(value) = read_var(&lookup, ENV_MAX_AIR_DISTANCE_KM, parse_from_str)? {
            config.max_air_distance_km = value;
        }
        if let Some(value) = read_var(&lookup, ENV_FAIRNESS_MODE, parse_flag)? {
            config.fairness_mode = value;
        }
        if let Some(value) = read_var(&lookup, ENV_FAIRNESS_WEIGHT, parse_from_str)? {
            config.fairness_weight = value;
        }
        if let Some(value) = read_var(&lookup, ENV_PENALTY_CURVE, parse_from_str)? {
            config.penalty_curve = value;
        }
        if let Some(value) = read_var(&lookup, ENV_HOURLY_RATE, parse_from_str)? {
            config.hourly_rate = value;
        }
        if let Some(value) = read_var(&lookup, ENV_LOOKUP_TIMEOUT_MS, parse_from_str)? {
            config.lookup_timeout_ms = value;
        }
        if let Some(value) = read_var(&lookup, ENV_MAX_CONCURRENT_EVALUATIONS, parse_from_str)? {
            config.max_concurrent_evaluations = value;
        }
        Ok(config)
    }

    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(value) = overrides.use_air_distance_filter {
            self.use_air_distance_filter = value;
        }
        if let Some(value) = overrides.max_air_distance_km {
            self.max_air_distance_km = value;
        }
        if let Some(value) = overrides.fairness_mode {
            self.fairness_mode = value;
        }
        if let Some(value) = overrides.fairness_weight {
            self.fairness_weight = value;
        }
        if let Some(value) = overrides.penalty_curve {
            self.penalty_curve = value;
        }
        if let Some(value) = overrides.hourly_rate {
            self.hourly_rate = value;
        }
        if let Some(value) = overrides.lookup_timeout_ms {
            self.lookup_timeout_ms = value;
        }
        if let Some(value) = overrides.max_concurrent_evaluations {
            self.max_concurrent_evaluations = value;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("max_air_distance_km", self.max_air_distance_km)?;
        non_negative("fairness_weight", self.fairness_weight)?;
        non_negative("hourly_rate", self.hourly_rate)?;
        if self.lookup_timeout_ms == 0 {
            return Err(ConfigError::OutOfRange {
                field: "lookup_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.max_concurrent_evaluations == 0 {
            return Err(ConfigError::OutOfRange {
                field: "max_concurrent_evaluations",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    // Builder helpers, mostly for tests and examples.

    pub fn with_air_distance_filter(mut self, max_air_distance_km: f64) -> Self {
        self.use_air_distance_filter = true;
        self.max_air_distance_km = max_air_distance_km;
        self
    }

    pub fn with_fairness(mut self, curve: PenaltyCurve, weight: f64) -> Self {
        self.fairness_mode = true;
        self.penalty_curve = curve;
        self.fairness_weight = weight;
        self
    }

    pub fn with_lookup_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.lookup_timeout_ms = timeout_ms;
        self
    }

    pub fn with_max_concurrent_evaluations(mut self, limit: usize) -> Self {
        self.max_concurrent_evaluations = limit;
        self
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            reason: format!("must be a non-negative number, got {value}"),
        })
    }
}

fn read_var<F, T>(
    lookup: &F,
    variable: &'static str,
    parse: fn(&str) -> Result<T, String>,
) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(variable) else {
        return Ok(None);
    };
    parse(raw.trim())
        .map(Some)
        .map_err(|reason| ConfigError::InvalidValue {
            variable,
            value: raw,
            reason,
        })
}

fn parse_flag(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err("expected true/false".to_string()),
    }
}

fn parse_from_str<T>(value: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|err| err.to_string())
}
