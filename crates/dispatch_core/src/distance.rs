//! Two-tier travel lookups: air-distance prefilter, then a deadline-bounded
//! road query.
//!
//! Every road lookup resolves to a [`RouteLookup`]. Anything other than
//! [`RouteLookup::Found`] collapses to the unreachable sentinel
//! ([`UNREACHABLE`], positive infinity), so a slow or failing backend shows up
//! as reduced assignment coverage and never aborts a run.

use std::time::Duration;

use h3o::LatLng;
use tracing::{debug, warn};

use crate::params::AssignmentConfig;
use crate::routing::{RouteBackend, RouteLeg, RoutingError};
use crate::spatial::air_distance_km;

/// Travel time or distance of an infeasible or unknown route.
pub const UNREACHABLE: f64 = f64::INFINITY;

/// Outcome of one road lookup.
#[derive(Debug)]
pub enum RouteLookup {
    Found(RouteLeg),
    /// Skipped by the air-distance prefilter; the backend was not contacted.
    Filtered { air_distance_km: f64 },
    /// The backend did not answer within the lookup deadline.
    TimedOut,
    Failed(RoutingError),
}

impl RouteLookup {
    pub fn is_reachable(&self) -> bool {
        matches!(self, RouteLookup::Found(_))
    }

    /// Whole minutes, rounded up with a floor of one; [`UNREACHABLE`] otherwise.
    pub fn travel_minutes(&self) -> f64 {
        match self {
            RouteLookup::Found(leg) => round_up_minutes(leg.duration_secs),
            _ => UNREACHABLE,
        }
    }

    /// Kilometres; [`UNREACHABLE`] when no route was found.
    pub fn distance_km(&self) -> f64 {
        match self {
            RouteLookup::Found(leg) => leg.distance_m / 1000.0,
            _ => UNREACHABLE,
        }
    }
}

/// Round a raw duration up to whole minutes, never below one minute.
pub fn round_up_minutes(duration_secs: f64) -> f64 {
    (duration_secs / 60.0).ceil().max(1.0)
}

/// Air and road distance lookups over a routing backend.
#[derive(Debug)]
pub struct DistanceProvider<B> {
    backend: B,
    max_air_distance_km: Option<f64>,
    lookup_timeout: Duration,
}

impl<B: RouteBackend> DistanceProvider<B> {
    pub fn new(backend: B, config: &AssignmentConfig) -> Self {
        Self {
            backend,
            max_air_distance_km: config
                .use_air_distance_filter
                .then_some(config.max_air_distance_km),
            lookup_timeout: config.lookup_timeout(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Air-distance threshold, when the prefilter is enabled.
    pub fn air_distance_filter(&self) -> Option<f64> {
        self.max_air_distance_km
    }

    pub fn air_distance_km(&self, a: LatLng, b: LatLng) -> f64 {
        air_distance_km(a, b)
    }

    /// Road travel time in whole minutes, or [`UNREACHABLE`].
    ///
    /// With the prefilter enabled, pairs whose air distance exceeds the
    /// threshold are unreachable without a backend call, even when a shorter
    /// road route exists.
    pub async fn road_travel_minutes(&self, from: LatLng, to: LatLng) -> f64 {
        self.filtered_lookup(from, to).await.travel_minutes()
    }

    /// Road distance in kilometres, or [`UNREACHABLE`]. Not subject to the prefilter.
    pub async fn road_distance_km(&self, from: LatLng, to: LatLng) -> f64 {
        self.lookup(from, to).await.distance_km()
    }

    /// Air-distance prefilter followed by [`Self::lookup`].
    pub async fn filtered_lookup(&self, from: LatLng, to: LatLng) -> RouteLookup {
        if let Some(max_km) = self.max_air_distance_km {
            let air_km = air_distance_km(from, to);
            if air_km > max_km {
                debug!(air_km, max_km, "air distance above threshold, skipping road lookup");
                return RouteLookup::Filtered {
                    air_distance_km: air_km,
                };
            }
        }
        self.lookup(from, to).await
    }

    /// Deadline-bounded backend query with failures kept as typed outcomes.
    pub async fn lookup(&self, from: LatLng, to: LatLng) -> RouteLookup {
        match tokio::time::timeout(self.lookup_timeout, self.backend.route(from, to)).await {
            Ok(Ok(leg)) if is_valid_leg(&leg) => RouteLookup::Found(leg),
            Ok(Ok(leg)) => {
                warn!(?leg, "routing backend returned a negative or non-finite leg");
                RouteLookup::Failed(RoutingError::Decode(format!("invalid leg {leg:?}")))
            }
            Ok(Err(RoutingError::NoRoute)) => {
                debug!(
                    from = ?(from.lat(), from.lng()),
                    to = ?(to.lat(), to.lng()),
                    "no road route"
                );
                RouteLookup::Failed(RoutingError::NoRoute)
            }
            Ok(Err(err)) => {
                warn!(error = %err, "routing lookup failed");
                RouteLookup::Failed(err)
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "routing lookup timed out"
                );
                RouteLookup::TimedOut
            }
        }
    }
}

fn is_valid_leg(leg: &RouteLeg) -> bool {
    [leg.duration_secs, leg.distance_m]
        .iter()
        .all(|value| value.is_finite() && *value >= 0.0)
}
