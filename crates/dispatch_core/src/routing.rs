//! Pluggable road-routing backends.
//!
//! Implementations, selectable via [`RouteBackendKind`]:
//!
//! - **`HaversineRouteBackend`**: air distance at a fixed average speed. Zero dependencies,
//!   fully deterministic.
//! - **`TableRouteBackend`**: precomputed legs keyed by coordinate pair, built in memory or
//!   loaded from a JSON file.
//! - **`OsrmRouteBackend`** (feature `osrm`): calls a local/remote OSRM HTTP endpoint.
//!
//! [`CachedRouteBackend`] memoizes successful legs of any backend by directional
//! coordinate pair. Backends report failures as [`RoutingError`]; turning those into
//! the unreachable sentinel is the job of [`crate::distance::DistanceProvider`].

use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use h3o::LatLng;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::RecordError;
use crate::records::{Coordinates, InputError};
use crate::spatial::air_distance_km;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// Road travel between two points as reported by a backend.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLeg {
    pub duration_secs: f64,
    pub distance_m: f64,
}

impl RouteLeg {
    pub fn new(duration_secs: f64, distance_m: f64) -> Self {
        Self {
            duration_secs,
            distance_m,
        }
    }
}

/// Failure reported by a routing backend.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[cfg(feature = "osrm")]
    #[error("routing request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("routing backend answered with HTTP status {0}")]
    Status(u16),
    #[error("routing response could not be decoded: {0}")]
    Decode(String),
    #[error("routing backend rejected the query: {0}")]
    Api(String),
    #[error("no route between the requested points")]
    NoRoute,
}

/// Failure while constructing a backend from a [`RouteBackendKind`].
#[derive(Debug, Error)]
pub enum BackendSetupError {
    #[error("failed to load route table: {0}")]
    Table(#[from] InputError),
    #[cfg(feature = "osrm")]
    #[error("failed to build OSRM client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Directional coordinate-pair key.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct PairKey([u64; 4]);

impl PairKey {
    pub fn new(from: LatLng, to: LatLng) -> Self {
        Self([
            from.lat().to_bits(),
            from.lng().to_bits(),
            to.lat().to_bits(),
            to.lng().to_bits(),
        ])
    }
}

/// Trait for routing backends.
///
/// Lookups are idempotent: asking twice for the same pair must give the same
/// answer, which is what makes [`CachedRouteBackend`] transparent.
pub trait RouteBackend: Send + Sync {
    /// Road duration and distance from `from` to `to`.
    fn route(
        &self,
        from: LatLng,
        to: LatLng,
    ) -> impl Future<Output = Result<RouteLeg, RoutingError>> + Send;
}

impl<B: RouteBackend> RouteBackend for Arc<B> {
    fn route(
        &self,
        from: LatLng,
        to: LatLng,
    ) -> impl Future<Output = Result<RouteLeg, RoutingError>> + Send {
        self.as_ref().route(from, to)
    }
}

/// Which routing backend to use.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum RouteBackendKind {
    /// Air distance at [`DEFAULT_AVERAGE_SPEED_KMH`].
    #[default]
    Haversine,
    /// Precomputed legs loaded from a JSON file.
    Table { path: PathBuf },
    /// OSRM HTTP endpoint (e.g. `"http://localhost:5000"`).
    #[cfg(feature = "osrm")]
    Osrm { endpoint: String },
}

// ---------------------------------------------------------------------------
// Haversine backend (always available)
// ---------------------------------------------------------------------------

/// Average city speed used to turn air distance into a duration.
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 40.0;

/// Estimates road travel as straight-line travel at a constant speed.
#[derive(Debug, Clone, Copy)]
pub struct HaversineRouteBackend {
    pub average_speed_kmh: f64,
}

impl Default for HaversineRouteBackend {
    fn default() -> Self {
        Self {
            average_speed_kmh: DEFAULT_AVERAGE_SPEED_KMH,
        }
    }
}

impl HaversineRouteBackend {
    pub fn leg(&self, from: LatLng, to: LatLng) -> RouteLeg {
        let distance_km = air_distance_km(from, to);
        let duration_secs = if distance_km > 0.0 {
            (distance_km / self.average_speed_kmh) * 3600.0
        } else {
            0.0
        };
        RouteLeg::new(duration_secs, distance_km * 1000.0)
    }
}

impl RouteBackend for HaversineRouteBackend {
    async fn route(&self, from: LatLng, to: LatLng) -> Result<RouteLeg, RoutingError> {
        Ok(self.leg(from, to))
    }
}

// ---------------------------------------------------------------------------
// Table backend
// ---------------------------------------------------------------------------

/// One row of a route table file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTableEntry {
    pub from: Coordinates,
    pub to: Coordinates,
    pub duration_secs: f64,
    pub distance_m: f64,
}

/// Precomputed route table. Missing pairs answer [`RoutingError::NoRoute`].
#[derive(Debug, Clone, Default)]
pub struct TableRouteBackend {
    table: HashMap<PairKey, RouteLeg>,
}

impl TableRouteBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directional leg.
    pub fn with_leg(mut self, from: LatLng, to: LatLng, leg: RouteLeg) -> Self {
        self.insert(from, to, leg);
        self
    }

    /// Add the same leg in both directions.
    pub fn with_symmetric_leg(mut self, a: LatLng, b: LatLng, leg: RouteLeg) -> Self {
        self.insert(a, b, leg);
        self.insert(b, a, leg);
        self
    }

    pub fn insert(&mut self, from: LatLng, to: LatLng, leg: RouteLeg) {
        self.table.insert(PairKey::new(from, to), leg);
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Build from table rows, rejecting invalid coordinates and negative legs.
    pub fn from_entries(entries: Vec<RouteTableEntry>) -> Result<Self, InputError> {
        let mut backend = Self::new();
        for (row, entry) in entries.into_iter().enumerate() {
            let (Some(from), Some(to)) = (entry.from.to_lat_lng(), entry.to.to_lat_lng()) else {
                return Err(InputError::Record(RecordError::invalid(
                    "route table row",
                    &row.to_string(),
                    "from/to",
                    "is not a valid coordinate",
                )));
            };
            let row_id = row.to_string();
            for (field, value) in [
                ("durationSecs", entry.duration_secs),
                ("distanceM", entry.distance_m),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(InputError::Record(RecordError::invalid(
                        "route table row",
                        &row_id,
                        field,
                        format!("must be a non-negative number, got {value}"),
                    )));
                }
            }
            backend.insert(from, to, RouteLeg::new(entry.duration_secs, entry.distance_m));
        }
        Ok(backend)
    }

    /// Load a JSON array of [`RouteTableEntry`] rows.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<RouteTableEntry> =
            serde_json::from_str(&raw).map_err(|source| InputError::Json {
                what: path.display().to_string(),
                source,
            })?;
        Self::from_entries(entries)
    }
}

impl RouteBackend for TableRouteBackend {
    async fn route(&self, from: LatLng, to: LatLng) -> Result<RouteLeg, RoutingError> {
        self.table
            .get(&PairKey::new(from, to))
            .copied()
            .ok_or(RoutingError::NoRoute)
    }
}

// ---------------------------------------------------------------------------
// OSRM backend (behind `osrm` feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "osrm")]
pub mod osrm;

// ---------------------------------------------------------------------------
// Caching wrapper
// ---------------------------------------------------------------------------

/// Default route cache capacity.
pub const DEFAULT_ROUTE_CACHE_CAPACITY: usize = 20_000;

/// LRU-cached wrapper around any [`RouteBackend`].
///
/// Cache key is the directional coordinate pair. Only successful legs are
/// cached; failures are retried on the next lookup.
pub struct CachedRouteBackend<B> {
    inner: B,
    cache: Mutex<LruCache<PairKey, RouteLeg>>,
}

impl<B> CachedRouteBackend<B> {
    pub fn new(inner: B, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Number of cached legs.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    fn cached(&self, key: &PairKey) -> Option<RouteLeg> {
        self.cache.lock().ok()?.get(key).copied()
    }
}

impl<B: RouteBackend> RouteBackend for CachedRouteBackend<B> {
    async fn route(&self, from: LatLng, to: LatLng) -> Result<RouteLeg, RoutingError> {
        let key = PairKey::new(from, to);

        // Fast path: cache hit
        if let Some(leg) = self.cached(&key) {
            return Ok(leg);
        }

        // Slow path: query inner backend
        let leg = self.inner.route(from, to).await?;
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, leg);
        }
        Ok(leg)
    }
}

// ---------------------------------------------------------------------------
// Factory: build a backend from RouteBackendKind
// ---------------------------------------------------------------------------

/// Any of the built-in backends, for callers that pick one at runtime.
#[derive(Debug)]
pub enum AnyRouteBackend {
    Haversine(HaversineRouteBackend),
    Table(TableRouteBackend),
    #[cfg(feature = "osrm")]
    Osrm(osrm::OsrmRouteBackend),
}

impl RouteBackend for AnyRouteBackend {
    async fn route(&self, from: LatLng, to: LatLng) -> Result<RouteLeg, RoutingError> {
        match self {
            AnyRouteBackend::Haversine(backend) => backend.route(from, to).await,
            AnyRouteBackend::Table(backend) => backend.route(from, to).await,
            #[cfg(feature = "osrm")]
            AnyRouteBackend::Osrm(backend) => backend.route(from, to).await,
        }
    }
}

/// Construct a cached backend from a [`RouteBackendKind`] descriptor.
pub fn build_route_backend(
    kind: &RouteBackendKind,
) -> Result<CachedRouteBackend<AnyRouteBackend>, BackendSetupError> {
    let inner = match kind {
        RouteBackendKind::Haversine => AnyRouteBackend::Haversine(HaversineRouteBackend::default()),
        RouteBackendKind::Table { path } => {
            AnyRouteBackend::Table(TableRouteBackend::from_json_file(path)?)
        }
        #[cfg(feature = "osrm")]
        RouteBackendKind::Osrm { endpoint } => {
            AnyRouteBackend::Osrm(osrm::OsrmRouteBackend::new(endpoint)?)
        }
    };
    Ok(CachedRouteBackend::new(inner, DEFAULT_ROUTE_CACHE_CAPACITY))
}
