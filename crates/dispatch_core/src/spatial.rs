//! Straight-line ("air") distance between coordinates.
//!
//! Air distance is the cheap first tier of every travel lookup: it needs no
//! backend and lower-bounds road distance in the common case, which is what the
//! optional air-distance filter in [`crate::distance`] relies on.

use h3o::LatLng;

/// Mean earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres between two coordinates.
pub fn air_distance_km(a: LatLng, b: LatLng) -> f64 {
    let (lat1, lon1) = (a.lat().to_radians(), a.lng().to_radians());
    let (lat2, lon2) = (b.lat().to_radians(), b.lng().to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    // Rounding can push `h` just past 1 for near-antipodal pairs.
    let h = (sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon).clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Shift `origin` by the given kilometres north and east (flat-earth approximation).
///
/// Good enough for building city-scale fixtures; not used for cost computation.
pub fn offset_km(origin: LatLng, north_km: f64, east_km: f64) -> Option<LatLng> {
    let km_per_degree = EARTH_RADIUS_KM.to_radians();
    let lat = origin.lat() + north_km / km_per_degree;
    let lng = origin.lng() + east_km / (km_per_degree * origin.lat().to_radians().cos());
    LatLng::new(lat, lng).ok()
}
