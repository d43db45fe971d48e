#[derive(serde::Deserialize)]
pub(super) struct OsrmRouteResponse {
    pub(super) code: String,
    pub(super) message: Option<String>,
    pub(super) routes: Option<Vec<OsrmRoute>>,
}

#[derive(serde::Deserialize)]
pub(super) struct OsrmRoute {
    /// Metres.
    pub(super) distance: f64,
    /// Seconds.
    pub(super) duration: f64,
}
