//! OSRM `/route` backend.
//!
//! Wraps an async HTTP client for OSRM and exposes only duration and distance
//! of the best route, without leaking details of the HTTP response.

mod parser;
mod response;


use std::time::Duration;

use h3o::LatLng;
use reqwest::{Client, Url};

use super::{RouteBackend, RouteLeg, RoutingError};
use parser::parse_route_response;
use response::OsrmRouteResponse;

/// Transport-level timeout; the per-lookup deadline in the distance provider is
/// usually tighter.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin HTTP client for OSRM's driving profile.
#[derive(Debug, Clone)]
pub struct OsrmRouteBackend {
    client: Client,
    endpoint: String,
}

impl OsrmRouteBackend {
    /// Create a backend for the given OSRM endpoint (e.g. `http://localhost:5000`).
    pub fn new(endpoint: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn route_url(&self, from: LatLng, to: LatLng) -> Result<Url, RoutingError> {
        let base = format!(
            "{}/route/v1/driving/{:.6},{:.6};{:.6},{:.6}",
            self.endpoint,
            from.lng(),
            from.lat(),
            to.lng(),
            to.lat(),
        );
        let mut url = Url::parse(&base)
            .map_err(|err| RoutingError::Api(format!("failed to build OSRM URL: {}", err)))?;
        url.query_pairs_mut()
            .append_pair("overview", "false")
            .append_pair("alternatives", "false");
        Ok(url)
    }
}

impl RouteBackend for OsrmRouteBackend {
    async fn route(&self, from: LatLng, to: LatLng) -> Result<RouteLeg, RoutingError> {
        let url = self.route_url(from, to)?;
        let response = self.client.get(url).send().await?;
        let status = response.status();

        // OSRM reports NoRoute and friends as JSON bodies on 400, so only give up on
        // the status when the body is not an OSRM response either.
        let parsed: OsrmRouteResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => return Err(RoutingError::Status(status.as_u16())),
            Err(err) => return Err(RoutingError::Decode(err.to_string())),
        };
        parse_route_response(parsed)
    }
}
