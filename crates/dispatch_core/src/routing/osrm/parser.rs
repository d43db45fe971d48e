use super::response::OsrmRouteResponse;
use crate::routing::{RouteLeg, RoutingError};

pub(super) fn parse_route_response(resp: OsrmRouteResponse) -> Result<RouteLeg, RoutingError> {
    match resp.code.as_str() {
        "Ok" => {}
        "NoRoute" | "NoSegment" => return Err(RoutingError::NoRoute),
        _ => {
            let detail = match resp.message {
                Some(message) => format!("{}: {}", resp.code, message),
                None => resp.code,
            };
            return Err(RoutingError::Api(detail));
        }
    }

    let route = resp
        .routes
        .and_then(|routes| routes.into_iter().next())
        .ok_or(RoutingError::NoRoute)?;

    if !route.duration.is_finite() || route.duration < 0.0 {
        return Err(RoutingError::Decode(format!(
            "invalid route duration {}",
            route.duration
        )));
    }
    if !route.distance.is_finite() || route.distance < 0.0 {
        return Err(RoutingError::Decode(format!(
            "invalid route distance {}",
            route.distance
        )));
    }

    Ok(RouteLeg::new(route.duration, route.distance))
}
