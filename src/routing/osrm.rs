use geo::{Coord, LineString};
use serde::{Deserialize, Serialize};

use super::{RouteResult, RoutingError};

/// Where and how to ask an OSRM server for routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsrmEndpoint {
    pub base_url: String,
    pub profile: String,
}

impl Default for OsrmEndpoint {
    fn default() -> Self {
        Self { base_url: "https://router.project-osrm.org".to_string(), profile: "driving".to_string() }
    }
}

impl OsrmEndpoint {
    pub fn new(base_url: impl Into<String>, profile: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), profile: profile.into() }
    }

    /// Route service URL for `waypoints` in order, asking for the full GeoJSON geometry.
    pub fn route_url(&self, waypoints: &[Coord<f64>]) -> Result<String, RoutingError> {
        if waypoints.len() < 2 {
            return Err(RoutingError::TooFewWaypoints(waypoints.len()));
        }
        let coords = waypoints.iter()
            .map(|c| format!("{},{}", c.x, c.y))
            .collect::<Vec<_>>()
            .join(";");

        Ok(format!(
            "{}/route/v1/{}/{coords}?overview=full&geometries=geojson",
            self.base_url.trim_end_matches('/'),
            self.profile,
        ))
    }
}

#[derive(Deserialize)]
struct Response {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<CandidateRoute>,
}

#[derive(Deserialize)]
struct CandidateRoute {
    geometry: Geometry,
    distance: f64, // meters
    duration: f64, // seconds
}

#[derive(Deserialize)]
struct Geometry {
    coordinates: Vec<[f64; 2]>,
}

/// Parse an OSRM route response body. Takes the first candidate route.
pub fn parse_route_response(body: &[u8]) -> Result<RouteResult, RoutingError> {
    let response: Response = serde_json::from_slice(body)
        .map_err(|e| RoutingError::Malformed(e.to_string()))?;

    if response.code != "Ok" {
        return Err(RoutingError::NoRoute {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }
    let route = response.routes.into_iter().next().ok_or_else(|| RoutingError::NoRoute {
        code: "Ok".to_string(),
        message: "no candidate routes".to_string(),
    })?;
    if route.geometry.coordinates.len() < 2 {
        return Err(RoutingError::Malformed(format!(
            "route geometry has {} coordinates", route.geometry.coordinates.len()
        )));
    }

    Ok(RouteResult {
        path: LineString(route.geometry.coordinates.into_iter().map(|[x, y]| Coord { x, y }).collect()),
        distance_km: route.distance / 1000.0,
        duration_min: route.duration / 60.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_lon_lat_pairs() {
        let endpoint = OsrmEndpoint::new("https://osrm.example/", "driving");
        let url = endpoint.route_url(&[Coord { x: 90.41, y: 23.8 }, Coord { x: 90.415, y: 23.805 }]).unwrap();
        assert_eq!(url, "https://osrm.example/route/v1/driving/90.41,23.8;90.415,23.805?overview=full&geometries=geojson");
    }

    #[test]
    fn url_needs_two_waypoints() {
        let err = OsrmEndpoint::default().route_url(&[Coord { x: 0.0, y: 0.0 }]).unwrap_err();
        assert_eq!(err, RoutingError::TooFewWaypoints(1));
    }

    #[test]
    fn parses_first_route_and_converts_units() {
        let body = br#"{
            "code": "Ok",
            "routes": [
                { "geometry": { "type": "LineString", "coordinates": [[90.41, 23.8], [90.412, 23.802], [90.415, 23.805]] },
                  "distance": 2500.0, "duration": 300.0 },
                { "geometry": { "type": "LineString", "coordinates": [[0, 0], [1, 1]] },
                  "distance": 1.0, "duration": 1.0 }
            ],
            "waypoints": []
        }"#;
        let result = parse_route_response(body).unwrap();
        assert_eq!(result.path.0.len(), 3);
        assert_eq!(result.path.0[1], Coord { x: 90.412, y: 23.802 });
        assert!((result.distance_km - 2.5).abs() < 1e-9);
        assert!((result.duration_min - 5.0).abs() < 1e-9);
    }

    #[test]
    fn non_ok_code_is_no_route() {
        let body = br#"{ "code": "NoRoute", "message": "Impossible route between points" }"#;
        assert!(matches!(parse_route_response(body), Err(RoutingError::NoRoute { code, .. }) if code == "NoRoute"));
    }

    #[test]
    fn ok_without_routes_is_no_route() {
        assert!(matches!(parse_route_response(br#"{ "code": "Ok", "routes": [] }"#), Err(RoutingError::NoRoute { .. })));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(parse_route_response(b"<html>"), Err(RoutingError::Malformed(_))));
    }
}
