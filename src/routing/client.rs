use std::time::Duration;

use geo::Coord;
use reqwest::blocking::Client;

use super::{OsrmEndpoint, RouteResult, Router, RoutingError, parse_route_response};

const USER_AGENT: &str = concat!("wastemap/", env!("CARGO_PKG_VERSION"));

/// Blocking OSRM client. One request per call, no retries.
#[derive(Debug, Clone)]
pub struct OsrmClient {
    client: Client,
    endpoint: OsrmEndpoint,
}

impl OsrmClient {
    /// Build a client. `timeout` of `None` waits as long as the server does.
    pub fn new(endpoint: OsrmEndpoint, timeout: Option<Duration>) -> Result<Self, RoutingError> {
        // The blocking client defaults to 30s; pass the setting through so `None` really disables it.
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build().map_err(|e| RoutingError::Transport(e.to_string()))?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &OsrmEndpoint { &self.endpoint }
}

impl Router for OsrmClient {
    fn route(&self, waypoints: &[Coord<f64>]) -> Result<RouteResult, RoutingError> {
        let url = self.endpoint.route_url(waypoints)?;
        tracing::debug!(%url, "requesting route");

        let resp = self.client.get(&url).send().map_err(|e| RoutingError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RoutingError::Status(status.as_u16()));
        }
        let body = resp.bytes().map_err(|e| RoutingError::Transport(e.to_string()))?;
        parse_route_response(&body)
    }
}
