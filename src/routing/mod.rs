//! Road-snapping through an external routing service.

#[cfg(feature = "routing")]
mod client;
mod osrm;

use geo::{Coord, LineString};

#[cfg(feature = "routing")]
pub use client::OsrmClient;
pub use osrm::{OsrmEndpoint, parse_route_response};

/// A road-snapped path with its aggregate cost.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    pub path: LineString<f64>,
    pub distance_km: f64,
    pub duration_min: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoutingError {
    #[error("routing needs at least 2 waypoints, got {0}")]
    TooFewWaypoints(usize),
    #[error("routing service is unavailable")]
    Unavailable,
    #[error("routing request failed: {0}")]
    Transport(String),
    #[error("routing service returned HTTP {0}")]
    Status(u16),
    #[error("routing service answered {code}: {message}")]
    NoRoute { code: String, message: String },
    #[error("malformed routing response: {0}")]
    Malformed(String),
}

/// Anything that can turn ordered waypoints into a road path.
///
/// One attempt per call; callers decide what to do on failure.
pub trait Router {
    fn route(&self, waypoints: &[Coord<f64>]) -> Result<RouteResult, RoutingError>;
}

impl<R: Router + ?Sized> Router for &R {
    fn route(&self, waypoints: &[Coord<f64>]) -> Result<RouteResult, RoutingError> { (**self).route(waypoints) }
}

/// Router used when routing is disabled. Every route degrades to straight lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl Router for Offline {
    fn route(&self, _waypoints: &[Coord<f64>]) -> Result<RouteResult, RoutingError> { Err(RoutingError::Unavailable) }
}
