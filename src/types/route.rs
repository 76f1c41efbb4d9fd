use geo::{Coord, LineString};
use serde::{Deserialize, Serialize};

use super::{BinId, DriverId, Rgb, RouteId, TruckId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl RouteStatus {
    pub fn to_str(&self) -> &'static str {
        match self {
            RouteStatus::Pending => "pending",
            RouteStatus::InProgress => "in_progress",
            RouteStatus::Completed => "completed",
        }
    }
}

/// Aggregate length and travel time of a road-snapped path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteMetrics {
    pub distance_km: f64,
    pub duration_min: f64,
}

/// An ordered visit plan over bins plus the path drawn for it.
///
/// `stops` are the semantic waypoints; `path` is the polyline to render, which is
/// either the road-snapped geometry or the straight line through the stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    pub color: Rgb,
    pub stops: Vec<BinId>,
    pub path: LineString<f64>,
    pub status: RouteStatus,
    pub metrics: Option<RouteMetrics>,
    pub driver: Option<DriverId>,
    pub truck: Option<TruckId>,
}

impl Route {
    pub fn path_coords(&self) -> &[Coord<f64>] { &self.path.0 }

    /// True if the path is just the straight line through `stops` (no road geometry).
    pub fn is_straight_line(&self, stop_coords: &[Coord<f64>]) -> bool {
        self.path.0.as_slice() == stop_coords
    }
}

/// A road segment shown as blocked. Advisory only, never used for routing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedRoad {
    pub start: Coord<f64>,
    pub end: Coord<f64>,
    pub reason: String,
}
