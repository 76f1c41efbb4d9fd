use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DriverId, LogId, RouteId, TruckId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TruckStatus {
    Available,
    InUse,
    Maintenance,
    OutOfService,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Truck {
    pub id: TruckId,
    pub plate: String,
    pub model: String,
    pub capacity_m3: f64,
    pub status: TruckStatus,
    pub fuel_level: u8, // Percent
    pub driver: Option<DriverId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriverStatus {
    Available,
    OnRoute,
    OffDuty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: DriverId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: DriverStatus,
    pub current_route: Option<RouteId>,
    pub total_routes: u32,
    pub completed_routes: u32,
}

/// One line of the operator-facing activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: LogId,
    pub action: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
    pub user: String,
}
