mod bin;
mod color;
mod fleet;
mod ids;
mod route;
mod zone;

pub use bin::{Bin, BinStatus, FillCategory};
pub use color::{ParseColorError, Rgb};
pub use fleet::{ActivityLog, Driver, DriverStatus, Truck, TruckStatus};
pub use ids::{BinId, DriverId, LogId, RouteId, TruckId, ZoneId};
pub use route::{BlockedRoad, Route, RouteMetrics, RouteStatus};
pub use zone::{GeometryError, Zone, closed_ring};
