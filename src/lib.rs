#![doc = "Wastemap public API"]
pub mod config;
mod dashboard;
pub mod io;
pub mod map;
pub mod routing;
pub mod store;
pub mod types;
pub mod workflow;

pub use geo::Coord;

#[doc(inline)]
pub use config::Settings;

#[doc(inline)]
pub use dashboard::{Dashboard, LayerVisibility, Selection};

#[doc(inline)]
pub use map::{Basemap, DrawingKind, MapBackend, MapSurface, OverlayGroup, SceneBackend};

#[doc(inline)]
pub use routing::{Offline, OsrmEndpoint, RouteResult, Router, RoutingError};

#[cfg(feature = "routing")]
#[doc(inline)]
pub use routing::OsrmClient;

#[doc(inline)]
pub use store::{Analytics, RecordSet, Statistics, seed, seed_with};

#[doc(inline)]
pub use types::{Bin, BinId, BinStatus, FillCategory, Route, RouteId, RouteStatus, Zone, ZoneId};

#[doc(inline)]
pub use workflow::{CreationMode, CreationWorkflow, RouteCompletion, Tool};
