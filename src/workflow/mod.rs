//! Creation-mode workflow: bin placement, zone drawing and route building.

mod creation;
mod mode;

pub use creation::{
    BinClickEffect, ClickEffect, CreationWorkflow, MIN_ROUTE_STOPS, MIN_ZONE_POINTS, RouteCompletion, RouteRequest,
    WorkflowError,
};
pub use mode::{CreationMode, Tool};
