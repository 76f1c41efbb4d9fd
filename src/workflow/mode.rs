use std::fmt;

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::types::BinId;

/// A creation tool button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Bin,
    Zone,
    Route,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Bin, Tool::Zone, Tool::Route];
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tool::Bin => "bin",
            Tool::Zone => "zone",
            Tool::Route => "route",
        })
    }
}

/// The active creation mode. Each case carries only its own pending data.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CreationMode {
    #[default]
    Idle,
    PlacingBin,
    DrawingZone { points: Vec<Coord<f64>> },
    BuildingRoute {
        stops: Vec<BinId>,
        session: u64,  // Tags routing requests issued from this session
        routing: bool, // A routing request is in flight
    },
}

impl CreationMode {
    /// The tool that owns this mode, if any.
    pub fn tool(&self) -> Option<Tool> {
        match self {
            CreationMode::Idle => None,
            CreationMode::PlacingBin => Some(Tool::Bin),
            CreationMode::DrawingZone { .. } => Some(Tool::Zone),
            CreationMode::BuildingRoute { .. } => Some(Tool::Route),
        }
    }

    #[inline] pub fn is_idle(&self) -> bool { matches!(self, CreationMode::Idle) }
}
