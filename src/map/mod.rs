//! Map rendering surface: overlay groups drawn onto a tile-based map.

mod backend;
pub mod color;
pub mod overlay;
mod scene;
mod style;
mod surface;

pub use backend::{Cursor, LayerKind, LayerSpec, MapBackend, MapError, MapOptions, MarkerId, MarkerSpec, MarkerTarget, Paint};
pub use overlay::{DrawingKind, OverlayGroup, OverlayPlan};
pub use scene::SceneBackend;
pub use style::Basemap;
pub use surface::MapSurface;
