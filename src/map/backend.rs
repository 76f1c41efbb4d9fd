use geo::Coord;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value, json};

use crate::types::{BinId, Rgb, RouteId};

use super::style::Basemap;

/// Errors reported by a mapping backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error("map has not been created")]
    NotInitialized,
    #[error("source {0:?} already exists")]
    DuplicateSource(String),
    #[error("layer {0:?} already exists")]
    DuplicateLayer(String),
    #[error("layer {layer:?} refers to missing source {source_id:?}")]
    MissingSource { layer: String, source_id: String },
    #[error("map backend error: {0}")]
    Backend(String),
}

/// Construction parameters for the single map instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapOptions {
    pub container: String,
    pub center: Coord<f64>, // (lon, lat)
    pub zoom: f64,
    pub basemap: Basemap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Fill,
    Line,
}

/// Paint properties shared by fill and line layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paint {
    pub color: Rgb,
    pub opacity: f64,
    pub width: f64,               // Ignored for fills
    pub dash: Option<[f64; 2]>,   // Line dash pattern, in line widths
}

/// One styled layer drawing a GeoJSON source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub id: String,
    pub source: String,
    pub kind: LayerKind,
    pub paint: Paint,
}

impl LayerSpec {
    pub fn fill(id: impl Into<String>, source: impl Into<String>, color: Rgb, opacity: f64) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            kind: LayerKind::Fill,
            paint: Paint { color, opacity, width: 0.0, dash: None },
        }
    }

    pub fn line(id: impl Into<String>, source: impl Into<String>, color: Rgb, width: f64, opacity: f64) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            kind: LayerKind::Line,
            paint: Paint { color, opacity, width, dash: None },
        }
    }

    pub fn dashed(mut self, dash: [f64; 2]) -> Self {
        self.paint.dash = Some(dash);
        self
    }

    /// Render as a MapLibre style-spec layer object.
    pub fn to_style_json(&self) -> Value {
        let mut paint = JsonMap::new();
        let color = Value::String(self.paint.color.to_string());
        match self.kind {
            LayerKind::Fill => {
                paint.insert("fill-color".into(), color);
                paint.insert("fill-opacity".into(), json!(self.paint.opacity));
            }
            LayerKind::Line => {
                paint.insert("line-color".into(), color);
                paint.insert("line-width".into(), json!(self.paint.width));
                paint.insert("line-opacity".into(), json!(self.paint.opacity));
                if let Some(dash) = self.paint.dash {
                    paint.insert("line-dasharray".into(), json!(dash));
                }
            }
        }

        let mut layer = json!({
            "id": self.id,
            "type": self.kind,
            "source": self.source,
            "paint": paint,
        });
        if self.kind == LayerKind::Line && self.paint.dash.is_none() {
            layer["layout"] = json!({ "line-cap": "round", "line-join": "round" });
        }
        layer
    }
}

/// What a marker stands for, so host click events can be routed back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarkerTarget {
    Bin { id: BinId },
    RouteStop { route: RouteId, index: usize },
    DraftVertex { index: usize },
}

/// A DOM-style marker pinned to a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub position: Coord<f64>,
    pub fill: Rgb,
    pub border: Rgb,
    pub size_px: u32,
    pub label: Option<String>,
    pub target: MarkerTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    #[default]
    Default,
    Crosshair,
}

/// The slice of a tile-based mapping library the overlay surface drives.
///
/// Implementations must reject duplicate source/layer identifiers, the way
/// MapLibre does; the surface is responsible for never submitting one.
pub trait MapBackend {
    /// Construct the map instance. Called once per surface lifetime.
    fn create(&mut self, options: &MapOptions) -> Result<(), MapError>;

    /// Release the map instance and everything attached to it.
    fn destroy(&mut self);

    /// Whether the style and tiles have finished their initial asynchronous load.
    fn is_style_loaded(&self) -> bool;

    fn has_source(&self, id: &str) -> bool;
    fn add_source(&mut self, id: &str, data: Value) -> Result<(), MapError>;
    fn remove_source(&mut self, id: &str);

    fn has_layer(&self, id: &str) -> bool;
    fn add_layer(&mut self, layer: LayerSpec) -> Result<(), MapError>;
    fn remove_layer(&mut self, id: &str);

    fn add_marker(&mut self, marker: MarkerSpec) -> Result<MarkerId, MapError>;
    fn remove_marker(&mut self, id: MarkerId);

    fn set_cursor(&mut self, cursor: Cursor);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashed_line_layer_json() {
        let layer = LayerSpec::line("zone-outline-zone-1", "zone-zone-1", Rgb::from_u32(0x3b82f6), 2.0, 1.0)
            .dashed([5.0, 5.0]);
        let json = layer.to_style_json();
        assert_eq!(json["type"], "line");
        assert_eq!(json["paint"]["line-color"], "#3b82f6");
        assert_eq!(json["paint"]["line-dasharray"], json!([5.0, 5.0]));
        assert!(json.get("layout").is_none());
    }

    #[test]
    fn solid_line_gets_round_layout() {
        let json = LayerSpec::line("route-line-r", "route-r", Rgb::from_u32(0), 4.0, 0.7).to_style_json();
        assert_eq!(json["layout"]["line-cap"], "round");
    }

    #[test]
    fn fill_layer_json() {
        let json = LayerSpec::fill("zone-fill-z", "zone-z", Rgb::from_u32(0x8b5cf6), 0.15).to_style_json();
        assert_eq!(json["type"], "fill");
        assert_eq!(json["paint"]["fill-opacity"], 0.15);
        assert!(json["paint"].get("line-width").is_none());
    }
}
