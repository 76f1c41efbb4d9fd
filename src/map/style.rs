use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Basemap the overlays are drawn on. Swapping it never touches overlay logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Basemap {
    /// Vector style descriptor fetched by the mapping library.
    Url { url: String },
    /// Raster tile template, e.g. `https://tile.openstreetmap.org/{z}/{x}/{y}.png`.
    Raster { tiles: Vec<String>, tile_size: u32, attribution: String },
}

impl Default for Basemap {
    fn default() -> Self {
        Basemap::Raster {
            tiles: vec!["https://tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()],
            tile_size: 256,
            attribution: "&copy; OpenStreetMap contributors".to_string(),
        }
    }
}

impl Basemap {
    /// The `style` value handed to the map constructor: a URL string or an inline style document.
    pub fn to_style_json(&self) -> Value {
        match self {
            Basemap::Url { url } => Value::String(url.clone()),
            Basemap::Raster { tiles, tile_size, attribution } => json!({
                "version": 8,
                "sources": {
                    "basemap": {
                        "type": "raster",
                        "tiles": tiles,
                        "tileSize": tile_size,
                        "attribution": attribution,
                    }
                },
                "layers": [{ "id": "basemap", "type": "raster", "source": "basemap" }],
            }),
        }
    }
}
