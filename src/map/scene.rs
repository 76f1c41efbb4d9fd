//! Headless map backend that records the scene instead of drawing it.
//!
//! The recorded scene serializes to a MapLibre style document and a marker
//! FeatureCollection, which a browser host (or a test) can inspect or replay.

use std::collections::BTreeMap;

use serde_json::{Value, json};

use super::backend::{Cursor, LayerSpec, MapBackend, MapError, MapOptions, MarkerId, MarkerSpec};

#[derive(Debug, Default)]
pub struct SceneBackend {
    options: Option<MapOptions>,
    loaded: bool,
    load_on_create: bool,
    sources: Vec<(String, Value)>, // Insertion order is draw order
    layers: Vec<LayerSpec>,
    markers: BTreeMap<MarkerId, MarkerSpec>,
    next_marker: u64,
    cursor: Cursor,
}

impl SceneBackend {
    /// A backend whose style finishes loading only when `finish_loading` is called.
    pub fn new() -> Self { Self::default() }

    /// A backend whose style is ready as soon as the map is created.
    pub fn preloaded() -> Self { Self { load_on_create: true, ..Self::default() } }

    /// Simulate the asynchronous style/tile load completing.
    pub fn finish_loading(&mut self) {
        if self.options.is_some() { self.loaded = true }
    }

    #[inline] pub fn is_created(&self) -> bool { self.options.is_some() }
    #[inline] pub fn options(&self) -> Option<&MapOptions> { self.options.as_ref() }
    #[inline] pub fn cursor(&self) -> Cursor { self.cursor }

    pub fn layers(&self) -> &[LayerSpec] { &self.layers }
    pub fn layer(&self, id: &str) -> Option<&LayerSpec> { self.layers.iter().find(|l| l.id == id) }
    pub fn source(&self, id: &str) -> Option<&Value> {
        self.sources.iter().find(|(sid, _)| sid == id).map(|(_, v)| v)
    }
    pub fn source_ids(&self) -> impl Iterator<Item = &str> { self.sources.iter().map(|(id, _)| id.as_str()) }
    pub fn markers(&self) -> impl Iterator<Item = &MarkerSpec> { self.markers.values() }
    pub fn num_markers(&self) -> usize { self.markers.len() }

    /// Layer ids starting with `prefix`, in draw order.
    pub fn layer_ids_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.layers.iter().map(|l| l.id.as_str()).filter(move |id| id.starts_with(prefix))
    }

    /// The full style document: basemap style merged with every overlay source and layer.
    pub fn to_style_json(&self) -> Value {
        let mut sources = serde_json::Map::new();
        let mut layers: Vec<Value> = Vec::new();
        let mut base_style = Value::Null;

        if let Some(base) = self.options.as_ref().map(|o| o.basemap.to_style_json()) {
            match base {
                Value::Object(mut style) => {
                    if let Some(Value::Object(base_sources)) = style.remove("sources") {
                        sources.extend(base_sources);
                    }
                    if let Some(Value::Array(base_layers)) = style.remove("layers") {
                        layers.extend(base_layers);
                    }
                }
                url => base_style = url,
            }
        }

        for (id, data) in &self.sources {
            sources.insert(id.clone(), json!({ "type": "geojson", "data": data }));
        }
        layers.extend(self.layers.iter().map(LayerSpec::to_style_json));

        let (center, zoom) = self.options.as_ref()
            .map(|o| (json!([o.center.x, o.center.y]), json!(o.zoom)))
            .unwrap_or((Value::Null, Value::Null));

        json!({
            "version": 8,
            "base_style": base_style,
            "center": center,
            "zoom": zoom,
            "sources": sources,
            "layers": layers,
        })
    }

    /// Markers as GeoJSON points carrying their style and click target.
    pub fn markers_geojson(&self) -> Value {
        let features: Vec<Value> = self.markers.iter().map(|(id, m)| json!({
            "type": "Feature",
            "id": id.0,
            "geometry": { "type": "Point", "coordinates": [m.position.x, m.position.y] },
            "properties": {
                "fill": m.fill.to_string(),
                "border": m.border.to_string(),
                "size": m.size_px,
                "label": m.label,
                "target": m.target,
            },
        })).collect();

        json!({ "type": "FeatureCollection", "features": features })
    }

    /// Style, markers and cursor in one document.
    pub fn snapshot(&self) -> Value {
        json!({
            "style": self.to_style_json(),
            "markers": self.markers_geojson(),
            "cursor": self.cursor,
        })
    }
}

impl MapBackend for SceneBackend {
    fn create(&mut self, options: &MapOptions) -> Result<(), MapError> {
        self.options = Some(options.clone());
        self.loaded = self.load_on_create;
        Ok(())
    }

    fn destroy(&mut self) {
        self.options = None;
        self.loaded = false;
        self.sources.clear();
        self.layers.clear();
        self.markers.clear();
        self.cursor = Cursor::Default;
    }

    fn is_style_loaded(&self) -> bool { self.loaded }

    fn has_source(&self, id: &str) -> bool { self.sources.iter().any(|(sid, _)| sid == id) }

    fn add_source(&mut self, id: &str, data: Value) -> Result<(), MapError> {
        if !self.is_created() { return Err(MapError::NotInitialized) }
        if self.has_source(id) { return Err(MapError::DuplicateSource(id.to_string())) }
        self.sources.push((id.to_string(), data));
        Ok(())
    }

    fn remove_source(&mut self, id: &str) { self.sources.retain(|(sid, _)| sid != id) }

    fn has_layer(&self, id: &str) -> bool { self.layers.iter().any(|l| l.id == id) }

    fn add_layer(&mut self, layer: LayerSpec) -> Result<(), MapError> {
        if !self.is_created() { return Err(MapError::NotInitialized) }
        if self.has_layer(&layer.id) { return Err(MapError::DuplicateLayer(layer.id)) }
        if !self.has_source(&layer.source) {
            return Err(MapError::MissingSource { layer: layer.id, source_id: layer.source });
        }
        self.layers.push(layer);
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) { self.layers.retain(|l| l.id != id) }

    fn add_marker(&mut self, marker: MarkerSpec) -> Result<MarkerId, MapError> {
        if !self.is_created() { return Err(MapError::NotInitialized) }
        let id = MarkerId(self.next_marker);
        self.next_marker += 1;
        self.markers.insert(id, marker);
        Ok(id)
    }

    fn remove_marker(&mut self, id: MarkerId) { self.markers.remove(&id); }

    fn set_cursor(&mut self, cursor: Cursor) { self.cursor = cursor }
}

#[cfg(test)]
mod tests {
    use geo::Coord;

    use super::*;
    use crate::{map::Basemap, types::Rgb};

    fn options() -> MapOptions {
        MapOptions {
            container: "map".into(),
            center: Coord { x: 90.4125, y: 23.8103 },
            zoom: 13.0,
            basemap: Basemap::default(),
        }
    }

    #[test]
    fn rejects_work_before_create() {
        let mut scene = SceneBackend::new();
        assert_eq!(scene.add_source("a", json!({})), Err(MapError::NotInitialized));
    }

    #[test]
    fn loading_is_deferred_until_finished() {
        let mut scene = SceneBackend::new();
        scene.create(&options()).unwrap();
        assert!(!scene.is_style_loaded());
        scene.finish_loading();
        assert!(scene.is_style_loaded());

        let mut ready = SceneBackend::preloaded();
        ready.create(&options()).unwrap();
        assert!(ready.is_style_loaded());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut scene = SceneBackend::preloaded();
        scene.create(&options()).unwrap();
        scene.add_source("s", json!({})).unwrap();
        assert_eq!(scene.add_source("s", json!({})), Err(MapError::DuplicateSource("s".into())));

        let layer = LayerSpec::fill("l", "s", Rgb::from_u32(0), 0.5);
        scene.add_layer(layer.clone()).unwrap();
        assert_eq!(scene.add_layer(layer), Err(MapError::DuplicateLayer("l".into())));

        let orphan = LayerSpec::fill("o", "missing", Rgb::from_u32(0), 0.5);
        assert!(matches!(scene.add_layer(orphan), Err(MapError::MissingSource { .. })));
    }

    #[test]
    fn style_merges_basemap_and_overlays() {
        let mut scene = SceneBackend::preloaded();
        scene.create(&options()).unwrap();
        scene.add_source("zone-zone-1", json!({ "type": "Feature" })).unwrap();
        scene.add_layer(LayerSpec::fill("zone-fill-zone-1", "zone-zone-1", Rgb::from_u32(0), 0.2)).unwrap();

        let style = scene.to_style_json();
        assert!(style["sources"]["basemap"].is_object());
        assert_eq!(style["sources"]["zone-zone-1"]["type"], "geojson");
        assert_eq!(style["layers"][0]["id"], "basemap");
        assert_eq!(style["layers"][1]["id"], "zone-fill-zone-1");
        assert_eq!(style["center"], json!([90.4125, 23.8103]));
    }

    #[test]
    fn destroy_clears_everything() {
        let mut scene = SceneBackend::preloaded();
        scene.create(&options()).unwrap();
        scene.add_source("s", json!({})).unwrap();
        scene.destroy();
        scene.destroy();
        assert!(!scene.is_created());
        assert_eq!(scene.source_ids().count(), 0);
    }
}
