use std::collections::BTreeMap;

use ahash::AHashMap;
use geo::Coord;

use crate::types::{Bin, BinId, BlockedRoad, Route, RouteId, Zone, ZoneId};

use super::backend::{Cursor, MapBackend, MapError, MapOptions, MarkerId};
use super::overlay::{self, DrawingKind, OverlayGroup, OverlayPlan};
use super::style::Basemap;

/// Everything one group currently has on the map.
#[derive(Debug, Default)]
struct Drawn {
    sources: Vec<String>,
    layers: Vec<String>,
    markers: Vec<MarkerId>,
}

/// Owns one map instance and its overlay groups.
///
/// Each `set_*` call fully replaces its group. Calls made before the style has
/// loaded are parked per group, keeping only the latest, and applied once by
/// [`MapSurface::handle_style_load`].
#[derive(Debug)]
pub struct MapSurface<B: MapBackend> {
    backend: B,
    basemap: Basemap,
    initialized: bool,
    drawn: AHashMap<OverlayGroup, Drawn>,
    pending: BTreeMap<OverlayGroup, OverlayPlan>,
}

impl<B: MapBackend> MapSurface<B> {
    pub fn new(backend: B, basemap: Basemap) -> Self {
        Self { backend, basemap, initialized: false, drawn: AHashMap::new(), pending: BTreeMap::new() }
    }

    #[inline] pub fn backend(&self) -> &B { &self.backend }
    #[inline] pub fn backend_mut(&mut self) -> &mut B { &mut self.backend }
    #[inline] pub fn is_initialized(&self) -> bool { self.initialized }

    /// True once overlay updates can be applied immediately.
    pub fn is_ready(&self) -> bool { self.initialized && self.backend.is_style_loaded() }

    /// Create the map. A second call while initialized does nothing.
    pub fn initialize(&mut self, container: &str, center: Coord<f64>, zoom: f64) -> Result<(), MapError> {
        if self.initialized {
            tracing::debug!("map already initialized");
            return Ok(());
        }
        self.backend.create(&MapOptions {
            container: container.to_string(),
            center,
            zoom,
            basemap: self.basemap.clone(),
        })?;
        self.initialized = true;

        if self.backend.is_style_loaded() {
            self.handle_style_load()?;
        }
        Ok(())
    }

    /// Apply every parked update, each exactly once. Returns how many groups were drawn.
    pub fn handle_style_load(&mut self) -> Result<usize, MapError> {
        if !self.is_ready() { return Ok(0) }

        let pending = std::mem::take(&mut self.pending);
        let count = pending.len();
        if count > 0 {
            tracing::debug!(groups = count, "flushing deferred overlay updates");
        }
        for (group, plan) in pending {
            self.draw(group, plan)?;
        }
        Ok(count)
    }

    pub fn set_zones(&mut self, zones: &[Zone], selected: Option<&ZoneId>) -> Result<(), MapError> {
        self.submit(OverlayGroup::Zones, overlay::zones_plan(zones, selected))
    }

    pub fn set_bins(&mut self, bins: &[Bin], selected: Option<&BinId>) -> Result<(), MapError> {
        self.submit(OverlayGroup::Bins, overlay::bins_plan(bins, selected))
    }

    /// `bins` supplies stop locations for the numbered stop markers.
    pub fn set_routes(&mut self, routes: &[Route], bins: &[Bin], selected: Option<&RouteId>) -> Result<(), MapError> {
        self.submit(OverlayGroup::Routes, overlay::routes_plan(routes, bins, selected))
    }

    pub fn set_blocked_roads(&mut self, roads: &[BlockedRoad]) -> Result<(), MapError> {
        self.submit(OverlayGroup::BlockedRoads, overlay::blocked_roads_plan(roads))
    }

    /// Draw the in-progress shape. Empty `points` clears it.
    pub fn set_drawing_overlay(&mut self, points: &[Coord<f64>], kind: DrawingKind) -> Result<(), MapError> {
        self.submit(OverlayGroup::Drawing, overlay::drawing_plan(points, kind))
    }

    pub fn clear_drawing_overlay(&mut self) -> Result<(), MapError> {
        self.submit(OverlayGroup::Drawing, OverlayPlan::default())
    }

    pub fn set_cursor_mode(&mut self, active: bool) {
        self.backend.set_cursor(if active { Cursor::Crosshair } else { Cursor::Default });
    }

    /// Release the map and all overlays. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if !self.initialized { return }
        self.backend.destroy();
        self.drawn.clear();
        self.pending.clear();
        self.initialized = false;
        tracing::debug!("map torn down");
    }

    pub fn num_pending(&self) -> usize { self.pending.len() }

    pub fn num_layers(&self, group: OverlayGroup) -> usize { self.drawn.get(&group).map_or(0, |d| d.layers.len()) }

    pub fn num_markers(&self, group: OverlayGroup) -> usize { self.drawn.get(&group).map_or(0, |d| d.markers.len()) }

    pub fn layer_ids(&self, group: OverlayGroup) -> &[String] {
        self.drawn.get(&group).map_or(&[][..], |d| d.layers.as_slice())
    }

    fn submit(&mut self, group: OverlayGroup, plan: OverlayPlan) -> Result<(), MapError> {
        if self.is_ready() {
            self.draw(group, plan)
        } else {
            if self.pending.insert(group, plan).is_some() {
                tracing::trace!(?group, "replaced parked overlay update");
            }
            Ok(())
        }
    }

    fn clear(&mut self, group: OverlayGroup) {
        let Some(drawn) = self.drawn.remove(&group) else { return };
        for id in &drawn.layers {
            self.backend.remove_layer(id);
        }
        for id in &drawn.sources {
            self.backend.remove_source(id);
        }
        for id in drawn.markers {
            self.backend.remove_marker(id);
        }
    }

    fn draw(&mut self, group: OverlayGroup, plan: OverlayPlan) -> Result<(), MapError> {
        self.clear(group);

        // Identity-derived ids can still be held by a layer drawn outside this group.
        for layer in &plan.layers {
            if self.backend.has_layer(&layer.id) { self.backend.remove_layer(&layer.id) }
        }
        for (id, _) in &plan.sources {
            if self.backend.has_source(id) { self.backend.remove_source(id) }
        }

        let drawn = self.drawn.entry(group).or_default();
        for (id, data) in plan.sources {
            self.backend.add_source(&id, data)?;
            drawn.sources.push(id);
        }
        for layer in plan.layers {
            let id = layer.id.clone();
            self.backend.add_layer(layer)?;
            drawn.layers.push(id);
        }
        for marker in plan.markers {
            drawn.markers.push(self.backend.add_marker(marker)?);
        }
        Ok(())
    }
}
