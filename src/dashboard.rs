//! The admin map page: records, map surface and creation workflow wired together.

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::config::MapSettings;
use crate::map::{MapBackend, MapError, MapSurface, OverlayGroup};
use crate::routing::{RouteResult, Router, RoutingError};
use crate::store::{BinDetail, RecordSet, StoreError, ZoneSummary};
use crate::types::{Bin, BinId, BlockedRoad, Route, RouteId, Zone, ZoneId};
use crate::workflow::{
    BinClickEffect, ClickEffect, CreationWorkflow, RouteCompletion, RouteRequest, Tool, WorkflowError,
};

/// Which record overlays are shown. Hidden groups render empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerVisibility {
    pub zones: bool,
    pub bins: bool,
    pub routes: bool,
    pub blocked_roads: bool,
}

impl Default for LayerVisibility {
    fn default() -> Self { Self { zones: true, bins: true, routes: true, blocked_roads: true } }
}

impl LayerVisibility {
    fn get_mut(&mut self, group: OverlayGroup) -> Option<&mut bool> {
        match group {
            OverlayGroup::Zones => Some(&mut self.zones),
            OverlayGroup::Bins => Some(&mut self.bins),
            OverlayGroup::Routes => Some(&mut self.routes),
            OverlayGroup::BlockedRoads => Some(&mut self.blocked_roads),
            OverlayGroup::Drawing => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub zone: Option<ZoneId>,
    pub bin: Option<BinId>,
    pub route: Option<RouteId>,
}

/// Map page controller. Every mutation re-renders the overlay groups it affects.
///
/// Map backend failures never abort a user action; they are logged and the page
/// stays usable.
#[derive(Debug)]
pub struct Dashboard<B: MapBackend> {
    records: RecordSet,
    surface: MapSurface<B>,
    workflow: CreationWorkflow,
    selection: Selection,
    visibility: LayerVisibility,
    settings: MapSettings,
}

impl<B: MapBackend> Dashboard<B> {
    pub fn new(records: RecordSet, backend: B, settings: MapSettings) -> Self {
        let surface = MapSurface::new(backend, settings.basemap.clone());
        Self {
            records,
            surface,
            workflow: CreationWorkflow::new(),
            selection: Selection::default(),
            visibility: LayerVisibility::default(),
            settings,
        }
    }

    #[inline] pub fn records(&self) -> &RecordSet { &self.records }
    #[inline] pub fn surface(&self) -> &MapSurface<B> { &self.surface }
    #[inline] pub fn surface_mut(&mut self) -> &mut MapSurface<B> { &mut self.surface }
    #[inline] pub fn workflow(&self) -> &CreationWorkflow { &self.workflow }
    #[inline] pub fn selection(&self) -> &Selection { &self.selection }
    #[inline] pub fn visibility(&self) -> LayerVisibility { self.visibility }

    /// Create the map and draw every overlay. Drawing waits for the style if needed.
    pub fn open(&mut self) -> Result<(), MapError> {
        self.surface.initialize(&self.settings.container, self.settings.center(), self.settings.zoom)?;
        self.refresh();
        Ok(())
    }

    /// The host reports that the map style finished loading.
    pub fn handle_style_load(&mut self) -> usize {
        match self.surface.handle_style_load() {
            Ok(n) => n,
            Err(error) => {
                tracing::warn!(%error, "deferred overlay update failed");
                0
            }
        }
    }

    /// Release the map. Records survive until the dashboard is dropped.
    pub fn close(&mut self) {
        self.workflow.cancel();
        self.surface.teardown();
    }

    pub fn refresh(&mut self) {
        for group in OverlayGroup::ALL {
            self.render(group);
        }
        self.surface.set_cursor_mode(self.workflow.cursor_active());
    }

    fn render(&mut self, group: OverlayGroup) {
        let records = &self.records;
        let shown = self.visibility;
        let result = match group {
            OverlayGroup::Zones => {
                let zones: &[Zone] = if shown.zones { records.zones() } else { &[] };
                self.surface.set_zones(zones, self.selection.zone.as_ref())
            }
            OverlayGroup::Bins => {
                let bins: &[Bin] = if shown.bins { records.bins() } else { &[] };
                self.surface.set_bins(bins, self.selection.bin.as_ref())
            }
            OverlayGroup::Routes => {
                let routes: &[Route] = if shown.routes { records.routes() } else { &[] };
                self.surface.set_routes(routes, records.bins(), self.selection.route.as_ref())
            }
            OverlayGroup::BlockedRoads => {
                let roads: &[BlockedRoad] = if shown.blocked_roads { records.blocked_roads() } else { &[] };
                self.surface.set_blocked_roads(roads)
            }
            OverlayGroup::Drawing => match self.workflow.drawing(records) {
                Some((points, kind)) => self.surface.set_drawing_overlay(&points, kind),
                None => self.surface.clear_drawing_overlay(),
            },
        };
        if let Err(error) = result {
            tracing::warn!(?group, %error, "overlay update failed");
        }
    }

    fn render_all_of(&mut self, groups: &[OverlayGroup]) {
        for &group in groups {
            self.render(group);
        }
        self.surface.set_cursor_mode(self.workflow.cursor_active());
    }

    // ---------------------------------------------------------------------
    // Creation workflow
    // ---------------------------------------------------------------------

    pub fn is_tool_enabled(&self, tool: Tool) -> bool { self.workflow.is_tool_enabled(tool) }

    pub fn can_complete(&self) -> bool { self.workflow.can_complete() }

    pub fn select_tool(&mut self, tool: Tool) -> Result<(), WorkflowError> {
        self.workflow.select_tool(tool)?;
        self.render_all_of(&[OverlayGroup::Drawing]);
        Ok(())
    }

    pub fn cancel(&mut self) {
        if self.workflow.cancel() {
            self.render_all_of(&[OverlayGroup::Drawing]);
        }
    }

    /// A click on the map background at `at`.
    pub fn click_map(&mut self, at: Coord<f64>) -> ClickEffect {
        let effect = self.workflow.click_map(&mut self.records, at);
        match effect {
            ClickEffect::BinPlaced(_) => self.render_all_of(&[OverlayGroup::Bins, OverlayGroup::Drawing]),
            ClickEffect::ZonePointAdded(_) => self.render_all_of(&[OverlayGroup::Drawing]),
            ClickEffect::Ignored => {}
        }
        effect
    }

    /// A click on a bin marker. Returns the detail popup unless a route is being built.
    pub fn click_bin(&mut self, id: &BinId) -> Option<BinDetail> {
        match self.workflow.click_bin(&self.records, id) {
            BinClickEffect::ShowDetail(id) => {
                self.selection.bin = Some(id.clone());
                self.render_all_of(&[OverlayGroup::Bins]);
                self.records.bin_detail(&id)
            }
            BinClickEffect::StopAdded(_) => {
                self.render_all_of(&[OverlayGroup::Drawing]);
                None
            }
            BinClickEffect::AlreadySelected | BinClickEffect::Ignored => None,
        }
    }

    /// A click on a zone fill. Popups are suppressed while a creation mode is active.
    pub fn click_zone(&mut self, id: &ZoneId) -> Option<ZoneSummary> {
        if !self.workflow.mode().is_idle() { return None }
        let summary = self.records.zone_summary(id)?;
        self.selection.zone = Some(id.clone());
        self.render_all_of(&[OverlayGroup::Zones]);
        Some(summary)
    }

    pub fn complete_zone(&mut self, name: Option<String>) -> Result<ZoneId, WorkflowError> {
        let id = self.workflow.complete_zone(&mut self.records, name)?;
        self.render_all_of(&[OverlayGroup::Zones, OverlayGroup::Drawing]);
        Ok(id)
    }

    /// First half of route completion, for hosts that route asynchronously.
    pub fn begin_route(&mut self) -> Result<RouteRequest, WorkflowError> { self.workflow.begin_route(&self.records) }

    pub fn finish_route(&mut self, request: RouteRequest, outcome: Result<RouteResult, RoutingError>) -> RouteCompletion {
        let completion = self.workflow.finish_route(&mut self.records, request, outcome);
        if let RouteCompletion::Created { .. } = completion {
            self.render_all_of(&[OverlayGroup::Routes, OverlayGroup::Drawing]);
        }
        completion
    }

    pub fn complete_route<R: Router>(&mut self, router: &R) -> Result<RouteCompletion, WorkflowError> {
        let request = self.begin_route()?;
        let outcome = router.route(&request.waypoints);
        Ok(self.finish_route(request, outcome))
    }

    // ---------------------------------------------------------------------
    // Record management
    // ---------------------------------------------------------------------

    pub fn delete_zone(&mut self, id: &ZoneId) -> Result<(), StoreError> {
        self.records.remove_zone(id)?;
        if self.selection.zone.as_ref() == Some(id) { self.selection.zone = None }
        self.render_all_of(&[OverlayGroup::Zones, OverlayGroup::Bins]);
        Ok(())
    }

    pub fn delete_bin(&mut self, id: &BinId) -> Result<(), StoreError> {
        self.records.remove_bin(id)?;
        self.workflow.forget_bin(id);
        if self.selection.bin.as_ref() == Some(id) { self.selection.bin = None }
        self.render_all_of(&[OverlayGroup::Bins, OverlayGroup::Routes, OverlayGroup::Drawing]);
        Ok(())
    }

    pub fn delete_route(&mut self, id: &RouteId) -> Result<(), StoreError> {
        self.records.remove_route(id)?;
        if self.selection.route.as_ref() == Some(id) { self.selection.route = None }
        self.render_all_of(&[OverlayGroup::Routes]);
        Ok(())
    }

    pub fn mark_collected(&mut self, id: &BinId) -> Result<(), StoreError> {
        self.records.mark_collected(id, chrono::Utc::now())?;
        self.render_all_of(&[OverlayGroup::Bins]);
        Ok(())
    }

    pub fn set_blocked_roads(&mut self, roads: Vec<BlockedRoad>) {
        self.records.set_blocked_roads(roads);
        self.render_all_of(&[OverlayGroup::BlockedRoads]);
    }

    pub fn select_route(&mut self, id: Option<RouteId>) {
        self.selection.route = id;
        self.render_all_of(&[OverlayGroup::Routes]);
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::default();
        self.render_all_of(&[OverlayGroup::Zones, OverlayGroup::Bins, OverlayGroup::Routes]);
    }

    /// Flip a record overlay on or off. Returns the new visibility, or `None` for the drawing group.
    pub fn toggle_layer(&mut self, group: OverlayGroup) -> Option<bool> {
        let flag = self.visibility.get_mut(group)?;
        *flag = !*flag;
        let shown = *flag;
        self.render_all_of(&[group]);
        Some(shown)
    }

    /// Direct record access for management views. Call [`Dashboard::refresh`] afterwards.
    pub fn records_mut(&mut self) -> &mut RecordSet { &mut self.records }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{Cursor, SceneBackend};
    use crate::routing::Offline;
    use crate::store::seed_with;

    fn open() -> Dashboard<SceneBackend> {
        let mut dashboard = Dashboard::new(seed_with(9), SceneBackend::preloaded(), MapSettings::default());
        dashboard.open().unwrap();
        dashboard
    }

    #[test]
    fn open_draws_seed() {
        let dashboard = open();
        let scene = dashboard.surface().backend();
        assert_eq!(scene.layer_ids_with_prefix("zone-fill-").count(), 3);
        assert_eq!(scene.layer_ids_with_prefix("route-line-").count(), 2);
        assert!(scene.layer("blocked-0").is_some());
        // 8 bins + 6 numbered route stops
        assert_eq!(scene.num_markers(), 14);
    }

    #[test]
    fn zone_popup_suppressed_in_creation_mode() {
        let mut dashboard = open();
        let zone = ZoneId::from("zone-1");
        let summary = dashboard.click_zone(&zone).unwrap();
        assert_eq!(summary.bin_count, 3);
        assert_eq!(summary.overflowing, 1);

        dashboard.select_tool(Tool::Bin).unwrap();
        assert!(dashboard.click_zone(&zone).is_none());
        assert_eq!(dashboard.surface().backend().cursor(), Cursor::Crosshair);
    }

    #[test]
    fn route_mode_takes_bin_clicks() {
        let mut dashboard = open();
        let a = BinId::from("bin-1");
        let b = BinId::from("bin-4");
        assert!(dashboard.click_bin(&a).is_some());

        dashboard.select_tool(Tool::Route).unwrap();
        assert!(dashboard.click_bin(&a).is_none());
        dashboard.click_bin(&b);
        let completion = dashboard.complete_route(&Offline).unwrap();
        assert!(matches!(completion, RouteCompletion::Created { degraded: true, .. }));
        assert_eq!(dashboard.surface().backend().layer_ids_with_prefix("route-line-").count(), 3);
        assert_eq!(dashboard.surface().num_markers(OverlayGroup::Drawing), 0);
    }

    #[test]
    fn bin_popup_survives_placement_and_drawing_modes() {
        let mut dashboard = open();
        let bin = BinId::from("bin-2");
        dashboard.select_tool(Tool::Bin).unwrap();
        assert_eq!(dashboard.click_bin(&bin).map(|d| d.fill_level), Some(78));
        dashboard.cancel();

        dashboard.select_tool(Tool::Zone).unwrap();
        assert!(dashboard.click_bin(&bin).is_some());
        assert_eq!(dashboard.selection().bin, Some(bin));
    }

    #[test]
    fn deleting_pending_stop_disables_completion() {
        let mut dashboard = open();
        dashboard.select_tool(Tool::Route).unwrap();
        dashboard.click_bin(&BinId::from("bin-1"));
        dashboard.click_bin(&BinId::from("bin-4"));
        assert!(dashboard.can_complete());

        dashboard.delete_bin(&BinId::from("bin-4")).unwrap();
        assert!(!dashboard.can_complete());
        assert_eq!(dashboard.surface().num_markers(OverlayGroup::Drawing), 1);
        assert_eq!(dashboard.complete_route(&Offline), Err(WorkflowError::NotEnoughStops(1)));
        assert_eq!(dashboard.records().routes().len(), 2);
    }

    #[test]
    fn hidden_groups_render_empty() {
        let mut dashboard = open();
        assert_eq!(dashboard.toggle_layer(OverlayGroup::Zones), Some(false));
        assert_eq!(dashboard.surface().backend().layer_ids_with_prefix("zone-").count(), 0);
        assert_eq!(dashboard.toggle_layer(OverlayGroup::Drawing), None);
        assert_eq!(dashboard.toggle_layer(OverlayGroup::Zones), Some(true));
        assert_eq!(dashboard.surface().backend().layer_ids_with_prefix("zone-fill-").count(), 3);
    }

    #[test]
    fn deleting_zone_keeps_bins() {
        let mut dashboard = open();
        dashboard.delete_zone(&ZoneId::from("zone-3")).unwrap();
        let bin = dashboard.records().bin(&BinId::from("bin-7")).unwrap();
        assert_eq!(bin.zone, None);
        assert_eq!(dashboard.surface().backend().layer_ids_with_prefix("zone-fill-").count(), 2);
    }

    #[test]
    fn close_is_idempotent() {
        let mut dashboard = open();
        dashboard.close();
        dashboard.close();
        assert!(!dashboard.surface().backend().is_created());
    }
}
