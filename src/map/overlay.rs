//! Overlay plans: the sources, layers and markers one overlay group draws.
//!
//! Plans are built from records without touching the backend, so a plan can be
//! parked while the style is still loading and applied later unchanged.

use geo::Coord;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::io::geojson::{line_feature, polygon_feature, route_feature, zone_feature};
use crate::types::{Bin, BinId, BlockedRoad, Route, RouteId, Zone, ZoneId, closed_ring};

use super::backend::{LayerSpec, MarkerSpec, MarkerTarget};
use super::color::{BLOCKED_ROAD, MARKER_BORDER, ROUTE_DRAFT, ZONE_DRAFT, fill_level_color};

/// Independent overlay groups. Replacing one never touches another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayGroup {
    Zones,
    Bins,
    Routes,
    BlockedRoads,
    Drawing,
}

impl OverlayGroup {
    pub const ALL: [OverlayGroup; 5] = [
        OverlayGroup::Zones,
        OverlayGroup::Bins,
        OverlayGroup::Routes,
        OverlayGroup::BlockedRoads,
        OverlayGroup::Drawing,
    ];
}

/// What an in-progress drawing will become.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawingKind {
    Zone,
    Route,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayPlan {
    pub sources: Vec<(String, Value)>,
    pub layers: Vec<LayerSpec>,
    pub markers: Vec<MarkerSpec>,
}

impl OverlayPlan {
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.layers.is_empty() && self.markers.is_empty()
    }
}

#[inline] pub fn zone_source_id(id: &ZoneId) -> String { format!("zone-{id}") }
#[inline] pub fn zone_fill_id(id: &ZoneId) -> String { format!("zone-fill-{id}") }
#[inline] pub fn zone_outline_id(id: &ZoneId) -> String { format!("zone-outline-{id}") }
#[inline] pub fn route_source_id(id: &RouteId) -> String { format!("route-{id}") }
#[inline] pub fn route_line_id(id: &RouteId) -> String { format!("route-line-{id}") }
#[inline] pub fn blocked_source_id(n: usize) -> String { format!("blocked-road-{n}") }
#[inline] pub fn blocked_layer_id(n: usize) -> String { format!("blocked-{n}") }

pub const DRAWING_SOURCE: &str = "drawing-source";
pub const DRAWING_FILL: &str = "drawing-fill";
pub const DRAWING_LINE: &str = "drawing-line";

pub fn zones_plan(zones: &[Zone], selected: Option<&ZoneId>) -> OverlayPlan {
    let mut plan = OverlayPlan::default();
    for zone in zones {
        let is_selected = selected == Some(&zone.id);
        let source = zone_source_id(&zone.id);
        plan.sources.push((source.clone(), zone_feature(zone)));
        plan.layers.push(LayerSpec::fill(zone_fill_id(&zone.id), &source, zone.color, if is_selected { 0.4 } else { 0.15 }));
        plan.layers.push(
            LayerSpec::line(zone_outline_id(&zone.id), source, zone.color, if is_selected { 3.0 } else { 2.0 }, 1.0)
                .dashed([5.0, 5.0]),
        );
    }
    plan
}

pub fn bins_plan(bins: &[Bin], selected: Option<&BinId>) -> OverlayPlan {
    let markers = bins.iter().map(|bin| {
        let is_selected = selected == Some(&bin.id);
        MarkerSpec {
            position: bin.location,
            fill: fill_level_color(bin.fill_level),
            border: if bin.is_blocked() { BLOCKED_ROAD } else { MARKER_BORDER },
            size_px: if is_selected { 28 } else { 20 },
            label: None,
            target: MarkerTarget::Bin { id: bin.id.clone() },
        }
    }).collect();

    OverlayPlan { markers, ..OverlayPlan::default() }
}

/// Route polylines plus numbered stop markers. Stops whose bin is gone get no marker.
pub fn routes_plan(routes: &[Route], bins: &[Bin], selected: Option<&RouteId>) -> OverlayPlan {
    let mut plan = OverlayPlan::default();
    for route in routes {
        let is_selected = selected == Some(&route.id);
        let source = route_source_id(&route.id);
        plan.sources.push((source.clone(), route_feature(route)));
        plan.layers.push(LayerSpec::line(
            route_line_id(&route.id),
            source,
            route.color,
            if is_selected { 6.0 } else { 4.0 },
            if is_selected { 1.0 } else { 0.7 },
        ));

        let stops = route.stops.iter()
            .filter_map(|id| bins.iter().find(|b| &b.id == id))
            .enumerate()
            .map(|(index, bin)| MarkerSpec {
                position: bin.location,
                fill: route.color,
                border: MARKER_BORDER,
                size_px: 24,
                label: Some((index + 1).to_string()),
                target: MarkerTarget::RouteStop { route: route.id.clone(), index },
            });
        plan.markers.extend(stops);
    }
    plan
}

pub fn blocked_roads_plan(roads: &[BlockedRoad]) -> OverlayPlan {
    let mut plan = OverlayPlan::default();
    for (n, road) in roads.iter().enumerate() {
        let source = blocked_source_id(n);
        plan.sources.push((source.clone(), line_feature(&[road.start, road.end], json!({ "reason": road.reason }))));
        plan.layers.push(LayerSpec::line(blocked_layer_id(n), source, BLOCKED_ROAD, 5.0, 1.0).dashed([2.0, 2.0]));
    }
    plan
}

/// Numbered vertex markers in input order, plus a preview shape once it is drawable.
pub fn drawing_plan(points: &[Coord<f64>], kind: DrawingKind) -> OverlayPlan {
    let (color, size_px) = match kind {
        DrawingKind::Zone => (ZONE_DRAFT, 16),
        DrawingKind::Route => (ROUTE_DRAFT, 24),
    };

    let mut plan = OverlayPlan::default();
    plan.markers = points.iter().enumerate().map(|(index, &position)| MarkerSpec {
        position,
        fill: color,
        border: MARKER_BORDER,
        size_px,
        label: Some((index + 1).to_string()),
        target: MarkerTarget::DraftVertex { index },
    }).collect();

    match kind {
        DrawingKind::Zone => {
            if let Ok(ring) = closed_ring(points) {
                plan.sources.push((DRAWING_SOURCE.to_string(), polygon_feature(&ring.0, json!({}))));
                plan.layers.push(LayerSpec::fill(DRAWING_FILL, DRAWING_SOURCE, color, 0.3));
                plan.layers.push(LayerSpec::line(DRAWING_LINE, DRAWING_SOURCE, color, 2.0, 1.0).dashed([2.0, 2.0]));
            }
        }
        DrawingKind::Route if points.len() >= 2 => {
            plan.sources.push((DRAWING_SOURCE.to_string(), line_feature(points, json!({}))));
            plan.layers.push(LayerSpec::line(DRAWING_LINE, DRAWING_SOURCE, color, 3.0, 0.8).dashed([2.0, 2.0]));
        }
        DrawingKind::Route => {}
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::color::fill_color;
    use crate::types::{BinStatus, FillCategory, Rgb};

    fn c(x: f64, y: f64) -> Coord<f64> { Coord { x, y } }

    fn square(id: &str) -> Zone {
        let pts = [c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 1.0)];
        Zone::from_points(ZoneId::from(id), id, Rgb::from_u32(0x3b82f6), &pts).unwrap()
    }

    #[test]
    fn selected_zone_is_emphasized() {
        let zones = [square("zone-1"), square("zone-2")];
        let plan = zones_plan(&zones, Some(&ZoneId::from("zone-2")));
        assert_eq!(plan.sources.len(), 2);
        assert_eq!(plan.layers.len(), 4);
        assert_eq!(plan.layers[0].id, "zone-fill-zone-1");
        assert_eq!(plan.layers[0].paint.opacity, 0.15);
        assert_eq!(plan.layers[2].paint.opacity, 0.4);
        assert_eq!(plan.layers[3].paint.width, 3.0);
        assert_eq!(plan.layers[3].paint.dash, Some([5.0, 5.0]));
    }

    #[test]
    fn blocked_bin_gets_red_border() {
        let mut bin = Bin::new(BinId::from("bin-1"), c(0.0, 0.0), 85);
        bin.status = BinStatus::Blocked;
        let plan = bins_plan(&[bin], Some(&BinId::from("bin-1")));
        let marker = &plan.markers[0];
        assert_eq!(marker.border, BLOCKED_ROAD);
        assert_eq!(marker.size_px, 28);
        assert_eq!(marker.fill, fill_color(FillCategory::Critical));
    }

    #[test]
    fn route_stops_are_numbered_in_order() {
        let bins = [
            Bin::new(BinId::from("bin-1"), c(0.0, 0.0), 10),
            Bin::new(BinId::from("bin-2"), c(1.0, 0.0), 10),
        ];
        let route = Route {
            id: RouteId::from("route-1"),
            name: "r".into(),
            color: Rgb::from_u32(0xec4899),
            stops: vec![BinId::from("bin-2"), BinId::from("bin-1")],
            path: geo::LineString(vec![c(1.0, 0.0), c(0.0, 0.0)]),
            status: Default::default(),
            metrics: None,
            driver: None,
            truck: None,
        };
        let plan = routes_plan(&[route], &bins, None);
        assert_eq!(plan.layers[0].id, "route-line-route-1");
        assert_eq!(plan.layers[0].paint.width, 4.0);
        let labels: Vec<_> = plan.markers.iter().map(|m| (m.label.clone().unwrap(), m.position)).collect();
        assert_eq!(labels, vec![("1".to_string(), c(1.0, 0.0)), ("2".to_string(), c(0.0, 0.0))]);
    }

    #[test]
    fn zone_drawing_previews_from_three_points() {
        let two = drawing_plan(&[c(0.0, 0.0), c(1.0, 0.0)], DrawingKind::Zone);
        assert_eq!(two.markers.len(), 2);
        assert!(two.layers.is_empty());

        let three = drawing_plan(&[c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0)], DrawingKind::Zone);
        assert_eq!(three.layers.len(), 2);
        let ring = three.sources[0].1["geometry"]["coordinates"][0].as_array().unwrap().len();
        assert_eq!(ring, 4);
    }

    #[test]
    fn empty_drawing_is_empty_plan() {
        assert!(drawing_plan(&[], DrawingKind::Zone).is_empty());
        assert!(drawing_plan(&[], DrawingKind::Route).is_empty());
    }
}
