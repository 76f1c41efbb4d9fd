// Integration tests for record creation through the click workflow:
//   bin placement and zone membership, zone completion, route building with and
//   without a road-snapped path, and deletion relationships between records.

use geo::LineString;
use wastemap::routing::RouteResult;
use wastemap::store::RecordSet;
use wastemap::types::{BinId, ZoneId};
use wastemap::workflow::{BinClickEffect, ClickEffect, WorkflowError};
use wastemap::{Coord, CreationMode, CreationWorkflow, Offline, RouteCompletion, Router, RoutingError, Tool};

fn c(x: f64, y: f64) -> Coord<f64> { Coord { x, y } }

struct Snapped(LineString<f64>);

impl Router for Snapped {
    fn route(&self, _: &[Coord<f64>]) -> Result<RouteResult, RoutingError> {
        Ok(RouteResult { path: self.0.clone(), distance_km: 4.2, duration_min: 11.0 })
    }
}

fn draw_zone(records: &mut RecordSet, workflow: &mut CreationWorkflow, points: &[Coord<f64>]) -> ZoneId {
    workflow.select_tool(Tool::Zone).unwrap();
    for &p in points {
        workflow.click_map(records, p);
    }
    workflow.complete_zone(records, None).unwrap()
}

fn place_bin(records: &mut RecordSet, workflow: &mut CreationWorkflow, at: Coord<f64>) -> BinId {
    workflow.select_tool(Tool::Bin).unwrap();
    match workflow.click_map(records, at) {
        ClickEffect::BinPlaced(id) => id,
        other => panic!("expected a placed bin, got {other:?}"),
    }
}

fn build_route<R: Router>(
    records: &mut RecordSet,
    workflow: &mut CreationWorkflow,
    stops: &[BinId],
    router: &R,
) -> RouteCompletion {
    workflow.select_tool(Tool::Route).unwrap();
    for stop in stops {
        workflow.click_bin(records, stop);
    }
    workflow.complete_route(records, router).unwrap()
}

#[test]
fn triangle_zone_has_closed_ring_of_four() {
    let mut records = RecordSet::with_seed(1);
    let mut workflow = CreationWorkflow::new();
    let points = [c(0.0, 0.0), c(2.0, 0.0), c(1.0, 2.0)];
    let id = draw_zone(&mut records, &mut workflow, &points);

    let ring = records.zone(&id).unwrap().ring();
    assert_eq!(ring.len(), 4);
    assert_eq!(ring[0], ring[3]);
    assert_eq!(&ring[..3], &points);
    assert!(workflow.mode().is_idle());
}

#[test]
fn zone_needs_three_points() {
    let mut records = RecordSet::with_seed(1);
    let mut workflow = CreationWorkflow::new();
    workflow.select_tool(Tool::Zone).unwrap();
    workflow.click_map(&mut records, c(0.0, 0.0));
    workflow.click_map(&mut records, c(1.0, 0.0));

    assert!(!workflow.can_complete());
    assert_eq!(workflow.complete_zone(&mut records, None), Err(WorkflowError::NotEnoughPoints(2)));
    assert!(records.zones().is_empty());
    assert_eq!(workflow.mode(), &CreationMode::DrawingZone { points: vec![c(0.0, 0.0), c(1.0, 0.0)] });
}

#[test]
fn placed_bin_joins_containing_zone() {
    let mut records = RecordSet::with_seed(2);
    let mut workflow = CreationWorkflow::new();
    let zone = draw_zone(&mut records, &mut workflow, &[c(0.0, 0.0), c(4.0, 0.0), c(4.0, 4.0), c(0.0, 4.0)]);

    let inside = place_bin(&mut records, &mut workflow, c(1.0, 1.0));
    let outside = place_bin(&mut records, &mut workflow, c(10.0, 10.0));
    assert_eq!(records.bin(&inside).unwrap().zone, Some(zone));
    assert_eq!(records.bin(&outside).unwrap().zone, None);
}

#[test]
fn failed_routing_draws_straight_line_through_stops() {
    let mut records = RecordSet::with_seed(3);
    let mut workflow = CreationWorkflow::new();
    let stops: Vec<BinId> = [c(0.0, 0.0), c(1.0, 1.0), c(2.0, 0.0)]
        .into_iter()
        .map(|p| place_bin(&mut records, &mut workflow, p))
        .collect();

    let RouteCompletion::Created { id, degraded } = build_route(&mut records, &mut workflow, &stops, &Offline) else {
        panic!("route was not created");
    };
    assert!(degraded);
    let route = records.route(&id).unwrap();
    assert_eq!(route.stops, stops);
    assert_eq!(route.path_coords(), &[c(0.0, 0.0), c(1.0, 1.0), c(2.0, 0.0)]);
    assert_eq!(route.metrics, None);
}

#[test]
fn successful_routing_keeps_snapped_geometry() {
    let mut records = RecordSet::with_seed(3);
    let mut workflow = CreationWorkflow::new();
    let stops: Vec<BinId> = [c(0.0, 0.0), c(2.0, 0.0)]
        .into_iter()
        .map(|p| place_bin(&mut records, &mut workflow, p))
        .collect();
    let snapped = LineString::from(vec![(0.0, 0.0), (0.5, 0.3), (1.5, 0.3), (2.0, 0.0)]);

    let RouteCompletion::Created { id, degraded } =
        build_route(&mut records, &mut workflow, &stops, &Snapped(snapped.clone()))
    else {
        panic!("route was not created");
    };
    assert!(!degraded);
    let route = records.route(&id).unwrap();
    assert_eq!(route.path, snapped);
    assert_eq!(route.metrics.map(|m| m.distance_km), Some(4.2));
}

#[test]
fn repeated_stop_click_is_ignored() {
    let mut records = RecordSet::with_seed(4);
    let mut workflow = CreationWorkflow::new();
    let a = place_bin(&mut records, &mut workflow, c(0.0, 0.0));
    let b = place_bin(&mut records, &mut workflow, c(1.0, 0.0));

    workflow.select_tool(Tool::Route).unwrap();
    assert_eq!(workflow.click_bin(&records, &a), BinClickEffect::StopAdded(1));
    assert_eq!(workflow.click_bin(&records, &a), BinClickEffect::AlreadySelected);
    assert_eq!(workflow.click_bin(&records, &b), BinClickEffect::StopAdded(2));

    let CreationMode::BuildingRoute { stops, .. } = workflow.mode() else { panic!("not building a route") };
    assert_eq!(stops, &vec![a, b]);
}

#[test]
fn deleting_zone_orphans_member_bins() {
    let mut records = RecordSet::with_seed(5);
    let mut workflow = CreationWorkflow::new();
    let zone = draw_zone(&mut records, &mut workflow, &[c(0.0, 0.0), c(4.0, 0.0), c(4.0, 4.0)]);
    let bin = place_bin(&mut records, &mut workflow, c(3.0, 1.0));
    assert_eq!(records.bin(&bin).unwrap().zone.as_ref(), Some(&zone));

    records.remove_zone(&zone).unwrap();
    assert_eq!(records.bins().len(), 1);
    assert_eq!(records.bin(&bin).unwrap().zone, None);
}

#[test]
fn deleting_stop_bin_keeps_route_order() {
    let mut records = RecordSet::with_seed(6);
    let mut workflow = CreationWorkflow::new();
    let stops: Vec<BinId> = (0..4).map(|i| place_bin(&mut records, &mut workflow, c(i as f64, 0.0))).collect();
    let RouteCompletion::Created { id, .. } = build_route(&mut records, &mut workflow, &stops, &Offline) else {
        panic!("route was not created");
    };

    records.remove_bin(&stops[1]).unwrap();
    let route = records.route(&id).unwrap();
    assert_eq!(route.stops, vec![stops[0].clone(), stops[2].clone(), stops[3].clone()]);
}

#[test]
fn outcome_for_cancelled_session_is_stale() {
    let mut records = RecordSet::with_seed(7);
    let mut workflow = CreationWorkflow::new();
    let a = place_bin(&mut records, &mut workflow, c(0.0, 0.0));
    let b = place_bin(&mut records, &mut workflow, c(1.0, 0.0));

    workflow.select_tool(Tool::Route).unwrap();
    workflow.click_bin(&records, &a);
    workflow.click_bin(&records, &b);
    let request = workflow.begin_route(&records).unwrap();
    workflow.cancel();

    let completion = workflow.finish_route(&mut records, request, Err(RoutingError::Unavailable));
    assert_eq!(completion, RouteCompletion::Stale);
    assert!(records.routes().is_empty());
}
