use anyhow::{Context, Result};
use geo::Coord;
use serde_json::{Value, json};

use crate::types::{Bin, BlockedRoad, Route, Zone};

#[inline]
fn position(c: &Coord<f64>) -> Value { json!([c.x, c.y]) }

fn positions(coords: &[Coord<f64>]) -> Vec<Value> { coords.iter().map(position).collect() }

/// A GeoJSON Point feature.
pub(crate) fn point_feature(at: Coord<f64>, properties: Value) -> Value {
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": position(&at) },
        "properties": properties,
    })
}

/// A GeoJSON LineString feature.
pub(crate) fn line_feature(coords: &[Coord<f64>], properties: Value) -> Value {
    json!({
        "type": "Feature",
        "geometry": { "type": "LineString", "coordinates": positions(coords) },
        "properties": properties,
    })
}

/// A GeoJSON Polygon feature from a single closed ring.
pub(crate) fn polygon_feature(ring: &[Coord<f64>], properties: Value) -> Value {
    json!({
        "type": "Feature",
        "geometry": { "type": "Polygon", "coordinates": [positions(ring)] },
        "properties": properties,
    })
}

pub fn zone_feature(zone: &Zone) -> Value {
    polygon_feature(zone.ring(), json!({
        "kind": "zone",
        "id": zone.id,
        "name": zone.name,
        "color": zone.color,
    }))
}

pub fn bin_feature(bin: &Bin) -> Value {
    point_feature(bin.location, json!({
        "kind": "bin",
        "id": bin.id,
        "label": bin.label,
        "fill_level": bin.fill_level,
        "fill_category": bin.fill_category(),
        "capacity_l": bin.capacity_l,
        "status": bin.status,
        "zone": bin.zone,
        "last_collection": bin.last_collection,
    }))
}

pub fn route_feature(route: &Route) -> Value {
    line_feature(route.path_coords(), json!({
        "kind": "route",
        "id": route.id,
        "name": route.name,
        "color": route.color,
        "stops": route.stops,
        "status": route.status,
        "distance_km": route.metrics.map(|m| m.distance_km),
        "duration_min": route.metrics.map(|m| m.duration_min),
    }))
}

pub fn blocked_road_feature(road: &BlockedRoad) -> Value {
    line_feature(&[road.start, road.end], json!({ "kind": "blocked", "reason": road.reason }))
}

/// Wrap features in a FeatureCollection.
pub fn feature_collection(features: Vec<Value>) -> Value {
    json!({ "type": "FeatureCollection", "features": features })
}

/// Write zones, bins and routes (in that order) to GeoJSON bytes.
pub fn write_records_to_geojson_bytes(zones: &[Zone], bins: &[Bin], routes: &[Route]) -> Result<Vec<u8>> {
    let features = zones.iter().map(zone_feature)
        .chain(bins.iter().map(bin_feature))
        .chain(routes.iter().map(route_feature))
        .collect();

    serde_json::to_vec_pretty(&feature_collection(features)).context("Failed to serialize GeoJSON to bytes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BinId, Rgb, ZoneId};

    #[test]
    fn zone_feature_is_closed_polygon() {
        let pts = [Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 }];
        let zone = Zone::from_points(ZoneId::from("zone-1"), "Tri", Rgb::from_u32(0x3b82f6), &pts).unwrap();
        let f = zone_feature(&zone);
        assert_eq!(f["geometry"]["type"], "Polygon");
        let ring = f["geometry"]["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 4);
        assert_eq!(ring[0], ring[3]);
        assert_eq!(f["properties"]["color"], "#3b82f6");
    }

    #[test]
    fn bin_feature_carries_category() {
        let bin = Bin::new(BinId::from("bin-1"), Coord { x: 90.41, y: 23.80 }, 85);
        let f = bin_feature(&bin);
        assert_eq!(f["geometry"]["coordinates"], json!([90.41, 23.80]));
        assert_eq!(f["properties"]["fill_category"], "critical");
        assert_eq!(f["properties"]["status"], "NEEDS_PICKUP");
    }

    #[test]
    fn collection_orders_zones_bins_routes() {
        let bin = Bin::new(BinId::from("bin-1"), Coord { x: 0.0, y: 0.0 }, 10);
        let bytes = write_records_to_geojson_bytes(&[], &[bin], &[]).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"].as_array().unwrap().len(), 1);
    }
}
