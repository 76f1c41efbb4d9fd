use geo::{Coord, Intersects, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};

use super::{Rgb, ZoneId};

/// Errors raised while building zone geometry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("zone boundary needs at least 3 distinct points, got {0}")]
    TooFewPoints(usize),
    #[error("zone boundary contains a non-finite coordinate")]
    NonFinite,
}

/// A named polygonal region grouping bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub color: Rgb,
    pub boundary: Polygon<f64>, // Closed exterior ring in (lon, lat)
}

impl Zone {
    /// Build a zone from an open or already-closed list of boundary points.
    /// The stored ring is always closed (first point repeated at the end).
    pub fn from_points(id: ZoneId, name: impl Into<String>, color: Rgb, points: &[Coord<f64>]) -> Result<Self, GeometryError> {
        let ring = closed_ring(points)?;
        Ok(Self { id, name: name.into(), color, boundary: Polygon::new(ring, vec![]) })
    }

    /// Exterior ring coordinates, closed.
    pub fn ring(&self) -> &[Coord<f64>] { &self.boundary.exterior().0 }

    /// Point-in-polygon test. Points on the boundary count as inside.
    pub fn contains(&self, at: Coord<f64>) -> bool {
        self.boundary.intersects(&Point::from(at))
    }
}

/// Close a ring of boundary points, checking it has at least 3 distinct vertices.
pub fn closed_ring(points: &[Coord<f64>]) -> Result<LineString<f64>, GeometryError> {
    if points.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(GeometryError::NonFinite);
    }

    // Drop the closing point if the caller already supplied one.
    let open = match points {
        [first, .., last] if first == last => &points[..points.len() - 1],
        _ => points,
    };

    let mut distinct: Vec<Coord<f64>> = Vec::with_capacity(open.len());
    for c in open {
        if !distinct.contains(c) { distinct.push(*c) }
    }
    if distinct.len() < 3 {
        return Err(GeometryError::TooFewPoints(distinct.len()));
    }

    let mut coords = open.to_vec();
    coords.push(open[0]);
    Ok(LineString(coords))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> { Coord { x, y } }

    fn square() -> Zone {
        let pts = [c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 1.0)];
        Zone::from_points(ZoneId::from("zone-1"), "Square", Rgb::from_u32(0x3b82f6), &pts).unwrap()
    }

    #[test]
    fn three_points_close_into_four() {
        let pts = [c(0.0, 0.0), c(1.0, 0.0), c(0.0, 1.0)];
        let zone = Zone::from_points(ZoneId::from("zone-1"), "Tri", Rgb::from_u32(0), &pts).unwrap();
        assert_eq!(zone.ring().len(), 4);
        assert_eq!(zone.ring()[0], zone.ring()[3]);
    }

    #[test]
    fn already_closed_ring_is_not_closed_twice() {
        let pts = [c(0.0, 0.0), c(1.0, 0.0), c(0.0, 1.0), c(0.0, 0.0)];
        let ring = closed_ring(&pts).unwrap();
        assert_eq!(ring.0.len(), 4);
    }

    #[test]
    fn rejects_degenerate_rings() {
        assert_eq!(closed_ring(&[c(0.0, 0.0), c(1.0, 1.0)]), Err(GeometryError::TooFewPoints(2)));
        let repeated = [c(0.0, 0.0), c(1.0, 1.0), c(1.0, 1.0), c(0.0, 0.0)];
        assert_eq!(closed_ring(&repeated), Err(GeometryError::TooFewPoints(2)));
        assert_eq!(closed_ring(&[c(f64::NAN, 0.0), c(1.0, 0.0), c(0.0, 1.0)]), Err(GeometryError::NonFinite));
    }

    #[test]
    fn contains_interior_and_boundary() {
        let zone = square();
        assert!(zone.contains(c(0.5, 0.5)));
        assert!(zone.contains(c(1.0, 0.5)));
        assert!(!zone.contains(c(1.5, 0.5)));
    }
}
