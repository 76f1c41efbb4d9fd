use chrono::{DateTime, Utc};
use geo::{Coord, LineString};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::map::color::{ROUTE_PALETTE, ZONE_PALETTE, palette_color};
use crate::types::{
    ActivityLog, Bin, BinId, BinStatus, BlockedRoad, Driver, DriverId, DriverStatus, GeometryError, LogId,
    Route, RouteId, RouteMetrics, RouteStatus, Truck, TruckId, Zone, ZoneId,
};

use super::summary::{BinDetail, ZoneSummary};

/// Errors raised by record mutations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("unknown bin {0}")]
    UnknownBin(BinId),
    #[error("unknown zone {0}")]
    UnknownZone(ZoneId),
    #[error("unknown route {0}")]
    UnknownRoute(RouteId),
    #[error("unknown driver {0}")]
    UnknownDriver(DriverId),
    #[error("unknown truck {0}")]
    UnknownTruck(TruckId),
    #[error("duplicate id {0}")]
    DuplicateId(String),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Fill level range for bins placed without one.
const DEFAULT_FILL_RANGE: std::ops::Range<u8> = 10..50;

/// Input for a new route.
#[derive(Debug, Clone, Default)]
pub struct NewRoute {
    pub name: Option<String>,
    pub stops: Vec<BinId>,
    pub path: Vec<Coord<f64>>,
    pub metrics: Option<RouteMetrics>,
    pub status: RouteStatus,
}

#[derive(Debug, Default)]
struct Counters {
    bin: u64,
    zone: u64,
    route: u64,
    log: u64,
    zone_colors: usize,
    route_colors: usize,
}

/// Session-scoped record store for every entity the dashboard shows.
///
/// All mutation goes through the methods below so zone membership and route
/// stop lists stay consistent: deleting a zone clears membership, deleting a
/// bin strips it from route stops.
#[derive(Debug)]
pub struct RecordSet {
    bins: Vec<Bin>,
    zones: Vec<Zone>,
    routes: Vec<Route>,
    blocked_roads: Vec<BlockedRoad>,
    trucks: Vec<Truck>,
    drivers: Vec<Driver>,
    logs: Vec<ActivityLog>,
    counters: Counters,
    rng: StdRng,
    actor: String,
}

impl RecordSet {
    /// Empty store with an OS-seeded generator.
    pub fn new() -> Self { Self::from_rng(StdRng::from_os_rng()) }

    /// Empty store with a deterministic generator.
    pub fn with_seed(seed: u64) -> Self { Self::from_rng(StdRng::seed_from_u64(seed)) }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            bins: Vec::new(),
            zones: Vec::new(),
            routes: Vec::new(),
            blocked_roads: Vec::new(),
            trucks: Vec::new(),
            drivers: Vec::new(),
            logs: Vec::new(),
            counters: Counters::default(),
            rng,
            actor: "Admin User".to_string(),
        }
    }

    /// Name recorded as the user on activity log entries.
    pub fn set_actor(&mut self, actor: impl Into<String>) { self.actor = actor.into() }

    // ---------------------------------------------------------------------
    // Read access
    // ---------------------------------------------------------------------

    #[inline] pub fn bins(&self) -> &[Bin] { &self.bins }
    #[inline] pub fn zones(&self) -> &[Zone] { &self.zones }
    #[inline] pub fn routes(&self) -> &[Route] { &self.routes }
    #[inline] pub fn blocked_roads(&self) -> &[BlockedRoad] { &self.blocked_roads }
    #[inline] pub fn trucks(&self) -> &[Truck] { &self.trucks }
    #[inline] pub fn drivers(&self) -> &[Driver] { &self.drivers }
    #[inline] pub fn logs(&self) -> &[ActivityLog] { &self.logs }

    pub fn bin(&self, id: &BinId) -> Option<&Bin> { self.bins.iter().find(|b| &b.id == id) }
    pub fn zone(&self, id: &ZoneId) -> Option<&Zone> { self.zones.iter().find(|z| &z.id == id) }
    pub fn route(&self, id: &RouteId) -> Option<&Route> { self.routes.iter().find(|r| &r.id == id) }
    pub fn truck(&self, id: &TruckId) -> Option<&Truck> { self.trucks.iter().find(|t| &t.id == id) }
    pub fn driver(&self, id: &DriverId) -> Option<&Driver> { self.drivers.iter().find(|d| &d.id == id) }

    /// First zone, in insertion order, containing `at`.
    /// Zones are assumed not to overlap; with overlaps the earliest zone wins.
    pub fn zone_at(&self, at: Coord<f64>) -> Option<&Zone> { self.zones.iter().find(|z| z.contains(at)) }

    pub fn bins_in_zone<'a>(&'a self, zone: &'a ZoneId) -> impl Iterator<Item = &'a Bin> + 'a {
        self.bins.iter().filter(move |b| b.zone.as_ref() == Some(zone))
    }

    /// Locations of `stops` in order, skipping ids with no bin.
    pub fn stop_coordinates(&self, stops: &[BinId]) -> Vec<Coord<f64>> {
        stops.iter().filter_map(|id| self.bin(id).map(|b| b.location)).collect()
    }

    pub fn zone_summary(&self, id: &ZoneId) -> Option<ZoneSummary> {
        let zone = self.zone(id)?;
        let (bin_count, overflowing) = self.bins_in_zone(id).fold((0, 0), |(n, o), b| {
            (n + 1, o + usize::from(b.status == BinStatus::Overflowing))
        });
        Some(ZoneSummary { id: zone.id.clone(), name: zone.name.clone(), color: zone.color, bin_count, overflowing })
    }

    pub fn bin_detail(&self, id: &BinId) -> Option<BinDetail> {
        let bin = self.bin(id)?;
        Some(BinDetail {
            id: bin.id.clone(),
            label: bin.label.clone(),
            fill_level: bin.fill_level,
            fill_category: bin.fill_category(),
            capacity_l: bin.capacity_l,
            status: bin.status,
            zone_name: bin.zone.as_ref().and_then(|z| self.zone(z)).map(|z| z.name.clone()),
            last_collection: bin.last_collection,
        })
    }

    // ---------------------------------------------------------------------
    // Bins
    // ---------------------------------------------------------------------

    fn fresh_bin_id(&mut self) -> BinId {
        loop {
            self.counters.bin += 1;
            let id = BinId::numbered(self.counters.bin);
            if self.bin(&id).is_none() { return id }
        }
    }

    /// Place a new bin. Zone membership comes from the containing zone, if any.
    pub fn add_bin(&mut self, location: Coord<f64>, fill_level: Option<u8>) -> BinId {
        let fill_level = fill_level.unwrap_or_else(|| self.rng.random_range(DEFAULT_FILL_RANGE));
        let id = self.fresh_bin_id();

        let mut bin = Bin::new(id.clone(), location, fill_level);
        bin.zone = self.zone_at(location).map(|z| z.id.clone());
        bin.last_collection = Some(Utc::now());

        tracing::info!(bin = %id, zone = ?bin.zone, fill_level, "bin placed");
        let details = match &bin.zone {
            Some(zone) => format!("Bin {id} placed in {zone}"),
            None => format!("Bin {id} placed outside any zone"),
        };
        self.bins.push(bin);
        self.log("Bin Created", details);
        id
    }

    /// Insert a fully specified bin. A bin without a zone gets one from containment.
    pub fn insert_bin(&mut self, mut bin: Bin) -> Result<BinId, StoreError> {
        if self.bin(&bin.id).is_some() {
            return Err(StoreError::DuplicateId(bin.id.to_string()));
        }
        match &bin.zone {
            Some(zone) if self.zone(zone).is_none() => return Err(StoreError::UnknownZone(zone.clone())),
            Some(_) => {}
            None => bin.zone = self.zone_at(bin.location).map(|z| z.id.clone()),
        }
        bin.fill_level = bin.fill_level.min(100);
        let id = bin.id.clone();
        self.bins.push(bin);
        Ok(id)
    }

    fn bin_mut(&mut self, id: &BinId) -> Result<&mut Bin, StoreError> {
        self.bins.iter_mut().find(|b| &b.id == id).ok_or_else(|| StoreError::UnknownBin(id.clone()))
    }

    pub fn set_fill_level(&mut self, id: &BinId, level: u8) -> Result<(), StoreError> {
        self.bin_mut(id)?.set_fill_level(level);
        Ok(())
    }

    pub fn set_bin_status(&mut self, id: &BinId, status: BinStatus) -> Result<(), StoreError> {
        self.bin_mut(id)?.status = status;
        Ok(())
    }

    /// Record an emptying: fill drops to zero and the collection time is stamped.
    pub fn mark_collected(&mut self, id: &BinId, at: DateTime<Utc>) -> Result<(), StoreError> {
        let bin = self.bin_mut(id)?;
        bin.set_fill_level(0);
        bin.last_collection = Some(at);
        let details = format!("Bin {id} emptied");
        self.log("Bin Emptied", details);
        Ok(())
    }

    /// Delete a bin and strip it from every route's stop list. Routes are kept.
    pub fn remove_bin(&mut self, id: &BinId) -> Result<Bin, StoreError> {
        let idx = self.bins.iter().position(|b| &b.id == id).ok_or_else(|| StoreError::UnknownBin(id.clone()))?;
        let bin = self.bins.remove(idx);
        for route in &mut self.routes {
            route.stops.retain(|s| s != id);
        }
        tracing::info!(bin = %id, "bin removed");
        self.log("Bin Deleted", format!("Bin {id} removed"));
        Ok(bin)
    }

    // ---------------------------------------------------------------------
    // Zones
    // ---------------------------------------------------------------------

    fn fresh_zone_id(&mut self) -> ZoneId {
        loop {
            self.counters.zone += 1;
            let id = ZoneId::numbered(self.counters.zone);
            if self.zone(&id).is_none() { return id }
        }
    }

    /// Create a zone from drawn points. Its color is picked once here and stored.
    pub fn add_zone(&mut self, name: Option<String>, points: &[Coord<f64>]) -> Result<ZoneId, StoreError> {
        let name = name.unwrap_or_else(|| format!("Zone {}", self.zones.len() + 1));
        let color = palette_color(&ZONE_PALETTE, self.counters.zone_colors);
        let id = self.fresh_zone_id();
        let zone = Zone::from_points(id.clone(), name, color, points)?;

        self.counters.zone_colors += 1;
        tracing::info!(zone = %id, points = points.len(), "zone created");
        let details = format!("Zone '{}' created", zone.name);
        self.zones.push(zone);
        self.log("Zone Created", details);
        Ok(id)
    }

    /// Insert a fully specified zone.
    pub fn insert_zone(&mut self, zone: Zone) -> Result<ZoneId, StoreError> {
        if self.zone(&zone.id).is_some() {
            return Err(StoreError::DuplicateId(zone.id.to_string()));
        }
        self.counters.zone_colors += 1;
        let id = zone.id.clone();
        self.zones.push(zone);
        Ok(id)
    }

    pub fn rename_zone(&mut self, id: &ZoneId, name: impl Into<String>) -> Result<(), StoreError> {
        let zone = self.zones.iter_mut().find(|z| &z.id == id).ok_or_else(|| StoreError::UnknownZone(id.clone()))?;
        zone.name = name.into();
        Ok(())
    }

    /// Delete a zone. Member bins survive with no zone.
    pub fn remove_zone(&mut self, id: &ZoneId) -> Result<Zone, StoreError> {
        let idx = self.zones.iter().position(|z| &z.id == id).ok_or_else(|| StoreError::UnknownZone(id.clone()))?;
        let zone = self.zones.remove(idx);
        let mut released = 0;
        for bin in self.bins.iter_mut().filter(|b| b.zone.as_ref() == Some(id)) {
            bin.zone = None;
            released += 1;
        }
        tracing::info!(zone = %id, released, "zone removed");
        self.log("Zone Deleted", format!("Zone '{}' removed", zone.name));
        Ok(zone)
    }

    // ---------------------------------------------------------------------
    // Routes
    // ---------------------------------------------------------------------

    fn fresh_route_id(&mut self) -> RouteId {
        loop {
            self.counters.route += 1;
            let id = RouteId::numbered(self.counters.route);
            if self.route(&id).is_none() { return id }
        }
    }

    /// Create a route. Stops that no longer name a bin are dropped.
    pub fn add_route(&mut self, new: NewRoute) -> RouteId {
        let NewRoute { name, mut stops, path, metrics, status } = new;
        let before = stops.len();
        stops.retain(|s| self.bin(s).is_some());
        if stops.len() != before {
            tracing::debug!(dropped = before - stops.len(), "route stops refer to deleted bins");
        }

        let name = name.unwrap_or_else(|| format!("Route {}", self.routes.len() + 1));
        let color = palette_color(&ROUTE_PALETTE, self.counters.route_colors);
        self.counters.route_colors += 1;
        let id = self.fresh_route_id();

        tracing::info!(route = %id, stops = stops.len(), points = path.len(), "route created");
        let details = format!("New route '{name}' created");
        self.routes.push(Route {
            id: id.clone(),
            name,
            color,
            stops,
            path: LineString(path),
            status,
            metrics,
            driver: None,
            truck: None,
        });
        self.log("Route Created", details);
        id
    }

    /// Insert a fully specified route.
    pub fn insert_route(&mut self, route: Route) -> Result<RouteId, StoreError> {
        if self.route(&route.id).is_some() {
            return Err(StoreError::DuplicateId(route.id.to_string()));
        }
        if let Some(missing) = route.stops.iter().find(|s| self.bin(s).is_none()) {
            return Err(StoreError::UnknownBin(missing.clone()));
        }
        self.counters.route_colors += 1;
        let id = route.id.clone();
        self.routes.push(route);
        Ok(id)
    }

    fn route_mut(&mut self, id: &RouteId) -> Result<&mut Route, StoreError> {
        self.routes.iter_mut().find(|r| &r.id == id).ok_or_else(|| StoreError::UnknownRoute(id.clone()))
    }

    pub fn remove_route(&mut self, id: &RouteId) -> Result<Route, StoreError> {
        let idx = self.routes.iter().position(|r| &r.id == id).ok_or_else(|| StoreError::UnknownRoute(id.clone()))?;
        let route = self.routes.remove(idx);
        for driver in self.drivers.iter_mut().filter(|d| d.current_route.as_ref() == Some(id)) {
            driver.current_route = None;
            driver.status = DriverStatus::Available;
        }
        self.log("Route Deleted", format!("Route '{}' removed", route.name));
        Ok(route)
    }

    pub fn set_route_status(&mut self, id: &RouteId, status: RouteStatus) -> Result<(), StoreError> {
        let route = self.route_mut(id)?;
        let previous = route.status;
        route.status = status;
        let driver = route.driver.clone();

        if let Some(driver) = driver.and_then(|d| self.drivers.iter_mut().find(|x| x.id == d)) {
            match status {
                RouteStatus::InProgress => {
                    driver.status = DriverStatus::OnRoute;
                    driver.current_route = Some(id.clone());
                }
                RouteStatus::Completed => {
                    if previous != RouteStatus::Completed { driver.completed_routes += 1 }
                    driver.status = DriverStatus::Available;
                    driver.current_route = None;
                }
                RouteStatus::Pending => {}
            }
        }
        Ok(())
    }

    /// Assign (or clear) the driver and truck serving a route.
    pub fn assign_route(&mut self, id: &RouteId, driver: Option<DriverId>, truck: Option<TruckId>) -> Result<(), StoreError> {
        if let Some(d) = &driver {
            if self.driver(d).is_none() { return Err(StoreError::UnknownDriver(d.clone())) }
        }
        if let Some(t) = &truck {
            if self.truck(t).is_none() { return Err(StoreError::UnknownTruck(t.clone())) }
        }
        let route = self.route_mut(id)?;
        let newly_assigned = driver.is_some() && route.driver != driver;
        route.driver = driver.clone();
        route.truck = truck;

        if let (true, Some(d)) = (newly_assigned, driver) {
            if let Some(driver) = self.drivers.iter_mut().find(|x| x.id == d) {
                driver.total_routes += 1;
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Fleet
    // ---------------------------------------------------------------------

    pub fn add_truck(&mut self, truck: Truck) -> Result<TruckId, StoreError> {
        if self.truck(&truck.id).is_some() {
            return Err(StoreError::DuplicateId(truck.id.to_string()));
        }
        let id = truck.id.clone();
        self.trucks.push(truck);
        Ok(id)
    }

    /// Delete a truck and unassign it from routes.
    pub fn remove_truck(&mut self, id: &TruckId) -> Result<Truck, StoreError> {
        let idx = self.trucks.iter().position(|t| &t.id == id).ok_or_else(|| StoreError::UnknownTruck(id.clone()))?;
        for route in self.routes.iter_mut().filter(|r| r.truck.as_ref() == Some(id)) {
            route.truck = None;
        }
        Ok(self.trucks.remove(idx))
    }

    pub fn add_driver(&mut self, driver: Driver) -> Result<DriverId, StoreError> {
        if self.driver(&driver.id).is_some() {
            return Err(StoreError::DuplicateId(driver.id.to_string()));
        }
        let id = driver.id.clone();
        self.drivers.push(driver);
        Ok(id)
    }

    /// Delete a driver and unassign them from routes and trucks.
    pub fn remove_driver(&mut self, id: &DriverId) -> Result<Driver, StoreError> {
        let idx = self.drivers.iter().position(|d| &d.id == id).ok_or_else(|| StoreError::UnknownDriver(id.clone()))?;
        for route in self.routes.iter_mut().filter(|r| r.driver.as_ref() == Some(id)) {
            route.driver = None;
        }
        for truck in self.trucks.iter_mut().filter(|t| t.driver.as_ref() == Some(id)) {
            truck.driver = None;
        }
        Ok(self.drivers.remove(idx))
    }

    // ---------------------------------------------------------------------
    // Blocked roads and activity
    // ---------------------------------------------------------------------

    pub fn set_blocked_roads(&mut self, roads: Vec<BlockedRoad>) { self.blocked_roads = roads }

    pub fn add_blocked_road(&mut self, road: BlockedRoad) {
        let details = format!("Road blocked: {}", road.reason);
        self.blocked_roads.push(road);
        self.log("Road Blocked", details);
    }

    /// Append a prebuilt log entry. Later minted entries number after it.
    pub(crate) fn push_log(&mut self, log: ActivityLog) {
        self.counters.log += 1;
        self.logs.push(log);
    }

    fn log(&mut self, action: &str, details: String) {
        self.counters.log += 1;
        let id = LogId::numbered(self.counters.log);
        self.logs.push(ActivityLog {
            id,
            action: action.to_string(),
            details,
            timestamp: Utc::now(),
            user: self.actor.clone(),
        });
    }
}

impl Default for RecordSet {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> { Coord { x, y } }

    fn unit_square() -> Vec<Coord<f64>> { vec![c(0.0, 0.0), c(1.0, 0.0), c(1.0, 1.0), c(0.0, 1.0)] }

    #[test]
    fn add_bin_uses_default_fill_range() {
        let mut records = RecordSet::with_seed(7);
        for _ in 0..20 {
            let id = records.add_bin(c(5.0, 5.0), None);
            let level = records.bin(&id).unwrap().fill_level;
            assert!((10..50).contains(&level));
        }
    }

    #[test]
    fn add_bin_ids_skip_existing() {
        let mut records = RecordSet::with_seed(1);
        records.insert_bin(Bin::new(BinId::from("bin-1"), c(0.0, 0.0), 5)).unwrap();
        let id = records.add_bin(c(0.0, 0.0), Some(5));
        assert_eq!(id.as_str(), "bin-2");
    }

    #[test]
    fn zone_colors_are_stored_at_creation() {
        let mut records = RecordSet::with_seed(1);
        let a = records.add_zone(None, &unit_square()).unwrap();
        let b = records.add_zone(Some("East".into()), &unit_square()).unwrap();
        assert_eq!(records.zone(&a).unwrap().color, ZONE_PALETTE[0]);
        assert_eq!(records.zone(&b).unwrap().color, ZONE_PALETTE[1]);
        assert_eq!(records.zone(&a).unwrap().name, "Zone 1");

        records.remove_zone(&a).unwrap();
        assert_eq!(records.zone(&b).unwrap().color, ZONE_PALETTE[1]);
    }

    #[test]
    fn add_zone_rejects_two_points() {
        let mut records = RecordSet::with_seed(1);
        let err = records.add_zone(None, &[c(0.0, 0.0), c(1.0, 1.0)]).unwrap_err();
        assert_eq!(err, StoreError::Geometry(GeometryError::TooFewPoints(2)));
        assert!(records.zones().is_empty());
    }

    #[test]
    fn insert_bin_checks_zone() {
        let mut records = RecordSet::with_seed(1);
        let mut bin = Bin::new(BinId::from("bin-9"), c(0.0, 0.0), 10);
        bin.zone = Some(ZoneId::from("zone-x"));
        assert_eq!(records.insert_bin(bin), Err(StoreError::UnknownZone(ZoneId::from("zone-x"))));
    }

    #[test]
    fn mark_collected_resets_fill() {
        let mut records = RecordSet::with_seed(1);
        let id = records.add_bin(c(0.0, 0.0), Some(95));
        assert_eq!(records.bin(&id).unwrap().status, BinStatus::Overflowing);

        let at = Utc::now();
        records.mark_collected(&id, at).unwrap();
        let bin = records.bin(&id).unwrap();
        assert_eq!(bin.fill_level, 0);
        assert_eq!(bin.status, BinStatus::Ok);
        assert_eq!(bin.last_collection, Some(at));
        assert_eq!(records.logs().last().unwrap().action, "Bin Emptied");
    }

    #[test]
    fn add_route_drops_unknown_stops() {
        let mut records = RecordSet::with_seed(1);
        let a = records.add_bin(c(0.0, 0.0), Some(10));
        let id = records.add_route(NewRoute {
            stops: vec![a.clone(), BinId::from("bin-404")],
            path: vec![c(0.0, 0.0), c(1.0, 1.0)],
            ..NewRoute::default()
        });
        let route = records.route(&id).unwrap();
        assert_eq!(route.stops, vec![a]);
        assert_eq!(route.name, "Route 1");
        assert_eq!(route.color, ROUTE_PALETTE[0]);
    }

    #[test]
    fn route_status_drives_driver_state() {
        let mut records = RecordSet::with_seed(1);
        records.add_driver(Driver {
            id: DriverId::from("driver-1"),
            name: "John Driver".into(),
            email: "john@example.com".into(),
            phone: "555".into(),
            status: DriverStatus::Available,
            current_route: None,
            total_routes: 0,
            completed_routes: 0,
        }).unwrap();
        let route = records.add_route(NewRoute::default());
        records.assign_route(&route, Some(DriverId::from("driver-1")), None).unwrap();
        records.set_route_status(&route, RouteStatus::InProgress).unwrap();

        let driver = records.driver(&DriverId::from("driver-1")).unwrap();
        assert_eq!(driver.status, DriverStatus::OnRoute);
        assert_eq!(driver.current_route.as_ref(), Some(&route));
        assert_eq!(driver.total_routes, 1);

        records.set_route_status(&route, RouteStatus::Completed).unwrap();
        let driver = records.driver(&DriverId::from("driver-1")).unwrap();
        assert_eq!(driver.status, DriverStatus::Available);
        assert_eq!(driver.completed_routes, 1);

        assert_eq!(
            records.assign_route(&route, Some(DriverId::from("driver-9")), None),
            Err(StoreError::UnknownDriver(DriverId::from("driver-9")))
        );
    }

    #[test]
    fn zone_summary_counts_overflowing() {
        let mut records = RecordSet::with_seed(1);
        let zone = records.add_zone(Some("Gulshan".into()), &unit_square()).unwrap();
        records.add_bin(c(0.5, 0.5), Some(95));
        records.add_bin(c(0.2, 0.2), Some(40));
        records.add_bin(c(3.0, 3.0), Some(99));

        let summary = records.zone_summary(&zone).unwrap();
        assert_eq!(summary.bin_count, 2);
        assert_eq!(summary.overflowing, 1);
        assert!(summary.to_string().contains("Total Bins: 2"));
    }
}
