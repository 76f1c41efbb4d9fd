//! Fixture seed: the record set a fresh session starts from.

use chrono::{DateTime, Duration, Utc};
use geo::{Coord, LineString};

use crate::map::color::{ROUTE_PALETTE, ZONE_PALETTE};
use crate::types::{
    ActivityLog, Bin, BinId, BlockedRoad, Driver, DriverId, DriverStatus, LogId, Route, RouteId, RouteStatus, Truck, TruckId, TruckStatus, Zone, ZoneId,
};

use super::records::{RecordSet, StoreError};

/// Default map center (lon, lat) over the seeded zones.
pub const DEFAULT_CENTER: Coord<f64> = Coord { x: 90.4125, y: 23.8103 };
pub const DEFAULT_ZOOM: f64 = 13.0;

const ZONES: [(&str, &str, [f64; 4]); 3] = [
    // id, name, [min_lon, min_lat, max_lon, max_lat]
    ("zone-1", "Gulshan District", [90.4050, 23.7950, 90.4200, 23.8100]),
    ("zone-2", "Banani Sector", [90.3950, 23.8100, 90.4100, 23.8250]),
    ("zone-3", "Uttara Zone", [90.3850, 23.8250, 90.4050, 23.8400]),
];

const BINS: [(&str, [f64; 2], u8, &str, &str); 8] = [
    ("bin-1", [90.4100, 23.8000], 35, "zone-1", "2024-01-15T08:30:00Z"),
    ("bin-2", [90.4150, 23.8050], 78, "zone-1", "2024-01-14T14:20:00Z"),
    ("bin-3", [90.4080, 23.7980], 95, "zone-1", "2024-01-13T09:15:00Z"),
    ("bin-4", [90.4000, 23.8150], 22, "zone-2", "2024-01-15T07:45:00Z"),
    ("bin-5", [90.4050, 23.8200], 82, "zone-2", "2024-01-14T16:00:00Z"),
    ("bin-6", [90.3980, 23.8180], 45, "zone-2", "2024-01-15T10:30:00Z"),
    ("bin-7", [90.3920, 23.8300], 98, "zone-3", "2024-01-12T11:00:00Z"),
    ("bin-8", [90.3980, 23.8350], 15, "zone-3", "2024-01-15T09:00:00Z"),
];

fn rect(bounds: [f64; 4]) -> [Coord<f64>; 4] {
    let [x0, y0, x1, y1] = bounds;
    [Coord { x: x0, y: y0 }, Coord { x: x1, y: y0 }, Coord { x: x1, y: y1 }, Coord { x: x0, y: y1 }]
}

/// Populate a fresh record set with the seed data.
pub fn seed_into(records: &mut RecordSet) -> Result<(), StoreError> {
    for (ordinal, (id, name, bounds)) in ZONES.into_iter().enumerate() {
        let color = ZONE_PALETTE[ordinal % ZONE_PALETTE.len()];
        records.insert_zone(Zone::from_points(ZoneId::from(id), name, color, &rect(bounds))?)?;
    }

    for (id, [x, y], fill_level, zone, collected) in BINS {
        let mut bin = Bin::new(BinId::from(id), Coord { x, y }, fill_level);
        bin.zone = Some(ZoneId::from(zone));
        bin.last_collection = collected.parse::<DateTime<Utc>>().ok();
        records.insert_bin(bin)?;
    }

    seed_fleet(records)?;
    seed_routes(records)?;

    records.set_blocked_roads(vec![BlockedRoad {
        start: Coord { x: 90.4060, y: 23.8120 },
        end: Coord { x: 90.4095, y: 23.8135 },
        reason: "Road construction".to_string(),
    }]);

    let now = Utc::now();
    for (n, (action, details, hours_ago, user)) in [
        ("Bin Emptied", "Bin bin-1 emptied by John Driver", 2, "John Driver"),
        ("Route Created", "New route 'Downtown Express' created", 5, "Admin User"),
        ("Maintenance", "Sensor maintenance performed on bin-3", 24, "Tech Team"),
    ].into_iter().enumerate() {
        records.push_log(ActivityLog {
            id: LogId::numbered(n as u64 + 1),
            action: action.to_string(),
            details: details.to_string(),
            timestamp: now - Duration::hours(hours_ago),
            user: user.to_string(),
        });
    }

    tracing::debug!(
        zones = records.zones().len(),
        bins = records.bins().len(),
        routes = records.routes().len(),
        "seeded record set"
    );
    Ok(())
}

fn seed_fleet(records: &mut RecordSet) -> Result<(), StoreError> {
    let drivers = [
        ("driver-1", "John Driver", "john.driver@company.com", "+1 (555) 123-4567", DriverStatus::OnRoute, Some("route-1"), 45, 42),
        ("driver-2", "Jane Doe", "jane.doe@company.com", "+1 (555) 234-5678", DriverStatus::Available, None, 38, 38),
        ("driver-3", "Mike Johnson", "mike.johnson@company.com", "+1 (555) 345-6789", DriverStatus::OffDuty, None, 52, 48),
    ];
    for (id, name, email, phone, status, current_route, total_routes, completed_routes) in drivers {
        records.add_driver(Driver {
            id: DriverId::from(id),
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            status,
            current_route: current_route.map(RouteId::from),
            total_routes,
            completed_routes,
        })?;
    }

    let trucks = [
        ("truck-1", "WST-001", "Ford Transit 350", 12.0, TruckStatus::InUse, 65, Some("driver-1")),
        ("truck-2", "WST-002", "Chevrolet Express", 15.0, TruckStatus::Available, 80, None),
        ("truck-3", "WST-003", "Ram ProMaster", 10.0, TruckStatus::Maintenance, 45, None),
    ];
    for (id, plate, model, capacity_m3, status, fuel_level, driver) in trucks {
        records.add_truck(Truck {
            id: TruckId::from(id),
            plate: plate.to_string(),
            model: model.to_string(),
            capacity_m3,
            status,
            fuel_level,
            driver: driver.map(DriverId::from),
        })?;
    }
    Ok(())
}

fn seed_routes(records: &mut RecordSet) -> Result<(), StoreError> {
    let routes = [
        ("route-1", "Monday Morning Collection", &["bin-1", "bin-2", "bin-3"][..], RouteStatus::InProgress, "driver-1", Some("truck-1")),
        ("route-2", "Downtown Express", &["bin-4", "bin-5", "bin-6"][..], RouteStatus::Pending, "driver-2", None),
    ];
    for (ordinal, (id, name, stops, status, driver, truck)) in routes.into_iter().enumerate() {
        let stops: Vec<BinId> = stops.iter().copied().map(BinId::from).collect();
        let path = LineString(records.stop_coordinates(&stops));

        records.insert_route(Route {
            id: RouteId::from(id),
            name: name.to_string(),
            color: ROUTE_PALETTE[ordinal % ROUTE_PALETTE.len()],
            stops,
            path,
            status,
            metrics: None,
            driver: Some(DriverId::from(driver)),
            truck: truck.map(TruckId::from),
        })?;
    }
    Ok(())
}

/// A record set holding the fixture seed.
pub fn seed() -> RecordSet {
    let mut records = RecordSet::new();
    if let Err(error) = seed_into(&mut records) {
        tracing::error!(%error, "fixture seed is inconsistent");
    }
    records
}

/// Deterministic variant of [`seed`] for tests and reproducible scenes.
pub fn seed_with(rng_seed: u64) -> RecordSet {
    let mut records = RecordSet::with_seed(rng_seed);
    if let Err(error) = seed_into(&mut records) {
        tracing::error!(%error, "fixture seed is inconsistent");
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BinStatus;

    #[test]
    fn seed_matches_fixture_counts() {
        let records = seed_with(0);
        assert_eq!(records.zones().len(), 3);
        assert_eq!(records.bins().len(), 8);
        assert_eq!(records.routes().len(), 2);
        assert_eq!(records.trucks().len(), 3);
        assert_eq!(records.drivers().len(), 3);
        assert_eq!(records.blocked_roads().len(), 1);
        assert_eq!(records.logs().len(), 3);
    }

    #[test]
    fn seeded_bins_lie_in_their_zones() {
        let records = seed_with(0);
        for bin in records.bins() {
            let zone = records.zone_at(bin.location).map(|z| z.id.clone());
            assert_eq!(zone, bin.zone, "{}", bin.id);
        }
    }

    #[test]
    fn seeded_statuses_follow_fill_level() {
        let records = seed_with(0);
        let status = |id: &str| records.bin(&BinId::from(id)).unwrap().status;
        assert_eq!(status("bin-2"), BinStatus::NeedsPickup);
        assert_eq!(status("bin-3"), BinStatus::Overflowing);
        assert_eq!(status("bin-8"), BinStatus::Ok);
    }

    #[test]
    fn new_records_number_after_seed() {
        let mut records = seed_with(0);
        let bin = records.add_bin(Coord { x: 0.0, y: 0.0 }, Some(10));
        assert_eq!(bin.as_str(), "bin-9");
        assert_eq!(records.logs().last().unwrap().id.as_str(), "log-4");
    }
}
