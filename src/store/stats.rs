use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{BinStatus, DriverStatus, FillCategory, RouteStatus, TruckStatus};

use super::records::RecordSet;

/// Headline counters for the dashboard header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_bins: usize,
    pub bins_needing_attention: usize, // Any status other than Ok
    pub overflowing_bins: usize,
    pub active_trucks: usize,
    pub on_route_trucks: usize,
    pub total_routes: usize,
    pub collected_today: usize,
    pub avg_fill_level: f64,
    pub completion_rate: f64,
    pub fill_categories: Vec<(FillCategory, usize)>,
    pub statuses: Vec<(BinStatus, usize)>,
}

impl Statistics {
    pub fn compute(records: &RecordSet) -> Self {
        let bins = records.bins();
        let today = chrono::Utc::now().date_naive();

        let routes = records.routes();
        let completed = routes.iter().filter(|r| r.status == RouteStatus::Completed).count();

        Self {
            total_bins: bins.len(),
            bins_needing_attention: bins.iter().filter(|b| b.status != BinStatus::Ok).count(),
            overflowing_bins: bins.iter().filter(|b| b.status == BinStatus::Overflowing).count(),
            active_trucks: records.trucks().iter()
                .filter(|t| matches!(t.status, TruckStatus::Available | TruckStatus::InUse))
                .count(),
            on_route_trucks: records.trucks().iter().filter(|t| t.status == TruckStatus::InUse).count(),
            total_routes: routes.len(),
            collected_today: records.logs().iter()
                .filter(|l| l.action == "Bin Emptied" && l.timestamp.date_naive() == today)
                .count(),
            avg_fill_level: average(bins.iter().map(|b| b.fill_level as f64)),
            completion_rate: percent(completed, routes.len()),
            fill_categories: FillCategory::ALL.iter()
                .map(|&c| (c, bins.iter().filter(|b| b.fill_category() == c).count()))
                .collect(),
            statuses: BinStatus::ALL.iter()
                .map(|&s| (s, bins.iter().filter(|b| b.status == s).count()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_bins: usize,
    pub total_routes: usize,
    pub total_collections: usize,
    pub avg_fill_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: BinStatus,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionTrend {
    pub date: chrono::NaiveDate,
    pub collections: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePerformance {
    pub route_name: String,
    pub total_bins: usize,
    pub completed_bins: usize,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverStats {
    pub driver_name: String,
    pub status: DriverStatus,
    pub total_routes: u32,
    pub completed_routes: u32,
    pub assigned_stops: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopBin {
    pub bin_id: String,
    pub label: String,
    pub collections_count: usize,
    pub fill_level: u8,
}

/// Aggregates behind the analytics page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    pub overview: Overview,
    pub status_distribution: Vec<StatusCount>,
    pub collection_trends: Vec<CollectionTrend>,
    pub route_performance: Vec<RoutePerformance>,
    pub driver_stats: Vec<DriverStats>,
    pub top_bins: Vec<TopBin>,
}

/// Number of bins listed in [`Analytics::top_bins`].
pub const TOP_BINS: usize = 10;

impl Analytics {
    pub fn compute(records: &RecordSet) -> Self {
        let bins = records.bins();
        let emptied: Vec<_> = records.logs().iter().filter(|l| l.action == "Bin Emptied").collect();

        let status_distribution = BinStatus::ALL.iter()
            .map(|&status| StatusCount { status, count: bins.iter().filter(|b| b.status == status).count() })
            .filter(|s| s.count > 0)
            .collect();

        let mut trends: BTreeMap<chrono::NaiveDate, usize> = BTreeMap::new();
        for log in &emptied {
            *trends.entry(log.timestamp.date_naive()).or_default() += 1;
        }

        // Stops count as served once the route is done; in-progress routes count stops already emptied.
        let route_performance = records.routes().iter().map(|route| {
            let total_bins = route.stops.len();
            let completed_bins = match route.status {
                RouteStatus::Completed => total_bins,
                RouteStatus::InProgress => route.stops.iter()
                    .filter_map(|s| records.bin(s))
                    .filter(|b| b.status == BinStatus::Ok)
                    .count(),
                RouteStatus::Pending => 0,
            };
            RoutePerformance {
                route_name: route.name.clone(),
                total_bins,
                completed_bins,
                completion_rate: percent(completed_bins, total_bins),
            }
        }).collect();

        let driver_stats = records.drivers().iter().map(|driver| DriverStats {
            driver_name: driver.name.clone(),
            status: driver.status,
            total_routes: driver.total_routes,
            completed_routes: driver.completed_routes,
            assigned_stops: records.routes().iter()
                .filter(|r| r.driver.as_ref() == Some(&driver.id))
                .map(|r| r.stops.len())
                .sum(),
        }).collect();

        let mut top_bins: Vec<TopBin> = bins.iter().map(|bin| {
            let mention = format!("Bin {} ", bin.id);
            TopBin {
                bin_id: bin.id.to_string(),
                label: bin.label.clone(),
                collections_count: emptied.iter().filter(|l| l.details.starts_with(&mention)).count(),
                fill_level: bin.fill_level,
            }
        }).collect();
        top_bins.sort_by(|a, b| b.fill_level.cmp(&a.fill_level).then_with(|| a.bin_id.cmp(&b.bin_id)));
        top_bins.truncate(TOP_BINS);

        Self {
            overview: Overview {
                total_bins: bins.len(),
                total_routes: records.routes().len(),
                total_collections: emptied.len(),
                avg_fill_level: average(bins.iter().map(|b| b.fill_level as f64)),
            },
            status_distribution,
            collection_trends: trends.into_iter().map(|(date, collections)| CollectionTrend { date, collections }).collect(),
            route_performance,
            driver_stats,
            top_bins,
        }
    }
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 { 0.0 } else { 100.0 * part as f64 / whole as f64 }
}
