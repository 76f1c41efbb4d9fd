use chrono::{DateTime, Utc};
use geo::Coord;
use serde::{Deserialize, Serialize};

use super::{BinId, ZoneId};

/// Operational status of a bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BinStatus {
    Ok,
    NeedsPickup,
    Overflowing,
    /// Set by an operator when the bin cannot be reached. Never derived from fill level.
    Blocked,
}

impl BinStatus {
    /// Coarse status for a fill level: `>= 90` overflowing, `>= 70` needs pickup.
    pub fn from_fill_level(level: u8) -> Self {
        match level {
            90.. => BinStatus::Overflowing,
            70..=89 => BinStatus::NeedsPickup,
            _ => BinStatus::Ok,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            BinStatus::Ok => "ok",
            BinStatus::NeedsPickup => "needs_pickup",
            BinStatus::Overflowing => "overflowing",
            BinStatus::Blocked => "blocked",
        }
    }

    pub const ALL: [BinStatus; 4] = [
        BinStatus::Ok,
        BinStatus::NeedsPickup,
        BinStatus::Overflowing,
        BinStatus::Blocked,
    ];
}

/// Discrete fill bucket used for marker colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillCategory {
    Empty,    // < 20
    Low,      // 20..40
    Medium,   // 40..60
    High,     // 60..80
    Critical, // >= 80
}

impl FillCategory {
    pub fn from_fill_level(level: u8) -> Self {
        match level {
            80.. => FillCategory::Critical,
            60..=79 => FillCategory::High,
            40..=59 => FillCategory::Medium,
            20..=39 => FillCategory::Low,
            _ => FillCategory::Empty,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            FillCategory::Empty => "empty",
            FillCategory::Low => "low",
            FillCategory::Medium => "medium",
            FillCategory::High => "high",
            FillCategory::Critical => "critical",
        }
    }

    pub const ALL: [FillCategory; 5] = [
        FillCategory::Empty,
        FillCategory::Low,
        FillCategory::Medium,
        FillCategory::High,
        FillCategory::Critical,
    ];
}

/// A physical collection point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub id: BinId,
    pub label: String,          // Street address or short name
    pub location: Coord<f64>,   // (lon, lat)
    pub fill_level: u8,         // Percent, 0..=100
    pub capacity_l: u32,
    pub status: BinStatus,
    pub zone: Option<ZoneId>,
    pub last_collection: Option<DateTime<Utc>>,
}

impl Bin {
    /// New bin with status derived from `fill_level` (clamped to 100).
    pub fn new(id: BinId, location: Coord<f64>, fill_level: u8) -> Self {
        let fill_level = fill_level.min(100);
        Self {
            label: id.to_string(),
            id,
            location,
            fill_level,
            capacity_l: 240,
            status: BinStatus::from_fill_level(fill_level),
            zone: None,
            last_collection: None,
        }
    }

    #[inline] pub fn fill_category(&self) -> FillCategory { FillCategory::from_fill_level(self.fill_level) }

    #[inline] pub fn is_blocked(&self) -> bool { self.status == BinStatus::Blocked }

    /// Update the fill level and re-derive the status, unless the bin is blocked.
    pub fn set_fill_level(&mut self, level: u8) {
        self.fill_level = level.min(100);
        if !self.is_blocked() {
            self.status = BinStatus::from_fill_level(self.fill_level);
        }
    }
}
