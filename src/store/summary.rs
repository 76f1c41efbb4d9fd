use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{BinId, BinStatus, FillCategory, Rgb, ZoneId};

/// Popup content for a clicked zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneSummary {
    pub id: ZoneId,
    pub name: String,
    pub color: Rgb,
    pub bin_count: usize,
    pub overflowing: usize, // Members in the most severe status
}

impl fmt::Display for ZoneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "Zone ID: {}", self.id)?;
        writeln!(f, "Total Bins: {}", self.bin_count)?;
        write!(f, "Overflowing: {}", self.overflowing)
    }
}

/// Popup content for a clicked bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinDetail {
    pub id: BinId,
    pub label: String,
    pub fill_level: u8,
    pub fill_category: FillCategory,
    pub capacity_l: u32,
    pub status: BinStatus,
    pub zone_name: Option<String>,
    pub last_collection: Option<DateTime<Utc>>,
}

impl fmt::Display for BinDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.label)?;
        writeln!(f, "Fill Level: {}% ({})", self.fill_level, self.fill_category.to_str())?;
        writeln!(f, "Capacity: {}L", self.capacity_l)?;
        write!(f, "Status: {}", self.status.to_str())?;
        if let Some(at) = self.last_collection {
            write!(f, "\nLast Collection: {}", at.format("%Y-%m-%d %H:%M"))?;
        }
        if let Some(zone) = &self.zone_name {
            write!(f, "\nZone: {zone}")?;
        }
        Ok(())
    }
}
