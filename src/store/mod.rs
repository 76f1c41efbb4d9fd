//! Session record store: the single owner of bins, zones, routes and fleet records.

pub mod fixtures;
mod records;
pub mod stats;
mod summary;

pub use fixtures::{DEFAULT_CENTER, DEFAULT_ZOOM, seed, seed_with};
pub use records::{NewRoute, RecordSet, StoreError};
pub use stats::{Analytics, Statistics};
pub use summary::{BinDetail, ZoneSummary};
