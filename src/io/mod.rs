//! File outputs: GeoJSON export and atomic writes.

pub mod geojson;
mod write;

pub use geojson::write_records_to_geojson_bytes;
pub use write::write_atomic;
