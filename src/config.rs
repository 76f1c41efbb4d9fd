//! Layered settings: built-in defaults, an optional TOML file, then `WASTEMAP__*` environment variables.

use std::path::Path;

use anyhow::{Context, Result};
use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::map::Basemap;
use crate::routing::OsrmEndpoint;
use crate::store::{DEFAULT_CENTER, DEFAULT_ZOOM};

/// Prefix for environment overrides, e.g. `WASTEMAP__ROUTING__BASE_URL`.
pub const ENV_PREFIX: &str = "WASTEMAP";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub container: String,
    pub center: [f64; 2], // (lon, lat)
    pub zoom: f64,
    pub basemap: Basemap,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            container: "map".to_string(),
            center: [DEFAULT_CENTER.x, DEFAULT_CENTER.y],
            zoom: DEFAULT_ZOOM,
            basemap: Basemap::default(),
        }
    }
}

impl MapSettings {
    pub fn center(&self) -> Coord<f64> { Coord { x: self.center[0], y: self.center[1] } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingSettings {
    pub enabled: bool,
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: Option<u64>, // None: no client-side timeout
}

impl Default for RoutingSettings {
    fn default() -> Self {
        let endpoint = OsrmEndpoint::default();
        Self { enabled: true, base_url: endpoint.base_url, profile: endpoint.profile, timeout_secs: None }
    }
}

impl RoutingSettings {
    pub fn endpoint(&self) -> OsrmEndpoint { OsrmEndpoint::new(&self.base_url, &self.profile) }

    pub fn timeout(&self) -> Option<std::time::Duration> { self.timeout_secs.map(std::time::Duration::from_secs) }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub map: MapSettings,
    pub routing: RoutingSettings,
    /// Seed for generated fill levels. Unset draws from the OS.
    pub seed: Option<u64>,
}

impl Settings {
    /// Load settings, layering `path` (if given and present) and the environment over defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path).format(config::FileFormat::Toml).required(false),
            );
        }
        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
            .build()
            .context("Failed to read settings")?
            .try_deserialize::<Settings>()
            .context("Failed to parse settings")?;

        tracing::debug!(?settings, "settings loaded");
        Ok(settings)
    }

    /// Parse settings from TOML text alone, ignoring the environment.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Failed to parse settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_osrm() {
        let settings = Settings::default();
        assert!(settings.routing.enabled);
        assert_eq!(settings.routing.base_url, "https://router.project-osrm.org");
        assert_eq!(settings.routing.timeout(), None);
        assert_eq!(settings.map.center(), DEFAULT_CENTER);
    }

    #[test]
    fn toml_overrides_fill_partial_tables() {
        let settings = Settings::from_toml_str(
            r#"
            seed = 42

            [routing]
            enabled = false
            timeout_secs = 5

            [map]
            zoom = 11.5
            "#,
        ).unwrap();
        assert_eq!(settings.seed, Some(42));
        assert!(!settings.routing.enabled);
        assert_eq!(settings.routing.profile, "driving");
        assert_eq!(settings.routing.timeout(), Some(std::time::Duration::from_secs(5)));
        assert_eq!(settings.map.zoom, 11.5);
        assert_eq!(settings.map.container, "map");
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(settings.map.zoom, DEFAULT_ZOOM);
    }
}
