pub mod export;
pub mod route;
pub mod scene;
pub mod stats;

use anyhow::{Context, Result, anyhow};
use wastemap::{Coord, Dashboard, RecordSet, SceneBackend, Settings};

use crate::cli::Cli;

/// Settings from `--config` and the environment.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    Settings::load(cli.config.as_deref())
}

/// The seeded record set, deterministic when a seed is configured.
pub fn load_records(settings: &Settings) -> RecordSet {
    match settings.seed {
        Some(seed) => wastemap::seed_with(seed),
        None => wastemap::seed(),
    }
}

/// A dashboard over a headless scene whose style is already loaded.
pub fn open_dashboard(settings: &Settings) -> Result<Dashboard<SceneBackend>> {
    let mut dashboard = Dashboard::new(load_records(settings), SceneBackend::preloaded(), settings.map.clone());
    dashboard.open().context("open map")?;
    Ok(dashboard)
}

/// Parse "LON,LAT".
pub fn parse_coord(text: &str) -> Result<Coord<f64>> {
    let (lon, lat) = text.split_once(',').ok_or_else(|| anyhow!("expected LON,LAT, got {text:?}"))?;
    let x: f64 = lon.trim().parse().with_context(|| format!("bad longitude in {text:?}"))?;
    let y: f64 = lat.trim().parse().with_context(|| format!("bad latitude in {text:?}"))?;
    Ok(Coord { x, y })
}
