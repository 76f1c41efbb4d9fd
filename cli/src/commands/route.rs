use anyhow::{Context, Result, bail};
use serde_json::json;
use wastemap::{BinId, CreationMode, Offline, RouteCompletion, Router, Tool, io::write_atomic};

use super::{load_settings, open_dashboard};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::RouteArgs) -> Result<()> {
    let settings = load_settings(cli)?;
    let mut dashboard = open_dashboard(&settings)?;

    dashboard.select_tool(Tool::Route)?;
    for stop in &args.stops {
        let id = BinId::from(stop.as_str());
        if dashboard.records().bin(&id).is_none() {
            bail!("unknown bin {id}");
        }
        dashboard.click_bin(&id);
    }
    if let CreationMode::BuildingRoute { stops, .. } = dashboard.workflow().mode() {
        if stops.len() < args.stops.len() {
            tracing::warn!(given = args.stops.len(), kept = stops.len(), "repeated stops were ignored");
        }
    }

    let router: Box<dyn Router> = if args.offline || !settings.routing.enabled {
        Box::new(Offline)
    } else {
        let client = wastemap::OsrmClient::new(settings.routing.endpoint(), settings.routing.timeout())
            .context("build routing client")?;
        Box::new(client)
    };

    let RouteCompletion::Created { id, degraded } = dashboard.complete_route(&router.as_ref())? else {
        bail!("route session ended before routing finished");
    };
    let route = dashboard.records().route(&id).context("created route is missing")?;

    let summary = json!({
        "id": route.id,
        "name": route.name,
        "stops": route.stops,
        "degraded": degraded,
        "points": route.path.0.len(),
        "distance_km": route.metrics.map(|m| m.distance_km),
        "duration_min": route.metrics.map(|m| m.duration_min),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(out_path) = &args.output {
        let bytes = serde_json::to_vec_pretty(&dashboard.surface().backend().snapshot()).context("serialize scene")?;
        write_atomic(out_path, &bytes, args.force)?;
        eprintln!("[route] wrote {}", out_path.display());
    }
    Ok(())
}
