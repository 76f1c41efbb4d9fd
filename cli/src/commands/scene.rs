use anyhow::{Context, Result, bail};
use wastemap::{Tool, io::write_atomic, workflow::ClickEffect};

use super::{load_settings, open_dashboard, parse_coord};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::SceneArgs) -> Result<()> {
    let out_path = args.output.clone().unwrap_or("./scene.json".into());
    let settings = load_settings(cli)?;
    let mut dashboard = open_dashboard(&settings)?;

    for text in &args.bins {
        let at = parse_coord(text)?;
        dashboard.select_tool(Tool::Bin)?;
        if let ClickEffect::BinPlaced(id) = dashboard.click_map(at) {
            let zone = dashboard.records().bin(&id).and_then(|b| b.zone.clone());
            tracing::info!(bin = %id, ?zone, "placed bin");
        }
    }

    if !args.zone_points.is_empty() {
        dashboard.select_tool(Tool::Zone)?;
        for text in &args.zone_points {
            dashboard.click_map(parse_coord(text)?);
        }
        if !dashboard.can_complete() {
            dashboard.cancel();
            bail!("a zone needs at least 3 points, got {}", args.zone_points.len());
        }
        let id = dashboard.complete_zone(args.zone_name.clone())?;
        tracing::info!(zone = %id, "drew zone");
    }

    let snapshot = dashboard.surface().backend().snapshot();
    let bytes = serde_json::to_vec_pretty(&snapshot).context("serialize scene")?;
    write_atomic(&out_path, &bytes, args.force)?;
    eprintln!("[scene] wrote {}", out_path.display());
    Ok(())
}
