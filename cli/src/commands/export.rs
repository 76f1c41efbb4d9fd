use anyhow::Result;
use wastemap::io::{write_atomic, write_records_to_geojson_bytes};

use super::{load_records, load_settings};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::ExportArgs) -> Result<()> {
    let out_path = args.output.clone().unwrap_or("./records.geojson".into());
    let records = load_records(&load_settings(cli)?);

    let bytes = write_records_to_geojson_bytes(records.zones(), records.bins(), records.routes())?;
    write_atomic(&out_path, &bytes, args.force)?;
    eprintln!(
        "[export] wrote {} zones, {} bins, {} routes to {}",
        records.zones().len(), records.bins().len(), records.routes().len(), out_path.display(),
    );
    Ok(())
}
