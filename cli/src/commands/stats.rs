use anyhow::Result;
use wastemap::{Analytics, Statistics};

use super::{load_records, load_settings};

pub fn run(cli: &crate::cli::Cli, args: &crate::cli::StatsArgs) -> Result<()> {
    let records = load_records(&load_settings(cli)?);

    let text = if args.analytics {
        serde_json::to_string_pretty(&Analytics::compute(&records))?
    } else {
        serde_json::to_string_pretty(&Statistics::compute(&records))?
    };
    println!("{text}");
    Ok(())
}
