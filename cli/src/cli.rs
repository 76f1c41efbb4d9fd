use std::path::PathBuf;

/// Waste-collection map CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "wastemap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Settings file (TOML); WASTEMAP__* environment variables override it
    #[arg(short, long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Render the seeded map scene, optionally placing bins and drawing a zone
    Scene(SceneArgs),

    /// Build a route through the given bins
    Route(RouteArgs),

    /// Print dashboard statistics as JSON
    Stats(StatsArgs),

    /// Export zones, bins and routes as GeoJSON
    Export(ExportArgs),
}

#[derive(clap::Args, Debug)]
pub struct SceneArgs {
    /// Output scene file, defaults to "./scene.json"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Place a bin at LON,LAT (repeatable)
    #[arg(long = "bin", value_name = "LON,LAT")]
    pub bins: Vec<String>,

    /// Add a vertex LON,LAT to a new zone (repeatable, at least 3)
    #[arg(long = "zone-point", value_name = "LON,LAT")]
    pub zone_points: Vec<String>,

    /// Name for the drawn zone
    #[arg(long, requires = "zone_points")]
    pub zone_name: Option<String>,

    /// Overwrite an existing output file
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct RouteArgs {
    /// Bin ids in visiting order, e.g. bin-1 bin-4
    #[arg(required = true, num_args = 2..)]
    pub stops: Vec<String>,

    /// Skip the routing service and draw straight lines
    #[arg(long)]
    pub offline: bool,

    /// Also write the resulting scene to this file
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Overwrite an existing output file
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct StatsArgs {
    /// Print the analytics breakdown instead of headline counters
    #[arg(long)]
    pub analytics: bool,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Output GeoJSON file, defaults to "./records.geojson"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Overwrite an existing output file
    #[arg(long)]
    pub force: bool,
}
