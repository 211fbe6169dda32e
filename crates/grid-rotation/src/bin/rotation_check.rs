//! Switch-and-restore diagnostic for rotated-pole resampling.
//!
//! Builds a synthetic global field, rotates it into the frame of the given
//! rotation, rotates it back, and reports how far the restored field is from
//! the original. Nearest-neighbour resampling should keep the error within
//! about one grid cell of the field's gradient.
//!
//! Run with: cargo run --release --bin rotation-check -- --rotation 20,260,0,180

use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use grid_rotation::{
    switch_and_restore, testdata, GridField, RegularGrid, RotationConfig, RotationSpec,
    SearchMethod,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FieldKind {
    /// Value = latitude of the cell
    Latitude,
    /// Value = longitude of the cell
    Longitude,
    /// Value = 1 everywhere
    Constant,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SearchKind {
    /// k-d tree over unit vectors
    #[value(name = "kdtree")]
    KdTree,
    /// Exhaustive scan
    #[value(name = "brute_force", alias = "brute-force")]
    BruteForce,
}

impl From<SearchKind> for SearchMethod {
    fn from(kind: SearchKind) -> Self {
        match kind {
            SearchKind::KdTree => SearchMethod::KdTree,
            SearchKind::BruteForce => SearchMethod::BruteForce,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "rotation-check")]
#[command(about = "Rotate a synthetic field to a new pole and back, reporting the restore error")]
struct Args {
    /// Rotation details: NP_LAT,NP_LON,PM_LAT,PM_LON
    #[arg(short, long, default_value = "20,260,0,180", allow_hyphen_values = true)]
    rotation: String,

    /// Grid spacing in degrees
    #[arg(long, default_value_t = 2.5)]
    resolution: f64,

    /// Synthetic field to rotate
    #[arg(long, value_enum, default_value = "latitude")]
    field: FieldKind,

    /// Nearest-neighbour search; defaults to ROTATION_SEARCH
    #[arg(long, value_enum)]
    search: Option<SearchKind>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Log level, used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn build_field(kind: FieldKind, grid: &RegularGrid) -> GridField {
    match kind {
        FieldKind::Latitude => testdata::latitude_field(grid),
        FieldKind::Longitude => testdata::longitude_field(grid),
        FieldKind::Constant => testdata::constant_field(grid, 1.0),
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    let spec = RotationSpec::parse(&args.rotation)
        .with_context(|| format!("invalid --rotation '{}'", args.rotation))?;

    let mut config = RotationConfig::from_env();
    if let Some(search) = args.search {
        config.search = search.into();
    }
    config.validate()?;

    let grid = testdata::global_grid(args.resolution)?;
    let field = build_field(args.field, &grid);

    info!(
        spec = %spec,
        field = ?args.field,
        nlat = grid.nlat(),
        nlon = grid.nlon(),
        search = %config.search,
        "Starting switch and restore"
    );

    let start = Instant::now();
    let result = switch_and_restore(&field, &grid, &spec, config)?;
    let elapsed = start.elapsed();

    info!(
        elapsed_ms = elapsed.as_millis() as u64,
        max_abs_error = result.stats.max_abs_error,
        "Switch and restore finished"
    );

    if args.json {
        let report = serde_json::json!({
            "rotation": spec,
            "resolution": args.resolution,
            "field": format!("{:?}", args.field).to_lowercase(),
            "stats": result.stats,
            "elapsed_ms": elapsed.as_millis() as u64,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Rotation check");
        println!("==============\n");
        println!("  Rotation:        {}", spec);
        println!("  Grid:            {} x {} ({}°)", grid.nlat(), grid.nlon(), args.resolution);
        println!("  Field:           {:?}", args.field);
        println!("  Cells compared:  {}", result.stats.cells);
        println!("  Max abs error:   {:.4}", result.stats.max_abs_error);
        println!("  Mean abs error:  {:.4}", result.stats.mean_abs_error);
        println!("  Elapsed:         {:.1?}", elapsed);
    }

    Ok(())
}
