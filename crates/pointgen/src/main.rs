use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs;
use std::path::PathBuf;

use pointgen::{generate_tile, ColorMode, ColorStrategy, GenerateOptions, Shape};

/// Generate a point-cloud tile payload and write its four sections
/// (feature/batch table JSON + binary) to an output directory.
///
/// Draco compression is not exposed here: the compression engine is an
/// external native module that library callers supply through the
/// `PointCompressor` port.
#[derive(Parser, Debug)]
#[command(name = "pointgen", version)]
struct Args {
    /// Output directory for the section files.
    #[arg(long, default_value = "tile_out")]
    output_dir: PathBuf,

    /// Number of points to generate.
    #[arg(long, default_value_t = 1000)]
    points: usize,

    #[arg(long, value_enum, default_value_t = Shape::Box)]
    shape: Shape,

    #[arg(long, value_enum, default_value_t = ColorMode::Rgb)]
    color_mode: ColorMode,

    #[arg(long, value_enum, default_value_t = ColorStrategy::Random)]
    color_strategy: ColorStrategy,

    /// Edge length of the tile cube in meters.
    #[arg(long, default_value_t = 10.0)]
    tile_width: f64,

    /// Noise time coordinate.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Seed for the deterministic random source.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Express positions relative to the tile center (RTC_CENTER).
    #[arg(long, default_value_t = false)]
    relative_to_center: bool,

    /// Quantize positions to UNSIGNED_SHORT.
    #[arg(long, default_value_t = false)]
    quantize: bool,

    /// Emit per-point normals.
    #[arg(long, default_value_t = false)]
    normals: bool,

    /// Oct-encode the normals into two bytes each.
    #[arg(long, default_value_t = false)]
    oct_encode_normals: bool,

    /// Batch points by octant and emit a per-batch batch table.
    #[arg(long, default_value_t = false)]
    batched: bool,

    /// Emit per-point batch-table metadata (temperature, secondaryColor, id).
    #[arg(long, default_value_t = false)]
    per_entity_properties: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let options = GenerateOptions {
        point_count: args.points,
        shape: args.shape,
        color_mode: args.color_mode,
        color_strategy: args.color_strategy,
        tile_width: args.tile_width,
        time: args.time,
        seed: args.seed,
        relative_to_center: args.relative_to_center,
        quantize_positions: args.quantize,
        normals: args.normals,
        oct_encode_normals: args.oct_encode_normals,
        batched: args.batched,
        per_entity_properties: args.per_entity_properties,
        ..Default::default()
    };

    let payload = generate_tile(&options, None)?;

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;

    let write = |name: &str, bytes: &[u8]| -> Result<()> {
        let path = args.output_dir.join(name);
        fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        info!("{} ({} bytes)", path.display(), bytes.len());
        Ok(())
    };

    write(
        "featureTable.json",
        &serde_json::to_vec_pretty(&payload.feature_table_json)?,
    )?;
    write("featureTable.bin", &payload.feature_table_binary)?;
    write(
        "batchTable.json",
        &serde_json::to_vec_pretty(&payload.batch_table_json)?,
    )?;
    write("batchTable.bin", &payload.batch_table_binary)?;

    info!(
        "OK {} points, shape {}, colors {} ({} feature bytes, {} batch bytes)",
        args.points,
        args.shape,
        args.color_mode,
        payload.feature_table_binary.len(),
        payload.batch_table_binary.len()
    );

    Ok(())
}
