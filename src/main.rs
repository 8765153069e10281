use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use tilemesh::config::FileConfig;
use tilemesh::input::load_tile;
use tilemesh::layers::{
    build_powerline_graph, build_road_graph, generate_building_meshes, generate_powerline_meshes,
    generate_road_meshes,
};
use tilemesh::mesh::stl::estimate_stl_size;
use tilemesh::mesh::{validate_and_fix, write_stl};
use tilemesh::roof::{ConvexSkeleton, RoofBuilder};

/// Build 3D geometry for one map tile and write it as a binary STL
///
/// The tile is a JSON file of pre-classified buildings, roads and power
/// lines in tile-local meters.
///
/// Examples:
///   # Build a tile next to the input file
///   tilemesh tile.json
///
///   # Pick the output path and show debug logs
///   tilemesh tile.json -o out/tile.stl -v
///
///   # Use a config file
///   tilemesh tile.json --config my-settings.toml
#[derive(Parser, Debug)]
#[command(name = "tilemesh")]
#[command(version, about, long_about = None)]
struct Args {
    /// Tile JSON file
    input: PathBuf,

    /// Output STL file path (defaults to the input path with an .stl extension)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Path to config file (optional, auto-searches tilemesh.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let file_config = match args.config {
        Some(ref config_path) => {
            if !config_path.exists() {
                bail!("Config file not found: {:?}", config_path);
            }
            FileConfig::load_from(config_path)
                .with_context(|| format!("Failed to load config file: {:?}", config_path))?
        }
        None => FileConfig::load().unwrap_or_default(),
    };
    let verbose = args.verbose || file_config.verbose;

    let output_path = args
        .output
        .clone()
        .or_else(|| file_config.output.clone())
        .unwrap_or_else(|| args.input.with_extension("stl"));

    println!("tilemesh - Map Tile Geometry Builder");
    println!("====================================");
    println!();

    if verbose {
        println!("Configuration:");
        println!("  Input: {}", args.input.display());
        println!("  Output: {}", output_path.display());
        println!("  Default wall height: {}m", file_config.buildings.default_height);
        println!("  Default road width: {}m", file_config.roads.default_width);
        println!("  Dome segments: {}", file_config.roof.dome_segments);
        println!();
    }

    let spinner = create_spinner("Reading tile...");
    let start = Instant::now();
    let tile = load_tile(&args.input)?;
    if tile.is_empty() {
        bail!("Tile contains no buildings, roads or power lines");
    }
    spinner.finish_with_message(format!(
        "Read {} buildings, {} roads, {} power lines [{:.1}s]",
        tile.buildings.len(),
        tile.roads.len(),
        tile.powerlines.len(),
        start.elapsed().as_secs_f32()
    ));

    let spinner = create_spinner("Building roofs and walls...");
    let start = Instant::now();
    let roofs = RoofBuilder::new(&ConvexSkeleton, file_config.roof.clone());
    let building_triangles =
        generate_building_meshes(&tile.buildings, &roofs, &file_config.buildings);
    spinner.finish_with_message(format!(
        "Buildings: {} triangles [{:.1}s]",
        building_triangles.len(),
        start.elapsed().as_secs_f32()
    ));

    let spinner = create_spinner("Building road network...");
    let start = Instant::now();
    let mut road_graph = build_road_graph(&tile.roads, &file_config.roads);
    let road_triangles = generate_road_meshes(&mut road_graph, &file_config.roads);
    spinner.finish_with_message(format!(
        "Roads: {} triangles, {} junctions [{:.1}s]",
        road_triangles.len(),
        road_graph.intersections().len(),
        start.elapsed().as_secs_f32()
    ));

    let spinner = create_spinner("Building power lines...");
    let start = Instant::now();
    let powerlines = build_powerline_graph(&tile.powerlines, &tile.powerline_nodes);
    let powerline_triangles =
        generate_powerline_meshes(&powerlines.create_entities(), &file_config.powerlines);
    spinner.finish_with_message(format!(
        "Power lines: {} triangles [{:.1}s]",
        powerline_triangles.len(),
        start.elapsed().as_secs_f32()
    ));

    let spinner = create_spinner("Validating and writing STL file...");
    let start = Instant::now();

    let mut all_triangles = Vec::new();
    all_triangles.extend(building_triangles);
    all_triangles.extend(road_triangles);
    all_triangles.extend(powerline_triangles);

    let (validated, report) = validate_and_fix(all_triangles);
    if report.has_issues() {
        tracing::warn!("{}", report.summary());
    }
    let file_size = estimate_stl_size(validated.len());

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    write_stl(&output_path, &validated).context("Failed to write STL file")?;

    spinner.finish_with_message(format!(
        "Wrote {} triangles ({:.1} KB) [{:.1}s]",
        validated.len(),
        file_size as f64 / 1024.0,
        start.elapsed().as_secs_f32()
    ));

    println!();
    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );
    println!();
    println!("Output: {}", output_path.display());

    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
