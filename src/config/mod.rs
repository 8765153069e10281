use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default elevations and sizes, all in meters.
///
/// Every feature is built from the tile ground plane at 0.0. Road slabs sit
/// slightly above the ground so they do not z-fight with it; junction slabs
/// sit a little higher still so they cover the trimmed road ends.
pub mod heights {
    pub const GROUND: f64 = 0.0;

    // Buildings without an explicit height
    pub const DEFAULT_WALL_HEIGHT: f64 = 6.0;
    pub const DEFAULT_ROOF_HEIGHT: f64 = 3.0;

    // Roads: ribbon slab and the junction slab on top of it
    pub const ROAD_BASE: f64 = 0.05;
    pub const ROAD_THICKNESS: f64 = 0.1;
    pub const JUNCTION_LIFT: f64 = 0.01;
    pub const DEFAULT_ROAD_WIDTH: f64 = 6.0;

    // Power lines
    pub const POLE_HEIGHT: f64 = 10.0;
    pub const POLE_SIZE: f64 = 0.4;
    pub const TOWER_HEIGHT: f64 = 30.0;
    pub const TOWER_SIZE: f64 = 4.0;
    pub const WIRE_WIDTH: f64 = 0.15;
    pub const WIRE_SAG: f64 = 0.9;
}

fn default_flat_texture_min_area() -> f64 {
    20.0
}
fn default_flat_texture_max_aabb_area() -> f64 {
    2500.0
}
fn default_validation_padding() -> f64 {
    0.01
}
fn default_dome_segments() -> usize {
    8
}

/// Roof builder tuning
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoofConfig {
    /// Flat roofs smaller than this keep their descriptor texture
    #[serde(default = "default_flat_texture_min_area")]
    pub flat_texture_min_area: f64,
    /// Flat roofs whose bounds exceed this keep their descriptor texture
    #[serde(default = "default_flat_texture_max_aabb_area")]
    pub flat_texture_max_aabb_area: f64,
    /// Slack around the footprint bounds when validating roof geometry
    #[serde(default = "default_validation_padding")]
    pub validation_padding: f64,
    /// Rings in a dome's quarter-circle profile
    #[serde(default = "default_dome_segments")]
    pub dome_segments: usize,
}

impl Default for RoofConfig {
    fn default() -> Self {
        Self {
            flat_texture_min_area: default_flat_texture_min_area(),
            flat_texture_max_aabb_area: default_flat_texture_max_aabb_area(),
            validation_padding: default_validation_padding(),
            dome_segments: default_dome_segments(),
        }
    }
}

fn default_road_width() -> f64 {
    heights::DEFAULT_ROAD_WIDTH
}
fn default_road_thickness() -> f64 {
    heights::ROAD_THICKNESS
}
fn default_road_base() -> f64 {
    heights::ROAD_BASE
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoadLayerConfig {
    /// Width used when a road descriptor has none
    #[serde(default = "default_road_width")]
    pub default_width: f64,
    #[serde(default = "default_road_thickness")]
    pub thickness: f64,
    #[serde(default = "default_road_base")]
    pub base: f64,
}

impl Default for RoadLayerConfig {
    fn default() -> Self {
        Self {
            default_width: default_road_width(),
            thickness: default_road_thickness(),
            base: default_road_base(),
        }
    }
}

fn default_pole_height() -> f64 {
    heights::POLE_HEIGHT
}
fn default_pole_size() -> f64 {
    heights::POLE_SIZE
}
fn default_tower_height() -> f64 {
    heights::TOWER_HEIGHT
}
fn default_tower_size() -> f64 {
    heights::TOWER_SIZE
}
fn default_wire_width() -> f64 {
    heights::WIRE_WIDTH
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PowerlineConfig {
    #[serde(default = "default_pole_height")]
    pub pole_height: f64,
    #[serde(default = "default_pole_size")]
    pub pole_size: f64,
    #[serde(default = "default_tower_height")]
    pub tower_height: f64,
    #[serde(default = "default_tower_size")]
    pub tower_size: f64,
    #[serde(default = "default_wire_width")]
    pub wire_width: f64,
}

impl Default for PowerlineConfig {
    fn default() -> Self {
        Self {
            pole_height: default_pole_height(),
            pole_size: default_pole_size(),
            tower_height: default_tower_height(),
            tower_size: default_tower_size(),
            wire_width: default_wire_width(),
        }
    }
}

fn default_wall_height() -> f64 {
    heights::DEFAULT_WALL_HEIGHT
}
fn default_roof_height() -> f64 {
    heights::DEFAULT_ROOF_HEIGHT
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BuildingConfig {
    #[serde(default = "default_wall_height")]
    pub default_height: f64,
    /// Roof height for sloped roofs without one
    #[serde(default = "default_roof_height")]
    pub default_roof_height: f64,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            default_height: default_wall_height(),
            default_roof_height: default_roof_height(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub roof: RoofConfig,
    #[serde(default)]
    pub roads: RoadLayerConfig,
    #[serde(default)]
    pub powerlines: PowerlineConfig,
    #[serde(default)]
    pub buildings: BuildingConfig,
}

impl FileConfig {
    /// First parseable config file from the search path
    pub fn load() -> Option<Self> {
        get_config_paths()
            .into_iter()
            .filter(|path| path.exists())
            .find_map(|path| Self::load_from(&path))
    }

    /// Parse one config file, logging and skipping it on failure
    pub fn load_from(path: &Path) -> Option<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read config file");
                return None;
            }
        };
        match toml::from_str(&contents) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config");
                Some(config)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to parse config file");
                None
            }
        }
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("tilemesh.toml"));
    paths.push(PathBuf::from(".tilemesh.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("tilemesh").join("config.toml"));
        paths.push(config_dir.join("tilemesh.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".tilemesh.toml"));
        paths.push(home.join(".config").join("tilemesh").join("config.toml"));
    }

    paths
}
