use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use strata_blocks::CoverDef;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Clone, Debug, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_seed")]
    pub seed: i32,
    #[serde(default)]
    pub dataset: DatasetPaths,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub tiles: Tiles,
    #[serde(default)]
    pub terrain: Terrain,
    #[serde(default)]
    pub interp: Interp,
    #[serde(default)]
    pub trees: Trees,
    #[serde(default)]
    pub ore: Ore,
    #[serde(default)]
    pub build: Build,
    #[serde(default)]
    pub merge: Merge,
    #[serde(default)]
    pub cover: Vec<CoverDef>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            seed: default_seed(),
            dataset: DatasetPaths::default(),
            output: Output::default(),
            tiles: Tiles::default(),
            terrain: Terrain::default(),
            interp: Interp::default(),
            trees: Trees::default(),
            ore: Ore::default(),
            build: Build::default(),
            merge: Merge::default(),
            cover: Vec::new(),
        }
    }
}

fn default_name() -> String {
    "strata".to_string()
}
fn default_seed() -> i32 {
    1337
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DatasetPaths {
    #[serde(default)]
    pub landcover: Option<PathBuf>,
    #[serde(default)]
    pub elevation: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Output {
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    #[serde(default = "default_world_dir")]
    pub world_dir: PathBuf,
}
fn default_work_dir() -> PathBuf {
    PathBuf::from("work")
}
fn default_world_dir() -> PathBuf {
    PathBuf::from("world")
}
impl Default for Output {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            world_dir: default_world_dir(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Tiles {
    #[serde(default = "default_tile_size")]
    pub size: i32,
    #[serde(default = "default_halo")]
    pub halo: i32,
    /// First tile index `[tx, ty]` to build.
    #[serde(default)]
    pub start: [i32; 2],
    /// One past the last tile index; `[0, 0]` means the whole grid.
    #[serde(default)]
    pub end: [i32; 2],
}
fn default_tile_size() -> i32 {
    256
}
fn default_halo() -> i32 {
    32
}
impl Default for Tiles {
    fn default() -> Self {
        Self {
            size: default_tile_size(),
            halo: default_halo(),
            start: [0, 0],
            end: [0, 0],
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Terrain {
    /// Metres per output block horizontally.
    #[serde(default = "default_scale")]
    pub scale: f64,
    /// Metres per output block vertically.
    #[serde(default = "default_vscale")]
    pub vscale: f64,
    #[serde(default = "default_sealevel")]
    pub sealevel: i32,
    /// Elevation (metres) mapped onto sea level.
    #[serde(default)]
    pub trim: f64,
    #[serde(default = "default_maxdepth")]
    pub maxdepth: i32,
    /// Horizontal blocks per block of depth along the shore.
    #[serde(default = "default_slope")]
    pub slope: f64,
    #[serde(default = "default_height")]
    pub height: i32,
    /// Air kept between the highest surface and the top of the volume.
    #[serde(default = "default_headroom")]
    pub headroom: i32,
    #[serde(default = "default_crust_max")]
    pub crust_max: i32,
}
fn default_scale() -> f64 {
    6.0
}
fn default_vscale() -> f64 {
    6.0
}
fn default_sealevel() -> i32 {
    64
}
fn default_maxdepth() -> i32 {
    32
}
fn default_slope() -> f64 {
    1.0
}
fn default_height() -> i32 {
    256
}
fn default_headroom() -> i32 {
    16
}
fn default_crust_max() -> i32 {
    5
}
impl Default for Terrain {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            vscale: default_vscale(),
            sealevel: default_sealevel(),
            trim: 0.0,
            maxdepth: default_maxdepth(),
            slope: default_slope(),
            height: default_height(),
            headroom: default_headroom(),
            crust_max: default_crust_max(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Interp {
    #[serde(default = "default_cover_neighbors")]
    pub cover_neighbors: usize,
    #[serde(default = "default_elevation_neighbors")]
    pub elevation_neighbors: usize,
    #[serde(default = "default_power")]
    pub power: f64,
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}
fn default_cover_neighbors() -> usize {
    1
}
fn default_elevation_neighbors() -> usize {
    11
}
fn default_power() -> f64 {
    1.0
}
fn default_epsilon() -> f64 {
    0.1
}
impl Default for Interp {
    fn default() -> Self {
        Self {
            cover_neighbors: default_cover_neighbors(),
            elevation_neighbors: default_elevation_neighbors(),
            power: default_power(),
            epsilon: default_epsilon(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Trees {
    #[serde(default = "default_true")]
    pub enable: bool,
    #[serde(default = "default_density_scale")]
    pub density_scale: f32,
}
fn default_true() -> bool {
    true
}
fn default_density_scale() -> f32 {
    1.0
}
impl Default for Trees {
    fn default() -> Self {
        Self {
            enable: true,
            density_scale: default_density_scale(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Ore {
    #[serde(default = "default_true")]
    pub enable: bool,
    /// Deposit candidates per column.
    #[serde(default = "default_ore_density")]
    pub density: f64,
}
fn default_ore_density() -> f64 {
    0.01
}
impl Default for Ore {
    fn default() -> Self {
        Self {
            enable: true,
            density: default_ore_density(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Build {
    /// Worker threads; 0 picks the available parallelism.
    #[serde(default)]
    pub workers: usize,
    #[serde(default)]
    pub single: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Merge {
    #[serde(default = "default_strategy")]
    pub strategy: MergeStrategyName,
}
fn default_strategy() -> MergeStrategyName {
    MergeStrategyName::Safe
}
impl Default for Merge {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategyName {
    Fast,
    Safe,
}

pub fn load_config_from_path(path: &Path) -> Result<BuildConfig, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: BuildConfig = toml::from_str(&s)?;
    Ok(cfg)
}
