//! Build configuration, tile partitioning, raster access and per-tile synthesis.
#![forbid(unsafe_code)]

pub mod config;
pub mod params;
pub mod raster;
pub mod synth;
pub mod tiles;

pub use config::{BuildConfig, ConfigError, MergeStrategyName, load_config_from_path};
pub use params::{Adjustment, BuildParams, ParamsError};
pub use raster::{Dataset, DatasetStats, GridRaster, RasterCrop, RasterError, RasterSource};
pub use synth::{Peak, Placements, SynthError, Synthesizer, TileLayers, TileOutput, TileSummary};
pub use tiles::{
    Tile, TileCoord, TileError, TileRange, TileSet, TileStatus, grid_dims, partition,
    partition_range,
};
