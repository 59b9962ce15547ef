//! Welds built tiles into region files and finalizes the world.
#![forbid(unsafe_code)]

mod decorate;
mod engine;
mod regions;
mod strategy;

pub use decorate::Decorations;
pub use engine::{Aggregate, MergeEngine, MergeReport, RegionOutcome, aggregate};
pub use regions::{RegionCoord, group_tiles};
pub use strategy::{FastMerge, MergeMode, MergeStrategy, SafeMerge};

use strata_chunk::ChunkError;
use strata_io::StoreError;
use strata_world::TileCoord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("{} tile artifact(s) missing: {}", .0.len(), list(.0))]
    MissingTile(Vec<TileCoord>),
    #[error("incomplete tile: {0}")]
    IncompleteTile(String),
    #[error("invalid merge parameter: {0}")]
    InvalidParameter(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Chunk(#[from] ChunkError),
}

fn list(coords: &[TileCoord]) -> String {
    coords
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
