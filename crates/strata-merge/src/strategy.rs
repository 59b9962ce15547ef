use std::path::PathBuf;

use log::debug;
use strata_chunk::RegionVolume;
use strata_io::{TileStore, WorldStore};
use strata_world::{MergeStrategyName, Tile};

use crate::{MergeError, RegionCoord};

/// How a region's blocks are gathered from tile artifacts and written out.
pub trait MergeStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Builds the region volume from `tiles`, all of which have artifacts.
    fn assemble(
        &self,
        rc: RegionCoord,
        tiles: &[Tile],
        height: usize,
        store: &TileStore,
    ) -> Result<RegionVolume, MergeError>;

    fn persist(&self, world: &WorldStore, region: &RegionVolume) -> Result<PathBuf, MergeError>;
}

/// Takes over the first tile's blocks as the region base and writes the
/// region file in place.
#[derive(Clone, Copy, Debug, Default)]
pub struct FastMerge;

impl MergeStrategy for FastMerge {
    fn name(&self) -> &'static str {
        "fast"
    }

    fn assemble(
        &self,
        rc: RegionCoord,
        tiles: &[Tile],
        height: usize,
        store: &TileStore,
    ) -> Result<RegionVolume, MergeError> {
        let Some((first, rest)) = tiles.split_first() else {
            return Ok(RegionVolume::new(rc.rx, rc.rz, height));
        };
        if !store.has_blocks(first.coord) {
            return Err(MergeError::IncompleteTile(format!(
                "tile {} has a summary but no blocks",
                first.coord
            )));
        }
        let base = store.take_volume(first.coord)?;
        debug!("{rc}: base from tile {}", first.coord);
        let mut region = RegionVolume::from_base_tile(rc.rx, rc.rz, base)?;
        if region.height != height {
            return Err(MergeError::IncompleteTile(format!(
                "tile {} has height {}, expected {height}",
                first.coord, region.height
            )));
        }
        for t in rest {
            let vol = store.read_volume(t.coord)?;
            region.copy_from_tile(&vol)?;
        }
        Ok(region)
    }

    fn persist(&self, world: &WorldStore, region: &RegionVolume) -> Result<PathBuf, MergeError> {
        Ok(world.write_region_direct(region)?)
    }
}

/// Copies every tile into a fresh region and writes through a temp file.
/// Tile artifacts are left untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct SafeMerge;

impl MergeStrategy for SafeMerge {
    fn name(&self) -> &'static str {
        "safe"
    }

    fn assemble(
        &self,
        rc: RegionCoord,
        tiles: &[Tile],
        height: usize,
        store: &TileStore,
    ) -> Result<RegionVolume, MergeError> {
        let mut region = RegionVolume::new(rc.rx, rc.rz, height);
        for t in tiles {
            let vol = store.read_volume(t.coord)?;
            region.copy_from_tile(&vol)?;
        }
        Ok(region)
    }

    fn persist(&self, world: &WorldStore, region: &RegionVolume) -> Result<PathBuf, MergeError> {
        Ok(world.write_region_atomic(region)?)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MergeMode {
    Fast,
    #[default]
    Safe,
}

impl MergeMode {
    pub fn strategy(self) -> Box<dyn MergeStrategy> {
        match self {
            MergeMode::Fast => Box::new(FastMerge),
            MergeMode::Safe => Box::new(SafeMerge),
        }
    }
}

impl From<MergeStrategyName> for MergeMode {
    fn from(n: MergeStrategyName) -> Self {
        match n {
            MergeStrategyName::Fast => MergeMode::Fast,
            MergeStrategyName::Safe => MergeMode::Safe,
        }
    }
}
