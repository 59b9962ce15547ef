//! Tile sub-volumes and fixed-size region containers.
#![forbid(unsafe_code)]

mod region;

pub use region::{ChunkColumn, RegionVolume};

use serde::{Deserialize, Serialize};
use strata_blocks::Block;
use strata_geom::GridRect;
use thiserror::Error;

/// Edge length of a chunk column in blocks.
pub const CHUNK_SIZE: i32 = 16;
/// Chunks per region edge.
pub const REGION_CHUNKS: i32 = 32;
/// Edge length of a region in blocks.
pub const REGION_SIZE: i32 = CHUNK_SIZE * REGION_CHUNKS;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("tile {tile:?} lies outside region ({rx}, {rz})")]
    OutOfRegion { tile: GridRect, rx: i32, rz: i32 },
    #[error("tile height {tile} does not match region height {region}")]
    HeightMismatch { tile: usize, region: usize },
}

/// Blocks of one tile's non-halo footprint, bedrock at `y == 0`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileVolume {
    pub origin_x: i32,
    pub origin_z: i32,
    pub sx: usize,
    pub sy: usize,
    pub sz: usize,
    pub blocks: Vec<Block>,
}

impl TileVolume {
    pub fn new(bounds: GridRect, sy: usize) -> Self {
        let sx = bounds.width() as usize;
        let sz = bounds.depth() as usize;
        Self {
            origin_x: bounds.x0,
            origin_z: bounds.z0,
            sx,
            sy,
            sz,
            blocks: vec![Block::AIR; sx * sy * sz],
        }
    }

    pub fn from_blocks_local(
        origin_x: i32,
        origin_z: i32,
        sx: usize,
        sy: usize,
        sz: usize,
        blocks: Vec<Block>,
    ) -> Self {
        let mut b = blocks;
        let expect = sx * sy * sz;
        if b.len() != expect {
            b.resize(expect, Block::AIR);
        }
        TileVolume {
            origin_x,
            origin_z,
            sx,
            sy,
            sz,
            blocks: b,
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.sz + z) * self.sx + x
    }

    #[inline]
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> Block {
        self.blocks[self.idx(x, y, z)]
    }

    #[inline]
    pub fn set_local(&mut self, x: usize, y: usize, z: usize, b: Block) {
        let i = self.idx(x, y, z);
        self.blocks[i] = b;
    }

    pub fn bounds(&self) -> GridRect {
        GridRect::from_size(self.origin_x, self.origin_z, self.sx as i32, self.sz as i32)
    }

    #[inline]
    pub fn contains_world(&self, wx: i32, wy: i32, wz: i32) -> bool {
        if wy < 0 || wy >= self.sy as i32 {
            return false;
        }
        self.bounds().contains(wx, wz)
    }

    #[inline]
    pub fn get_world(&self, wx: i32, wy: i32, wz: i32) -> Option<Block> {
        if !self.contains_world(wx, wy, wz) {
            return None;
        }
        let lx = (wx - self.origin_x) as usize;
        let lz = (wz - self.origin_z) as usize;
        Some(self.get_local(lx, wy as usize, lz))
    }

    /// Fills `y0..y1` of a local column with `b`, clamped to the volume height.
    pub fn fill_column(&mut self, x: usize, z: usize, y0: usize, y1: usize, b: Block) {
        for y in y0..y1.min(self.sy) {
            self.set_local(x, y, z, b);
        }
    }

    #[inline]
    pub fn has_non_air(&self) -> bool {
        self.blocks.iter().any(|b| *b != Block::AIR)
    }

    pub fn count_of(&self, b: Block) -> usize {
        self.blocks.iter().filter(|x| **x == b).count()
    }
}

/// Region coordinate owning world column `(x, z)`.
#[inline]
pub fn region_of(x: i32, z: i32) -> (i32, i32) {
    (x.div_euclid(REGION_SIZE), z.div_euclid(REGION_SIZE))
}

/// Chunk coordinate owning world column `(x, z)`.
#[inline]
pub fn chunk_of(x: i32, z: i32) -> (i32, i32) {
    (x.div_euclid(CHUNK_SIZE), z.div_euclid(CHUNK_SIZE))
}
