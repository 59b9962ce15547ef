use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_blocks::Block;
use strata_geom::GridRect;

use crate::{CHUNK_SIZE, ChunkError, REGION_SIZE, TileVolume};

const CS: usize = CHUNK_SIZE as usize;

/// A 16 x height x 16 column of blocks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkColumn {
    pub cx: i32,
    pub cz: i32,
    pub sy: usize,
    pub blocks: Vec<Block>,
}

impl ChunkColumn {
    pub fn new(cx: i32, cz: i32, sy: usize) -> Self {
        Self {
            cx,
            cz,
            sy,
            blocks: vec![Block::AIR; CS * sy * CS],
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * CS + z) * CS + x
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

    #[inline]
    pub fn has_non_air(&self) -> bool {
        self.blocks.iter().any(|b| *b != Block::AIR)
    }
}

/// A 512 x 512 block region, stored as chunk columns keyed by world chunk
/// coordinate. The sorted map keeps serialized output stable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionVolume {
    pub rx: i32,
    pub rz: i32,
    pub height: usize,
    columns: BTreeMap<(i32, i32), ChunkColumn>,
}

impl RegionVolume {
    pub fn new(rx: i32, rz: i32, height: usize) -> Self {
        Self {
            rx,
            rz,
            height,
            columns: BTreeMap::new(),
        }
    }

    /// Starts a region from a tile volume, consuming it.
    pub fn from_base_tile(rx: i32, rz: i32, tile: TileVolume) -> Result<Self, ChunkError> {
        let mut region = Self::new(rx, rz, tile.sy);
        region.copy_from_tile(&tile)?;
        Ok(region)
    }

    pub fn bounds(&self) -> GridRect {
        GridRect::from_size(self.rx * REGION_SIZE, self.rz * REGION_SIZE, REGION_SIZE, REGION_SIZE)
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> impl Iterator<Item = &ChunkColumn> {
        self.columns.values()
    }

    pub fn column(&self, cx: i32, cz: i32) -> Option<&ChunkColumn> {
        self.columns.get(&(cx, cz))
    }

    #[inline]
    pub fn contains_world(&self, wx: i32, wy: i32, wz: i32) -> bool {
        wy >= 0 && (wy as usize) < self.height && self.bounds().contains(wx, wz)
    }

    /// Block at world position; unpopulated columns read as air.
    pub fn get_world(&self, wx: i32, wy: i32, wz: i32) -> Option<Block> {
        if !self.contains_world(wx, wy, wz) {
            return None;
        }
        let cx = wx.div_euclid(CHUNK_SIZE);
        let cz = wz.div_euclid(CHUNK_SIZE);
        let b = self
            .columns
            .get(&(cx, cz))
            .map(|c| {
                c.get_local(
                    wx.rem_euclid(CHUNK_SIZE) as usize,
                    wy as usize,
                    wz.rem_euclid(CHUNK_SIZE) as usize,
                )
            })
            .unwrap_or(Block::AIR);
        Some(b)
    }

    /// Writes a block; returns false when the position is outside the region.
    pub fn set_world(&mut self, wx: i32, wy: i32, wz: i32, b: Block) -> bool {
        if !self.contains_world(wx, wy, wz) {
            return false;
        }
        let cx = wx.div_euclid(CHUNK_SIZE);
        let cz = wz.div_euclid(CHUNK_SIZE);
        let height = self.height;
        let col = self
            .columns
            .entry((cx, cz))
            .or_insert_with(|| ChunkColumn::new(cx, cz, height));
        col.set_local(
            wx.rem_euclid(CHUNK_SIZE) as usize,
            wy as usize,
            wz.rem_euclid(CHUNK_SIZE) as usize,
            b,
        );
        true
    }

    /// Copies every block of `tile` into the region. Returns the number of
    /// columns written.
    pub fn copy_from_tile(&mut self, tile: &TileVolume) -> Result<usize, ChunkError> {
        let tb = tile.bounds();
        if !self.bounds().contains_rect(&tb) {
            return Err(ChunkError::OutOfRegion {
                tile: tb,
                rx: self.rx,
                rz: self.rz,
            });
        }
        if tile.sy != self.height {
            return Err(ChunkError::HeightMismatch {
                tile: tile.sy,
                region: self.height,
            });
        }
        if tb.is_empty() {
            return Ok(0);
        }

        let height = self.height;
        let (cx0, cz0) = (tb.x0.div_euclid(CHUNK_SIZE), tb.z0.div_euclid(CHUNK_SIZE));
        let (cx1, cz1) = ((tb.x1 - 1).div_euclid(CHUNK_SIZE), (tb.z1 - 1).div_euclid(CHUNK_SIZE));
        let mut written = 0;
        for cz in cz0..=cz1 {
            for cx in cx0..=cx1 {
                let chunk = GridRect::from_size(cx * CHUNK_SIZE, cz * CHUNK_SIZE, CHUNK_SIZE, CHUNK_SIZE);
                let Some(part) = chunk.intersect(&tb) else {
                    continue;
                };
                let col = self
                    .columns
                    .entry((cx, cz))
                    .or_insert_with(|| ChunkColumn::new(cx, cz, height));
                for (wx, wz) in part.cells() {
                    let (tx, tz) = ((wx - tb.x0) as usize, (wz - tb.z0) as usize);
                    let (lx, lz) = ((wx - chunk.x0) as usize, (wz - chunk.z0) as usize);
                    for y in 0..height {
                        col.set_local(lx, y, lz, tile.get_local(tx, y, tz));
                    }
                    written += 1;
                }
            }
        }
        Ok(written)
    }

    pub fn count_of(&self, b: Block) -> usize {
        self.columns
            .values()
            .map(|c| c.blocks.iter().filter(|x| **x == b).count())
            .sum()
    }
}
