use std::fmt;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strata_geom::GridRect;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TileError {
    #[error("tile size must be positive, got {0}")]
    InvalidTileSize(i32),
    #[error("invalid partition parameter: {0}")]
    InvalidParameter(String),
}

/// Integer tile index: `tx` across, `ty` down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub ty: i32,
    pub tx: i32,
}

impl TileCoord {
    #[inline]
    pub const fn new(tx: i32, ty: i32) -> Self {
        Self { ty, tx }
    }

    /// Directory name of the tile's working artifacts.
    pub fn dir_name(&self) -> String {
        format!("{}x{}", self.tx, self.ty)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.tx, self.ty)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TileStatus {
    Pending,
    Built,
    Failed(String),
    Missing,
}

impl TileStatus {
    #[inline]
    pub fn is_built(&self) -> bool {
        matches!(self, TileStatus::Built)
    }

    #[inline]
    pub fn is_incomplete(&self) -> bool {
        !self.is_built()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    pub coord: TileCoord,
    /// Output cells this tile owns.
    pub bounds: GridRect,
    /// Interpolation context; never written to output.
    pub halo: Option<GridRect>,
    pub status: TileStatus,
}

impl Tile {
    /// Rectangle the synthesizer reads from.
    #[inline]
    pub fn context(&self) -> GridRect {
        self.halo.unwrap_or(self.bounds)
    }

    pub fn artifact_dir(&self, tiles_root: &Path) -> PathBuf {
        tiles_root.join(self.coord.dir_name())
    }
}

/// Half-open range of tile indices. An `end` component of zero, or one past
/// the grid, means "to the end of the grid".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileRange {
    pub start: (i32, i32),
    pub end: (i32, i32),
}

impl TileRange {
    pub const ALL: TileRange = TileRange {
        start: (0, 0),
        end: (0, 0),
    };

    pub fn new(start: (i32, i32), end: (i32, i32)) -> Self {
        Self { start, end }
    }
}

/// Tile grid dimensions `(columns, rows)` for `bounds`.
pub fn grid_dims(bounds: &GridRect, tile_size: i32) -> Result<(i32, i32), TileError> {
    if tile_size <= 0 {
        return Err(TileError::InvalidTileSize(tile_size));
    }
    let cols = (bounds.width() + tile_size - 1) / tile_size;
    let rows = (bounds.depth() + tile_size - 1) / tile_size;
    Ok((cols, rows))
}

/// Splits `bounds` into tiles of `tile_size`, row-major by `ty` then `tx`.
pub fn partition(bounds: GridRect, tile_size: i32, halo: i32) -> Result<Vec<Tile>, TileError> {
    partition_range(bounds, tile_size, halo, TileRange::ALL)
}

pub fn partition_range(
    bounds: GridRect,
    tile_size: i32,
    halo: i32,
    range: TileRange,
) -> Result<Vec<Tile>, TileError> {
    let (cols, rows) = grid_dims(&bounds, tile_size)?;
    if halo < 0 {
        return Err(TileError::InvalidParameter(format!(
            "halo must be >= 0, got {halo}"
        )));
    }
    if range.start.0 < 0 || range.start.1 < 0 || range.end.0 < 0 || range.end.1 < 0 {
        return Err(TileError::InvalidParameter(format!(
            "tile range {:?}..{:?} has negative indices",
            range.start, range.end
        )));
    }
    let end_x = if range.end.0 == 0 || range.end.0 > cols { cols } else { range.end.0 };
    let end_y = if range.end.1 == 0 || range.end.1 > rows { rows } else { range.end.1 };
    let start_x = range.start.0.min(end_x);
    let start_y = range.start.1.min(end_y);

    let mut tiles = Vec::with_capacity(((end_x - start_x) * (end_y - start_y)) as usize);
    for ty in start_y..end_y {
        for tx in start_x..end_x {
            let x0 = bounds.x0 + tx * tile_size;
            let z0 = bounds.z0 + ty * tile_size;
            let rect = GridRect::new(
                x0,
                z0,
                (x0 + tile_size).min(bounds.x1),
                (z0 + tile_size).min(bounds.z1),
            );
            let halo_rect = (halo > 0).then(|| rect.expand_within(halo, &bounds));
            tiles.push(Tile {
                coord: TileCoord::new(tx, ty),
                bounds: rect,
                halo: halo_rect,
                status: TileStatus::Pending,
            });
        }
    }
    Ok(tiles)
}

/// Owns a run's tiles and tracks their status.
#[derive(Clone, Debug, Default)]
pub struct TileSet {
    tiles: Vec<Tile>,
    index: HashMap<TileCoord, usize>,
}

impl TileSet {
    pub fn new(tiles: Vec<Tile>) -> Self {
        let index = tiles
            .iter()
            .enumerate()
            .map(|(i, t)| (t.coord, i))
            .collect();
        Self { tiles, index }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn get(&self, coord: TileCoord) -> Option<&Tile> {
        self.index.get(&coord).map(|&i| &self.tiles[i])
    }

    /// Sets a tile's status; returns false for unknown coordinates.
    pub fn set_status(&mut self, coord: TileCoord, status: TileStatus) -> bool {
        match self.index.get(&coord) {
            Some(&i) => {
                self.tiles[i].status = status;
                true
            }
            None => false,
        }
    }

    pub fn pending(&self) -> Vec<TileCoord> {
        self.tiles
            .iter()
            .filter(|t| t.status != TileStatus::Built)
            .map(|t| t.coord)
            .collect()
    }

    pub fn built(&self) -> usize {
        self.tiles.iter().filter(|t| t.status.is_built()).count()
    }

    pub fn remaining(&self) -> usize {
        self.tiles.len() - self.built()
    }

    /// Tiles that did not end up built, with their status.
    pub fn incomplete(&self) -> Vec<(TileCoord, TileStatus)> {
        self.tiles
            .iter()
            .filter(|t| t.status.is_incomplete())
            .map(|t| (t.coord, t.status.clone()))
            .collect()
    }

    pub fn into_tiles(self) -> Vec<Tile> {
        self.tiles
    }
}
