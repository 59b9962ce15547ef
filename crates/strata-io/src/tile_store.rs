//! Per-tile working artifacts: `<root>/<tx>x<ty>/{blocks.bin,tile.toml}`.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use strata_chunk::TileVolume;
use strata_world::{TileCoord, TileSummary};

use crate::atomic::{read_bincode, read_toml, write_atomic, write_bincode, write_toml};
use crate::{IoContext, StoreError};

pub const BLOCKS_FILE: &str = "blocks.bin";
pub const SUMMARY_FILE: &str = "tile.toml";

#[derive(Clone, Debug)]
pub struct TileStore {
    root: PathBuf,
}

impl TileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tile_dir(&self, coord: TileCoord) -> PathBuf {
        self.root.join(coord.dir_name())
    }

    fn blocks_path(&self, coord: TileCoord) -> PathBuf {
        self.tile_dir(coord).join(BLOCKS_FILE)
    }

    fn summary_path(&self, coord: TileCoord) -> PathBuf {
        self.tile_dir(coord).join(SUMMARY_FILE)
    }

    /// Persists a built tile. The summary goes last; its presence marks the
    /// artifact complete.
    pub fn write(&self, volume: &TileVolume, summary: &TileSummary) -> Result<(), StoreError> {
        let blocks = self.blocks_path(summary.coord);
        write_atomic(&blocks, |w| write_bincode(w, &blocks, volume))?;
        write_toml(&self.summary_path(summary.coord), summary)?;
        debug!("wrote tile artifact {}", self.tile_dir(summary.coord).display());
        Ok(())
    }

    pub fn has_artifact(&self, coord: TileCoord) -> bool {
        self.summary_path(coord).is_file()
    }

    pub fn has_blocks(&self, coord: TileCoord) -> bool {
        self.blocks_path(coord).is_file()
    }

    pub fn read_summary(&self, coord: TileCoord) -> Result<TileSummary, StoreError> {
        read_toml(&self.summary_path(coord))
    }

    pub fn read_volume(&self, coord: TileCoord) -> Result<TileVolume, StoreError> {
        read_bincode(&self.blocks_path(coord))
    }

    /// Reads the tile's blocks and removes the file; the caller now owns them.
    pub fn take_volume(&self, coord: TileCoord) -> Result<TileVolume, StoreError> {
        let path = self.blocks_path(coord);
        let volume = read_bincode(&path)?;
        fs::remove_file(&path).at(&path)?;
        Ok(volume)
    }

    /// Removes one tile directory. Missing directories are not an error.
    pub fn remove(&self, coord: TileCoord) -> Result<(), StoreError> {
        let dir = self.tile_dir(coord);
        match fs::remove_dir_all(&dir) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e).at(&dir),
            _ => Ok(()),
        }
    }

    /// Removes the whole tile root once it is empty of tiles.
    pub fn remove_root_if_empty(&self) -> Result<(), StoreError> {
        match fs::read_dir(&self.root) {
            Ok(mut it) => {
                if it.next().is_none() {
                    fs::remove_dir(&self.root).at(&self.root)?;
                }
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).at(&self.root),
        }
    }
}
