//! World container: `<root>/region/r.<rx>.<rz>.bin` plus `<root>/world.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use strata_chunk::RegionVolume;
use strata_geom::GridRect;
use strata_world::{Peak, Placements};

use crate::atomic::{read_bincode, read_toml, write_atomic, write_bincode, write_direct, write_toml};
use crate::{IoContext, StoreError};

pub const META_FILE: &str = "world.toml";
pub const REGION_DIR: &str = "region";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Survival,
    Creative,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldMeta {
    pub name: String,
    pub height: i32,
    pub sealevel: i32,
    pub game_mode: GameMode,
    pub spawn: [i32; 3],
    /// Region files written, as `[rx, rz]`.
    pub regions: Vec<[i32; 2]>,
    pub bounds: GridRect,
    pub peak: Peak,
    #[serde(default)]
    pub trees: Placements,
    #[serde(default)]
    pub ores: Placements,
}

#[derive(Clone, Debug)]
pub struct WorldStore {
    root: PathBuf,
}

impl WorldStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn region_path(&self, rx: i32, rz: i32) -> PathBuf {
        self.root.join(REGION_DIR).join(format!("r.{rx}.{rz}.bin"))
    }

    /// Clears region files and metadata left by an earlier run.
    pub fn prepare(&self) -> Result<(), StoreError> {
        let regions = self.root.join(REGION_DIR);
        if regions.exists() {
            info!("clearing existing regions in {}", regions.display());
            fs::remove_dir_all(&regions).at(&regions)?;
        }
        let meta = self.root.join(META_FILE);
        if meta.exists() {
            fs::remove_file(&meta).at(&meta)?;
        }
        fs::create_dir_all(&regions).at(&regions)?;
        Ok(())
    }

    pub fn write_region_atomic(&self, region: &RegionVolume) -> Result<PathBuf, StoreError> {
        let path = self.region_path(region.rx, region.rz);
        write_atomic(&path, |w| write_bincode(w, &path, region))?;
        Ok(path)
    }

    pub fn write_region_direct(&self, region: &RegionVolume) -> Result<PathBuf, StoreError> {
        let path = self.region_path(region.rx, region.rz);
        write_direct(&path, |w| write_bincode(w, &path, region))?;
        Ok(path)
    }

    pub fn has_region(&self, rx: i32, rz: i32) -> bool {
        self.region_path(rx, rz).is_file()
    }

    pub fn read_region(&self, rx: i32, rz: i32) -> Result<RegionVolume, StoreError> {
        read_bincode(&self.region_path(rx, rz))
    }

    pub fn write_meta(&self, meta: &WorldMeta) -> Result<(), StoreError> {
        write_toml(&self.root.join(META_FILE), meta)
    }

    pub fn read_meta(&self) -> Result<WorldMeta, StoreError> {
        read_toml(&self.root.join(META_FILE))
    }
}
