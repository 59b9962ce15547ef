//! On-disk formats: ESRI ASCII grids, tile artifacts and the world container.
#![forbid(unsafe_code)]

pub mod ascii_grid;
mod atomic;
pub mod tile_store;
pub mod world_store;

pub use tile_store::TileStore;
pub use world_store::{GameMode, WorldMeta, WorldStore};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: bincode: {source}")]
    Bincode {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },
    #[error("{path}: toml decode: {source}")]
    TomlDe {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("toml encode: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("{path}: {msg}")]
    Format { path: PathBuf, msg: String },
}

pub(crate) trait IoContext<T> {
    fn at(self, path: &std::path::Path) -> Result<T, StoreError>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, path: &std::path::Path) -> Result<T, StoreError> {
        self.map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
