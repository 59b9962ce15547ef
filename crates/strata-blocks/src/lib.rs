//! Block ids, decoration categories and the land-cover translation table.
#![forbid(unsafe_code)]

pub mod cover;
pub mod types;

pub use cover::{CoverClass, CoverDef, CoverTable, WATER_CODE};
pub use types::{Block, OreKind, TreeSpecies};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlockError {
    #[error("unknown block name: {0}")]
    UnknownBlock(String),
    #[error("unknown tree species: {0}")]
    UnknownSpecies(String),
    #[error("cover class {code}: {msg}")]
    InvalidCover { code: i32, msg: String },
    #[error("cover table parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("cover table read error: {0}")]
    Io(#[from] std::io::Error),
}
