use strata_io::{StoreError, TileStore};
use strata_world::{SynthError, Synthesizer, Tile, TileCoord};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TileJobError {
    #[error(transparent)]
    Synth(#[from] SynthError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Other(String),
}

/// Unit of work the coordinator schedules, one call per tile.
pub trait TileWorker: Send + Sync {
    /// Builds the tile and leaves its artifact behind.
    fn build_tile(&self, tile: &Tile) -> Result<(), TileJobError>;

    fn artifact_exists(&self, coord: TileCoord) -> bool;
}

/// Synthesizes tiles and writes them to a [`TileStore`].
pub struct SynthWorker {
    synth: Synthesizer,
    store: TileStore,
}

impl SynthWorker {
    pub fn new(synth: Synthesizer, store: TileStore) -> Self {
        Self { synth, store }
    }

    pub fn store(&self) -> &TileStore {
        &self.store
    }
}

impl TileWorker for SynthWorker {
    fn build_tile(&self, tile: &Tile) -> Result<(), TileJobError> {
        let out = self.synth.synthesize(tile)?;
        self.store.write(&out.volume, &out.summary)?;
        Ok(())
    }

    fn artifact_exists(&self, coord: TileCoord) -> bool {
        self.store.has_artifact(coord)
    }
}
