//! End-to-end drivers: partition, build tiles, merge the world.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{error, info};
use strata_io::{StoreError, TileStore, WorldStore, ascii_grid};
use strata_merge::{MergeEngine, MergeError, MergeMode, MergeReport};
use strata_runtime::{BuildCoordinator, BuildMode, BuildReport, SynthWorker};
use strata_world::{
    BuildConfig, BuildParams, Dataset, ParamsError, RasterError, Synthesizer, Tile, TileCoord,
    TileError, TileSet,
};
use thiserror::Error;

pub const TILES_DIR: &str = "tiles";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("config: dataset.{0} is not set")]
    MissingDataset(&'static str),
    #[error(transparent)]
    Params(#[from] ParamsError),
    #[error(transparent)]
    Tiles(#[from] TileError),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Merge(#[from] MergeError),
    #[error("{} tile(s) failed and {} are missing; re-run to build them", .failed.len(), .missing.len())]
    Incomplete {
        failed: Vec<(TileCoord, String)>,
        missing: Vec<TileCoord>,
    },
}

/// Execution choices that may be overridden per invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub build: BuildMode,
    pub merge: MergeMode,
}

impl RunOptions {
    pub fn from_config(cfg: &BuildConfig) -> Self {
        let build = if cfg.build.single {
            BuildMode::Single
        } else {
            BuildMode::Parallel {
                workers: cfg.build.workers,
            }
        };
        Self {
            build,
            merge: cfg.merge.strategy.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RunSummary {
    pub build: BuildReport,
    pub merge: MergeReport,
}

pub struct Pipeline {
    params: Arc<BuildParams>,
    dataset: Dataset,
    work_dir: PathBuf,
    world_dir: PathBuf,
}

impl Pipeline {
    /// Loads both rasters named by the config.
    pub fn from_config(cfg: &BuildConfig) -> Result<Self, PipelineError> {
        let lc = cfg
            .dataset
            .landcover
            .as_deref()
            .ok_or(PipelineError::MissingDataset("landcover"))?;
        let el = cfg
            .dataset
            .elevation
            .as_deref()
            .ok_or(PipelineError::MissingDataset("elevation"))?;
        let dataset = Dataset::new(Arc::new(load_grid(lc)?), Arc::new(load_grid(el)?));
        Self::with_dataset(cfg, dataset)
    }

    pub fn with_dataset(cfg: &BuildConfig, dataset: Dataset) -> Result<Self, PipelineError> {
        let stats = dataset.stats()?;
        let params = BuildParams::derive(cfg, &stats)?;
        info!(
            "{}: grid {}x{} at scale {} (vscale {}, sealevel {}), {} adjustment(s)",
            params.name,
            params.bounds.width(),
            params.bounds.depth(),
            params.scale,
            params.vscale,
            params.sealevel,
            params.adjustments.len()
        );
        Ok(Self {
            params: Arc::new(params),
            dataset,
            work_dir: cfg.output.work_dir.clone(),
            world_dir: cfg.output.world_dir.clone(),
        })
    }

    pub fn params(&self) -> &BuildParams {
        &self.params
    }

    pub fn tiles(&self) -> Result<Vec<Tile>, PipelineError> {
        Ok(self.params.partition()?)
    }

    pub fn tile_store(&self) -> TileStore {
        TileStore::new(self.work_dir.join(TILES_DIR))
    }

    pub fn world_store(&self) -> WorldStore {
        WorldStore::new(&self.world_dir)
    }

    /// Builds every tile of the configured range that has no artifact yet.
    pub fn build_tiles(&self, mode: BuildMode) -> Result<(TileSet, BuildReport), PipelineError> {
        let mut set = TileSet::new(self.tiles()?);
        let synth = Synthesizer::new(Arc::clone(&self.params), self.dataset.clone());
        let worker = SynthWorker::new(synth, self.tile_store());
        let report = BuildCoordinator::new(mode).run(&mut set, &worker);
        report.log_summary();
        Ok((set, report))
    }

    pub fn merge(&self, mode: MergeMode) -> Result<MergeReport, PipelineError> {
        let engine = MergeEngine::new(self.tile_store(), self.world_store(), mode);
        Ok(engine.merge_world(&self.tiles()?, &self.params)?)
    }

    /// Build then merge. An incomplete build is reported and stops the run
    /// before any world output is touched.
    pub fn run(&self, opts: RunOptions) -> Result<RunSummary, PipelineError> {
        let (_, build) = self.build_tiles(opts.build)?;
        if !build.is_complete() {
            error!(
                "build incomplete, not merging: {} failed, {} missing",
                build.failed.len(),
                build.missing.len()
            );
            return Err(PipelineError::Incomplete {
                failed: build.failed,
                missing: build.missing,
            });
        }
        let merge = self.merge(opts.merge)?;
        Ok(RunSummary { build, merge })
    }
}

fn load_grid(path: &Path) -> Result<strata_world::GridRaster, PipelineError> {
    info!("loading {}", path.display());
    Ok(ascii_grid::read(path)?)
}
