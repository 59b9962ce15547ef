//! Parallel tile build coordination.
#![forbid(unsafe_code)]

mod progress;
mod worker;

pub use progress::{BuildProgress, ProgressHandle};
pub use worker::{SynthWorker, TileJobError, TileWorker};

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, error, info, warn};
use rayon::ThreadPoolBuilder;
use strata_world::{Tile, TileCoord, TileSet, TileStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildMode {
    /// Inline on the calling thread, in tile order.
    Single,
    /// Bounded worker pool; `workers == 0` uses the available parallelism.
    Parallel { workers: usize },
}

impl BuildMode {
    pub fn worker_count(self) -> usize {
        match self {
            BuildMode::Single => 1,
            BuildMode::Parallel { workers: 0 } => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            BuildMode::Parallel { workers } => workers,
        }
    }
}

/// Outcome of one coordinator pass, sorted by tile coordinate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub built: Vec<TileCoord>,
    /// Tiles whose artifacts already existed.
    pub resumed: Vec<TileCoord>,
    pub failed: Vec<(TileCoord, String)>,
    pub missing: Vec<TileCoord>,
}

impl BuildReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.missing.is_empty()
    }

    /// Coordinates to re-run: failed first, then missing.
    pub fn incomplete(&self) -> Vec<TileCoord> {
        self.failed
            .iter()
            .map(|(c, _)| *c)
            .chain(self.missing.iter().copied())
            .collect()
    }

    pub fn log_summary(&self) {
        info!(
            "build: {} built, {} resumed, {} failed, {} missing",
            self.built.len(),
            self.resumed.len(),
            self.failed.len(),
            self.missing.len()
        );
        for (c, why) in &self.failed {
            warn!("tile {c} failed: {why}");
        }
        for c in &self.missing {
            warn!("tile {c} is missing its artifact");
        }
    }
}

pub struct BuildCoordinator {
    mode: BuildMode,
    progress: ProgressHandle,
    events: Option<Sender<BuildProgress>>,
}

impl BuildCoordinator {
    pub fn new(mode: BuildMode) -> Self {
        Self {
            mode,
            progress: ProgressHandle::default(),
            events: None,
        }
    }

    pub fn mode(&self) -> BuildMode {
        self.mode
    }

    /// Handle for polling counters while `run` blocks another thread.
    pub fn progress(&self) -> ProgressHandle {
        self.progress.clone()
    }

    /// Subscribes to per-tile events. Events are advisory; dropping the
    /// receiver does not affect the build.
    pub fn subscribe(&mut self) -> Receiver<BuildProgress> {
        let (tx, rx) = unbounded();
        self.events = Some(tx);
        rx
    }

    /// Builds every non-built tile of `set` and blocks until all finish.
    pub fn run(&self, set: &mut TileSet, worker: &dyn TileWorker) -> BuildReport {
        let t0 = Instant::now();
        let mut report = BuildReport::default();
        let mut todo: Vec<Tile> = Vec::new();
        for tile in set.tiles() {
            if worker.artifact_exists(tile.coord) {
                report.resumed.push(tile.coord);
                self.emit(BuildProgress::Resumed(tile.coord));
            } else {
                todo.push(tile.clone());
            }
        }
        for c in &report.resumed {
            set.set_status(*c, TileStatus::Built);
        }
        self.progress
            .reset(set.len(), todo.len(), report.resumed.len());
        info!(
            "building {} tiles ({} already built) with {:?}",
            todo.len(),
            report.resumed.len(),
            self.mode
        );

        let outcomes = match self.mode {
            BuildMode::Single => self.run_inline(&todo, worker),
            BuildMode::Parallel { .. } => self.run_pool(&todo, worker),
        };

        for (coord, status) in outcomes {
            match &status {
                TileStatus::Built => report.built.push(coord),
                TileStatus::Failed(why) => report.failed.push((coord, why.clone())),
                TileStatus::Missing | TileStatus::Pending => report.missing.push(coord),
            }
            set.set_status(coord, status);
        }
        report.built.sort();
        report.resumed.sort();
        report.failed.sort();
        report.missing.sort();
        self.emit(BuildProgress::Drained);
        info!("build pass finished in {:.1}s", t0.elapsed().as_secs_f32());
        report
    }

    fn run_inline(&self, todo: &[Tile], worker: &dyn TileWorker) -> Vec<(TileCoord, TileStatus)> {
        todo.iter()
            .map(|t| (t.coord, self.run_one(t, worker)))
            .collect()
    }

    fn run_pool(&self, todo: &[Tile], worker: &dyn TileWorker) -> Vec<(TileCoord, TileStatus)> {
        let workers = self.mode.worker_count().max(1);
        let pool = match ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("strata-tile-{i}"))
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                warn!("tile pool unavailable ({e}); building inline");
                return self.run_inline(todo, worker);
            }
        };

        let (res_tx, res_rx) = unbounded::<(usize, TileCoord, TileStatus)>();
        pool.scope(|s| {
            for (i, tile) in todo.iter().enumerate() {
                let tx = res_tx.clone();
                s.spawn(move |_| {
                    let status = self.run_one(tile, worker);
                    let _ = tx.send((i, tile.coord, status));
                });
            }
        });
        drop(res_tx);

        let mut results: Vec<(usize, TileCoord, TileStatus)> = res_rx.iter().collect();
        results.sort_by_key(|(i, _, _)| *i);
        results.into_iter().map(|(_, c, s)| (c, s)).collect()
    }

    fn run_one(&self, tile: &Tile, worker: &dyn TileWorker) -> TileStatus {
        self.progress.started();
        self.emit(BuildProgress::Started(tile.coord));
        let t0 = Instant::now();
        let status = match catch_unwind(AssertUnwindSafe(|| worker.build_tile(tile))) {
            Ok(Ok(())) if worker.artifact_exists(tile.coord) => TileStatus::Built,
            Ok(Ok(())) => {
                warn!("tile {} reported success but left no artifact", tile.coord);
                TileStatus::Missing
            }
            Ok(Err(e)) => {
                warn!("tile {} failed: {e}", tile.coord);
                TileStatus::Failed(e.to_string())
            }
            Err(payload) => {
                error!("tile {} panicked: {}", tile.coord, panic_message(&*payload));
                TileStatus::Missing
            }
        };
        debug!(
            "tile {} -> {:?} in {}ms",
            tile.coord,
            status,
            t0.elapsed().as_millis()
        );
        self.progress.finished(&status);
        self.emit(BuildProgress::Finished {
            coord: tile.coord,
            status: status.clone(),
        });
        status
    }

    fn emit(&self, ev: BuildProgress) {
        if let Some(tx) = &self.events {
            let _ = tx.send(ev);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
