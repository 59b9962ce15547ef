use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use strata_world::{TileCoord, TileStatus};

#[derive(Default)]
struct Counters {
    total: AtomicUsize,
    remaining: AtomicUsize,
    inflight: AtomicUsize,
    built: AtomicUsize,
    failed: AtomicUsize,
}

/// Read-only view of a running build. Cheap to clone and safe to poll from
/// any thread at any interval.
#[derive(Clone, Default)]
pub struct ProgressHandle {
    inner: Arc<Counters>,
}

impl ProgressHandle {
    pub fn total(&self) -> usize {
        self.inner.total.load(Ordering::Relaxed)
    }

    /// Tiles not yet finished in this run.
    pub fn remaining(&self) -> usize {
        self.inner.remaining.load(Ordering::Relaxed)
    }

    pub fn inflight(&self) -> usize {
        self.inner.inflight.load(Ordering::Relaxed)
    }

    pub fn built(&self) -> usize {
        self.inner.built.load(Ordering::Relaxed)
    }

    /// Failed or missing tiles.
    pub fn failed(&self) -> usize {
        self.inner.failed.load(Ordering::Relaxed)
    }

    pub(crate) fn reset(&self, total: usize, todo: usize, built: usize) {
        self.inner.total.store(total, Ordering::Relaxed);
        self.inner.remaining.store(todo, Ordering::Relaxed);
        self.inner.inflight.store(0, Ordering::Relaxed);
        self.inner.built.store(built, Ordering::Relaxed);
        self.inner.failed.store(0, Ordering::Relaxed);
    }

    pub(crate) fn started(&self) {
        self.inner.inflight.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn finished(&self, status: &TileStatus) {
        if status.is_built() {
            self.inner.built.fetch_add(1, Ordering::Relaxed);
        } else {
            self.inner.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.inner.inflight.fetch_sub(1, Ordering::Relaxed);
        self.inner.remaining.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Events published on the optional progress channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildProgress {
    Resumed(TileCoord),
    Started(TileCoord),
    Finished { coord: TileCoord, status: TileStatus },
    Drained,
}
