use std::collections::HashSet;
use std::sync::Mutex;

use strata_geom::GridRect;
use strata_runtime::{BuildCoordinator, BuildMode, BuildProgress, TileJobError, TileWorker};
use strata_world::{Tile, TileCoord, TileSet, TileStatus, partition};

#[derive(Default)]
struct FakeWorker {
    done: Mutex<HashSet<TileCoord>>,
    fail: HashSet<TileCoord>,
    panic: HashSet<TileCoord>,
    forget: HashSet<TileCoord>,
}

impl FakeWorker {
    fn built(&self) -> usize {
        self.done.lock().unwrap().len()
    }
}

impl TileWorker for FakeWorker {
    fn build_tile(&self, tile: &Tile) -> Result<(), TileJobError> {
        let c = tile.coord;
        if self.fail.contains(&c) {
            return Err(TileJobError::Other(format!("no data under {c}")));
        }
        if self.panic.contains(&c) {
            panic!("worker blew up on {c}");
        }
        if !self.forget.contains(&c) {
            self.done.lock().unwrap().insert(c);
        }
        Ok(())
    }

    fn artifact_exists(&self, coord: TileCoord) -> bool {
        self.done.lock().unwrap().contains(&coord)
    }
}

fn tiles() -> TileSet {
    TileSet::new(partition(GridRect::new(0, 0, 64, 48), 16, 4).unwrap())
}

fn faulty() -> FakeWorker {
    FakeWorker {
        fail: [TileCoord::new(1, 0), TileCoord::new(3, 2)].into_iter().collect(),
        panic: [TileCoord::new(2, 1)].into_iter().collect(),
        forget: [TileCoord::new(0, 2)].into_iter().collect(),
        ..Default::default()
    }
}

#[test]
fn every_tile_builds() {
    let mut set = tiles();
    let worker = FakeWorker::default();
    let coord = BuildCoordinator::new(BuildMode::Parallel { workers: 4 });
    let report = coord.run(&mut set, &worker);
    assert!(report.is_complete());
    assert_eq!(report.built.len(), 12);
    assert_eq!(worker.built(), 12);
    assert_eq!(set.remaining(), 0);
    let progress = coord.progress();
    assert_eq!(progress.remaining(), 0);
    assert_eq!(progress.inflight(), 0);
    assert_eq!(progress.built(), 12);
}

#[test]
fn failures_are_isolated_and_classified() {
    let mut set = tiles();
    let worker = faulty();
    let report = BuildCoordinator::new(BuildMode::Parallel { workers: 3 }).run(&mut set, &worker);

    assert!(!report.is_complete());
    assert_eq!(report.built.len(), 8);
    assert_eq!(
        report.failed.iter().map(|(c, _)| *c).collect::<Vec<_>>(),
        vec![TileCoord::new(1, 0), TileCoord::new(3, 2)]
    );
    assert!(report.failed[0].1.contains("no data"));
    assert_eq!(report.missing, vec![TileCoord::new(2, 1), TileCoord::new(0, 2)]);
    assert!(matches!(
        set.get(TileCoord::new(1, 0)).unwrap().status,
        TileStatus::Failed(_)
    ));
    assert_eq!(set.get(TileCoord::new(2, 1)).unwrap().status, TileStatus::Missing);
    assert_eq!(report.incomplete().len(), 4);
}

#[test]
fn single_and_parallel_reports_match() {
    let mut a = tiles();
    let mut b = tiles();
    let ra = BuildCoordinator::new(BuildMode::Single).run(&mut a, &faulty());
    let rb = BuildCoordinator::new(BuildMode::Parallel { workers: 0 }).run(&mut b, &faulty());
    assert_eq!(ra, rb);
    assert_eq!(a.incomplete(), b.incomplete());
}

#[test]
fn rerun_resumes_from_existing_artifacts() {
    let mut set = tiles();
    let worker = faulty();
    let coord = BuildCoordinator::new(BuildMode::Parallel { workers: 2 });
    let first = coord.run(&mut set, &worker);

    let fixed = FakeWorker {
        done: Mutex::new(worker.done.lock().unwrap().clone()),
        ..Default::default()
    };
    let second = coord.run(&mut set, &fixed);
    assert!(second.is_complete());
    assert_eq!(second.resumed, first.built);
    let mut redo = first.incomplete();
    redo.sort();
    assert_eq!(second.built, redo);
    assert_eq!(set.built(), 12);
}

#[test]
fn progress_channel_reports_every_tile() {
    let mut set = tiles();
    let worker = FakeWorker::default();
    worker.done.lock().unwrap().insert(TileCoord::new(0, 0));
    let mut coord = BuildCoordinator::new(BuildMode::Parallel { workers: 2 });
    let rx = coord.subscribe();
    coord.run(&mut set, &worker);

    let events: Vec<BuildProgress> = rx.try_iter().collect();
    assert_eq!(events.first(), Some(&BuildProgress::Resumed(TileCoord::new(0, 0))));
    assert_eq!(events.last(), Some(&BuildProgress::Drained));
    let started = events
        .iter()
        .filter(|e| matches!(e, BuildProgress::Started(_)))
        .count();
    let finished = events
        .iter()
        .filter(|e| matches!(e, BuildProgress::Finished { status: TileStatus::Built, .. }))
        .count();
    assert_eq!((started, finished), (11, 11));
}
