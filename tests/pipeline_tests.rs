use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use strata::{BuildConfig, BuildMode, MergeMode, Pipeline, PipelineError, RunOptions};
use strata_geom::GeoTransform;
use strata_io::ascii_grid;
use strata_world::{Dataset, GridRaster, TileCoord};

const NODATA: f64 = -9999.0;

fn transform() -> GeoTransform {
    GeoTransform::new(500_000.0, 4_200_000.0, 30.0, -30.0)
}

fn landcover() -> GridRaster {
    GridRaster::from_fn(24, 16, transform(), None, |c, r| {
        if c + r < 6 {
            11.0
        } else if c > 14 {
            42.0
        } else if r > 9 {
            41.0
        } else {
            71.0
        }
    })
}

fn elevation(hole: bool) -> GridRaster {
    GridRaster::from_fn(24, 16, transform(), Some(NODATA), move |c, r| {
        if hole && c < 12 && r < 12 {
            return NODATA;
        }
        let (x, y) = (c as f64, r as f64);
        40.0 + 4.0 * x + 3.0 * y + 10.0 * (x * 0.7).sin() * (y * 0.5).cos()
    })
}

fn config(root: &Path) -> BuildConfig {
    let mut cfg = BuildConfig::default();
    cfg.name = "valley".into();
    cfg.seed = 7;
    cfg.tiles.size = 32;
    cfg.tiles.halo = 8;
    cfg.terrain.height = 64;
    cfg.terrain.headroom = 8;
    cfg.terrain.sealevel = 20;
    cfg.trees.density_scale = 4.0;
    cfg.output.work_dir = root.join("work");
    cfg.output.world_dir = root.join("world");
    cfg
}

fn pipeline(root: &Path, hole: bool) -> Pipeline {
    let dataset = Dataset::new(Arc::new(landcover()), Arc::new(elevation(hole)));
    Pipeline::with_dataset(&config(root), dataset).unwrap()
}

fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    fn walk(base: &Path, dir: &Path, out: &mut BTreeMap<String, Vec<u8>>) {
        for e in std::fs::read_dir(dir).unwrap() {
            let p = e.unwrap().path();
            if p.is_dir() {
                walk(base, &p, out);
            } else {
                let rel = p.strip_prefix(base).unwrap().to_string_lossy().into_owned();
                out.insert(rel, std::fs::read(&p).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(dir, dir, &mut out);
    out
}

#[test]
fn grid_and_partition_follow_the_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let p = pipeline(dir.path(), false);
    assert_eq!(p.params().bounds.width(), 120);
    assert_eq!(p.params().bounds.depth(), 80);
    assert_eq!(p.tiles().unwrap().len(), 12);
}

#[test]
fn single_and_parallel_builds_are_byte_identical() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let pa = pipeline(a.path(), false);
    let pb = pipeline(b.path(), false);

    let (_, ra) = pa.build_tiles(BuildMode::Single).unwrap();
    let (_, rb) = pb.build_tiles(BuildMode::Parallel { workers: 4 }).unwrap();
    assert!(ra.is_complete());
    assert_eq!(ra, rb);
    let tiles_a = snapshot(pa.tile_store().root());
    assert_eq!(tiles_a.len(), 24);
    assert_eq!(tiles_a, snapshot(pb.tile_store().root()));

    let ma = pa.merge(MergeMode::Safe).unwrap();
    let mb = pb.merge(MergeMode::Safe).unwrap();
    assert_eq!(ma.meta, mb.meta);
    assert_eq!(snapshot(pa.world_store().root()), snapshot(pb.world_store().root()));
}

#[test]
fn fast_and_safe_merges_produce_the_same_world() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let pa = pipeline(a.path(), false);
    let pb = pipeline(b.path(), false);
    let fast = pa
        .run(RunOptions {
            build: BuildMode::Parallel { workers: 2 },
            merge: MergeMode::Fast,
        })
        .unwrap();
    let safe = pb
        .run(RunOptions {
            build: BuildMode::Parallel { workers: 2 },
            merge: MergeMode::Safe,
        })
        .unwrap();
    assert_eq!(fast.merge.meta, safe.merge.meta);
    assert_eq!(snapshot(pa.world_store().root()), snapshot(pb.world_store().root()));
    assert!(!pa.tile_store().root().exists());
}

#[test]
fn world_counts_match_tile_summaries() {
    let dir = tempfile::tempdir().unwrap();
    let p = pipeline(dir.path(), false);
    p.build_tiles(BuildMode::Parallel { workers: 0 }).unwrap();

    let store = p.tile_store();
    let (mut trees, mut ores, mut peak) = (0, 0, i32::MIN);
    for t in p.tiles().unwrap() {
        let s = store.read_summary(t.coord).unwrap();
        trees += s.tree_count();
        ores += s.ore_count();
        peak = peak.max(s.peak.elevation);
    }
    assert!(trees > 0 && ores > 0);

    let meta = p.merge(MergeMode::Fast).unwrap().meta;
    assert_eq!(meta.trees.values().map(Vec::len).sum::<usize>(), trees);
    assert_eq!(meta.ores.values().map(Vec::len).sum::<usize>(), ores);
    assert_eq!(meta.peak.elevation, peak);
    assert_eq!(meta.spawn[1], peak + 1);
    assert_eq!(meta.regions, vec![[0, 0]]);
}

#[test]
fn rebuild_resumes_from_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let p = pipeline(dir.path(), false);
    let (_, first) = p.build_tiles(BuildMode::Parallel { workers: 3 }).unwrap();
    assert_eq!(first.built.len(), 12);
    let (set, second) = p.build_tiles(BuildMode::Single).unwrap();
    assert!(second.built.is_empty());
    assert_eq!(second.resumed.len(), 12);
    assert_eq!(set.remaining(), 0);
}

#[test]
fn nodata_tile_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let p = pipeline(dir.path(), true);
    let err = p
        .run(RunOptions {
            build: BuildMode::Parallel { workers: 2 },
            merge: MergeMode::Safe,
        })
        .unwrap_err();
    let PipelineError::Incomplete { failed, missing } = err else {
        panic!("expected an incomplete build, got {err}");
    };
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, TileCoord::new(0, 0));
    assert!(failed[0].1.contains("no valid elevation"), "{}", failed[0].1);
    assert!(missing.is_empty());

    let store = p.tile_store();
    let built = p
        .tiles()
        .unwrap()
        .iter()
        .filter(|t| store.has_artifact(t.coord))
        .count();
    assert_eq!(built, 11);
    assert!(!p.world_store().root().join("region").exists());
}

#[test]
fn config_paths_load_ascii_grids() {
    let dir = tempfile::tempdir().unwrap();
    let lc = dir.path().join("cover.asc");
    let el = dir.path().join("elev.asc");
    ascii_grid::write(&lc, &landcover()).unwrap();
    ascii_grid::write(&el, &elevation(false)).unwrap();

    let mut cfg = config(dir.path());
    assert!(matches!(
        Pipeline::from_config(&cfg),
        Err(PipelineError::MissingDataset("landcover"))
    ));
    cfg.dataset.landcover = Some(lc);
    cfg.dataset.elevation = Some(el);
    let p = Pipeline::from_config(&cfg).unwrap();
    assert_eq!(p.tiles().unwrap().len(), 12);
    assert_eq!(p.params().name, "valley");
}
