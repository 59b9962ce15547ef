use std::path::PathBuf;
use std::time::Instant;

use log::{debug, error, info};
use strata_geom::GridRect;
use strata_io::{GameMode, TileStore, WorldMeta, WorldStore};
use strata_world::{BuildParams, Peak, Placements, Tile, TileCoord, TileSummary};

use crate::{Decorations, MergeError, MergeMode, MergeStrategy, RegionCoord, group_tiles};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegionOutcome {
    /// No constituent tile had an artifact; nothing was written.
    Skipped,
    Welded { path: PathBuf, tiles: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub struct MergeReport {
    pub meta: WorldMeta,
    pub welded: Vec<RegionCoord>,
    pub skipped: Vec<RegionCoord>,
}

/// Cross-tile metadata of a finished build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Aggregate {
    pub peak: Peak,
    pub trees: Placements,
    pub ores: Placements,
}

/// Folds per-tile summaries given in tile order. The global peak is the
/// highest one; on ties the earliest tile keeps it.
pub fn aggregate(summaries: &[TileSummary]) -> Option<Aggregate> {
    let (first, rest) = summaries.split_first()?;
    let mut agg = Aggregate {
        peak: first.peak,
        trees: first.trees.clone(),
        ores: first.ores.clone(),
    };
    for s in rest {
        if s.peak.elevation > agg.peak.elevation {
            agg.peak = s.peak;
        }
        for (k, v) in &s.trees {
            agg.trees.entry(k.clone()).or_default().extend_from_slice(v);
        }
        for (k, v) in &s.ores {
            agg.ores.entry(k.clone()).or_default().extend_from_slice(v);
        }
    }
    Some(agg)
}

pub struct MergeEngine {
    tiles: TileStore,
    world: WorldStore,
    strategy: Box<dyn MergeStrategy>,
}

impl MergeEngine {
    pub fn new(tiles: TileStore, world: WorldStore, mode: MergeMode) -> Self {
        Self::with_strategy(tiles, world, mode.strategy())
    }

    pub fn with_strategy(tiles: TileStore, world: WorldStore, strategy: Box<dyn MergeStrategy>) -> Self {
        Self {
            tiles,
            world,
            strategy,
        }
    }

    pub fn tile_store(&self) -> &TileStore {
        &self.tiles
    }

    pub fn world_store(&self) -> &WorldStore {
        &self.world
    }

    /// Welds one region. A region whose tiles were all consumed already is a
    /// no-op; a partially present region is an error.
    pub fn merge_region(
        &self,
        rc: RegionCoord,
        tiles: &[Tile],
        height: usize,
        deco: &Decorations,
    ) -> Result<RegionOutcome, MergeError> {
        let present = tiles
            .iter()
            .filter(|t| self.tiles.has_artifact(t.coord))
            .count();
        if present == 0 {
            debug!("{rc}: no tile artifacts, skipping");
            return Ok(RegionOutcome::Skipped);
        }
        if present < tiles.len() {
            return Err(MergeError::IncompleteTile(format!(
                "region {rc}: {present} of {} tiles have artifacts",
                tiles.len()
            )));
        }
        let t0 = Instant::now();
        let mut region = self.strategy.assemble(rc, tiles, height, &self.tiles)?;
        let stamped = deco.stamp(&mut region);
        let path = self.strategy.persist(&self.world, &region)?;
        debug!(
            "{rc}: {} merge of {} tiles, {} decoration blocks, {}ms",
            self.strategy.name(),
            tiles.len(),
            stamped,
            t0.elapsed().as_millis()
        );
        Ok(RegionOutcome::Welded {
            path,
            tiles: tiles.len(),
        })
    }

    /// Merges every tile into the world and finalizes it. Tiles are consumed
    /// on success.
    pub fn merge_world(&self, tiles: &[Tile], params: &BuildParams) -> Result<MergeReport, MergeError> {
        let t0 = Instant::now();
        let mut tiles = tiles.to_vec();
        tiles.sort_by_key(|t| t.coord);
        if tiles.is_empty() {
            return Err(MergeError::InvalidParameter("no tiles to merge".into()));
        }
        let groups = group_tiles(&tiles)?;

        let missing: Vec<TileCoord> = tiles
            .iter()
            .filter(|t| !self.tiles.has_artifact(t.coord))
            .map(|t| t.coord)
            .collect();
        if missing.len() == tiles.len() {
            if let Ok(meta) = self.world.read_meta() {
                info!("tiles already merged into {}", self.world.root().display());
                return Ok(MergeReport {
                    meta,
                    welded: Vec::new(),
                    skipped: groups.keys().copied().collect(),
                });
            }
        }
        if !missing.is_empty() {
            for c in &missing {
                error!("tile {c} has no artifact");
            }
            return Err(MergeError::MissingTile(missing));
        }

        let mut summaries = Vec::with_capacity(tiles.len());
        for t in &tiles {
            let s = self.tiles.read_summary(t.coord)?;
            if s.coord != t.coord || s.bounds != t.bounds {
                return Err(MergeError::IncompleteTile(format!(
                    "tile {} summary describes {} {:?}, expected {:?}",
                    t.coord, s.coord, s.bounds, t.bounds
                )));
            }
            if !s.placements_in_bounds() {
                return Err(MergeError::IncompleteTile(format!(
                    "tile {} lists placements outside its bounds",
                    t.coord
                )));
            }
            summaries.push(s);
        }
        let agg = aggregate(&summaries)
            .ok_or_else(|| MergeError::InvalidParameter("no tile summaries".into()))?;
        let deco = Decorations::from_placements(&agg.trees, &agg.ores)?;

        let height = usize::try_from(params.height)
            .map_err(|_| MergeError::InvalidParameter(format!("height {}", params.height)))?;
        self.world.prepare()?;
        let mut welded = Vec::new();
        let mut skipped = Vec::new();
        for (rc, group) in &groups {
            match self.merge_region(*rc, group, height, &deco)? {
                RegionOutcome::Welded { .. } => welded.push(*rc),
                RegionOutcome::Skipped => skipped.push(*rc),
            }
        }

        let peak = agg.peak;
        let meta = WorldMeta {
            name: params.name.clone(),
            height: params.height,
            sealevel: params.sealevel,
            game_mode: GameMode::Creative,
            spawn: [peak.x, peak.elevation + 1, peak.z],
            regions: welded.iter().map(|r| [r.rx, r.rz]).collect(),
            bounds: union(tiles.iter().map(|t| t.bounds)),
            peak,
            trees: agg.trees,
            ores: agg.ores,
        };
        self.world.write_meta(&meta)?;

        for t in &tiles {
            self.tiles.remove(t.coord)?;
        }
        self.tiles.remove_root_if_empty()?;
        info!(
            "merged {} tiles into {} regions ({} merge) in {:.1}s; peak {} at ({}, {})",
            tiles.len(),
            welded.len(),
            self.strategy.name(),
            t0.elapsed().as_secs_f32(),
            peak.elevation,
            peak.x,
            peak.z
        );
        Ok(MergeReport {
            meta,
            welded,
            skipped,
        })
    }
}

fn union(rects: impl Iterator<Item = GridRect>) -> GridRect {
    rects
        .reduce(|a, b| {
            GridRect::new(
                a.x0.min(b.x0),
                a.z0.min(b.z0),
                a.x1.max(b.x1),
                a.z1.max(b.z1),
            )
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn summary(tx: i32, x: i32, z: i32, elevation: i32) -> TileSummary {
        let mut trees = BTreeMap::new();
        trees.insert("oak".to_string(), vec![[x, elevation + 1, z]]);
        TileSummary {
            coord: TileCoord::new(tx, 0),
            bounds: GridRect::new(0, 0, 16, 16),
            peak: Peak { x, z, elevation },
            trees,
            ores: BTreeMap::new(),
        }
    }

    #[test]
    fn peak_ties_keep_the_earliest_tile() {
        let s = [summary(0, 1, 1, 50), summary(1, 2, 2, 80), summary(2, 3, 3, 80)];
        let agg = aggregate(&s).unwrap();
        assert_eq!(agg.peak, Peak { x: 2, z: 2, elevation: 80 });
        assert_eq!(agg.trees["oak"].len(), 3);
        assert_eq!(agg.trees["oak"][0], [1, 51, 1]);
    }

    #[test]
    fn empty_input_has_no_aggregate() {
        assert!(aggregate(&[]).is_none());
    }
}
