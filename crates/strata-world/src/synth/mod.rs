//! Per-tile synthesis: raster crops in, block volume and summary out.

mod bathy;
mod crust;
mod ore;
mod summary;
pub mod terrain;
mod trees;

pub use crust::CrustNoise;
pub use summary::{Peak, Placements, TileSummary};

use std::sync::Arc;

use log::debug;
use strata_blocks::WATER_CODE;
use strata_chunk::TileVolume;
use strata_geom::{GeoPoint, GridRect};
use strata_interp::{InterpError, InterpolationTree};
use thiserror::Error;

use crate::params::BuildParams;
use crate::raster::{Dataset, RasterError, RasterSource, pixel_window};
use crate::tiles::{Tile, TileCoord};

use self::bathy::{Shoreline, water_depth};
use self::terrain::{Column, compose, surface_height};

/// Land-cover code read as nodata when the raster declares none.
pub const COVER_NODATA: f64 = 0.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SynthError {
    #[error("tile {0} has no valid elevation pixels")]
    EmptyTile(TileCoord),
    #[error(transparent)]
    Interp(#[from] InterpError),
    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// Per-quantity layers at 1:1 with the tile's non-halo bounds, indexed by
/// `bounds.index_of`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileLayers {
    pub bounds: GridRect,
    pub cover: Vec<i32>,
    /// y of the topmost solid block.
    pub surface: Vec<i32>,
    /// Water above the surface; 0 for dry cells.
    pub depth: Vec<i32>,
    pub crust: Vec<i32>,
}

#[derive(Clone, Debug)]
pub struct TileOutput {
    pub volume: TileVolume,
    pub summary: TileSummary,
    pub layers: TileLayers,
}

pub struct Synthesizer {
    params: Arc<BuildParams>,
    dataset: Dataset,
    crust: CrustNoise,
}

impl Synthesizer {
    pub fn new(params: Arc<BuildParams>, dataset: Dataset) -> Self {
        let crust = CrustNoise::new(params.seed, params.crust_max);
        Self {
            params,
            dataset,
            crust,
        }
    }

    pub fn params(&self) -> &BuildParams {
        &self.params
    }

    pub fn synthesize(&self, tile: &Tile) -> Result<TileOutput, SynthError> {
        let p = &*self.params;
        let ctx = tile.context();
        let bounds = tile.bounds;

        let points: Vec<GeoPoint> = ctx
            .cells()
            .map(|(x, z)| p.grid_transform.apply(f64::from(x) + 0.5, f64::from(z) + 0.5))
            .collect();

        let elevation = self
            .crop_samples(&*self.dataset.elevation, &ctx, None, None)?
            .ok_or(SynthError::EmptyTile(tile.coord))?;
        let cover = self
            .crop_samples(
                &*self.dataset.landcover,
                &ctx,
                Some(COVER_NODATA),
                Some(f64::from(WATER_CODE)),
            )?
            .ok_or(SynthError::EmptyTile(tile.coord))?;

        let cover_vals = cover.query(&points, &p.cover_idw)?;
        let elev_vals = elevation.query(&points, &p.elevation_idw)?;
        let ctx_cover: Vec<i32> = cover_vals.iter().map(|v| v.round() as i32).collect();

        let is_land: Vec<bool> = ctx_cover.iter().map(|c| !p.cover.get(*c).water).collect();
        let shore = Shoreline::new(&ctx, &is_land);

        let n = bounds.area() as usize;
        let mut layers = TileLayers {
            bounds,
            cover: Vec::with_capacity(n),
            surface: Vec::with_capacity(n),
            depth: Vec::with_capacity(n),
            crust: Vec::with_capacity(n),
        };
        let mut volume = TileVolume::new(bounds, p.height as usize);
        let mut stone_top = Vec::with_capacity(n);
        let mut peak: Option<Peak> = None;

        for (x, z) in bounds.cells() {
            // Halo cells feed interpolation and the shoreline only.
            let ci = ctx.index_of(x, z).unwrap_or_default();
            let code = ctx_cover[ci];
            let class = p.cover.get(code);
            let h = surface_height(elev_vals[ci], p);

            let (top, depth) = if class.water || h < p.sealevel {
                let d = water_depth(
                    class.water,
                    shore.distance(x, z),
                    h,
                    p.sealevel,
                    p.slope,
                    p.maxdepth,
                );
                (p.sealevel - 1 - d, d)
            } else {
                (h, 0)
            };
            let crust = self.crust.thickness(x, z);

            let lx = (x - bounds.x0) as usize;
            let lz = (z - bounds.z0) as usize;
            stone_top.push(compose(&mut volume, lx, lz, Column { top, depth, crust }, class));

            let here = Peak { x, z, elevation: top };
            if peak.is_none_or(|best| here.beats(&best)) {
                peak = Some(here);
            }
            layers.cover.push(code);
            layers.surface.push(top);
            layers.depth.push(depth);
            layers.crust.push(crust);
        }

        let seed = p.seed as u32;
        let trees = if p.trees_enabled {
            trees::plant(
                seed,
                &bounds,
                &p.cover,
                &layers.cover,
                &layers.surface,
                &layers.depth,
                p.tree_density_scale,
                p.height,
            )
        } else {
            Placements::new()
        };
        let ores = if p.ore_enabled {
            ore::deposit(seed, tile.coord, &volume, &stone_top, p.ore_density)
        } else {
            Placements::new()
        };

        let peak = peak.ok_or(SynthError::EmptyTile(tile.coord))?;
        let summary = TileSummary {
            coord: tile.coord,
            bounds,
            peak,
            trees,
            ores,
        };
        debug!(
            "synthesized tile {} peak={} trees={} ores={}",
            tile.coord,
            peak.elevation,
            summary.tree_count(),
            summary.ore_count()
        );
        Ok(TileOutput {
            volume,
            summary,
            layers,
        })
    }

    /// Interpolation tree over the raster pixels covering `ctx`. `None` when
    /// no usable pixel falls inside the window. `assumed_nodata` stands in for
    /// a raster that declares no nodata value.
    fn crop_samples(
        &self,
        src: &dyn RasterSource,
        ctx: &GridRect,
        assumed_nodata: Option<f64>,
        fill: Option<f64>,
    ) -> Result<Option<InterpolationTree>, SynthError> {
        let gt = self.params.grid_transform;
        let a = gt.apply(f64::from(ctx.x0), f64::from(ctx.z0));
        let b = gt.apply(f64::from(ctx.x1), f64::from(ctx.z1));
        let Some((c0, r0, cols, rows)) = pixel_window(src, a, b, 1) else {
            return Ok(None);
        };
        let mut crop = src.read_crop(c0, r0, cols, rows)?;
        if crop.nodata.is_none() {
            crop.nodata = assumed_nodata;
        }
        let samples = crop.samples(fill);
        if samples.is_empty() {
            return Ok(None);
        }
        Ok(Some(InterpolationTree::build(samples)?))
    }
}
