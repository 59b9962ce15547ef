//! Immutable per-run parameters, derived once from the config and the
//! observed dataset statistics.

use log::warn;
use strata_blocks::{BlockError, CoverTable};
use strata_chunk::{CHUNK_SIZE, REGION_SIZE};
use strata_geom::{GeoTransform, GridRect};
use strata_interp::IdwParams;
use thiserror::Error;

use crate::config::BuildConfig;
use crate::raster::DatasetStats;
use crate::tiles::{Tile, TileError, TileRange, partition_range};

/// Upper bound on `ore.density`, in deposit candidates per column.
pub const MAX_ORE_DENSITY: f64 = 1.0;

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("invalid tile size {0}: must be a positive multiple of 16 dividing 512")]
    InvalidTileSize(i32),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error(transparent)]
    Cover(#[from] BlockError),
}

/// A value changed while fitting the config to the dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct Adjustment {
    pub field: &'static str,
    pub from: f64,
    pub to: f64,
}

#[derive(Clone, Debug)]
pub struct BuildParams {
    pub name: String,
    pub seed: i32,
    /// Metres per output block horizontally.
    pub scale: f64,
    /// Output blocks per land-cover pixel.
    pub mult: f64,
    pub vscale: f64,
    pub sealevel: i32,
    pub trim: f64,
    pub maxdepth: i32,
    pub slope: f64,
    pub height: i32,
    pub headroom: i32,
    pub crust_max: i32,
    pub tile_size: i32,
    pub halo: i32,
    pub range: TileRange,
    pub cover_idw: IdwParams,
    pub elevation_idw: IdwParams,
    pub trees_enabled: bool,
    pub tree_density_scale: f32,
    pub ore_enabled: bool,
    pub ore_density: f64,
    /// Output grid, origin at the land-cover raster's corner.
    pub bounds: GridRect,
    /// Maps output cells to projected coordinates.
    pub grid_transform: GeoTransform,
    pub cover: CoverTable,
    pub adjustments: Vec<Adjustment>,
}

impl BuildParams {
    pub fn derive(cfg: &BuildConfig, stats: &DatasetStats) -> Result<Self, ParamsError> {
        let tile_size = cfg.tiles.size;
        if tile_size <= 0 || REGION_SIZE % tile_size != 0 || tile_size % CHUNK_SIZE != 0 {
            return Err(ParamsError::InvalidTileSize(tile_size));
        }
        let t = &cfg.terrain;
        check(cfg.tiles.halo >= 0, || format!("tiles.halo must be >= 0, got {}", cfg.tiles.halo))?;
        check(t.scale.is_finite() && t.scale > 0.0, || {
            format!("terrain.scale must be > 0, got {}", t.scale)
        })?;
        check(t.vscale.is_finite() && t.vscale > 0.0, || {
            format!("terrain.vscale must be > 0, got {}", t.vscale)
        })?;
        check(t.slope.is_finite() && t.slope > 0.0, || {
            format!("terrain.slope must be > 0, got {}", t.slope)
        })?;
        check(t.headroom >= 0 && t.height > t.headroom + 2, || {
            format!(
                "terrain.height {} leaves no room under headroom {}",
                t.height, t.headroom
            )
        })?;
        check(t.crust_max >= 1, || format!("terrain.crust_max must be >= 1, got {}", t.crust_max))?;
        check(
            cfg.ore.density.is_finite() && (0.0..=MAX_ORE_DENSITY).contains(&cfg.ore.density),
            || format!("ore.density must be in 0..={MAX_ORE_DENSITY}, got {}", cfg.ore.density),
        )?;
        check(cfg.trees.density_scale >= 0.0, || {
            format!("trees.density_scale must be >= 0, got {}", cfg.trees.density_scale)
        })?;
        check(stats.pixel_size > 0.0, || "land-cover pixel size must be > 0".to_string())?;

        let cover_idw = IdwParams {
            neighbors: cfg.interp.cover_neighbors,
            power: cfg.interp.power,
            epsilon: cfg.interp.epsilon,
        };
        let elevation_idw = IdwParams {
            neighbors: cfg.interp.elevation_neighbors,
            ..cover_idw
        };
        cover_idw
            .validate()
            .and_then(|_| elevation_idw.validate())
            .map_err(|e| ParamsError::InvalidParameter(e.to_string()))?;

        let mut adjustments = Vec::new();

        let scale_hi = stats.pixel_size;
        let scale = fit(&mut adjustments, "scale", t.scale, 1.0f64.min(scale_hi), scale_hi);
        let mult = stats.pixel_size / scale;

        let (cols, rows) = stats.cover_dims;
        let width = (cols as f64 * mult).round() as i32;
        let depth = (rows as f64 * mult).round() as i32;
        if width <= 0 || depth <= 0 {
            return Err(ParamsError::InvalidParameter(format!(
                "dataset of {cols}x{rows} pixels yields an empty output grid"
            )));
        }
        let ct = stats.cover_transform;
        let grid_transform = GeoTransform::new(
            ct.origin_x,
            ct.origin_y,
            scale * ct.pixel_w.signum(),
            scale * ct.pixel_h.signum(),
        );

        let mut min_sea = 2;
        if stats.elev_min < 0.0 {
            min_sea += (-stats.elev_min / t.vscale) as i32;
        }
        let max_sea = t.height - t.headroom;
        let sealevel = fit(
            &mut adjustments,
            "sealevel",
            f64::from(t.sealevel),
            f64::from(min_sea.min(max_sea)),
            f64::from(max_sea),
        ) as i32;

        let maxdepth = fit(
            &mut adjustments,
            "maxdepth",
            f64::from(t.maxdepth),
            1.0,
            f64::from((sealevel - 1).max(1)),
        ) as i32;

        // Water deeper than the halo can see would step at tile seams.
        let shore_reach = (f64::from(maxdepth) * t.slope).ceil().min(f64::from(width.max(depth)));
        let halo = if f64::from(cfg.tiles.halo) < shore_reach {
            record(&mut adjustments, "halo", f64::from(cfg.tiles.halo), shore_reach);
            shore_reach as i32
        } else {
            cfg.tiles.halo
        };

        let trim = fit(&mut adjustments, "trim", t.trim, 0.0, stats.elev_min.max(0.0));

        let room = (t.height - t.headroom - sealevel).max(1);
        let min_vscale = ((stats.elev_max - trim) / f64::from(room)).ceil();
        let vscale = if t.vscale < min_vscale {
            record(&mut adjustments, "vscale", t.vscale, min_vscale);
            min_vscale
        } else {
            t.vscale
        };

        let mut cover = CoverTable::nlcd();
        cover.apply_overrides(&cfg.cover)?;

        Ok(Self {
            name: cfg.name.clone(),
            seed: cfg.seed,
            scale,
            mult,
            vscale,
            sealevel,
            trim,
            maxdepth,
            slope: t.slope,
            height: t.height,
            headroom: t.headroom,
            crust_max: t.crust_max,
            tile_size,
            halo,
            range: TileRange::new(
                (cfg.tiles.start[0], cfg.tiles.start[1]),
                (cfg.tiles.end[0], cfg.tiles.end[1]),
            ),
            cover_idw,
            elevation_idw,
            trees_enabled: cfg.trees.enable,
            tree_density_scale: cfg.trees.density_scale,
            ore_enabled: cfg.ore.enable,
            ore_density: cfg.ore.density,
            bounds: GridRect::new(0, 0, width, depth),
            grid_transform,
            cover,
            adjustments,
        })
    }

    /// Tiles of this run, restricted to the configured range.
    pub fn partition(&self) -> Result<Vec<Tile>, TileError> {
        partition_range(self.bounds, self.tile_size, self.halo, self.range)
    }

    /// Every tile of the grid, ignoring the configured range.
    pub fn partition_all(&self) -> Result<Vec<Tile>, TileError> {
        partition_range(self.bounds, self.tile_size, self.halo, TileRange::ALL)
    }

    /// Highest y a surface block may occupy.
    #[inline]
    pub fn max_surface(&self) -> i32 {
        self.height - self.headroom
    }
}

fn check(ok: bool, msg: impl FnOnce() -> String) -> Result<(), ParamsError> {
    if ok { Ok(()) } else { Err(ParamsError::InvalidParameter(msg())) }
}

fn fit(adj: &mut Vec<Adjustment>, field: &'static str, value: f64, lo: f64, hi: f64) -> f64 {
    let v = value.max(lo).min(hi);
    if v != value {
        warn!("{field} value {value} outside {lo}..={hi}; using {v}");
        adj.push(Adjustment {
            field,
            from: value,
            to: v,
        });
    }
    v
}

fn record(adj: &mut Vec<Adjustment>, field: &'static str, from: f64, to: f64) {
    warn!("{field} value {from} below minimum {to}; using {to}");
    adj.push(Adjustment { field, from, to });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(elev_min: f64, elev_max: f64) -> DatasetStats {
        DatasetStats {
            elev_min,
            elev_max,
            pixel_size: 30.0,
            cover_dims: (64, 32),
            cover_transform: GeoTransform::new(0.0, 0.0, 30.0, -30.0),
        }
    }

    #[test]
    fn defaults_fit_gentle_dataset() {
        let p = BuildParams::derive(&BuildConfig::default(), &stats(0.0, 500.0)).unwrap();
        assert!(p.adjustments.is_empty());
        assert_eq!(p.mult, 5.0);
        assert_eq!(p.bounds, GridRect::new(0, 0, 320, 160));
        assert_eq!(p.grid_transform.pixel_h, -6.0);
    }

    #[test]
    fn tall_dataset_raises_vscale() {
        let p = BuildParams::derive(&BuildConfig::default(), &stats(0.0, 4000.0)).unwrap();
        // room = 256 - 16 - 64 = 176
        assert_eq!(p.vscale, (4000.0f64 / 176.0).ceil());
        assert_eq!(p.adjustments[0].field, "vscale");
    }

    #[test]
    fn deep_dataset_raises_sealevel() {
        let p = BuildParams::derive(&BuildConfig::default(), &stats(-600.0, 100.0)).unwrap();
        assert_eq!(p.sealevel, 102);
        assert_eq!(p.trim, 0.0);
    }

    #[test]
    fn narrow_halo_widens_to_shore_reach() {
        let mut cfg = BuildConfig::default();
        cfg.tiles.halo = 4;
        cfg.terrain.slope = 1.5;
        let p = BuildParams::derive(&cfg, &stats(0.0, 100.0)).unwrap();
        assert_eq!(p.halo, 48);
        assert_eq!(
            p.adjustments,
            vec![Adjustment {
                field: "halo",
                from: 4.0,
                to: 48.0
            }]
        );

        cfg.tiles.halo = 60;
        let p = BuildParams::derive(&cfg, &stats(0.0, 100.0)).unwrap();
        assert_eq!(p.halo, 60);
        assert!(p.adjustments.is_empty());
    }

    #[test]
    fn shallow_sea_needs_a_smaller_halo() {
        let mut cfg = BuildConfig::default();
        cfg.tiles.halo = 0;
        cfg.terrain.sealevel = 9;
        cfg.terrain.height = 40;
        let p = BuildParams::derive(&cfg, &stats(0.0, 100.0)).unwrap();
        // maxdepth clamps to sealevel - 1 first.
        assert_eq!(p.maxdepth, 8);
        assert_eq!(p.halo, 8);
    }

    #[test]
    fn ore_density_is_bounded() {
        let mut cfg = BuildConfig::default();
        cfg.ore.density = 1e12;
        assert!(matches!(
            BuildParams::derive(&cfg, &stats(0.0, 10.0)),
            Err(ParamsError::InvalidParameter(_))
        ));
        cfg.ore.density = MAX_ORE_DENSITY;
        assert!(BuildParams::derive(&cfg, &stats(0.0, 10.0)).is_ok());
    }

    #[test]
    fn tile_size_must_fit_regions() {
        let mut cfg = BuildConfig::default();
        cfg.tiles.size = 100;
        assert!(matches!(
            BuildParams::derive(&cfg, &stats(0.0, 10.0)),
            Err(ParamsError::InvalidTileSize(100))
        ));
    }
}
