//! Read-only raster seam and the in-memory grid implementation.

use std::sync::Arc;

use strata_geom::{GeoPoint, GeoTransform};
use strata_interp::Sample;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RasterError {
    #[error("crop {cols}x{rows} at ({col0}, {row0}) exceeds raster {width}x{height}")]
    OutOfBounds {
        col0: usize,
        row0: usize,
        cols: usize,
        rows: usize,
        width: usize,
        height: usize,
    },
    #[error("raster data length {got} does not match {cols}x{rows}")]
    BadLength { got: usize, cols: usize, rows: usize },
    #[error("raster read failed: {0}")]
    Read(String),
}

/// A geographic raster the pipeline may read from any worker thread.
pub trait RasterSource: Send + Sync {
    /// `(columns, rows)`.
    fn dims(&self) -> (usize, usize);
    fn transform(&self) -> GeoTransform;
    fn nodata(&self) -> Option<f64>;
    fn read_crop(
        &self,
        col0: usize,
        row0: usize,
        cols: usize,
        rows: usize,
    ) -> Result<RasterCrop, RasterError>;

    /// Minimum and maximum over valid pixels, `None` when every pixel is nodata.
    fn min_max(&self) -> Result<Option<(f64, f64)>, RasterError> {
        let (w, h) = self.dims();
        let crop = self.read_crop(0, 0, w, h)?;
        Ok(crop.min_max())
    }
}

/// A rectangular window read out of a raster, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterCrop {
    pub col0: usize,
    pub row0: usize,
    pub cols: usize,
    pub rows: usize,
    /// Transform of the full raster the crop was read from.
    pub transform: GeoTransform,
    pub nodata: Option<f64>,
    pub data: Vec<f64>,
}

impl RasterCrop {
    #[inline]
    pub fn get(&self, col: usize, row: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn is_valid(&self, v: f64) -> bool {
        !v.is_nan() && self.nodata != Some(v)
    }

    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| self.is_valid(**v)).count()
    }

    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| self.is_valid(*v))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Pixel centres with values. Nodata pixels are replaced by `fill`, or
    /// skipped when `fill` is `None`.
    pub fn samples(&self, fill: Option<f64>) -> Vec<Sample> {
        let mut out = Vec::with_capacity(self.data.len());
        for row in 0..self.rows {
            for col in 0..self.cols {
                let v = self.get(col, row);
                let v = if self.is_valid(v) {
                    v
                } else if let Some(f) = fill {
                    f
                } else {
                    continue;
                };
                let p = self.transform.pixel_center(self.col0 + col, self.row0 + row);
                out.push(Sample {
                    point: p,
                    value: v,
                });
            }
        }
        out
    }
}

/// Pixel window of `src` covering the projected rectangle spanned by `a` and
/// `b`, grown by `pad` pixels and clipped to the raster. `None` if empty.
pub fn pixel_window(
    src: &dyn RasterSource,
    a: GeoPoint,
    b: GeoPoint,
    pad: usize,
) -> Option<(usize, usize, usize, usize)> {
    let t = src.transform();
    let (w, h) = src.dims();
    let (ca, ra) = t.to_pixel(a);
    let (cb, rb) = t.to_pixel(b);
    let pad = pad as f64;
    let c0 = (ca.min(cb).floor() - pad).max(0.0);
    let r0 = (ra.min(rb).floor() - pad).max(0.0);
    let c1 = (ca.max(cb).ceil() + pad).min(w as f64);
    let r1 = (ra.max(rb).ceil() + pad).min(h as f64);
    if c1 <= c0 || r1 <= r0 {
        return None;
    }
    let (c0, r0) = (c0 as usize, r0 as usize);
    Some((c0, r0, c1 as usize - c0, r1 as usize - r0))
}

/// In-memory raster.
#[derive(Clone, Debug, PartialEq)]
pub struct GridRaster {
    cols: usize,
    rows: usize,
    transform: GeoTransform,
    nodata: Option<f64>,
    data: Vec<f64>,
}

impl GridRaster {
    pub fn new(
        cols: usize,
        rows: usize,
        transform: GeoTransform,
        nodata: Option<f64>,
        data: Vec<f64>,
    ) -> Result<Self, RasterError> {
        if data.len() != cols * rows {
            return Err(RasterError::BadLength {
                got: data.len(),
                cols,
                rows,
            });
        }
        Ok(Self {
            cols,
            rows,
            transform,
            nodata,
            data,
        })
    }

    pub fn from_fn(
        cols: usize,
        rows: usize,
        transform: GeoTransform,
        nodata: Option<f64>,
        mut f: impl FnMut(usize, usize) -> f64,
    ) -> Self {
        let mut data = Vec::with_capacity(cols * rows);
        for row in 0..rows {
            for col in 0..cols {
                data.push(f(col, row));
            }
        }
        Self {
            cols,
            rows,
            transform,
            nodata,
            data,
        }
    }

    #[inline]
    pub fn get(&self, col: usize, row: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

impl RasterSource for GridRaster {
    fn dims(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    fn transform(&self) -> GeoTransform {
        self.transform
    }

    fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    fn read_crop(
        &self,
        col0: usize,
        row0: usize,
        cols: usize,
        rows: usize,
    ) -> Result<RasterCrop, RasterError> {
        if col0 + cols > self.cols || row0 + rows > self.rows {
            return Err(RasterError::OutOfBounds {
                col0,
                row0,
                cols,
                rows,
                width: self.cols,
                height: self.rows,
            });
        }
        let mut data = Vec::with_capacity(cols * rows);
        for row in row0..row0 + rows {
            let start = row * self.cols + col0;
            data.extend_from_slice(&self.data[start..start + cols]);
        }
        Ok(RasterCrop {
            col0,
            row0,
            cols,
            rows,
            transform: self.transform,
            nodata: self.nodata,
            data,
        })
    }
}

/// The two rasters a build reads.
#[derive(Clone)]
pub struct Dataset {
    pub landcover: Arc<dyn RasterSource>,
    pub elevation: Arc<dyn RasterSource>,
}

/// Observed properties of a dataset, gathered once before a build.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DatasetStats {
    pub elev_min: f64,
    pub elev_max: f64,
    /// Land-cover pixel edge in projected units.
    pub pixel_size: f64,
    /// Land-cover `(columns, rows)`.
    pub cover_dims: (usize, usize),
    pub cover_transform: GeoTransform,
}

impl Dataset {
    pub fn new(landcover: Arc<dyn RasterSource>, elevation: Arc<dyn RasterSource>) -> Self {
        Self {
            landcover,
            elevation,
        }
    }

    pub fn stats(&self) -> Result<DatasetStats, RasterError> {
        let (elev_min, elev_max) = self
            .elevation
            .min_max()?
            .ok_or_else(|| RasterError::Read("elevation raster has no valid pixels".into()))?;
        let t = self.landcover.transform();
        Ok(DatasetStats {
            elev_min,
            elev_max,
            pixel_size: t.pixel_size(),
            cover_dims: self.landcover.dims(),
            cover_transform: t,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> GridRaster {
        GridRaster::from_fn(4, 3, GeoTransform::new(100.0, 90.0, 10.0, -10.0), Some(-1.0), |c, r| {
            if c == 0 && r == 0 { -1.0 } else { (r * 4 + c) as f64 }
        })
    }

    #[test]
    fn crop_and_samples() {
        let g = ramp();
        let crop = g.read_crop(0, 0, 2, 2).unwrap();
        assert_eq!(crop.data, vec![-1.0, 1.0, 4.0, 5.0]);
        assert_eq!(crop.valid_count(), 3);
        let s = crop.samples(None);
        assert_eq!(s.len(), 3);
        assert_eq!(s[0].point, GeoPoint::new(115.0, 85.0));
        assert_eq!(crop.samples(Some(11.0))[0].value, 11.0);
    }

    #[test]
    fn out_of_bounds_crop_fails() {
        assert!(matches!(
            ramp().read_crop(3, 0, 2, 1),
            Err(RasterError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn window_pads_and_clips() {
        let g = ramp();
        let w = pixel_window(&g, GeoPoint::new(112.0, 88.0), GeoPoint::new(118.0, 82.0), 1);
        assert_eq!(w, Some((0, 0, 3, 2)));
    }

    #[test]
    fn min_max_skips_nodata() {
        assert_eq!(ramp().min_max().unwrap(), Some((1.0, 11.0)));
    }
}
