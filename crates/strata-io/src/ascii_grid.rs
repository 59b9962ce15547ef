//! ESRI ASCII grid (`.asc`) reader and writer.

use std::fs;
use std::io::Write;
use std::path::Path;

use strata_geom::GeoTransform;
use strata_world::{GridRaster, RasterSource};

use crate::atomic::write_atomic;
use crate::{IoContext, StoreError};

#[derive(Default)]
struct Header {
    ncols: Option<usize>,
    nrows: Option<usize>,
    xll: Option<f64>,
    yll: Option<f64>,
    center: bool,
    cellsize: Option<f64>,
    nodata: Option<f64>,
}

pub fn read(path: &Path) -> Result<GridRaster, StoreError> {
    let text = fs::read_to_string(path).at(path)?;
    parse(&text).map_err(|msg| StoreError::Format {
        path: path.to_path_buf(),
        msg,
    })
}

pub fn parse(text: &str) -> Result<GridRaster, String> {
    let mut h = Header::default();
    let mut tokens = text.split_whitespace().peekable();

    while let Some(key) = tokens.peek().copied() {
        if key.parse::<f64>().is_ok() {
            break;
        }
        tokens.next();
        let val = tokens
            .next()
            .ok_or_else(|| format!("missing value for header `{key}`"))?;
        let num: f64 = val
            .parse()
            .map_err(|_| format!("bad value `{val}` for header `{key}`"))?;
        match key.to_ascii_lowercase().as_str() {
            "ncols" => h.ncols = Some(num as usize),
            "nrows" => h.nrows = Some(num as usize),
            "xllcorner" => h.xll = Some(num),
            "yllcorner" => h.yll = Some(num),
            "xllcenter" => {
                h.xll = Some(num);
                h.center = true;
            }
            "yllcenter" => {
                h.yll = Some(num);
                h.center = true;
            }
            "cellsize" => h.cellsize = Some(num),
            "nodata_value" => h.nodata = Some(num),
            other => return Err(format!("unknown header `{other}`")),
        }
    }

    let ncols = h.ncols.ok_or("missing ncols")?;
    let nrows = h.nrows.ok_or("missing nrows")?;
    let cell = h.cellsize.ok_or("missing cellsize")?;
    let mut xll = h.xll.ok_or("missing xllcorner")?;
    let mut yll = h.yll.ok_or("missing yllcorner")?;
    if cell <= 0.0 {
        return Err(format!("cellsize must be > 0, got {cell}"));
    }
    if h.center {
        xll -= cell * 0.5;
        yll -= cell * 0.5;
    }

    let data = tokens
        .map(|t| t.parse::<f64>().map_err(|_| format!("bad cell value `{t}`")))
        .collect::<Result<Vec<_>, _>>()?;
    let transform = GeoTransform::new(xll, yll + nrows as f64 * cell, cell, -cell);
    GridRaster::new(ncols, nrows, transform, h.nodata, data).map_err(|e| e.to_string())
}

/// Writes a north-up raster with square pixels.
pub fn write(path: &Path, raster: &GridRaster) -> Result<(), StoreError> {
    let (cols, rows) = raster.dims();
    let t = raster.transform();
    if t.pixel_w <= 0.0 || t.pixel_h >= 0.0 || t.pixel_w != -t.pixel_h {
        return Err(StoreError::Format {
            path: path.to_path_buf(),
            msg: "only north-up rasters with square pixels can be written".into(),
        });
    }
    let yll = t.origin_y + rows as f64 * t.pixel_h;
    write_atomic(path, |w| {
        writeln!(w, "ncols {cols}").at(path)?;
        writeln!(w, "nrows {rows}").at(path)?;
        writeln!(w, "xllcorner {}", t.origin_x).at(path)?;
        writeln!(w, "yllcorner {yll}").at(path)?;
        writeln!(w, "cellsize {}", t.pixel_w).at(path)?;
        if let Some(nd) = raster.nodata() {
            writeln!(w, "NODATA_value {nd}").at(path)?;
        }
        for row in raster.data().chunks(cols.max(1)) {
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(w, "{}", line.join(" ")).at(path)?;
        }
        Ok(())
    })
}
