use std::collections::BTreeMap;
use std::fmt;

use strata_chunk::{REGION_SIZE, region_of};
use strata_geom::GridRect;
use strata_world::Tile;

use crate::MergeError;

/// Region index; each region covers `REGION_SIZE` output cells on a side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionCoord {
    pub rz: i32,
    pub rx: i32,
}

impl RegionCoord {
    pub const fn new(rx: i32, rz: i32) -> Self {
        Self { rz, rx }
    }

    pub fn bounds(&self) -> GridRect {
        GridRect::from_size(
            self.rx * REGION_SIZE,
            self.rz * REGION_SIZE,
            REGION_SIZE,
            REGION_SIZE,
        )
    }
}

impl fmt::Display for RegionCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r.{}.{}", self.rx, self.rz)
    }
}

/// Groups tiles by the region holding their origin. Tile order inside a
/// region follows the input order.
pub fn group_tiles(tiles: &[Tile]) -> Result<BTreeMap<RegionCoord, Vec<Tile>>, MergeError> {
    let mut out: BTreeMap<RegionCoord, Vec<Tile>> = BTreeMap::new();
    for tile in tiles {
        let (rx, rz) = region_of(tile.bounds.x0, tile.bounds.z0);
        let rc = RegionCoord::new(rx, rz);
        if !rc.bounds().contains_rect(&tile.bounds) {
            return Err(MergeError::InvalidParameter(format!(
                "tile {} {:?} straddles region {rc}",
                tile.coord, tile.bounds
            )));
        }
        out.entry(rc).or_default().push(tile.clone());
    }
    Ok(out)
}
