use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_geom::GridRect;

use crate::tiles::TileCoord;

/// Highest surface block of a tile (or of the whole world).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peak {
    pub x: i32,
    pub z: i32,
    pub elevation: i32,
}

impl Peak {
    /// True when `self` should replace `best`: higher wins, ties go to the
    /// lower x, then the lower z.
    #[inline]
    pub fn beats(&self, best: &Peak) -> bool {
        self.elevation > best.elevation
            || (self.elevation == best.elevation && (self.x, self.z) < (best.x, best.z))
    }
}

/// Placement coordinates `[x, y, z]` keyed by category name.
pub type Placements = BTreeMap<String, Vec<[i32; 3]>>;

/// Per-tile metadata written next to the tile's blocks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSummary {
    pub coord: TileCoord,
    pub bounds: GridRect,
    pub peak: Peak,
    #[serde(default)]
    pub trees: Placements,
    #[serde(default)]
    pub ores: Placements,
}

impl TileSummary {
    pub fn tree_count(&self) -> usize {
        self.trees.values().map(Vec::len).sum()
    }

    pub fn ore_count(&self) -> usize {
        self.ores.values().map(Vec::len).sum()
    }

    /// Every placement lies inside the tile's own bounds.
    pub fn placements_in_bounds(&self) -> bool {
        self.trees
            .values()
            .chain(self.ores.values())
            .flatten()
            .all(|p| self.bounds.contains(p[0], p[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_tie_prefers_lower_x_then_z() {
        let a = Peak { x: 3, z: 9, elevation: 80 };
        let b = Peak { x: 3, z: 2, elevation: 80 };
        let c = Peak { x: 1, z: 50, elevation: 80 };
        assert!(b.beats(&a));
        assert!(c.beats(&b));
        assert!(!a.beats(&a));
        assert!(Peak { x: 99, z: 99, elevation: 81 }.beats(&c));
    }
}
