use strata_blocks::{Block, OreKind, TreeSpecies};
use strata_chunk::RegionVolume;
use strata_geom::GridRect;
use strata_world::Placements;

use crate::MergeError;

/// World-level tree and ore placements, resolved to block kinds.
#[derive(Clone, Debug, Default)]
pub struct Decorations {
    trees: Vec<(TreeSpecies, [i32; 3])>,
    ores: Vec<(OreKind, [i32; 3])>,
}

impl Decorations {
    pub fn from_placements(trees: &Placements, ores: &Placements) -> Result<Self, MergeError> {
        let mut out = Decorations::default();
        for (name, list) in trees {
            let sp = TreeSpecies::from_name(name)
                .ok_or_else(|| MergeError::InvalidParameter(format!("unknown tree species {name}")))?;
            out.trees.extend(list.iter().map(|p| (sp, *p)));
        }
        for (name, list) in ores {
            let kind = OreKind::from_name(name)
                .ok_or_else(|| MergeError::InvalidParameter(format!("unknown ore kind {name}")))?;
            out.ores.extend(list.iter().map(|p| (kind, *p)));
        }
        Ok(out)
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty() && self.ores.is_empty()
    }

    /// Stamps every decoration touching the region, clipped to it. Each write
    /// depends only on the block already at its position, so neighbouring
    /// regions agree on trees that cross their shared edge.
    pub fn stamp(&self, region: &mut RegionVolume) -> usize {
        let rb = region.bounds();
        let mut written = 0;
        for (kind, [x, y, z]) in &self.ores {
            if region.get_world(*x, *y, *z) == Some(Block::STONE)
                && region.set_world(*x, *y, *z, kind.block())
            {
                written += 1;
            }
        }
        for (sp, base) in &self.trees {
            let reach = sp.canopy_radius() + 1;
            let foot = GridRect::new(base[0] - reach, base[2] - reach, base[0] + reach + 1, base[2] + reach + 1);
            if rb.overlaps(&foot) {
                written += stamp_tree(region, *sp, *base);
            }
        }
        written
    }
}

fn stamp_tree(region: &mut RegionVolume, sp: TreeSpecies, [x, y, z]: [i32; 3]) -> usize {
    let mut written = 0;
    let th = sp.trunk_height();
    for ty in y..y + th {
        if matches!(region.get_world(x, ty, z), Some(b) if !b.is_solid() || b == sp.leaves())
            && region.set_world(x, ty, z, sp.log())
        {
            written += 1;
        }
    }

    let top = y + th - 1;
    let r = sp.canopy_radius();
    for dy in -2i32..=2 {
        let rad = if dy.abs() == 2 { r - 1 } else { r };
        let extra = if dy >= 1 { 0 } else { 1 };
        for dz in -(r + 1)..=(r + 1) {
            for dx in -(r + 1)..=(r + 1) {
                if dx == 0 && dz == 0 && dy <= 0 {
                    continue;
                }
                if dx.abs() + dz.abs() > rad + extra {
                    continue;
                }
                let (lx, ly, lz) = (x + dx, top + dy, z + dz);
                if region.get_world(lx, ly, lz) == Some(Block::AIR)
                    && region.set_world(lx, ly, lz, sp.leaves())
                {
                    written += 1;
                }
            }
        }
    }
    written
}
