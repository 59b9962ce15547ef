use strata_blocks::CoverTable;
use strata_geom::GridRect;

use super::summary::Placements;

const TREE_SALT: u32 = 0x7265_6531;
const SPECIES_SALT: u32 = 0x5be1_1a55;

pub(crate) fn hash2(ix: i32, iz: i32, seed: u32) -> u32 {
    let mut h = (ix as u32).wrapping_mul(0x85eb_ca6b)
        ^ (iz as u32).wrapping_mul(0xc2b2_ae35)
        ^ seed.wrapping_mul(0x27d4_eb2d);
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^= h >> 16;
    h
}

pub(crate) fn rand01(seed: u32, ix: i32, iz: i32, salt: u32) -> f32 {
    let h = hash2(ix, iz, (seed ^ salt).wrapping_add(0x9E37_79B9));
    ((h & 0x00FF_FFFF) as f32) / 16_777_216.0
}

/// Tree placements for the dry cells of `bounds`. Layers are indexed by
/// `bounds.index_of`; `depth > 0` marks a submerged cell.
pub(crate) fn plant(
    seed: u32,
    bounds: &GridRect,
    cover_table: &CoverTable,
    cover: &[i32],
    surface: &[i32],
    depth: &[i32],
    density_scale: f32,
    top: i32,
) -> Placements {
    let mut out = Placements::new();
    for (i, (x, z)) in bounds.cells().enumerate() {
        if depth[i] > 0 {
            continue;
        }
        let class = cover_table.get(cover[i]);
        if class.water || class.tree_density <= 0.0 || class.species.is_empty() {
            continue;
        }
        if rand01(seed, x, z, TREE_SALT) >= class.tree_density * density_scale {
            continue;
        }
        let pick = hash2(x, z, seed ^ SPECIES_SALT) as usize % class.species.len();
        let species = class.species[pick];
        let base = surface[i] + 1;
        if base + species.trunk_height() + 1 > top {
            continue;
        }
        out.entry(species.name().to_string())
            .or_default()
            .push([x, base, z]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rand01_is_unit_interval_and_stable() {
        for i in -100..100 {
            let r = rand01(42, i, i * 7, TREE_SALT);
            assert!((0.0..1.0).contains(&r));
            assert_eq!(r, rand01(42, i, i * 7, TREE_SALT));
        }
    }

    #[test]
    fn dense_forest_fills_dry_cells_only() {
        let mut table = CoverTable::nlcd();
        table
            .apply_overrides(&[strata_blocks::CoverDef {
                code: 42,
                tree_density: Some(1.0),
                ..Default::default()
            }])
            .unwrap();
        let b = GridRect::new(0, 0, 4, 4);
        let cover = vec![42; 16];
        let surface = vec![70; 16];
        let mut depth = vec![0; 16];
        depth[5] = 3;
        let got = plant(1, &b, &table, &cover, &surface, &depth, 1.0, 240);
        let spruce = &got["spruce"];
        assert_eq!(spruce.len(), 15);
        assert!(spruce.iter().all(|p| p[1] == 71 && b.contains(p[0], p[2])));
        assert!(!spruce.contains(&[1, 71, 1]));
    }
}
