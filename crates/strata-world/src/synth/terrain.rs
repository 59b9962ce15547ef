use strata_blocks::{Block, CoverClass};
use strata_chunk::TileVolume;

use crate::params::BuildParams;

/// Surface block height for a raw elevation in metres.
pub fn surface_height(raw: f64, p: &BuildParams) -> i32 {
    // A positive trim maps onto sea level; lower values clip to it.
    let e = if p.trim > 0.0 { raw.max(p.trim) } else { raw };
    let h = ((e - p.trim) / p.vscale).round() as i32 + p.sealevel;
    h.clamp(1, p.max_surface())
}

/// Describes one output column.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Column {
    /// y of the topmost solid block.
    pub top: i32,
    /// Water blocks above `top`; 0 for dry columns.
    pub depth: i32,
    pub crust: i32,
}

/// Writes a column into the tile volume and returns the highest y still
/// holding stone (0 when there is none).
pub(crate) fn compose(
    vol: &mut TileVolume,
    lx: usize,
    lz: usize,
    col: Column,
    class: &CoverClass,
) -> i32 {
    let top = col.top.max(0) as usize;
    vol.set_local(lx, 0, lz, Block::BEDROCK);

    let crust_floor = (col.top - col.crust).max(1) as usize;
    if crust_floor > 1 {
        vol.fill_column(lx, lz, 1, crust_floor, Block::STONE);
    }
    if top > crust_floor {
        vol.fill_column(lx, lz, crust_floor, top, class.subsurface);
    }
    if top >= 1 {
        let cap = if col.depth > 0 { class.bed } else { class.surface };
        vol.set_local(lx, top, lz, cap);
    }
    if col.depth > 0 {
        vol.fill_column(lx, lz, top + 1, top + 1 + col.depth as usize, Block::WATER);
    }
    crust_floor as i32 - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_blocks::CoverTable;
    use strata_geom::GridRect;

    #[test]
    fn dry_column_layers() {
        let table = CoverTable::nlcd();
        let grass = table.get(71);
        let mut vol = TileVolume::new(GridRect::new(0, 0, 1, 1), 16);
        let stone_top = compose(&mut vol, 0, 0, Column { top: 10, depth: 0, crust: 3 }, grass);
        assert_eq!(stone_top, 6);
        assert_eq!(vol.get_local(0, 0, 0), Block::BEDROCK);
        assert_eq!(vol.get_local(0, 6, 0), Block::STONE);
        assert_eq!(vol.get_local(0, 7, 0), Block::DIRT);
        assert_eq!(vol.get_local(0, 9, 0), Block::DIRT);
        assert_eq!(vol.get_local(0, 10, 0), Block::GRASS);
        assert_eq!(vol.get_local(0, 11, 0), Block::AIR);
    }

    #[test]
    fn wet_column_has_bed_and_water() {
        let table = CoverTable::nlcd();
        let water = table.get(strata_blocks::WATER_CODE);
        let mut vol = TileVolume::new(GridRect::new(0, 0, 1, 1), 16);
        compose(&mut vol, 0, 0, Column { top: 5, depth: 4, crust: 2 }, water);
        assert_eq!(vol.get_local(0, 5, 0), Block::SAND);
        assert_eq!(vol.get_local(0, 6, 0), Block::WATER);
        assert_eq!(vol.get_local(0, 9, 0), Block::WATER);
        assert_eq!(vol.get_local(0, 10, 0), Block::AIR);
    }
}
