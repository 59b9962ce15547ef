use strata_blocks::{Block, OreKind};
use strata_chunk::TileVolume;

use super::summary::Placements;
use super::trees::hash2;
use crate::tiles::TileCoord;

const ORE_SALT: u32 = 0x04e5_0e5a;

/// Deposit candidates drawn from a per-tile hash stream. A candidate is kept
/// only when it lands on stone and below its kind's height limit.
pub(crate) fn deposit(
    seed: u32,
    coord: TileCoord,
    volume: &TileVolume,
    stone_top: &[i32],
    density: f64,
) -> Placements {
    let mut out = Placements::new();
    let area = volume.sx * volume.sz;
    if area == 0 || density <= 0.0 {
        return out;
    }
    let count = i32::try_from((area as f64 * density).ceil() as usize).unwrap_or(i32::MAX);
    let total_weight: u32 = OreKind::ALL.iter().map(|k| k.weight()).sum();
    let stream = hash2(coord.tx, coord.ty, seed ^ ORE_SALT);

    for i in 0..count {
        let h0 = hash2(i, 0, stream);
        let h1 = hash2(i, 1, stream);
        let h2 = hash2(i, 2, stream);
        let h3 = hash2(i, 3, stream);
        let lx = h0 as usize % volume.sx;
        let lz = h1 as usize % volume.sz;
        let kind = pick_kind(h2 % total_weight);

        // Column index in x-fastest order.
        let top = stone_top[lz * volume.sx + lx].min(kind.max_y());
        if top < 1 {
            continue;
        }
        let y = 1 + (h3 % top as u32) as i32;
        if volume.get_local(lx, y as usize, lz) != Block::STONE {
            continue;
        }
        out.entry(kind.name().to_string()).or_default().push([
            volume.origin_x + lx as i32,
            y,
            volume.origin_z + lz as i32,
        ]);
    }
    out
}

fn pick_kind(mut roll: u32) -> OreKind {
    for k in OreKind::ALL {
        if roll < k.weight() {
            return k;
        }
        roll -= k.weight();
    }
    OreKind::Coal
}
