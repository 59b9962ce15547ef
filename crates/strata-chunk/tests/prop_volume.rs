use proptest::prelude::*;
use strata_blocks::Block;
use strata_chunk::{ChunkError, REGION_SIZE, RegionVolume, TileVolume};
use strata_geom::GridRect;

fn dim() -> impl Strategy<Value = usize> {
    1usize..=8
}

fn patterned(origin_x: i32, origin_z: i32, sx: usize, sy: usize, sz: usize) -> TileVolume {
    let blocks = (0..sx * sy * sz).map(|i| Block((i % 46) as u16)).collect();
    TileVolume::from_blocks_local(origin_x, origin_z, sx, sy, sz, blocks)
}

proptest! {
    // idx maps each (x,y,z) within bounds to unique in-range indices
    #[test]
    fn idx_is_unique_and_in_range(sx in dim(), sy in dim(), sz in dim()) {
        let t = TileVolume::new(GridRect::from_size(0, 0, sx as i32, sz as i32), sy);
        let expect = sx * sy * sz;
        let mut seen = vec![false; expect];
        for y in 0..sy { for z in 0..sz { for x in 0..sx {
            let i = t.idx(x, y, z);
            prop_assert!(i < expect);
            prop_assert!(!seen[i]);
            seen[i] = true;
        }}}
        prop_assert!(seen.into_iter().all(|b| b));
    }

    // Copying a tile into a region reproduces every block at the same world position
    #[test]
    fn copy_preserves_blocks(
        ox in 0i32..(REGION_SIZE - 40),
        oz in 0i32..(REGION_SIZE - 40),
        sx in 1usize..40,
        sz in 1usize..40,
        sy in 1usize..6,
    ) {
        let tile = patterned(ox, oz, sx, sy, sz);
        let mut region = RegionVolume::new(0, 0, sy);
        let written = region.copy_from_tile(&tile).unwrap();
        prop_assert_eq!(written, sx * sz);
        for z in 0..sz { for x in 0..sx { for y in 0..sy {
            let w = region.get_world(ox + x as i32, y as i32, oz + z as i32);
            prop_assert_eq!(w, Some(tile.get_local(x, y, z)));
        }}}
    }
}

#[test]
fn tile_outside_region_is_rejected() {
    let tile = patterned(500, 0, 20, 2, 4);
    let mut region = RegionVolume::new(0, 0, 2);
    assert!(matches!(
        region.copy_from_tile(&tile),
        Err(ChunkError::OutOfRegion { rx: 0, rz: 0, .. })
    ));
}

#[test]
fn height_mismatch_is_rejected() {
    let tile = patterned(0, 0, 4, 3, 4);
    let mut region = RegionVolume::new(0, 0, 4);
    assert_eq!(
        region.copy_from_tile(&tile),
        Err(ChunkError::HeightMismatch { tile: 3, region: 4 })
    );
}

#[test]
fn base_tile_matches_explicit_copy() {
    let a = patterned(512, 1024, 32, 3, 16);
    let mut fresh = RegionVolume::new(1, 2, 3);
    fresh.copy_from_tile(&a).unwrap();
    let based = RegionVolume::from_base_tile(1, 2, a).unwrap();
    assert_eq!(fresh, based);
    assert_eq!(based.column_count(), 2);
}

#[test]
fn negative_region_addresses_resolve() {
    let mut region = RegionVolume::new(-1, -1, 2);
    assert!(region.set_world(-1, 1, -512, Block::STONE));
    assert!(!region.set_world(0, 1, -1, Block::STONE));
    assert_eq!(region.get_world(-1, 1, -512), Some(Block::STONE));
    assert_eq!(region.get_world(-2, 1, -512), Some(Block::AIR));
}
