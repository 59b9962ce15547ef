use proptest::prelude::*;
use strata_geom::GridRect;
use strata_world::{TileError, TileRange, grid_dims, partition, partition_range};

fn arb_bounds() -> impl Strategy<Value = GridRect> {
    (-300i32..300, -300i32..300, 1i32..200, 1i32..200)
        .prop_map(|(x, z, w, d)| GridRect::from_size(x, z, w, d))
}

proptest! {
    // Non-halo tiles cover the bounds exactly once
    #[test]
    fn tiles_partition_bounds(bounds in arb_bounds(), size in 1i32..70, halo in 0i32..10) {
        let tiles = partition(bounds, size, halo).unwrap();
        let (cols, rows) = grid_dims(&bounds, size).unwrap();
        prop_assert_eq!(tiles.len() as i32, cols * rows);

        let mut hits = vec![0u8; bounds.area() as usize];
        for t in &tiles {
            prop_assert!(bounds.contains_rect(&t.bounds));
            for (x, z) in t.bounds.cells() {
                hits[bounds.index_of(x, z).unwrap()] += 1;
            }
        }
        prop_assert!(hits.iter().all(|&h| h == 1));
    }

    // Halos contain their tile and never leave the bounds
    #[test]
    fn halos_are_clamped(bounds in arb_bounds(), size in 1i32..70, halo in 1i32..40) {
        for t in partition(bounds, size, halo).unwrap() {
            let h = t.halo.unwrap();
            prop_assert!(h.contains_rect(&t.bounds));
            prop_assert!(bounds.contains_rect(&h));
        }
    }

    // A range yields exactly the tiles of the full grid inside it
    #[test]
    fn range_is_a_subset(bounds in arb_bounds(), size in 4i32..60, sx in 0i32..4, sy in 0i32..4, ex in 0i32..6, ey in 0i32..6) {
        let all = partition(bounds, size, 0).unwrap();
        let sub = partition_range(bounds, size, 0, TileRange::new((sx, sy), (ex, ey))).unwrap();
        for t in &sub {
            prop_assert!(all.contains(t));
            prop_assert!(t.coord.tx >= sx && t.coord.ty >= sy);
        }
    }
}

#[test]
fn clipped_last_row_and_column() {
    let tiles = partition(GridRect::new(0, 0, 100, 50), 32, 0).unwrap();
    assert_eq!(tiles.len(), 4 * 2);
    let last = tiles.last().unwrap();
    assert_eq!(last.bounds, GridRect::new(96, 32, 100, 50));
}

#[test]
fn zero_end_means_to_the_end() {
    let b = GridRect::new(0, 0, 64, 64);
    let tiles = partition_range(b, 16, 0, TileRange::new((2, 1), (0, 0))).unwrap();
    assert_eq!(tiles.len(), 2 * 3);
    assert_eq!(tiles[0].coord.tx, 2);
    assert_eq!(tiles[0].coord.ty, 1);
}

#[test]
fn start_past_end_is_empty() {
    let b = GridRect::new(0, 0, 64, 64);
    let tiles = partition_range(b, 16, 0, TileRange::new((9, 9), (2, 2))).unwrap();
    assert!(tiles.is_empty());
}

#[test]
fn negative_inputs_are_rejected() {
    let b = GridRect::new(0, 0, 10, 10);
    assert_eq!(partition(b, -4, 0), Err(TileError::InvalidTileSize(-4)));
    assert!(matches!(partition(b, 4, -1), Err(TileError::InvalidParameter(_))));
}
