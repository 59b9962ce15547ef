use proptest::prelude::*;
use strata_geom::GridRect;

fn coord() -> impl Strategy<Value = i32> {
    -10_000i32..=10_000
}

fn extent() -> impl Strategy<Value = i32> {
    0i32..=64
}

fn arb_rect() -> impl Strategy<Value = GridRect> {
    (coord(), coord(), extent(), extent()).prop_map(|(x, z, w, d)| GridRect::from_size(x, z, w, d))
}

proptest! {
    // expand_within never leaves the limit and always keeps the original inside
    #[test]
    fn expand_stays_inside_limit(r in arb_rect(), border in 0i32..32) {
        let limit = r.expand_within(100, &GridRect::new(i32::MIN / 2, i32::MIN / 2, i32::MAX / 2, i32::MAX / 2));
        let e = r.expand_within(border, &limit);
        prop_assert!(limit.contains_rect(&e));
        prop_assert!(e.contains_rect(&r));
    }

    // Intersection is symmetric
    #[test]
    fn intersect_symmetric(a in arb_rect(), b in arb_rect()) {
        prop_assert_eq!(a.intersect(&b), b.intersect(&a));
    }

    // Every cell yielded by cells() is contained and indices are dense
    #[test]
    fn cells_dense_and_contained(r in arb_rect()) {
        let mut n = 0usize;
        for (x, z) in r.cells() {
            prop_assert!(r.contains(x, z));
            prop_assert_eq!(r.index_of(x, z), Some(n));
            n += 1;
        }
        prop_assert_eq!(n as i64, r.area());
    }
}
