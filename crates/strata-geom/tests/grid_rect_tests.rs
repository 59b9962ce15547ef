use strata_geom::{GeoPoint, GeoTransform, GridRect};

#[test]
fn rect_dimensions() {
    let r = GridRect::new(10, 20, 42, 30);
    assert_eq!(r.width(), 32);
    assert_eq!(r.depth(), 10);
    assert_eq!(r.area(), 320);
    assert!(!r.is_empty());

    // Inverted rectangles report zero extent instead of negative sizes
    let inv = GridRect::new(5, 5, 1, 1);
    assert_eq!(inv.width(), 0);
    assert!(inv.is_empty());
}

#[test]
fn rect_contains_is_half_open() {
    let r = GridRect::new(0, 0, 4, 4);
    assert!(r.contains(0, 0));
    assert!(r.contains(3, 3));
    assert!(!r.contains(4, 0));
    assert!(!r.contains(0, 4));
    assert!(!r.contains(-1, 2));
}

#[test]
fn expand_within_clamps_to_limit() {
    let limit = GridRect::new(0, 0, 100, 100);
    let r = GridRect::new(0, 40, 20, 60);
    let e = r.expand_within(16, &limit);
    assert_eq!(e, GridRect::new(0, 24, 36, 76));

    let corner = GridRect::new(90, 90, 100, 100).expand_within(16, &limit);
    assert_eq!(corner, GridRect::new(74, 74, 100, 100));
}

#[test]
fn intersect_disjoint_is_none() {
    let a = GridRect::new(0, 0, 10, 10);
    let b = GridRect::new(10, 0, 20, 10);
    assert!(a.intersect(&b).is_none());
    assert!(!a.overlaps(&b));
    let c = GridRect::new(5, 5, 15, 15);
    assert_eq!(a.intersect(&c), Some(GridRect::new(5, 5, 10, 10)));
}

#[test]
fn index_and_cells_agree() {
    let r = GridRect::new(3, -2, 7, 1);
    for (i, (x, z)) in r.cells().enumerate() {
        assert_eq!(r.index_of(x, z), Some(i));
    }
    assert_eq!(r.cells().count() as i64, r.area());
    assert_eq!(r.index_of(7, 0), None);
}

#[test]
fn geo_distance() {
    let a = GeoPoint::new(0.0, 0.0);
    let b = GeoPoint::new(3.0, 4.0);
    assert!((a.distance(b) - 5.0).abs() < 1e-12);
    assert_eq!((b - a).x, 3.0);
    assert_eq!((a + b).y, 4.0);
}

#[test]
fn transform_north_up_rows_descend() {
    let t = GeoTransform::new(0.0, 100.0, 10.0, -10.0);
    let top = t.pixel_center(0, 0);
    let below = t.pixel_center(0, 1);
    assert!(below.y < top.y);
    assert_eq!(t.pixel_size(), 10.0);
}
