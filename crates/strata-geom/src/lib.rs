//! Grid rectangles and geographic transforms shared by the pipeline crates.
#![forbid(unsafe_code)]

use core::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A point in projected geographic units (usually metres).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
}

impl GeoPoint {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance_sq(self, rhs: GeoPoint) -> f64 {
        let dx = self.x - rhs.x;
        let dy = self.y - rhs.y;
        dx * dx + dy * dy
    }

    #[inline]
    pub fn distance(self, rhs: GeoPoint) -> f64 {
        self.distance_sq(rhs).sqrt()
    }

    #[inline]
    pub fn axis(self, axis: usize) -> f64 {
        if axis == 0 { self.x } else { self.y }
    }
}

impl Add for GeoPoint {
    type Output = GeoPoint;
    #[inline]
    fn add(self, rhs: GeoPoint) -> GeoPoint {
        GeoPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for GeoPoint {
    type Output = GeoPoint;
    #[inline]
    fn sub(self, rhs: GeoPoint) -> GeoPoint {
        GeoPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Half-open rectangle `[x0, x1) × [z0, z1)` on the output block grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    pub x0: i32,
    pub z0: i32,
    pub x1: i32,
    pub z1: i32,
}

impl GridRect {
    #[inline]
    pub const fn new(x0: i32, z0: i32, x1: i32, z1: i32) -> Self {
        Self { x0, z0, x1, z1 }
    }

    #[inline]
    pub const fn from_size(x0: i32, z0: i32, width: i32, depth: i32) -> Self {
        Self::new(x0, z0, x0 + width, z0 + depth)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        (self.x1 - self.x0).max(0)
    }

    #[inline]
    pub fn depth(&self) -> i32 {
        (self.z1 - self.z0).max(0)
    }

    #[inline]
    pub fn area(&self) -> i64 {
        i64::from(self.width()) * i64::from(self.depth())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.depth() == 0
    }

    #[inline]
    pub fn contains(&self, x: i32, z: i32) -> bool {
        x >= self.x0 && x < self.x1 && z >= self.z0 && z < self.z1
    }

    #[inline]
    pub fn contains_rect(&self, other: &GridRect) -> bool {
        other.x0 >= self.x0 && other.x1 <= self.x1 && other.z0 >= self.z0 && other.z1 <= self.z1
    }

    pub fn intersect(&self, other: &GridRect) -> Option<GridRect> {
        let r = GridRect::new(
            self.x0.max(other.x0),
            self.z0.max(other.z0),
            self.x1.min(other.x1),
            self.z1.min(other.z1),
        );
        if r.is_empty() { None } else { Some(r) }
    }

    #[inline]
    pub fn overlaps(&self, other: &GridRect) -> bool {
        self.intersect(other).is_some()
    }

    /// Grows the rectangle by `border` on every side, then clips it to `limit`.
    pub fn expand_within(&self, border: i32, limit: &GridRect) -> GridRect {
        GridRect::new(
            (self.x0 - border).max(limit.x0),
            (self.z0 - border).max(limit.z0),
            (self.x1 + border).min(limit.x1),
            (self.z1 + border).min(limit.z1),
        )
    }

    /// Linear index of `(x, z)` inside the rectangle, x fastest.
    #[inline]
    pub fn index_of(&self, x: i32, z: i32) -> Option<usize> {
        if !self.contains(x, z) {
            return None;
        }
        let dx = (x - self.x0) as usize;
        let dz = (z - self.z0) as usize;
        Some(dz * self.width() as usize + dx)
    }

    /// Iterates cells row by row (z outer, x inner).
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (self.z0..self.z1).flat_map(move |z| (self.x0..self.x1).map(move |x| (x, z)))
    }
}

/// North-up affine transform from pixel space to projected coordinates.
///
/// `pixel_h` is negative for rasters stored top row first.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_w: f64,
    pub pixel_h: f64,
}

impl GeoTransform {
    #[inline]
    pub const fn new(origin_x: f64, origin_y: f64, pixel_w: f64, pixel_h: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_w,
            pixel_h,
        }
    }

    /// Projected point at fractional pixel position `(col, row)`.
    #[inline]
    pub fn apply(&self, col: f64, row: f64) -> GeoPoint {
        GeoPoint::new(
            self.origin_x + col * self.pixel_w,
            self.origin_y + row * self.pixel_h,
        )
    }

    #[inline]
    pub fn pixel_center(&self, col: usize, row: usize) -> GeoPoint {
        self.apply(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// Fractional `(col, row)` of a projected point.
    #[inline]
    pub fn to_pixel(&self, p: GeoPoint) -> (f64, f64) {
        (
            (p.x - self.origin_x) / self.pixel_w,
            (p.y - self.origin_y) / self.pixel_h,
        )
    }

    #[inline]
    pub fn pixel_size(&self) -> f64 {
        self.pixel_w.abs()
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn small_rect() -> impl Strategy<Value = GridRect> {
        (-500i32..500, -500i32..500, 0i32..300, 0i32..300)
            .prop_map(|(x, z, w, d)| GridRect::from_size(x, z, w, d))
    }

    proptest! {
        #[test]
        fn intersect_is_contained_in_both(a in small_rect(), b in small_rect()) {
            if let Some(r) = a.intersect(&b) {
                prop_assert!(a.contains_rect(&r));
                prop_assert!(b.contains_rect(&r));
            }
        }
    }

    #[test]
    fn pixel_round_trip_hits_center() {
        let t = GeoTransform::new(1000.0, 5000.0, 30.0, -30.0);
        let p = t.pixel_center(3, 7);
        let (c, r) = t.to_pixel(p);
        assert!((c - 3.5).abs() < 1e-9);
        assert!((r - 7.5).abs() < 1e-9);
    }
}
