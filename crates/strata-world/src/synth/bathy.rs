use strata_geom::{GeoPoint, GridRect};
use strata_interp::{InterpolationTree, Sample};

/// Distance from water cells to the nearest land cell of the context.
pub(crate) struct Shoreline {
    land: Option<InterpolationTree>,
}

impl Shoreline {
    /// `is_land` is indexed by `context.index_of`.
    pub(crate) fn new(context: &GridRect, is_land: &[bool]) -> Self {
        let samples: Vec<Sample> = context
            .cells()
            .zip(is_land)
            .filter(|(_, land)| **land)
            .map(|((x, z), _)| Sample::new(f64::from(x), f64::from(z), 0.0))
            .collect();
        Self {
            land: InterpolationTree::build(samples).ok(),
        }
    }

    /// `None` when the context holds no land at all.
    pub(crate) fn distance(&self, x: i32, z: i32) -> Option<f64> {
        let tree = self.land.as_ref()?;
        tree.nearest(GeoPoint::new(f64::from(x), f64::from(z)), 1)
            .first()
            .map(|n| n.distance)
    }
}

/// Water depth of a submerged column, flattened to `maxdepth`.
pub(crate) fn water_depth(
    water_cover: bool,
    shore: Option<f64>,
    surface: i32,
    sealevel: i32,
    slope: f64,
    maxdepth: i32,
) -> i32 {
    let below = sealevel - 1 - surface;
    let d = if water_cover {
        let from_shore = match shore {
            Some(dist) => (dist / slope).round() as i32,
            None => maxdepth,
        };
        from_shore.max(below)
    } else {
        below
    };
    d.clamp(1, maxdepth)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_grows_with_shore_distance_and_flattens() {
        let ctx = GridRect::new(0, 0, 10, 1);
        let mut land = vec![false; 10];
        land[0] = true;
        let shore = Shoreline::new(&ctx, &land);
        let d: Vec<i32> = (1..10)
            .map(|x| water_depth(true, shore.distance(x, 0), 64, 64, 1.0, 4))
            .collect();
        assert_eq!(d, vec![1, 2, 3, 4, 4, 4, 4, 4, 4]);
    }

    #[test]
    fn no_land_means_max_depth() {
        let ctx = GridRect::new(0, 0, 3, 3);
        let shore = Shoreline::new(&ctx, &[false; 9]);
        assert_eq!(shore.distance(1, 1), None);
        assert_eq!(water_depth(true, None, 64, 64, 1.0, 12), 12);
    }

    #[test]
    fn sunken_land_uses_height_below_sea() {
        assert_eq!(water_depth(false, Some(1.0), 60, 64, 1.0, 32), 3);
        assert_eq!(water_depth(false, None, 63, 64, 1.0, 32), 1);
    }
}
