//! Inverse-distance interpolation over scattered geographic samples.
#![forbid(unsafe_code)]

mod kdtree;

pub use kdtree::Neighbor;

use rayon::prelude::*;
use strata_geom::GeoPoint;
use thiserror::Error;

use crate::kdtree::KdTree;

/// A geographic coordinate with a scalar value attached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub point: GeoPoint,
    pub value: f64,
}

impl Sample {
    #[inline]
    pub const fn new(x: f64, y: f64, value: f64) -> Self {
        Self {
            point: GeoPoint::new(x, y),
            value,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InterpError {
    #[error("interpolation needs at least one sample")]
    EmptySampleSet,
    #[error("invalid interpolation parameter: {0}")]
    InvalidParameter(String),
}

/// Inverse-distance weighting parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IdwParams {
    /// Neighbours consulted per query point.
    pub neighbors: usize,
    pub power: f64,
    /// Added to `d^power` so nearby samples cannot dominate without bound.
    pub epsilon: f64,
}

impl Default for IdwParams {
    fn default() -> Self {
        Self {
            neighbors: 11,
            power: 1.0,
            epsilon: 0.1,
        }
    }
}

impl IdwParams {
    pub fn validate(&self) -> Result<(), InterpError> {
        if self.neighbors == 0 {
            return Err(InterpError::InvalidParameter("neighbors must be > 0".into()));
        }
        if !self.power.is_finite() || self.power < 0.0 {
            return Err(InterpError::InvalidParameter(format!(
                "power must be finite and >= 0, got {}",
                self.power
            )));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(InterpError::InvalidParameter(format!(
                "epsilon must be finite and >= 0, got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

/// Batched queries below this size stay on the calling thread.
const PAR_MIN_LEN: usize = 256;

/// Read-only spatial index over a fixed sample set.
pub struct InterpolationTree {
    samples: Vec<Sample>,
    index: KdTree,
}

impl InterpolationTree {
    pub fn build(samples: Vec<Sample>) -> Result<Self, InterpError> {
        if samples.is_empty() {
            return Err(InterpError::EmptySampleSet);
        }
        if let Some(i) = samples
            .iter()
            .position(|s| !s.point.x.is_finite() || !s.point.y.is_finite())
        {
            return Err(InterpError::InvalidParameter(format!(
                "sample {i} has non-finite coordinates"
            )));
        }
        let points: Vec<GeoPoint> = samples.iter().map(|s| s.point).collect();
        let index = KdTree::build(&points);
        Ok(Self { samples, index })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// The `k` samples closest to `point`, ascending by `(distance, index)`.
    /// Returns every sample when fewer than `k` exist.
    pub fn nearest(&self, point: GeoPoint, k: usize) -> Vec<Neighbor> {
        self.index.nearest(point, k)
    }

    /// Interpolated value at a single point.
    pub fn query_one(&self, point: GeoPoint, params: &IdwParams) -> Result<f64, InterpError> {
        params.validate()?;
        Ok(self.weighted(point, params))
    }

    /// Interpolated values at `points`, in input order.
    pub fn query(&self, points: &[GeoPoint], params: &IdwParams) -> Result<Vec<f64>, InterpError> {
        params.validate()?;
        Ok(points
            .par_iter()
            .with_min_len(PAR_MIN_LEN)
            .map(|p| self.weighted(*p, params))
            .collect())
    }

    fn weighted(&self, point: GeoPoint, params: &IdwParams) -> f64 {
        let near = self.index.nearest(point, params.neighbors);
        // Exact hit: return the sample value untouched.
        if let Some(first) = near.first() {
            if first.distance == 0.0 {
                return self.samples[first.index].value;
            }
        }
        let mut num = 0.0;
        let mut den = 0.0;
        for n in &near {
            let w = 1.0 / (n.distance.powf(params.power) + params.epsilon);
            // d^power underflowed with no epsilon: as good as an exact hit.
            if w.is_infinite() {
                return self.samples[n.index].value;
            }
            num += w * self.samples[n.index].value;
            den += w;
        }
        if den > 0.0 {
            num / den
        } else {
            // Every weight underflowed to zero; use the plain mean.
            let sum: f64 = near.iter().map(|n| self.samples[n.index].value).sum();
            sum / near.len() as f64
        }
    }
}
