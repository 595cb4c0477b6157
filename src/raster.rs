//! Dense elevation raster and the inverse-distance-weighting sampler.

use crate::domain::Domain;
use crate::error::PlanError;
use crate::point::Point;

/// Default IDW distance exponent.
pub const DEFAULT_IDW_POWER: f64 = 2.0;
/// Default coincidence epsilon, in domain units.
pub const DEFAULT_IDW_EPS: f64 = 1e-6;

/// A row-major grid of estimated elevations.
///
/// Cell `(i, j)` lives at `values[j * cols + i]`. A `NaN` value means
/// "undefined" (no contribution reached that cell). Owned exclusively by
/// the pipeline invocation that produced it; never mutated once returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub cols: usize,
    pub rows: usize,
    pub values: Vec<f64>,
}

impl Raster {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            values: vec![f64::NAN; cols * rows],
        }
    }

    #[inline(always)]
    pub fn idx(&self, i: usize, j: usize) -> usize {
        j * self.cols + i
    }

    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[j * self.cols + i]
    }

    /// Minimum and maximum over the defined (non-NaN) cells, if any.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in &self.values {
            if v.is_nan() {
                continue;
            }
            min = min.min(v);
            max = max.max(v);
        }
        (min <= max).then_some((min, max))
    }
}

/// Samples a `cols x rows` lattice over `domain` by inverse-distance
/// weighting of `points`.
///
/// Cell centers span the domain edge-to-edge: column `i` sits at
/// `min_x + i/(cols-1) * span_x`, and likewise for rows, so the lattice is
/// the exact inverse of [`crate::mapper::grid_to_domain`].
///
/// A cell within `eps` of an input point takes that point's elevation
/// exactly, which also avoids the 1/0 singularity. An empty point set
/// produces an all-NaN raster (0/0), never an error.
///
/// Pure: identical inputs produce bit-identical output.
pub fn rasterize_idw(
    points: &[Point],
    domain: &Domain,
    cols: usize,
    rows: usize,
    power: f64,
    eps: f64,
) -> Result<Raster, PlanError> {
    if cols < 2 || rows < 2 {
        return Err(PlanError::GridTooSmall { cols, rows });
    }
    if !(power > 0.0) || !power.is_finite() {
        return Err(PlanError::BadIdwPower { power });
    }

    let mut raster = Raster::new(cols, rows);
    let dx = domain.span_x() / (cols - 1) as f64;
    let dy = domain.span_y() / (rows - 1) as f64;
    let eps2 = eps * eps;
    let half_power = power / 2.0;

    for j in 0..rows {
        let y = domain.min_y + j as f64 * dy;
        for i in 0..cols {
            let x = domain.min_x + i as f64 * dx;

            let mut num = 0.0;
            let mut den = 0.0;
            let mut exact = None;
            for p in points {
                let ddx = x - p.x;
                let ddy = y - p.y;
                let d2 = ddx * ddx + ddy * ddy;
                if d2 < eps2 {
                    exact = Some(p.z);
                    break;
                }
                let w = 1.0 / (d2 + eps).powf(half_power);
                num += w * p.z;
                den += w;
            }

            raster.values[j * cols + i] = match exact {
                Some(z) => z,
                // den == 0.0 only for an empty point set; 0/0 is the NaN
                // "undefined" cell the contour extractor expects.
                None => num / den,
            };
        }
    }
    Ok(raster)
}
