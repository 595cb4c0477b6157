//! Padded bounding rectangle derived from a point set.

use crate::error::PlanError;
use crate::point::Point;

/// The rectangular extent used for rasterization and display.
///
/// Derived, never mutated after computation; recompute whenever the point
/// set changes. Invariant: `min_x <= max_x` and `min_y <= max_y`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Domain {
    /// Width of the domain in survey units.
    pub fn span_x(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the domain in survey units.
    pub fn span_y(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Computes the domain of a point set, padding each axis by 10% of its
/// span. A zero span falls back to an absolute pad of 1.0 so a single
/// point (or a collinear row) still yields a usable rectangle.
///
/// An empty point set is a hard error rather than a substituted default
/// domain: silently inventing an extent can mask upstream bugs.
pub fn compute_domain(points: &[Point]) -> Result<Domain, PlanError> {
    if points.is_empty() {
        return Err(PlanError::EmptyPointSet);
    }

    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }

    let pad_x = pad_for_span(max_x - min_x);
    let pad_y = pad_for_span(max_y - min_y);
    Ok(Domain {
        min_x: min_x - pad_x,
        max_x: max_x + pad_x,
        min_y: min_y - pad_y,
        max_y: max_y + pad_y,
    })
}

fn pad_for_span(span: f64) -> f64 {
    let pad = span * 0.1;
    if pad == 0.0 { 1.0 } else { pad }
}

/// Minimum and maximum elevation over a point set.
pub fn elevation_range(points: &[Point]) -> Result<(f64, f64), PlanError> {
    if points.is_empty() {
        return Err(PlanError::EmptyPointSet);
    }
    let mut min_z = f64::INFINITY;
    let mut max_z = f64::NEG_INFINITY;
    for p in points {
        min_z = min_z.min(p.z);
        max_z = max_z.max(p.z);
    }
    Ok((min_z, max_z))
}
