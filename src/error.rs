//! Error types for the contour pipeline.

use thiserror::Error;

/// Errors raised when a caller violates a pipeline precondition.
///
/// Degenerate *data* (malformed point lines, zero-span domains, a
/// non-positive contour step, NaN raster cells) is handled inline by the
/// individual stages and never surfaces here.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The point set is empty, so no domain can be derived from it.
    #[error("cannot compute a domain from an empty point set")]
    EmptyPointSet,

    /// The requested raster lattice is too small to interpolate over.
    #[error("raster grid must be at least 2x2, got {cols}x{rows}")]
    GridTooSmall {
        /// Requested column count.
        cols: usize,
        /// Requested row count.
        rows: usize,
    },

    /// The IDW distance exponent must be positive and finite.
    #[error("IDW power must be > 0 and finite, got {power}")]
    BadIdwPower {
        /// Requested exponent.
        power: f64,
    },
}
