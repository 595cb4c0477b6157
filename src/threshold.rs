//! Contour level selection and the major/minor classifier.

/// Default "every Nth level is major" ordinal.
pub const DEFAULT_MAJOR_EVERY: usize = 5;

/// Rounds to 6 decimal places to suppress floating-point drift in the
/// generated level values.
fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

/// Builds the ascending contour level list for `[min_z, max_z]` at `step`.
///
/// Levels run from `floor(min_z/step)*step` up to and including the first
/// value `>= ceil(max_z/step)*step`, with constant spacing. A non-positive
/// or non-finite step is degenerate input, not an error: the result is
/// simply empty and downstream renders no contours.
pub fn build_thresholds(min_z: f64, max_z: f64, step: f64) -> Vec<f64> {
    if !step.is_finite() || step <= 0.0 {
        return Vec::new();
    }
    if !min_z.is_finite() || !max_z.is_finite() || max_z < min_z {
        return Vec::new();
    }

    let start = (min_z / step).floor() * step;
    let end = (max_z / step).ceil() * step;
    // Counted stepping instead of accumulation keeps the spacing constant
    // and guarantees the end value is included.
    let n = ((end - start) / step).round() as usize;
    (0..=n).map(|i| round6(start + i as f64 * step)).collect()
}

/// True when the level at ordinal `index` should be drawn as a major
/// contour: every `major_every`-th level, or any level within 1e-6 of a
/// whole number. Styling only; never affects geometry.
///
/// `major_every == 0` disables the ordinal rule rather than dividing by
/// zero.
pub fn is_major_level(index: usize, value: f64, major_every: usize) -> bool {
    if major_every != 0 && index % major_every == 0 {
        return true;
    }
    (value - value.round()).abs() < 1e-6
}
