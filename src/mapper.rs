//! Coordinate mappings between grid-index, domain, and output spaces.
//!
//! Two independent, composable linear layers: grid index ↔ domain
//! coordinate (the inverse of the rasterizer's sampling lattice), and
//! domain ↔ output space. The output layer handles axis swap, Y-axis
//! inversion, margin-based scale-to-rect, and fit-to-page at a fixed
//! real-world map scale.

use crate::domain::Domain;

/// Maps a fractional grid index to its domain coordinate.
///
/// Column `i` of a `cols`-wide lattice sits at
/// `min_x + i/(cols-1) * span_x`; this is the exact inverse of the
/// sampling done by the IDW rasterizer.
pub fn grid_to_domain(domain: &Domain, cols: usize, rows: usize, gx: f64, gy: f64) -> (f64, f64) {
    let x = domain.min_x + gx / (cols - 1) as f64 * domain.span_x();
    let y = domain.min_y + gy / (rows - 1) as f64 * domain.span_y();
    (x, y)
}

/// Inverse of [`grid_to_domain`].
pub fn domain_to_grid(domain: &Domain, cols: usize, rows: usize, x: f64, y: f64) -> (f64, f64) {
    let gx = (x - domain.min_x) / nonzero(domain.span_x()) * (cols - 1) as f64;
    let gy = (y - domain.min_y) / nonzero(domain.span_y()) * (rows - 1) as f64;
    (gx, gy)
}

fn nonzero(d: f64) -> f64 {
    if d == 0.0 { 1.0 } else { d }
}

/// A 1-D linear map from a domain interval to a range interval.
///
/// A zero-width domain maps everything to `r0` plus the raw offset (the
/// divisor falls back to 1) rather than dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinScale {
    pub d0: f64,
    pub d1: f64,
    pub r0: f64,
    pub r1: f64,
}

impl LinScale {
    pub fn new(d0: f64, d1: f64, r0: f64, r1: f64) -> Self {
        Self { d0, d1, r0, r1 }
    }

    #[inline]
    pub fn apply(&self, v: f64) -> f64 {
        self.r0 + (v - self.d0) * (self.r1 - self.r0) / nonzero(self.d1 - self.d0)
    }
}

/// Domain → output-space mapping over a rectangular viewport.
///
/// `swap_xy` exchanges the X/Y coordinates of incoming points before any
/// other transform. `invert_y` selects whether increasing survey Y runs
/// toward the top of the output (`true`, the geodetic convention) or
/// toward the bottom.
#[derive(Debug, Clone, Copy)]
pub struct OutputMap {
    swap_xy: bool,
    x: LinScale,
    y: LinScale,
}

impl OutputMap {
    /// Scale-to-rect: maps `domain` into a `width` x `height` box, inset
    /// by `margin` on all sides.
    pub fn fit_rect(
        domain: &Domain,
        width: f64,
        height: f64,
        margin: f64,
        swap_xy: bool,
        invert_y: bool,
    ) -> Self {
        let x = LinScale::new(domain.min_x, domain.max_x, margin, width - margin);
        let y = if invert_y {
            LinScale::new(domain.min_y, domain.max_y, height - margin, margin)
        } else {
            LinScale::new(domain.min_y, domain.max_y, margin, height - margin)
        };
        Self { swap_xy, x, y }
    }

    /// Maps one domain point into the output space.
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let (x, y) = if self.swap_xy { (y, x) } else { (x, y) };
        (self.x.apply(x), self.y.apply(y))
    }
}

/// Fixed page geometry for print export, in physical units (millimeters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSpec {
    pub width_mm: f64,
    pub height_mm: f64,
    pub margin_mm: f64,
    /// Requested map scale denominator: 200 means 1:200.
    pub scale_denom: f64,
}

impl PageSpec {
    /// Landscape A2 at 1:200, the standard print setup.
    pub fn a2_landscape_1_200() -> Self {
        Self {
            width_mm: 594.0,
            height_mm: 420.0,
            margin_mm: 10.0,
            scale_denom: 200.0,
        }
    }
}

/// Result of fitting a domain onto a fixed page at a requested scale.
#[derive(Debug, Clone)]
pub struct PageLayout {
    /// Size of the plotted domain on the page, in mm.
    pub content_w_mm: f64,
    pub content_h_mm: f64,
    /// Scale denominator actually achieved (equals the request when the
    /// domain fits).
    pub effective_denom: f64,
    /// True when the requested scale had to be shrunk to fit.
    pub approximate: bool,
    /// Domain → page-mm mapping, Y up on paper.
    pub map: OutputMap,
    page: PageSpec,
}

impl PageLayout {
    /// Computes the page layout for `domain` on `page`.
    ///
    /// `desired = span * mm_per_unit` at the requested scale (domain units
    /// are assumed to be meters, so 1:200 gives 5 mm per meter). If the
    /// desired size exceeds the usable plot area on either axis, both axes
    /// shrink uniformly by the limiting ratio and the effective scale is
    /// reported as approximate instead of failing.
    pub fn fit(domain: &Domain, page: PageSpec, swap_xy: bool) -> Self {
        let plot_w = page.width_mm - 2.0 * page.margin_mm;
        let plot_h = page.height_mm - 2.0 * page.margin_mm;

        let (span_x, span_y) = if swap_xy {
            (domain.span_y(), domain.span_x())
        } else {
            (domain.span_x(), domain.span_y())
        };

        let mm_per_unit = 1000.0 / page.scale_denom;
        let mut desired_w = span_x * mm_per_unit;
        let mut desired_h = span_y * mm_per_unit;

        let fit = (plot_w / desired_w).min(plot_h / desired_h);
        let mut shrink = 1.0;
        if fit < 1.0 {
            shrink = fit;
            desired_w *= fit;
            desired_h *= fit;
        }

        let m = page.margin_mm;
        let x = if swap_xy {
            LinScale::new(domain.min_y, domain.max_y, m, m + desired_w)
        } else {
            LinScale::new(domain.min_x, domain.max_x, m, m + desired_w)
        };
        // Survey Y grows upward; page Y grows downward, so flip.
        let y = if swap_xy {
            LinScale::new(domain.min_x, domain.max_x, m + desired_h, m)
        } else {
            LinScale::new(domain.min_y, domain.max_y, m + desired_h, m)
        };

        Self {
            content_w_mm: desired_w,
            content_h_mm: desired_h,
            effective_denom: page.scale_denom / shrink,
            approximate: shrink < 1.0,
            map: OutputMap { swap_xy, x, y },
            page,
        }
    }

    pub fn page(&self) -> PageSpec {
        self.page
    }

    /// Human-readable scale caption: `1:200`, or `~1:407` when shrunk.
    pub fn scale_label(&self) -> String {
        if self.approximate {
            format!("~1:{:.0}", self.effective_denom)
        } else {
            format!("1:{:.0}", self.effective_denom)
        }
    }
}
