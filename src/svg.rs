//! SVG output: path-data serialization and the screen/page documents.
//!
//! The core hands over rings in grid-index space; everything here is
//! projection plus string assembly. The page writer produces the fixed
//! 594x420 mm landscape sheet at 1:200 (shrunk with an approximate scale
//! caption when the domain does not fit).

use crate::contour::Contour;
use crate::domain::Domain;
use crate::mapper::{OutputMap, PageLayout, PageSpec, grid_to_domain};
use crate::point::Point;
use crate::threshold::is_major_level;

/// Everything a renderer needs, borrowed from one pipeline result.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub points: &'a [Point],
    pub domain: &'a Domain,
    /// Raster lattice size the contour rings are indexed against.
    pub grid: (usize, usize),
    pub contours: &'a [Contour],
}

/// Presentation knobs shared by the screen and page writers.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub invert_y: bool,
    pub show_grid: bool,
    /// Coordinate grid spacing in survey units.
    pub grid_spacing: f64,
    pub show_points: bool,
    pub show_labels: bool,
    pub major_every: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            invert_y: true,
            show_grid: true,
            grid_spacing: 25.0,
            show_points: true,
            show_labels: true,
            major_every: 5,
        }
    }
}

/// Serializes one ring as SVG path data, `M x0 y0 L x1 y1 … Z`, applying
/// `project` to each grid-space vertex.
pub fn ring_path_data(
    ring: &[(f64, f64)],
    mut project: impl FnMut(f64, f64) -> (f64, f64),
) -> String {
    let mut d = String::new();
    for (k, &(gx, gy)) in ring.iter().enumerate() {
        let (x, y) = project(gx, gy);
        if k == 0 {
            d.push_str("M ");
        } else {
            d.push_str(" L ");
        }
        d.push_str(&fmt_coord(x));
        d.push(' ');
        d.push_str(&fmt_coord(y));
    }
    d.push_str(" Z");
    d
}

/// Grid-line positions spanning `[min, max]` snapped outward to whole
/// multiples of `spacing`. Empty for a degenerate spacing.
pub fn grid_line_positions(min: f64, max: f64, spacing: f64) -> Vec<f64> {
    if !spacing.is_finite() || spacing <= 0.0 {
        return Vec::new();
    }
    let start = (min / spacing).floor() * spacing;
    let end = (max / spacing).ceil() * spacing;
    let n = ((end - start) / spacing).round() as usize;
    (0..=n).map(|i| start + i as f64 * spacing).collect()
}

/// Output coordinates at 1/100 precision, trailing zeros trimmed.
fn fmt_coord(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Label formatting: exponential for very large/small magnitudes,
/// otherwise plain with up to two decimals.
pub fn fmt_num(n: f64) -> String {
    let a = n.abs();
    if a >= 1000.0 || (a > 0.0 && a < 0.01) {
        return format!("{n:.2e}");
    }
    if n == n.round() {
        format!("{}", n as i64)
    } else {
        let s = format!("{n:.2}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

pub fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn project_through<'a>(
    domain: &'a Domain,
    grid: (usize, usize),
    map: &'a OutputMap,
) -> impl FnMut(f64, f64) -> (f64, f64) + 'a {
    move |gx, gy| {
        let (x, y) = grid_to_domain(domain, grid.0, grid.1, gx, gy);
        map.apply(x, y)
    }
}

fn contour_layer(
    out: &mut Vec<String>,
    scene: &Scene,
    map: &OutputMap,
    opt: &RenderOptions,
    major_width: f64,
    minor_width: f64,
    label_font: f64,
) {
    for (i, cont) in scene.contours.iter().enumerate() {
        let major = is_major_level(i, cont.value, opt.major_every);
        let stroke = if major { "#334155" } else { "#64748b" };
        let sw = if major { major_width } else { minor_width };
        for ring in &cont.rings {
            let d = ring_path_data(ring, project_through(scene.domain, scene.grid, map));
            out.push(format!(
                r##"<path d="{d}" fill="none" stroke="{stroke}" stroke-width="{sw}"/>"##
            ));
        }
        // One elevation label per contour, at the midpoint of its first ring.
        if opt.show_labels {
            if let Some(ring) = cont.rings.first() {
                if ring.len() > 2 {
                    let (gx, gy) = ring[ring.len() / 2];
                    let (x, y) = grid_to_domain(scene.domain, scene.grid.0, scene.grid.1, gx, gy);
                    let (sx, sy) = map.apply(x, y);
                    out.push(format!(
                        r##"<text x="{}" y="{}" font-size="{label_font}" text-anchor="middle" fill="#0f172a" font-family="sans-serif">{}</text>"##,
                        fmt_coord(sx),
                        fmt_coord(sy),
                        xml_escape(&fmt_num(cont.value)),
                    ));
                }
            }
        }
    }
}

fn grid_layer(
    out: &mut Vec<String>,
    scene: &Scene,
    map: &OutputMap,
    opt: &RenderOptions,
    frame: (f64, f64, f64, f64),
    line_width: f64,
    label_font: f64,
) {
    let (l, t, r, b) = frame;
    for xv in grid_line_positions(scene.domain.min_x, scene.domain.max_x, opt.grid_spacing) {
        let (sx, _) = map.apply(xv, scene.domain.min_y);
        if sx < l || sx > r {
            continue;
        }
        out.push(format!(
            r##"<line x1="{0}" y1="{1}" x2="{0}" y2="{2}" stroke="#f1f5f9" stroke-width="{line_width}"/>"##,
            fmt_coord(sx),
            fmt_coord(t),
            fmt_coord(b),
        ));
        out.push(format!(
            r##"<text x="{}" y="{}" font-size="{label_font}" text-anchor="middle" fill="#475569" font-family="sans-serif">{}</text>"##,
            fmt_coord(sx),
            fmt_coord(b + label_font),
            xml_escape(&fmt_num(xv)),
        ));
    }
    for yv in grid_line_positions(scene.domain.min_y, scene.domain.max_y, opt.grid_spacing) {
        let (_, sy) = map.apply(scene.domain.min_x, yv);
        if sy < t || sy > b {
            continue;
        }
        out.push(format!(
            r##"<line x1="{1}" y1="{0}" x2="{2}" y2="{0}" stroke="#f1f5f9" stroke-width="{line_width}"/>"##,
            fmt_coord(sy),
            fmt_coord(l),
            fmt_coord(r),
        ));
        out.push(format!(
            r##"<text x="{}" y="{}" font-size="{label_font}" text-anchor="end" fill="#475569" font-family="sans-serif">{}</text>"##,
            fmt_coord(l - 1.0),
            fmt_coord(sy + label_font * 0.35),
            xml_escape(&fmt_num(yv)),
        ));
    }
}

fn point_layer(
    out: &mut Vec<String>,
    scene: &Scene,
    map: &OutputMap,
    opt: &RenderOptions,
    radius: f64,
    label_font: f64,
) {
    for p in scene.points {
        let (sx, sy) = map.apply(p.x, p.y);
        out.push(format!(
            r##"<circle cx="{}" cy="{}" r="{radius}" fill="#0ea5e9" stroke="#0369a1"/>"##,
            fmt_coord(sx),
            fmt_coord(sy),
        ));
        if opt.show_labels {
            out.push(format!(
                r##"<text x="{}" y="{}" font-size="{label_font}" fill="#0f172a" font-family="sans-serif">{} ({}, {}) {}</text>"##,
                fmt_coord(sx + radius + 2.0),
                fmt_coord(sy - radius - 2.0),
                xml_escape(&p.id),
                xml_escape(&fmt_num(p.x)),
                xml_escape(&fmt_num(p.y)),
                xml_escape(&fmt_num(p.z)),
            ));
        }
    }
}

/// Renders the interactive screen view as a standalone SVG document of
/// `width` x `height` pixels with a fixed 60 px plot margin.
pub fn render_screen(scene: &Scene, opt: &RenderOptions, width: f64, height: f64) -> String {
    let margin = 60.0;
    let map = OutputMap::fit_rect(scene.domain, width, height, margin, false, opt.invert_y);
    let frame = (margin, margin, width - margin, height - margin);

    let mut out = Vec::new();
    out.push(format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"##
    ));
    out.push(format!(
        r##"<rect x="0" y="0" width="{width}" height="{height}" fill="#fafafa"/>"##
    ));
    out.push(format!(
        r##"<rect x="{margin}" y="{margin}" width="{}" height="{}" fill="#fff" stroke="#e5e7eb"/>"##,
        width - 2.0 * margin,
        height - 2.0 * margin,
    ));
    if opt.show_grid {
        grid_layer(&mut out, scene, &map, opt, frame, 1.0, 10.0);
    }
    contour_layer(&mut out, scene, &map, opt, 1.6, 0.9, 10.0);
    if opt.show_points {
        point_layer(&mut out, scene, &map, opt, 3.5, 11.0);
    }
    out.push("</svg>".to_string());
    out.join("\n")
}

/// Renders the fixed-scale print sheet. Millimeter user units throughout.
pub fn render_page(scene: &Scene, opt: &RenderOptions, page: PageSpec) -> String {
    let layout = PageLayout::fit(scene.domain, page, false);
    let m = page.margin_mm;
    let frame = (m, m, m + layout.content_w_mm, m + layout.content_h_mm);

    let mut out = Vec::new();
    out.push(format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{0}mm" height="{1}mm" viewBox="0 0 {0} {1}">"##,
        page.width_mm, page.height_mm,
    ));
    out.push(format!(
        r##"<rect x="0" y="0" width="{}" height="{}" fill="white"/>"##,
        page.width_mm, page.height_mm,
    ));
    out.push(format!(
        r##"<text x="{}" y="{}" font-family="sans-serif" font-size="6">{} | {}x{} mm</text>"##,
        fmt_coord(m),
        fmt_coord(page.height_mm - m / 2.0),
        xml_escape(&layout.scale_label()),
        page.width_mm,
        page.height_mm,
    ));
    out.push(format!(
        r##"<rect x="{}" y="{}" width="{}" height="{}" fill="white" stroke="#E5E7EB"/>"##,
        fmt_coord(m),
        fmt_coord(m),
        fmt_coord(layout.content_w_mm),
        fmt_coord(layout.content_h_mm),
    ));
    if opt.show_grid {
        grid_layer(&mut out, scene, &layout.map, opt, frame, 0.2, 3.0);
    }
    contour_layer(&mut out, scene, &layout.map, opt, 0.4, 0.25, 3.0);
    if opt.show_points {
        point_layer(&mut out, scene, &layout.map, opt, 1.0, 3.0);
    }
    out.push("</svg>".to_string());
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::extract_contour;
    use crate::test_helpers::raster_from_rows;

    fn unit_domain() -> Domain {
        Domain {
            min_x: 0.0,
            max_x: 1.0,
            min_y: 0.0,
            max_y: 1.0,
        }
    }

    #[test]
    fn ring_path_data_is_move_lines_close() {
        let ring = vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 0.0)];
        let d = ring_path_data(&ring, |x, y| (x * 10.0, y * 10.0));
        assert_eq!(d, "M 0 0 L 20 0 L 20 20 L 0 0 Z");
    }

    #[test]
    fn coords_are_trimmed_to_two_decimals() {
        assert_eq!(fmt_coord(1.0), "1");
        assert_eq!(fmt_coord(1.25), "1.25");
        assert_eq!(fmt_coord(1.256), "1.26");
        assert_eq!(fmt_coord(-0.001), "0");
    }

    #[test]
    fn grid_line_positions_snap_outward() {
        assert_eq!(grid_line_positions(-10.0, 110.0, 25.0), vec![
            -25.0, 0.0, 25.0, 50.0, 75.0, 100.0, 125.0
        ]);
        assert!(grid_line_positions(0.0, 10.0, 0.0).is_empty());
        assert!(grid_line_positions(0.0, 10.0, -5.0).is_empty());
    }

    #[test]
    fn fmt_num_switches_notation_by_magnitude() {
        assert_eq!(fmt_num(42.0), "42");
        assert_eq!(fmt_num(42.5), "42.5");
        assert_eq!(fmt_num(0.0), "0");
        assert!(fmt_num(12345.0).contains('e'));
        assert!(fmt_num(0.0001).contains('e'));
    }

    #[test]
    fn xml_escape_covers_markup_characters() {
        assert_eq!(xml_escape("a<b>&c"), "a&lt;b&gt;&amp;c");
    }

    #[test]
    fn screen_document_contains_contour_paths() {
        let raster = raster_from_rows(&[&[0.0, 1.0], &[0.0, 1.0]]);
        let contours = vec![extract_contour(&raster, 0.5)];
        let points = vec![Point::new("P1", 0.25, 0.5, 0.4)];
        let domain = unit_domain();
        let scene = Scene {
            points: &points,
            domain: &domain,
            grid: (2, 2),
            contours: &contours,
        };
        let doc = render_screen(&scene, &RenderOptions::default(), 800.0, 600.0);
        assert!(doc.starts_with("<svg"));
        assert!(doc.ends_with("</svg>"));
        assert!(doc.contains("<path d=\"M "));
        assert!(doc.contains("Z\""));
        assert!(doc.contains("<circle"));
        assert!(doc.contains("P1"));
    }

    #[test]
    fn page_document_carries_the_scale_caption() {
        let raster = raster_from_rows(&[&[0.0, 1.0], &[0.0, 1.0]]);
        let contours = vec![extract_contour(&raster, 0.5)];
        let domain = Domain {
            min_x: 0.0,
            max_x: 40.0,
            min_y: 0.0,
            max_y: 30.0,
        };
        let scene = Scene {
            points: &[],
            domain: &domain,
            grid: (2, 2),
            contours: &contours,
        };
        let doc = render_page(&scene, &RenderOptions::default(), PageSpec::a2_landscape_1_200());
        assert!(doc.contains("1:200"));
        assert!(doc.contains("width=\"594mm\""));
        assert!(doc.contains("height=\"420mm\""));
    }

    #[test]
    fn oversized_page_export_labels_the_approximate_scale() {
        let domain = Domain {
            min_x: 0.0,
            max_x: 2000.0,
            min_y: 0.0,
            max_y: 500.0,
        };
        let scene = Scene {
            points: &[],
            domain: &domain,
            grid: (2, 2),
            contours: &[],
        };
        let doc = render_page(&scene, &RenderOptions::default(), PageSpec::a2_landscape_1_200());
        assert!(doc.contains("~1:"));
    }
}
