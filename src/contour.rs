//! Isoline extraction by marching squares.
//!
//! The raster is classified cell by cell against a threshold `t`: a corner
//! is "above" when its value is `>= t`, and any NaN corner deactivates the
//! whole cell (undefined regions never produce geometry). Each active cell
//! contributes directed segments from a 16-entry case table; crossings are
//! interpolated linearly along grid edges, canonically per edge so the two
//! cells sharing an edge agree bit-for-bit. Segments are then linked into
//! chains over shared edges; a chain closes either on its own start or by
//! running along the raster's outer boundary.
//!
//! Orientation convention: the above-region is kept on the left of the
//! walking direction (grid coordinates, y down). The boundary is walked
//! interior-on-left as well, so spliced rings never self-intersect.

use std::collections::{HashMap, HashSet};

use crate::raster::Raster;

/// A closed polyline in fractional grid-index coordinates.
/// First point equals last point.
pub type Ring = Vec<(f64, f64)>;

/// All rings extracted for one threshold. Zero rings is a valid result
/// (nothing crosses the threshold), not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub value: f64,
    pub rings: Vec<Ring>,
}

// Case table
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

/// Directed segments for one marching-squares case.
///
/// `case` packs the four corner above-bits as `TL<<3 | TR<<2 | BR<<1 | BL`.
/// Directions keep the above-region on the left. The two saddle cases (5:
/// TR+BL above, 10: TL+BR above) are disambiguated by the cell's
/// four-corner average: average above `t` connects the diagonal, average
/// below separates it into two blobs.
pub(crate) fn cell_segments(case: u8, center_above: bool) -> &'static [(Side, Side)] {
    use Side::*;
    match case {
        0 | 15 => &[],
        1 => &[(Bottom, Left)],
        2 => &[(Right, Bottom)],
        3 => &[(Right, Left)],
        4 => &[(Top, Right)],
        5 => {
            if center_above {
                // TR and BL join through the center; the below corners TL
                // and BR are cut off separately.
                &[(Top, Left), (Bottom, Right)]
            } else {
                &[(Top, Right), (Bottom, Left)]
            }
        }
        6 => &[(Top, Bottom)],
        7 => &[(Top, Left)],
        8 => &[(Left, Top)],
        9 => &[(Bottom, Top)],
        10 => {
            if center_above {
                &[(Right, Top), (Left, Bottom)]
            } else {
                &[(Left, Top), (Right, Bottom)]
            }
        }
        11 => &[(Right, Top)],
        12 => &[(Left, Right)],
        13 => &[(Bottom, Right)],
        14 => &[(Left, Bottom)],
        _ => unreachable!("case index is 4 bits"),
    }
}

// Edge identity and crossing interpolation
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Orient {
    /// Between grid nodes (x, y) and (x+1, y).
    H,
    /// Between grid nodes (x, y) and (x, y+1).
    V,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct EdgeKey {
    x: usize,
    y: usize,
    orient: Orient,
}

fn side_edge(i: usize, j: usize, side: Side) -> EdgeKey {
    match side {
        Side::Top => EdgeKey { x: i, y: j, orient: Orient::H },
        Side::Bottom => EdgeKey { x: i, y: j + 1, orient: Orient::H },
        Side::Left => EdgeKey { x: i, y: j, orient: Orient::V },
        Side::Right => EdgeKey { x: i + 1, y: j, orient: Orient::V },
    }
}

/// Crossing position on an edge, canonical operand order (lower-index
/// corner first) so both adjacent cells compute the identical point.
fn edge_point(r: &Raster, t: f64, e: EdgeKey) -> (f64, f64) {
    match e.orient {
        Orient::H => {
            let va = r.get(e.x, e.y);
            let vb = r.get(e.x + 1, e.y);
            (e.x as f64 + crossing_frac(va, vb, t), e.y as f64)
        }
        Orient::V => {
            let va = r.get(e.x, e.y);
            let vb = r.get(e.x, e.y + 1);
            (e.x as f64, e.y as f64 + crossing_frac(va, vb, t))
        }
    }
}

fn crossing_frac(va: f64, vb: f64, t: f64) -> f64 {
    // Only called for straddling endpoints, so va != vb.
    debug_assert!((va >= t) != (vb >= t));
    (t - va) / (vb - va)
}

// Extraction
// -----------------------------------------------------------------------------

/// Extracts all rings of the isoline at `t`.
pub fn extract_contour(raster: &Raster, t: f64) -> Contour {
    let mut rings = Vec::new();
    if raster.cols >= 2 && raster.rows >= 2 {
        let next = collect_segments(raster, t);
        rings = link_rings(raster, t, &next);
    }
    Contour { value: t, rings }
}

/// Extracts one `Contour` per threshold, in threshold order.
pub fn extract_contours(raster: &Raster, thresholds: &[f64]) -> Vec<Contour> {
    thresholds
        .iter()
        .map(|&t| extract_contour(raster, t))
        .collect()
}

/// Walks every cell and records its directed segments as a successor map
/// from entry edge to exit edge. Each crossed edge appears exactly once as
/// a key and at most once as a value, so chains follow uniquely.
fn collect_segments(raster: &Raster, t: f64) -> HashMap<EdgeKey, EdgeKey> {
    let mut next = HashMap::new();
    for j in 0..raster.rows - 1 {
        for i in 0..raster.cols - 1 {
            let tl = raster.get(i, j);
            let tr = raster.get(i + 1, j);
            let br = raster.get(i + 1, j + 1);
            let bl = raster.get(i, j + 1);
            if tl.is_nan() || tr.is_nan() || br.is_nan() || bl.is_nan() {
                continue;
            }

            let case = (((tl >= t) as u8) << 3)
                | (((tr >= t) as u8) << 2)
                | (((br >= t) as u8) << 1)
                | ((bl >= t) as u8);
            let center_above = (tl + tr + br + bl) * 0.25 >= t;

            for &(from, to) in cell_segments(case, center_above) {
                let prev = next.insert(side_edge(i, j, from), side_edge(i, j, to));
                debug_assert!(prev.is_none(), "edge crossed twice at one threshold");
            }
        }
    }
    next
}

struct OpenChain {
    pts: Vec<(f64, f64)>,
}

fn link_rings(r: &Raster, t: f64, next: &HashMap<EdgeKey, EdgeKey>) -> Vec<Ring> {
    let mut rings = Vec::new();
    let mut visited: HashSet<EdgeKey> = HashSet::new();
    let has_incoming: HashSet<EdgeKey> = next.values().copied().collect();

    let sort_key = |e: &EdgeKey| (e.y, e.x, matches!(e.orient, Orient::V));

    // Open chains: heads are crossings nothing flows into. Sorted for
    // deterministic output independent of hash order.
    let mut heads: Vec<EdgeKey> = next
        .keys()
        .filter(|k| !has_incoming.contains(*k))
        .copied()
        .collect();
    heads.sort_by_key(sort_key);

    let mut open = Vec::new();
    for head in heads {
        let mut pts = vec![edge_point(r, t, head)];
        visited.insert(head);
        let mut e = head;
        while let Some(&n) = next.get(&e) {
            visited.insert(n);
            pts.push(edge_point(r, t, n));
            e = n;
        }
        open.push(OpenChain { pts });
    }

    // Whatever remains forms closed loops.
    let mut loop_heads: Vec<EdgeKey> = next
        .keys()
        .filter(|k| !visited.contains(*k))
        .copied()
        .collect();
    loop_heads.sort_by_key(sort_key);

    for head in loop_heads {
        if visited.contains(&head) {
            continue;
        }
        let mut pts = vec![edge_point(r, t, head)];
        visited.insert(head);
        let mut e = next[&head];
        while e != head {
            visited.insert(e);
            pts.push(edge_point(r, t, e));
            e = next[&e];
        }
        pts.push(pts[0]);
        rings.push(pts);
    }

    rings.extend(close_open_chains(r, open));
    rings
}

/// Closes open chains along the raster's outer boundary.
///
/// The boundary rectangle is parameterized as a cycle walked with the
/// interior on the left: left edge downward, bottom edge rightward, right
/// edge upward, top edge leftward. Each chain end connects to the nearest
/// chain start forward along that cycle (possibly its own), inserting the
/// frame corners passed on the way.
fn close_open_chains(r: &Raster, open: Vec<OpenChain>) -> Vec<Ring> {
    let w = (r.cols - 1) as f64;
    let h = (r.rows - 1) as f64;
    let perim = 2.0 * (w + h);

    // Position along the boundary cycle, or None for a point in the
    // interior (a chain stranded against an undefined region).
    let boundary_pos = |p: (f64, f64)| -> Option<f64> {
        if p.0 == 0.0 {
            Some(p.1)
        } else if p.1 == h {
            Some(h + p.0)
        } else if p.0 == w {
            Some(h + w + (h - p.1))
        } else if p.1 == 0.0 {
            Some(2.0 * h + w + (w - p.0))
        } else {
            None
        }
    };

    // Cyclic forward distance in (0, perim]: a coincident position counts
    // as a full loop, never zero.
    let fwd = |from: f64, to: f64| -> f64 {
        let d = (to - from) % perim;
        if d <= 0.0 { d + perim } else { d }
    };

    let corners = [
        (0.0, (0.0, 0.0)),
        (h, (0.0, h)),
        (h + w, (w, h)),
        (2.0 * h + w, (w, 0.0)),
    ];

    struct BChain {
        start_s: f64,
        end_s: f64,
        pts: Vec<(f64, f64)>,
    }

    let mut rings = Vec::new();
    let mut chains: Vec<BChain> = Vec::new();
    for c in open {
        let start = boundary_pos(c.pts[0]);
        let end = boundary_pos(*c.pts.last().expect("chains are non-empty"));
        match (start, end) {
            (Some(start_s), Some(end_s)) => chains.push(BChain {
                start_s,
                end_s,
                pts: c.pts,
            }),
            // Both ends blocked by NaN cells: close directly on the start
            // so partial geometry next to undefined regions is kept.
            _ => {
                let mut pts = c.pts;
                pts.push(pts[0]);
                rings.push(pts);
            }
        }
    }

    while !chains.is_empty() {
        let mut cur = chains.swap_remove(0);
        loop {
            let self_d = fwd(cur.end_s, cur.start_s);
            let mut best: Option<(usize, f64)> = None;
            for (idx, c) in chains.iter().enumerate() {
                let d = fwd(cur.end_s, c.start_s);
                if best.is_none_or(|(_, bd)| d < bd) {
                    best = Some((idx, d));
                }
            }
            let (merge, d_target) = match best {
                Some((idx, d)) if d < self_d => (Some(idx), d),
                _ => (None, self_d),
            };

            // Frame corners strictly between the chain end and the target.
            let mut passed: Vec<(f64, (f64, f64))> = corners
                .iter()
                .map(|&(s, p)| (fwd(cur.end_s, s), p))
                .filter(|&(d, _)| d < d_target)
                .collect();
            passed.sort_by(|a, b| a.0.total_cmp(&b.0));
            for (_, p) in passed {
                cur.pts.push(p);
            }

            match merge {
                Some(idx) => {
                    let nx = chains.swap_remove(idx);
                    cur.pts.extend(nx.pts);
                    cur.end_s = nx.end_s;
                }
                None => {
                    cur.pts.push(cur.pts[0]);
                    rings.push(cur.pts);
                    break;
                }
            }
        }
    }

    rings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::raster_from_rows;

    // Case table entries, independent of the linker.
    // -------------------------------------------------------------------------

    #[test]
    fn empty_and_full_cases_emit_nothing() {
        assert!(cell_segments(0, false).is_empty());
        assert!(cell_segments(15, true).is_empty());
    }

    #[test]
    fn single_corner_cases_cut_that_corner_off() {
        use Side::*;
        assert_eq!(cell_segments(8, false), &[(Left, Top)]); // TL
        assert_eq!(cell_segments(4, false), &[(Top, Right)]); // TR
        assert_eq!(cell_segments(2, false), &[(Right, Bottom)]); // BR
        assert_eq!(cell_segments(1, false), &[(Bottom, Left)]); // BL
    }

    #[test]
    fn three_corner_cases_reverse_the_single_corner_direction() {
        use Side::*;
        assert_eq!(cell_segments(7, false), &[(Top, Left)]);
        assert_eq!(cell_segments(11, false), &[(Right, Top)]);
        assert_eq!(cell_segments(13, false), &[(Bottom, Right)]);
        assert_eq!(cell_segments(14, false), &[(Left, Bottom)]);
    }

    #[test]
    fn half_cell_cases_cross_straight_through() {
        use Side::*;
        assert_eq!(cell_segments(12, false), &[(Left, Right)]); // top half
        assert_eq!(cell_segments(3, false), &[(Right, Left)]); // bottom half
        assert_eq!(cell_segments(9, false), &[(Bottom, Top)]); // left half
        assert_eq!(cell_segments(6, false), &[(Top, Bottom)]); // right half
    }

    #[test]
    fn saddle_cases_follow_the_center_average() {
        use Side::*;
        assert_eq!(cell_segments(5, true), &[(Top, Left), (Bottom, Right)]);
        assert_eq!(cell_segments(5, false), &[(Top, Right), (Bottom, Left)]);
        assert_eq!(cell_segments(10, true), &[(Right, Top), (Left, Bottom)]);
        assert_eq!(cell_segments(10, false), &[(Left, Top), (Right, Bottom)]);
    }

    #[test]
    fn every_case_uses_each_side_at_most_once() {
        for case in 0..16u8 {
            for center_above in [false, true] {
                let segs = cell_segments(case, center_above);
                let mut seen = Vec::new();
                for &(a, b) in segs {
                    for s in [a, b] {
                        assert!(!seen.contains(&s), "case {case}: side used twice");
                        seen.push(s);
                    }
                }
            }
        }
    }

    // Linker and boundary closure.
    // -------------------------------------------------------------------------

    #[test]
    fn flat_field_yields_zero_rings_even_at_its_own_level() {
        let r = raster_from_rows(&[&[5.0, 5.0, 5.0], &[5.0, 5.0, 5.0], &[5.0, 5.0, 5.0]]);
        assert!(extract_contour(&r, 4.0).rings.is_empty());
        assert!(extract_contour(&r, 6.0).rings.is_empty());
        // t == k: every corner is "above", no strict crossing exists.
        assert!(extract_contour(&r, 5.0).rings.is_empty());
    }

    #[test]
    fn all_nan_raster_yields_zero_rings() {
        let nan = f64::NAN;
        let r = raster_from_rows(&[&[nan, nan], &[nan, nan]]);
        let c = extract_contour(&r, 0.5);
        assert!(c.rings.is_empty());
        assert_eq!(c.value, 0.5);
    }

    #[test]
    fn interior_peak_produces_one_closed_diamond() {
        let r = raster_from_rows(&[
            &[0.0, 0.0, 0.0, 0.0],
            &[0.0, 10.0, 0.0, 0.0],
            &[0.0, 0.0, 0.0, 0.0],
            &[0.0, 0.0, 0.0, 0.0],
        ]);
        let c = extract_contour(&r, 5.0);
        assert_eq!(c.rings.len(), 1);
        let ring = &c.rings[0];
        assert_eq!(ring.first(), ring.last());
        // Four crossings at half distance around node (1, 1), plus closure.
        assert_eq!(ring.len(), 5);
        for &(gx, gy) in &ring[..4] {
            let d = (gx - 1.0).abs() + (gy - 1.0).abs();
            assert!((d - 0.5).abs() < 1e-12, "({gx}, {gy}) not on the diamond");
        }
    }

    #[test]
    fn vertical_split_closes_along_the_boundary() {
        let r = raster_from_rows(&[&[1.0, 0.0], &[1.0, 0.0]]);
        let c = extract_contour(&r, 0.5);
        assert_eq!(c.rings.len(), 1);
        let ring = &c.rings[0];
        assert_eq!(ring.first(), ring.last());
        // Crossings at x = 0.5 on both horizontal edges, plus the two
        // left-side frame corners.
        assert!(ring.contains(&(0.5, 0.0)));
        assert!(ring.contains(&(0.5, 1.0)));
        assert!(ring.contains(&(0.0, 0.0)));
        assert!(ring.contains(&(0.0, 1.0)));
        assert!(!ring.contains(&(1.0, 0.0)));
        assert!(!ring.contains(&(1.0, 1.0)));
    }

    #[test]
    fn horizontal_band_splits_grid_into_one_boundary_ring() {
        // Bottom half above threshold across a wider raster.
        let r = raster_from_rows(&[
            &[0.0, 0.0, 0.0, 0.0],
            &[0.0, 0.0, 0.0, 0.0],
            &[1.0, 1.0, 1.0, 1.0],
            &[1.0, 1.0, 1.0, 1.0],
        ]);
        let c = extract_contour(&r, 0.5);
        assert_eq!(c.rings.len(), 1);
        let ring = &c.rings[0];
        // The crossing row sits midway between rows 1 and 2.
        for &(gx, gy) in ring {
            if gx > 0.0 && gx < 3.0 {
                assert_eq!(gy, 1.5);
            }
        }
        // Closure runs along the bottom frame, not the top.
        assert!(ring.contains(&(0.0, 3.0)));
        assert!(ring.contains(&(3.0, 3.0)));
        assert!(!ring.contains(&(0.0, 0.0)));
    }

    #[test]
    fn connected_saddle_produces_a_single_band() {
        // TL and BR corners above; average 0.55 >= t connects them.
        let r = raster_from_rows(&[&[1.1, 0.0], &[0.0, 1.1]]);
        let c = extract_contour(&r, 0.5);
        assert_eq!(c.rings.len(), 1);
    }

    #[test]
    fn separated_saddle_produces_two_blobs() {
        // Same diagonal, but low peaks: average 0.3 < t separates them.
        let r = raster_from_rows(&[&[0.6, 0.0], &[0.0, 0.6]]);
        let c = extract_contour(&r, 0.5);
        assert_eq!(c.rings.len(), 2);
        for ring in &c.rings {
            assert_eq!(ring.first(), ring.last());
        }
    }

    #[test]
    fn nan_cells_are_inactive_and_block_geometry() {
        let nan = f64::NAN;
        // The NaN node deactivates all four cells around it; the peak at
        // (1, 1) still has its left/top cells active.
        let r = raster_from_rows(&[
            &[0.0, 0.0, 0.0, 0.0],
            &[0.0, 10.0, nan, 0.0],
            &[0.0, 0.0, 0.0, 0.0],
            &[0.0, 0.0, 0.0, 0.0],
        ]);
        let c = extract_contour(&r, 5.0);
        // Cells (0,0), (0,1) stay active around the peak; cells touching
        // the NaN node emit nothing. The surviving chain is stranded in
        // the interior and closes directly on itself.
        assert_eq!(c.rings.len(), 1);
        let ring = &c.rings[0];
        assert_eq!(ring.first(), ring.last());
        for &(gx, gy) in ring {
            assert!(gx.is_finite() && gy.is_finite());
        }
    }

    #[test]
    fn threshold_above_all_values_yields_zero_rings() {
        let r = raster_from_rows(&[&[1.0, 2.0], &[3.0, 4.0]]);
        assert!(extract_contour(&r, 10.0).rings.is_empty());
        assert!(extract_contour(&r, -10.0).rings.is_empty());
    }

    #[test]
    fn extract_contours_returns_one_contour_per_threshold() {
        let r = raster_from_rows(&[&[0.0, 1.0], &[0.0, 1.0]]);
        let cs = extract_contours(&r, &[0.25, 0.5, 0.75]);
        assert_eq!(cs.len(), 3);
        assert_eq!(cs[0].value, 0.25);
        assert_eq!(cs[2].value, 0.75);
        for c in &cs {
            assert_eq!(c.rings.len(), 1);
        }
    }

    #[test]
    fn degenerate_raster_is_tolerated() {
        let r = Raster::new(1, 1);
        assert!(extract_contour(&r, 0.0).rings.is_empty());
        let r = Raster::new(0, 0);
        assert!(extract_contour(&r, 0.0).rings.is_empty());
    }

    #[test]
    fn crossing_positions_interpolate_linearly() {
        // 0 at the left node, 4 at the right: t = 1 crosses at 1/4.
        let r = raster_from_rows(&[&[0.0, 4.0], &[0.0, 4.0]]);
        let c = extract_contour(&r, 1.0);
        assert_eq!(c.rings.len(), 1);
        assert!(c.rings[0].contains(&(0.25, 0.0)));
        assert!(c.rings[0].contains(&(0.25, 1.0)));
    }
}
