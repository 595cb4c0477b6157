//! Shared fixtures for unit tests.

use crate::point::Point;
use crate::raster::Raster;

/// Builds a raster from row slices, top row first.
///
/// Rows must be non-empty and equal length; at least 2x2 so the result is
/// usable by the contour extractor.
pub fn raster_from_rows(rows: &[&[f64]]) -> Raster {
    assert!(rows.len() >= 2, "need at least two rows");
    let cols = rows[0].len();
    assert!(cols >= 2, "need at least two columns");

    let mut raster = Raster::new(cols, rows.len());
    for (j, row) in rows.iter().enumerate() {
        assert_eq!(row.len(), cols, "row {j} length mismatch");
        for (i, &v) in row.iter().enumerate() {
            let idx = raster.idx(i, j);
            raster.values[idx] = v;
        }
    }
    raster
}

/// Four survey points on a unit square, low edge at y=0, high edge at y=1.
pub fn unit_square_points() -> Vec<Point> {
    vec![
        Point::new("a", 0.0, 0.0, 0.0),
        Point::new("b", 1.0, 0.0, 0.0),
        Point::new("c", 0.0, 1.0, 1.0),
        Point::new("d", 1.0, 1.0, 1.0),
    ]
}
