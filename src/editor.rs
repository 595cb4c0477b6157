//! Interactive editing session state.
//!
//! Points are addressed by index into an explicit array, connectors are
//! index pairs, and the selection is a plain `Option<usize>` carried by
//! the session value. The pipeline itself never sees any of this; it only
//! receives the point slice.

use crate::point::Point;

/// One editing session: survey points, line connectors between them, and
/// the currently selected point.
#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    points: Vec<Point>,
    /// Connector endpoints as point indices, stored low index first.
    connectors: Vec<(usize, usize)>,
    selected: Option<usize>,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_points(points: Vec<Point>) -> Self {
        Self {
            points,
            connectors: Vec::new(),
            selected: None,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn connectors(&self) -> &[(usize, usize)] {
        &self.connectors
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Adds a point with the elevation given as raw user text. Non-numeric
    /// or non-finite text is rejected here so an invalid elevation never
    /// reaches the pipeline. Returns the new point's index.
    pub fn add_point(&mut self, x: f64, y: f64, elevation_text: &str) -> Option<usize> {
        let z: f64 = elevation_text.trim().parse().ok()?;
        if !z.is_finite() {
            return None;
        }
        let id = format!("P{}", self.points.len() + 1);
        self.points.push(Point::new(id, x, y, z));
        Some(self.points.len() - 1)
    }

    /// Removes the point at `index`, dropping its incident connectors and
    /// shifting the indices of the connectors that survive.
    pub fn remove_point(&mut self, index: usize) -> bool {
        if index >= self.points.len() {
            return false;
        }
        self.points.remove(index);
        self.connectors.retain(|&(a, b)| a != index && b != index);
        for c in &mut self.connectors {
            if c.0 > index {
                c.0 -= 1;
            }
            if c.1 > index {
                c.1 -= 1;
            }
        }
        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        true
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.points.len() {
            return false;
        }
        self.selected = Some(index);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Connects two points. Self-pairs, out-of-range indices, and
    /// duplicates of an existing connector are rejected.
    pub fn connect(&mut self, a: usize, b: usize) -> bool {
        if a == b || a >= self.points.len() || b >= self.points.len() {
            return false;
        }
        let pair = (a.min(b), a.max(b));
        if self.connectors.contains(&pair) {
            return false;
        }
        self.connectors.push(pair);
        true
    }
}
