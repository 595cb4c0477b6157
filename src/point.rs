//! Survey point records and their text interchange format.
//!
//! One record per line, fields split on comma, semicolon, tab, or runs of
//! spaces: `x y z [id]`. An optional header line (anything matching an
//! `x…y…z` pattern, case-insensitive) is skipped. Malformed lines are
//! discarded silently; the parser is tolerant by design so a pasted or
//! imported file never aborts the pipeline.

/// A single survey point. Immutable once added; identity is `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(id: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            z,
        }
    }
}

/// Returns true when `line` looks like a column header rather than data.
///
/// Heuristic: the letters x, y, z appear in that order,
/// case-insensitively, with anything between them.
fn is_header_line(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    let Some(xi) = lower.find('x') else {
        return false;
    };
    let Some(yi) = lower[xi + 1..].find('y') else {
        return false;
    };
    lower[xi + 1 + yi + 1..].contains('z')
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(|c: char| c == ',' || c == ';' || c == '\t' || c == ' ')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parses point records from text.
///
/// Lines with fewer than 3 numeric fields, or any non-finite coordinate,
/// are skipped. A missing id defaults to a positional placeholder `P<n>`
/// counted over the parsed lines.
pub fn parse_points(text: &str) -> Vec<Point> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut pts = Vec::new();
    let mut line_no = 0usize;
    for (i, line) in lines.iter().enumerate() {
        if i == 0 && is_header_line(line) {
            continue;
        }
        line_no += 1;

        let fields = split_fields(line);
        if fields.len() < 3 {
            continue;
        }

        let parsed: Option<(f64, f64, f64)> = (|| {
            let x: f64 = fields[0].parse().ok()?;
            let y: f64 = fields[1].parse().ok()?;
            let z: f64 = fields[2].parse().ok()?;
            (x.is_finite() && y.is_finite() && z.is_finite()).then_some((x, y, z))
        })();

        let Some((x, y, z)) = parsed else {
            continue;
        };

        let id = fields
            .get(3)
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("P{line_no}"));
        pts.push(Point { id, x, y, z });
    }
    pts
}

/// Serializes points as `x;y;z;id` records, header first, current order.
///
/// Reparsing the output yields the same `(x, y, z, id)` tuples.
pub fn export_points(points: &[Point]) -> String {
    let mut out = String::from("x;y;z;id\n");
    for p in points {
        out.push_str(&format!("{};{};{};{}\n", p.x, p.y, p.z, p.id));
    }
    out
}
