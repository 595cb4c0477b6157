//! Pipeline configuration and the end-to-end contour plan run.
//!
//! `run` strings the stages together: axis swap, domain, IDW raster,
//! threshold list, contour extraction. Everything downstream of the
//! config is pure; re-run in full whenever points or settings change.

use serde::Deserialize;
use tracing::{debug, info};

use crate::contour::{Contour, extract_contours};
use crate::domain::{Domain, compute_domain, elevation_range};
use crate::error::PlanError;
use crate::point::Point;
use crate::raster::{Raster, rasterize_idw};
use crate::svg::{RenderOptions, Scene};
use crate::threshold::build_thresholds;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PlanConfig {
    #[serde(default = "default_cols")]
    pub cols: usize,
    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default = "default_power")]
    pub power: f64,
    #[serde(default = "default_eps")]
    pub eps: f64,
    #[serde(default = "default_step")]
    pub contour_step: f64,
    #[serde(default = "default_major_every")]
    pub major_every: usize,
    #[serde(default)]
    pub swap_xy: bool,
    #[serde(default = "default_true")]
    pub invert_y: bool,
    #[serde(default = "default_grid_spacing")]
    pub grid_spacing: f64,
    #[serde(default = "default_true")]
    pub show_grid: bool,
    #[serde(default = "default_true")]
    pub show_points: bool,
    #[serde(default = "default_true")]
    pub show_labels: bool,
}

fn default_cols() -> usize {
    120
}
fn default_rows() -> usize {
    120
}
fn default_power() -> f64 {
    crate::raster::DEFAULT_IDW_POWER
}
fn default_eps() -> f64 {
    crate::raster::DEFAULT_IDW_EPS
}
fn default_step() -> f64 {
    0.5
}
fn default_major_every() -> usize {
    crate::threshold::DEFAULT_MAJOR_EVERY
}
fn default_true() -> bool {
    true
}
fn default_grid_spacing() -> f64 {
    25.0
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            cols: default_cols(),
            rows: default_rows(),
            power: default_power(),
            eps: default_eps(),
            contour_step: default_step(),
            major_every: default_major_every(),
            swap_xy: false,
            invert_y: true,
            grid_spacing: default_grid_spacing(),
            show_grid: true,
            show_points: true,
            show_labels: true,
        }
    }
}

impl PlanConfig {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            invert_y: self.invert_y,
            show_grid: self.show_grid,
            grid_spacing: self.grid_spacing,
            show_points: self.show_points,
            show_labels: self.show_labels,
            major_every: self.major_every,
        }
    }
}

pub fn parse_plan_json(json_text: &str) -> Result<PlanConfig, serde_json::Error> {
    serde_json::from_str(json_text)
}

/// Everything one pipeline invocation produces. The points are the
/// working copy (axis-swapped when the config asks for it), so renderers
/// take this result as-is with no further swapping.
#[derive(Debug, Clone)]
pub struct PlanResult {
    pub points: Vec<Point>,
    pub domain: Domain,
    pub raster: Raster,
    pub levels: Vec<f64>,
    pub contours: Vec<Contour>,
}

impl PlanResult {
    pub fn scene(&self) -> Scene<'_> {
        Scene {
            points: &self.points,
            domain: &self.domain,
            grid: (self.raster.cols, self.raster.rows),
            contours: &self.contours,
        }
    }
}

/// Runs the full contour pipeline over `points`.
pub fn run(points: &[Point], config: &PlanConfig) -> Result<PlanResult, PlanError> {
    let points: Vec<Point> = if config.swap_xy {
        points
            .iter()
            .map(|p| Point::new(p.id.clone(), p.y, p.x, p.z))
            .collect()
    } else {
        points.to_vec()
    };

    let domain = compute_domain(&points)?;
    debug!(
        min_x = domain.min_x,
        max_x = domain.max_x,
        min_y = domain.min_y,
        max_y = domain.max_y,
        "computed padded domain"
    );

    let raster = rasterize_idw(
        &points,
        &domain,
        config.cols,
        config.rows,
        config.power,
        config.eps,
    )?;

    let (min_z, max_z) = elevation_range(&points)?;
    let levels = build_thresholds(min_z, max_z, config.contour_step);
    let contours = extract_contours(&raster, &levels);

    info!(
        points = points.len(),
        cols = config.cols,
        rows = config.rows,
        levels = levels.len(),
        rings = contours.iter().map(|c| c.rings.len()).sum::<usize>(),
        "contour plan complete"
    );

    Ok(PlanResult {
        points,
        domain,
        raster,
        levels,
        contours,
    })
}
