use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use topoplan::mapper::PageSpec;
use topoplan::plan::{self, PlanConfig, parse_plan_json};
use topoplan::point::parse_points;
use topoplan::svg;

#[derive(Parser, Debug)]
#[command(name = "topoplan")]
#[command(about = "Contour plan generator for sparse survey points")]
struct Cli {
    /// Input point list: one `x;y;z[;id]` record per line (commas, tabs,
    /// or whitespace also accepted), optional header.
    input: PathBuf,

    /// Output SVG path.
    #[arg(short, long, default_value = "contours.svg")]
    output: PathBuf,

    /// Emit the fixed-scale A2 print sheet instead of the screen view.
    #[arg(long)]
    page: bool,

    /// Pipeline settings as a JSON file; omitted fields take defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Raster columns.
    #[arg(long)]
    cols: Option<usize>,

    /// Raster rows.
    #[arg(long)]
    rows: Option<usize>,

    /// Contour interval in elevation units.
    #[arg(long)]
    step: Option<f64>,

    /// Swap the X and Y axes of the input points.
    #[arg(long)]
    swap_xy: bool,

    /// Screen view width in pixels.
    #[arg(long, default_value_t = 1000.0)]
    width: f64,

    /// Screen view height in pixels.
    #[arg(long, default_value_t = 700.0)]
    height: f64,
}

fn load_config(cli: &Cli) -> Result<PlanConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => parse_plan_json(&fs::read_to_string(path)?)?,
        None => PlanConfig::default(),
    };
    if let Some(cols) = cli.cols {
        config.cols = cols;
    }
    if let Some(rows) = cli.rows {
        config.rows = rows;
    }
    if let Some(step) = cli.step {
        config.contour_step = step;
    }
    if cli.swap_xy {
        config.swap_xy = true;
    }
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let text = fs::read_to_string(&cli.input)?;
    let points = parse_points(&text);
    info!(path = %cli.input.display(), points = points.len(), "parsed input");

    let result = plan::run(&points, &config)?;

    let opt = config.render_options();
    let doc = if cli.page {
        svg::render_page(&result.scene(), &opt, PageSpec::a2_landscape_1_200())
    } else {
        svg::render_screen(&result.scene(), &opt, cli.width, cli.height)
    };

    fs::write(&cli.output, &doc)?;
    info!(path = %cli.output.display(), bytes = doc.len(), "wrote SVG");
    Ok(())
}
