use clap::{Parser, Subcommand, ValueEnum};
use crack_thresh::config::{FilterConfig, load_config};
use crack_thresh::tools::sweep::{
    self, DEFAULT_RADIUS_RANGE, DEFAULT_SIMPLE_RANGE, DEFAULT_THRESHOLD_RANGE, SweepInput,
    crop_truth, parse_float_range, parse_int_range, scale_intensity, sweep_adaptive,
    sweep_simple,
};
use crack_thresh::tools::{
    grayscale_stats, load_gray, load_mask, mask_points, selection_ratio, write_points_csv,
};
use crack_thresh::{Filter, ModeKind, PointSet, Region, logging};
use log::debug;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "crackthresh", version, about = "Dark-pixel extraction tools")]
struct Cli {
    /// Downscale images larger than this on either side (0 = never)
    #[arg(long, global = true, env = "CRACKTHRESH_MAX_DIM")]
    max_dim: Option<u32>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one filter over an image and print the selected points
    Filter {
        #[arg(long)]
        image: PathBuf,
        /// JSON config file; flags below override it
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        mode: Option<ModeKind>,
        #[arg(long)]
        simple_threshold: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        adaptive_threshold: Option<f64>,
        #[arg(long)]
        radius: Option<i64>,
        /// Inclusive region `x0,y0,x1,y1`
        #[arg(long, value_parser = parse_region)]
        region: Option<Region>,
        #[arg(long)]
        parallel: bool,
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Sweep filter parameters and score them against a ground-truth mask
    Sweep {
        #[arg(long)]
        image: PathBuf,
        /// Mask image, same size as the image; pure red (255,0,0) pixels are ground truth
        #[arg(long)]
        truth: Option<PathBuf>,
        #[arg(long, value_parser = parse_region)]
        region: Option<Region>,
        /// Simple thresholds `begin:end:step`
        #[arg(long, default_value = DEFAULT_SIMPLE_RANGE)]
        simple: String,
        /// Adaptive radii `begin:end:step`
        #[arg(long, default_value = DEFAULT_RADIUS_RANGE)]
        radii: String,
        /// Adaptive thresholds `begin:end:step`
        #[arg(long, default_value = DEFAULT_THRESHOLD_RANGE, allow_hyphen_values = true)]
        thresholds: String,
        /// Intensity ratios; the sweep is repeated on a scaled copy per ratio
        #[arg(long, value_delimiter = ',', default_value = "1.0")]
        ratios: Vec<f64>,
        #[arg(long)]
        parallel: bool,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Write per-setting errors averaged over all ratios (needs --truth)
        #[arg(long)]
        averages: Option<PathBuf>,
    },
    /// Print grayscale statistics for an image
    Stats {
        #[arg(long)]
        image: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[derive(Serialize)]
struct FilterReport<'a> {
    mode: String,
    count: usize,
    ratio: f64,
    slope: Option<f64>,
    intercept: Option<f64>,
    xs: &'a [i64],
    ys: &'a [i64],
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    if let Err(err) = run(cli.command, cli.max_dim) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run(command: Command, max_dim: Option<u32>) -> Result<(), String> {
    match command {
        Command::Filter {
            image,
            config,
            mode,
            simple_threshold,
            adaptive_threshold,
            radius,
            region,
            parallel,
            format,
            output,
        } => {
            let mut cfg = match config {
                Some(path) => load_config(&path)?,
                None => FilterConfig::default(),
            }
            .with_env_overrides();
            if let Some(mode) = mode {
                cfg.mode = mode;
            }
            if let Some(t) = simple_threshold {
                cfg.simple_threshold = t;
            }
            if let Some(t) = adaptive_threshold {
                cfg.adaptive_threshold = t;
            }
            if let Some(r) = radius {
                cfg.adaptive_radius = r;
            }
            cfg.parallel |= parallel;
            let (gray, width, height) = open_gray(&image, max_dim)?;
            cmd_filter(&gray, width, height, &cfg, region, format, output.as_deref())
        }
        Command::Sweep {
            image,
            truth,
            region,
            simple,
            radii,
            thresholds,
            ratios,
            parallel,
            output,
            averages,
        } => {
            let grid = SweepGrid {
                simple: parse_int_range(&simple)?,
                radii: parse_int_range(&radii)?,
                thresholds: parse_float_range(&thresholds)?,
                ratios,
            };
            let (gray, width, height) = open_gray(&image, max_dim)?;
            cmd_sweep(
                &gray,
                width,
                height,
                truth.as_deref(),
                region,
                &grid,
                parallel,
                output.as_deref(),
                averages.as_deref(),
            )
        }
        Command::Stats { image } => {
            let (gray, width, height) = open_gray(&image, max_dim)?;
            cmd_stats(&gray, width, height)
        }
    }
}

struct SweepGrid {
    simple: Vec<i64>,
    radii: Vec<i64>,
    thresholds: Vec<f64>,
    ratios: Vec<f64>,
}

fn open_gray(image: &Path, max_dim: Option<u32>) -> Result<(Vec<u8>, usize, usize), String> {
    load_gray(image, max_dim).map_err(|e| format!("{}: {e}", image.display()))
}

fn cmd_filter(
    gray: &[u8],
    width: usize,
    height: usize,
    cfg: &FilterConfig,
    region: Option<Region>,
    format: Format,
    output: Option<&Path>,
) -> Result<(), String> {
    let region = region.unwrap_or_else(|| Region::full(width, height));
    let filter = Filter::new(cfg.filter_mode()).parallel(cfg.parallel);

    let start = Instant::now();
    let points = filter
        .apply_region(gray, width, height, region)
        .map_err(|e| e.to_string())?;
    debug!(
        "{} filter on {}x{} took {:.2?}",
        filter.mode(),
        width,
        height,
        start.elapsed()
    );

    let mut out = open_output(output)?;
    match format {
        Format::Csv => write_points_csv(&mut out, &points).map_err(|e| e.to_string())?,
        Format::Json => write_report(&mut out, cfg, &points, region, width, height)?,
    }
    out.flush().map_err(|e| e.to_string())
}

fn write_report(
    out: &mut dyn Write,
    cfg: &FilterConfig,
    points: &PointSet,
    region: Region,
    width: usize,
    height: usize,
) -> Result<(), String> {
    let area = region
        .clip(width, height)
        .map_or((0, 0), |r| (r.width(), r.height()));
    let line = points.fit_line(cfg.min_line_points);
    let report = FilterReport {
        mode: cfg.filter_mode().to_string(),
        count: points.len(),
        ratio: selection_ratio(points, area.0, area.1),
        slope: line.map(|l| l.slope),
        intercept: line.map(|l| l.intercept),
        xs: points.xs(),
        ys: points.ys(),
    };
    let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
    writeln!(out, "{json}").map_err(|e| e.to_string())
}

#[allow(clippy::too_many_arguments)]
fn cmd_sweep(
    gray: &[u8],
    width: usize,
    height: usize,
    truth: Option<&Path>,
    region: Option<Region>,
    grid: &SweepGrid,
    parallel: bool,
    output: Option<&Path>,
    averages: Option<&Path>,
) -> Result<(), String> {
    let region = region
        .unwrap_or_else(|| Region::full(width, height))
        .clip(width, height)
        .ok_or_else(|| "region lies outside the image".to_string())?;
    let crop = region.crop(gray, width, height).map_err(|e| e.to_string())?;

    let truth = match truth {
        Some(path) => {
            let mask = load_mask(path).map_err(|e| format!("{}: {e}", path.display()))?;
            let (mw, mh) = mask.dimensions();
            if (mw as usize, mh as usize) != (width, height) {
                return Err(format!("mask is {mw}x{mh}, image is {width}x{height}"));
            }
            Some(crop_truth(&mask_points(&mask, 0, 0), region))
        }
        None => None,
    };

    let mut out = open_output(output)?;
    sweep::write_csv_header(&mut out).map_err(|e| e.to_string())?;
    let mut runs = Vec::with_capacity(grid.ratios.len());
    for &ratio in &grid.ratios {
        let scaled = scale_intensity(&crop, ratio);
        let input = SweepInput {
            gray: &scaled,
            width: region.width(),
            height: region.height(),
            origin: region.origin(),
            truth: truth.as_ref(),
            parallel,
        };
        let mut rows = sweep_simple(&input, &grid.simple).map_err(|e| e.to_string())?;
        rows.extend(
            sweep_adaptive(&input, &grid.radii, &grid.thresholds).map_err(|e| e.to_string())?,
        );
        sweep::write_csv_rows(&mut out, ratio, &rows).map_err(|e| e.to_string())?;
        runs.push(rows);
    }
    out.flush().map_err(|e| e.to_string())?;

    let Some(mean) = sweep::average(&runs) else {
        if averages.is_some() {
            return Err("averages need --truth".to_string());
        }
        return Ok(());
    };
    if let Some(path) = averages {
        let mut out = open_output(Some(path))?;
        sweep::write_averages_csv(&mut out, &mean).map_err(|e| e.to_string())?;
        out.flush().map_err(|e| e.to_string())?;
    }
    if let Some(best) = sweep::best(&mean) {
        eprintln!("best: {:?} err={:.5}", best.mode, best.err);
    }
    Ok(())
}

fn cmd_stats(gray: &[u8], width: usize, height: usize) -> Result<(), String> {
    let stats = grayscale_stats(gray);
    println!("size: {}x{}", width, height);
    println!("min: {}  max: {}  mean: {:.2}", stats.min, stats.max, stats.mean);
    Ok(())
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>, String> {
    match path {
        Some(p) => {
            let file = File::create(p).map_err(|e| format!("{}: {e}", p.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

fn parse_region(s: &str) -> Result<Region, String> {
    let parts: Vec<i64> = s
        .split(',')
        .map(|p| p.trim().parse::<i64>().map_err(|e| format!("'{p}': {e}")))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        &[x0, y0, x1, y1] => Ok(Region::new(x0, y0, x1, y1)),
        _ => Err(format!("expected x0,y0,x1,y1, got '{s}'")),
    }
}
