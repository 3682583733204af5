//! Parameter sweeps scored against ground truth
//!
//! Runs the simple filter over a range of thresholds and the adaptive filter
//! over a radius x threshold grid, counting true/false positives and false
//! negatives against a known set of dark points. Repeating a sweep on
//! intensity-scaled copies of an image and averaging the errors shows which
//! settings hold up under exposure changes.

use crate::Filter;
use crate::error::Result;
use crate::filter::FilterMode;
use crate::models::{PointI, PointSet, Region};
use log::debug;
use std::collections::HashSet;
use std::io::{self, Write};

/// Agreement between a filter result and ground truth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    /// Selected and in truth
    pub tp: usize,
    /// Selected but not in truth
    pub fp: usize,
    /// In truth but not selected
    pub fn_count: usize,
    /// `(fp + fn) / area`
    pub err: f64,
}

/// Score `points` against `truth` over an image of `area` pixels.
///
/// Duplicate selections count once.
pub fn score(points: &PointSet, truth: &HashSet<PointI>, area: usize) -> Score {
    let selected: HashSet<PointI> = points.iter().collect();
    let tp = selected.intersection(truth).count();
    let fp = selected.len() - tp;
    let fn_count = truth.len() - tp;
    let err = if area == 0 {
        0.0
    } else {
        (fp + fn_count) as f64 / area as f64
    };
    Score {
        tp,
        fp,
        fn_count,
        err,
    }
}

/// Keep only the truth points inside `region`
pub fn crop_truth(truth: &HashSet<PointI>, region: Region) -> HashSet<PointI> {
    truth
        .iter()
        .filter(|p| p.x >= region.x0 && p.x <= region.x1 && p.y >= region.y0 && p.y <= region.y1)
        .copied()
        .collect()
}

/// One filter run in a sweep
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRow {
    /// Mode and parameters used
    pub mode: FilterMode,
    /// Number of selected points
    pub points: usize,
    /// Agreement with truth, when truth was given
    pub score: Option<Score>,
}

/// Evenly spaced values `begin, begin + step, ...` up to and including `end`.
///
/// Values are computed from an integer index so the end point is not lost to
/// accumulated rounding. Returns nothing for a non-positive step.
pub fn float_range(begin: f64, end: f64, step: f64) -> Vec<f64> {
    if step.is_nan() || step <= 0.0 || end < begin {
        return Vec::new();
    }
    let n = ((end - begin) / step + 1e-9).floor() as usize;
    (0..=n).map(|i| begin + i as f64 * step).collect()
}

/// Integer range `begin..=end` by `step`. Empty for a non-positive step.
pub fn int_range(begin: i64, end: i64, step: i64) -> Vec<i64> {
    if step <= 0 || end < begin {
        return Vec::new();
    }
    (begin..=end).step_by(step as usize).collect()
}

/// Every simple threshold, `begin:end:step`
pub const DEFAULT_SIMPLE_RANGE: &str = "0:255:1";
/// Adaptive window radii, `begin:end:step`
pub const DEFAULT_RADIUS_RANGE: &str = "1:50:1";
/// Adaptive thresholds in hundredths, `begin:end:step`
pub const DEFAULT_THRESHOLD_RANGE: &str = "-0.5:0.5:0.01";

fn split_range(s: &str) -> std::result::Result<[&str; 3], String> {
    let parts: Vec<&str> = s.split(':').collect();
    match parts.as_slice() {
        &[a, b, c] => Ok([a, b, c]),
        _ => Err(format!("expected begin:end:step, got '{s}'")),
    }
}

/// Parse `begin:end:step` into an [`int_range`]
pub fn parse_int_range(s: &str) -> std::result::Result<Vec<i64>, String> {
    let [a, b, c] = split_range(s)?;
    let parse = |v: &str| v.trim().parse::<i64>().map_err(|e| format!("'{v}': {e}"));
    Ok(int_range(parse(a)?, parse(b)?, parse(c)?))
}

/// Parse `begin:end:step` into a [`float_range`]
pub fn parse_float_range(s: &str) -> std::result::Result<Vec<f64>, String> {
    let [a, b, c] = split_range(s)?;
    let parse = |v: &str| v.trim().parse::<f64>().map_err(|e| format!("'{v}': {e}"));
    Ok(float_range(parse(a)?, parse(b)?, parse(c)?))
}

/// Copy of `gray` with every value multiplied by `ratio`, rounded half to
/// even and clamped to `0..=255`
pub fn scale_intensity(gray: &[u8], ratio: f64) -> Vec<u8> {
    let lut: Vec<u8> = (0..=255u8)
        .map(|v| (v as f64 * ratio).round_ties_even().clamp(0.0, 255.0) as u8)
        .collect();
    gray.iter().map(|&v| lut[v as usize]).collect()
}

/// Sweep configuration shared by both modes
#[derive(Debug, Clone, Copy)]
pub struct SweepInput<'a> {
    /// Grayscale image (or crop), row-major
    pub gray: &'a [u8],
    /// Image width
    pub width: usize,
    /// Image height
    pub height: usize,
    /// Origin added to emitted coordinates
    pub origin: (i64, i64),
    /// Ground truth, already restricted to this image
    pub truth: Option<&'a HashSet<PointI>>,
    /// Run the adaptive filter row-parallel
    pub parallel: bool,
}

impl SweepInput<'_> {
    fn run(&self, mode: FilterMode) -> Result<SweepRow> {
        let points = Filter::new(mode).parallel(self.parallel).apply_with_origin(
            self.gray,
            self.width,
            self.height,
            self.origin.0,
            self.origin.1,
        )?;
        let score = self
            .truth
            .map(|truth| score(&points, truth, self.width * self.height));
        debug!("sweep {:?}: {} points", mode, points.len());
        Ok(SweepRow {
            mode,
            points: points.len(),
            score,
        })
    }
}

/// Run the simple filter once per threshold
pub fn sweep_simple(input: &SweepInput<'_>, thresholds: &[i64]) -> Result<Vec<SweepRow>> {
    thresholds
        .iter()
        .map(|&threshold| input.run(FilterMode::Simple { threshold }))
        .collect()
}

/// Run the adaptive filter over every `(radius, threshold)` pair, radius outer
pub fn sweep_adaptive(
    input: &SweepInput<'_>,
    radii: &[i64],
    thresholds: &[f64],
) -> Result<Vec<SweepRow>> {
    let mut rows = Vec::with_capacity(radii.len() * thresholds.len());
    for &radius in radii {
        for &threshold in thresholds {
            rows.push(input.run(FilterMode::Adaptive { threshold, radius })?);
        }
    }
    Ok(rows)
}

/// Mean error of one parameter setting over several runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageRow {
    /// Mode and parameters used
    pub mode: FilterMode,
    /// Mean of the per-run errors
    pub err: f64,
}

/// Average the scored errors of each setting over `runs`.
///
/// Every run must hold the same settings in the same order. Returns `None`
/// when there are no runs, the runs disagree, or a row was not scored.
pub fn average(runs: &[Vec<SweepRow>]) -> Option<Vec<AverageRow>> {
    let (first, rest) = runs.split_first()?;
    let mut sums = first
        .iter()
        .map(|row| {
            row.score.map(|s| AverageRow {
                mode: row.mode,
                err: s.err,
            })
        })
        .collect::<Option<Vec<_>>>()?;
    for run in rest {
        if run.len() != sums.len() {
            return None;
        }
        for (acc, row) in sums.iter_mut().zip(run) {
            if acc.mode != row.mode {
                return None;
            }
            acc.err += row.score?.err;
        }
    }
    let n = runs.len() as f64;
    for acc in &mut sums {
        acc.err /= n;
    }
    Some(sums)
}

/// Setting with the lowest mean error
pub fn best(averages: &[AverageRow]) -> Option<&AverageRow> {
    averages.iter().min_by(|a, b| a.err.total_cmp(&b.err))
}

fn mode_columns(mode: FilterMode) -> (String, String) {
    match mode {
        FilterMode::Simple { threshold } => (threshold.to_string(), String::new()),
        FilterMode::Adaptive { threshold, radius } => {
            (format!("{threshold:.2}"), radius.to_string())
        }
    }
}

/// Write the CSV header for [`write_csv_rows`]
pub fn write_csv_header<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "ratio,mode,threshold,radius,points,tp,fp,fn,err")
}

/// Write the rows of one run, tagged with its intensity ratio
pub fn write_csv_rows<W: Write>(out: &mut W, ratio: f64, rows: &[SweepRow]) -> io::Result<()> {
    for row in rows {
        let (threshold, radius) = mode_columns(row.mode);
        let (tp, fp, fn_count, err) = match row.score {
            Some(s) => (
                s.tp.to_string(),
                s.fp.to_string(),
                s.fn_count.to_string(),
                s.err.to_string(),
            ),
            None => Default::default(),
        };
        writeln!(
            out,
            "{:.2},{},{},{},{},{},{},{},{}",
            ratio, row.mode, threshold, radius, row.points, tp, fp, fn_count, err
        )?;
    }
    Ok(())
}

/// Write averaged errors as CSV
pub fn write_averages_csv<W: Write>(out: &mut W, averages: &[AverageRow]) -> io::Result<()> {
    writeln!(out, "mode,threshold,radius,err")?;
    for row in averages {
        let (threshold, radius) = mode_columns(row.mode);
        writeln!(out, "{},{},{},{}", row.mode, threshold, radius, row.err)?;
    }
    Ok(())
}
