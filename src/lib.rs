//! crack_thresh - dark-pixel extraction for grayscale images
//!
//! Selects the coordinates of dark pixels from a single-channel 8-bit image
//! using either a fixed global threshold or a Bradley-Roth adaptive threshold
//! (local mean over a square window, computed with an integral image).
//! Results come back as a [`PointSet`] with `xs`, `ys` and interleaved `xy`
//! views, every coordinate shifted by a caller-supplied origin.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Runtime configuration (JSON file + environment overrides)
pub mod config;
/// Error type shared by all filters
pub mod error;
/// Global and adaptive threshold filters, integral image
pub mod filter;
/// stderr logger for the command-line tool
pub mod logging;
/// Core data structures (PointSet, Region, PointI, Line)
pub mod models;
/// Image loading, statistics and parameter sweeps
pub mod tools;

pub use error::{FilterError, Result};
pub use filter::{FilterMode, ModeKind};
pub use models::{Line, PointI, PointSet, Region};

use filter::{adaptive, simple};
use log::debug;

fn check_buffer(gray: &[u8], width: i64, height: i64) -> Result<()> {
    let (w, h) = filter::checked_dims(width, height)?;
    let expected = w * h;
    if gray.len() != expected {
        return Err(FilterError::BufferSizeMismatch {
            expected,
            actual: gray.len(),
        });
    }
    Ok(())
}

/// Select every pixel with intensity `<= threshold`
///
/// # Arguments
/// * `gray` - Grayscale bytes, row-major, `width * height` long
/// * `width`, `height` - Image size in pixels (negative values are rejected)
/// * `x_origin`, `y_origin` - Offset added to every emitted coordinate
/// * `threshold` - Intensity cutoff in `0..=255`
///
/// # Returns
/// The selected coordinates in row-major order
///
/// # Example
/// ```
/// let gray = vec![0u8; 4];
/// let points = crack_thresh::filter_simple(&gray, 2, 2, 10, 20, 0).unwrap();
/// assert_eq!(points.xs(), &[10, 11, 10, 11]);
/// assert_eq!(points.ys(), &[20, 20, 21, 21]);
/// ```
pub fn filter_simple(
    gray: &[u8],
    width: i64,
    height: i64,
    x_origin: i64,
    y_origin: i64,
    threshold: i64,
) -> Result<PointSet> {
    check_buffer(gray, width, height)?;
    let mut points = PointSet::new();
    simple::scan(&mut points, gray, width, height, x_origin, y_origin, threshold)?;
    Ok(points)
}

/// Select pixels at most `(1 - threshold)` times their local mean
///
/// # Arguments
/// * `gray` - Grayscale bytes, row-major, `width * height` long
/// * `width`, `height` - Image size in pixels (negative values are rejected)
/// * `x_origin`, `y_origin` - Offset added to every emitted coordinate
/// * `threshold` - Fraction below the local mean; any finite value is accepted
/// * `radius` - Half-size of the square window, clipped at image edges
///
/// # Returns
/// The selected coordinates in row-major order
pub fn filter_adaptive(
    gray: &[u8],
    width: i64,
    height: i64,
    x_origin: i64,
    y_origin: i64,
    threshold: f64,
    radius: i64,
) -> Result<PointSet> {
    check_buffer(gray, width, height)?;
    let mut points = PointSet::new();
    adaptive::scan(
        &mut points, gray, width, height, x_origin, y_origin, threshold, radius,
    )?;
    Ok(points)
}

/// Run `mode` over one region of a larger image
///
/// The region is clipped to the image, cropped out, and filtered with its
/// top-left corner as origin, so the returned coordinates are in full-image
/// space. An empty intersection yields an empty set.
pub fn filter_region(
    gray: &[u8],
    width: usize,
    height: usize,
    region: Region,
    mode: FilterMode,
) -> Result<PointSet> {
    Filter::new(mode).apply_region(gray, width, height, region)
}

/// Filter with a fixed mode and execution options
///
/// # Example
/// ```
/// use crack_thresh::{Filter, FilterMode};
///
/// let gray = vec![128u8; 64 * 48];
/// let filter = Filter::new(FilterMode::Adaptive { threshold: 0.15, radius: 7 }).parallel(true);
/// let points = filter.apply(&gray, 64, 48).unwrap();
/// assert!(points.is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Filter {
    mode: FilterMode,
    parallel: bool,
}

impl Filter {
    /// Create a sequential filter
    pub fn new(mode: FilterMode) -> Self {
        Self {
            mode,
            parallel: false,
        }
    }

    /// Classify rows on the rayon pool (adaptive mode only; output is unchanged)
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Selected mode
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Filter a whole image with origin `(0, 0)`
    pub fn apply(&self, gray: &[u8], width: usize, height: usize) -> Result<PointSet> {
        self.apply_with_origin(gray, width, height, 0, 0)
    }

    /// Filter a whole image, shifting coordinates by the given origin
    pub fn apply_with_origin(
        &self,
        gray: &[u8],
        width: usize,
        height: usize,
        x_origin: i64,
        y_origin: i64,
    ) -> Result<PointSet> {
        let (w, h) = signed_dims(width, height)?;
        check_buffer(gray, w, h)?;
        let mut points = PointSet::new();
        self.mode
            .run(&mut points, gray, w, h, x_origin, y_origin, self.parallel)?;
        Ok(points)
    }

    /// Filter one region of an image; see [`filter_region`]
    pub fn apply_region(
        &self,
        gray: &[u8],
        width: usize,
        height: usize,
        region: Region,
    ) -> Result<PointSet> {
        let Some(clipped) = region.clip(width, height) else {
            debug!("region {:?} outside {}x{} image", region, width, height);
            return Ok(PointSet::new());
        };
        let crop = clipped.crop(gray, width, height)?;
        let (x0, y0) = clipped.origin();
        self.apply_with_origin(&crop, clipped.width(), clipped.height(), x0, y0)
    }
}

fn signed_dims(width: usize, height: usize) -> Result<(i64, i64)> {
    match (i64::try_from(width), i64::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(FilterError::InvalidDimension {
            width: i64::try_from(width).unwrap_or(i64::MAX),
            height: i64::try_from(height).unwrap_or(i64::MAX),
        }),
    }
}
