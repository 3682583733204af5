//! Helpers for the command-line tool: image loading, statistics, CSV output

pub mod sweep;

use crate::models::{PointI, PointSet};
use image::{GenericImageView, Rgb, RgbImage};
use std::collections::HashSet;
use std::io::{self, Write};
use std::path::Path;

/// Load an image as 8-bit grayscale bytes along with its dimensions.
///
/// With `max_dim` set, images larger than it on either side are downscaled
/// (aspect ratio kept). `Some(0)` means no limit.
pub fn load_gray<P: AsRef<Path>>(
    path: P,
    max_dim: Option<u32>,
) -> Result<(Vec<u8>, usize, usize), image::ImageError> {
    let img = image::open(path)?;
    let (w, h) = img.dimensions();
    let gray = match max_dim {
        Some(max_dim) if max_dim > 0 && w.max(h) > max_dim => img
            .resize(max_dim, max_dim, image::imageops::FilterType::Triangle)
            .to_luma8(),
        _ => img.to_luma8(),
    };
    let (width, height) = gray.dimensions();
    Ok((gray.into_raw(), width as usize, height as usize))
}

/// Pixel colour marking ground truth in a mask
pub const TRUTH_COLOR: Rgb<u8> = Rgb([0xFF, 0x00, 0x00]);

/// Load a ground-truth mask at full resolution
pub fn load_mask<P: AsRef<Path>>(path: P) -> Result<RgbImage, image::ImageError> {
    Ok(image::open(path)?.to_rgb8())
}

/// Ground-truth points from a mask: every pure red pixel, shifted by the origin
pub fn mask_points(mask: &RgbImage, x_origin: i64, y_origin: i64) -> HashSet<PointI> {
    mask.enumerate_pixels()
        .filter(|(_, _, px)| **px == TRUTH_COLOR)
        .map(|(x, y, _)| PointI::new(x as i64 + x_origin, y as i64 + y_origin))
        .collect()
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Mean grayscale value.
    pub mean: f64,
}

/// Compute min/max/mean for grayscale values.
pub fn grayscale_stats(gray: &[u8]) -> GrayStats {
    if gray.is_empty() {
        return GrayStats {
            min: 0,
            max: 0,
            mean: 0.0,
        };
    }
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in gray {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    GrayStats {
        min,
        max,
        mean: sum as f64 / gray.len() as f64,
    }
}

/// Fraction of the image selected by a filter
pub fn selection_ratio(points: &PointSet, width: usize, height: usize) -> f64 {
    let total = width * height;
    if total == 0 {
        0.0
    } else {
        points.len() as f64 / total as f64
    }
}

/// Write points as `x,y` CSV with a header line
pub fn write_points_csv<W: Write>(out: &mut W, points: &PointSet) -> io::Result<()> {
    writeln!(out, "x,y")?;
    for p in points.iter() {
        writeln!(out, "{},{}", p.x, p.y)?;
    }
    Ok(())
}
