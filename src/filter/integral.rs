//! Summed-area table over an 8-bit grayscale buffer
//!
//! Cell `(x, y)` holds the sum of every pixel in `[0..=x] x [0..=y]`, so any
//! axis-aligned rectangle sum is four lookups. Cells are `u64`: the largest
//! possible value is `255 * width * height`, which `build` checks up front.

use crate::error::{FilterError, Result};
use log::trace;

/// Summed-area table with the same dimensions as its source image
#[derive(Debug, Clone)]
pub struct IntegralImage {
    width: usize,
    height: usize,
    data: Vec<u64>,
}

impl IntegralImage {
    /// Build the table for a row-major `width x height` buffer.
    ///
    /// Walks column by column keeping a running vertical sum; each cell is
    /// that sum plus the already-finished cell to its left.
    pub fn build(gray: &[u8], width: usize, height: usize) -> Result<Self> {
        let max_sum = width
            .checked_mul(height)
            .and_then(|n| (n as u64).checked_mul(u8::MAX as u64));
        if max_sum.is_none() {
            return Err(FilterError::AccumulatorOverflow { width, height });
        }

        let pixel_count = width * height;
        if gray.len() < pixel_count {
            return Err(FilterError::BufferSizeMismatch {
                expected: pixel_count,
                actual: gray.len(),
            });
        }

        let mut data = vec![0u64; pixel_count];
        for x in 0..width {
            let mut col_sum = 0u64;
            for y in 0..height {
                let idx = y * width + x;
                col_sum += gray[idx] as u64;
                data[idx] = col_sum + if x > 0 { data[idx - 1] } else { 0 };
            }
        }

        trace!("integral image built: {}x{}", width, height);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Table width
    pub fn width(&self) -> usize {
        self.width
    }

    /// Table height
    pub fn height(&self) -> usize {
        self.height
    }

    /// Sum of `[0..=x] x [0..=y]`
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u64 {
        self.data[y * self.width + x]
    }

    /// Sum of the inclusive rectangle `[x1..=x2] x [y1..=y2]`.
    ///
    /// Corners must satisfy `x1 <= x2 < width` and `y1 <= y2 < height`.
    #[inline]
    pub fn window_sum(&self, x1: usize, y1: usize, x2: usize, y2: usize) -> u64 {
        let total = self.get(x2, y2);
        let above = if y1 > 0 { self.get(x2, y1 - 1) } else { 0 };
        let left = if x1 > 0 { self.get(x1 - 1, y2) } else { 0 };
        let corner = if x1 > 0 && y1 > 0 {
            self.get(x1 - 1, y1 - 1)
        } else {
            0
        };
        // total + corner >= above + left, so this order never underflows
        total + corner - above - left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_ones_3x3() {
        let gray = vec![1u8; 9];
        let ii = IntegralImage::build(&gray, 3, 3).unwrap();
        assert_eq!(ii.get(2, 2), 9);
        assert_eq!(ii.get(0, 0), 1);
        assert_eq!(ii.get(1, 2), 6);
        assert_eq!(ii.get(2, 0), 3);
    }

    #[test]
    fn test_window_sum_matches_brute_force() {
        let (w, h) = (7usize, 5usize);
        let gray: Vec<u8> = (0..w * h).map(|i| ((i * 37 + 11) % 256) as u8).collect();
        let ii = IntegralImage::build(&gray, w, h).unwrap();

        for y1 in 0..h {
            for y2 in y1..h {
                for x1 in 0..w {
                    for x2 in x1..w {
                        let mut expected = 0u64;
                        for y in y1..=y2 {
                            for x in x1..=x2 {
                                expected += gray[y * w + x] as u64;
                            }
                        }
                        assert_eq!(ii.window_sum(x1, y1, x2, y2), expected);
                    }
                }
            }
        }
    }

    #[test]
    fn test_large_values_do_not_wrap() {
        // 32-bit accumulators overflow past ~16.8M saturated pixels; u64 must not.
        let (w, h) = (4096usize, 4200usize);
        let gray = vec![255u8; w * h];
        let ii = IntegralImage::build(&gray, w, h).unwrap();
        assert_eq!(ii.get(w - 1, h - 1), 255 * (w * h) as u64);
    }

    #[test]
    fn test_empty_image() {
        let ii = IntegralImage::build(&[], 0, 0).unwrap();
        assert_eq!(ii.width(), 0);
        assert_eq!(ii.height(), 0);
    }

    #[test]
    fn test_short_buffer_rejected() {
        let err = IntegralImage::build(&[1, 2, 3], 2, 2).unwrap_err();
        assert_eq!(
            err,
            FilterError::BufferSizeMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_overflow_detected() {
        let err = IntegralImage::build(&[], usize::MAX, 2).unwrap_err();
        assert!(matches!(err, FilterError::AccumulatorOverflow { .. }));
    }
}
