use crate::error::{FilterError, Result};

/// Inclusive pixel rectangle `[x0..=x1] x [y0..=y1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Left column
    pub x0: i64,
    /// Top row
    pub y0: i64,
    /// Right column (inclusive)
    pub x1: i64,
    /// Bottom row (inclusive)
    pub y1: i64,
}

impl Region {
    /// Create a region from its inclusive corners
    pub fn new(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Region covering a whole `width x height` image
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width as i64 - 1, height as i64 - 1)
    }

    /// Number of columns (0 when empty)
    pub fn width(&self) -> usize {
        (self.x1 - self.x0 + 1).max(0) as usize
    }

    /// Number of rows (0 when empty)
    pub fn height(&self) -> usize {
        (self.y1 - self.y0 + 1).max(0) as usize
    }

    /// Top-left corner, used as the coordinate origin for filtering
    pub fn origin(&self) -> (i64, i64) {
        (self.x0, self.y0)
    }

    /// Clip to a `width x height` image. `None` if nothing remains.
    pub fn clip(&self, width: usize, height: usize) -> Option<Region> {
        if width == 0 || height == 0 {
            return None;
        }
        let clipped = Region::new(
            self.x0.max(0),
            self.y0.max(0),
            self.x1.min(width as i64 - 1),
            self.y1.min(height as i64 - 1),
        );
        if clipped.x0 > clipped.x1 || clipped.y0 > clipped.y1 {
            return None;
        }
        Some(clipped)
    }

    /// Copy the region's pixels out of a row-major grayscale buffer.
    ///
    /// The region must already lie inside the image (see [`Region::clip`]).
    pub fn crop(&self, gray: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
        let expected = width * height;
        if gray.len() != expected {
            return Err(FilterError::BufferSizeMismatch {
                expected,
                actual: gray.len(),
            });
        }
        if self.clip(width, height) != Some(*self) {
            return Err(FilterError::InvalidDimension {
                width: self.width() as i64,
                height: self.height() as i64,
            });
        }

        let (x0, x1) = (self.x0 as usize, self.x1 as usize);
        let mut out = Vec::with_capacity(self.width() * self.height());
        for y in self.y0 as usize..=self.y1 as usize {
            let row = y * width;
            out.extend_from_slice(&gray[row + x0..=row + x1]);
        }
        Ok(out)
    }
}
