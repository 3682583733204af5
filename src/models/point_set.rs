//! Ordered collection of selected pixel coordinates
//!
//! Every scan appends matches here in visitation order. The set keeps three
//! views of the same data so callers can pick whichever layout they need:
//! - `xs`: x coordinates
//! - `ys`: y coordinates, index-aligned with `xs`
//! - `xy`: interleaved `[x0, y0, x1, y1, ...]`

use super::point::{Line, PointI};

/// Minimum number of points before [`PointSet::fit_line`] is attempted
pub const DEFAULT_MIN_LINE_POINTS: usize = 20;

/// Coordinates selected by a filter, in the order pixels were visited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointSet {
    xs: Vec<i64>,
    ys: Vec<i64>,
    xy: Vec<i64>,
}

impl PointSet {
    /// Create an empty point set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one coordinate pair to all three views
    #[inline]
    pub fn add(&mut self, x: i64, y: i64) {
        // Reserve up front so a failed allocation can't leave the views out of step.
        self.xs.reserve(1);
        self.ys.reserve(1);
        self.xy.reserve(2);
        self.xs.push(x);
        self.ys.push(y);
        self.xy.push(x);
        self.xy.push(y);
    }

    /// Move every point of `other` to the end of this set, leaving `other` empty
    pub fn append(&mut self, other: &mut PointSet) {
        self.xs.reserve(other.xs.len());
        self.ys.reserve(other.ys.len());
        self.xy.reserve(other.xy.len());
        self.xs.append(&mut other.xs);
        self.ys.append(&mut other.ys);
        self.xy.append(&mut other.xy);
    }

    /// X coordinates in visitation order
    pub fn xs(&self) -> &[i64] {
        &self.xs
    }

    /// Y coordinates in visitation order
    pub fn ys(&self) -> &[i64] {
        &self.ys
    }

    /// Interleaved coordinates `[x0, y0, x1, y1, ...]`
    pub fn xy(&self) -> &[i64] {
        &self.xy
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// True when no point was selected
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Iterate over the points in visitation order
    pub fn iter(&self) -> impl Iterator<Item = PointI> + '_ {
        self.xs
            .iter()
            .zip(self.ys.iter())
            .map(|(&x, &y)| PointI::new(x, y))
    }

    /// Consume the set, returning `(xs, ys, xy)`
    pub fn into_parts(self) -> (Vec<i64>, Vec<i64>, Vec<i64>) {
        (self.xs, self.ys, self.xy)
    }

    /// Least-squares fit of `y = slope * x + intercept` through the points.
    ///
    /// Returns `None` unless more than `min_points` points are present, or
    /// when every point shares the same x (vertical line).
    pub fn fit_line(&self, min_points: usize) -> Option<Line> {
        let n = self.len();
        if n <= min_points || n == 0 {
            return None;
        }

        // Center on the mean to keep the sums small for large origins.
        let nf = n as f64;
        let mean_x = self.xs.iter().map(|&x| x as f64).sum::<f64>() / nf;
        let mean_y = self.ys.iter().map(|&y| y as f64).sum::<f64>() / nf;

        let mut sxx = 0.0f64;
        let mut sxy = 0.0f64;
        for (&x, &y) in self.xs.iter().zip(self.ys.iter()) {
            let dx = x as f64 - mean_x;
            let dy = y as f64 - mean_y;
            sxx += dx * dx;
            sxy += dx * dy;
        }

        if sxx == 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        Some(Line::new(slope, mean_y - slope * mean_x))
    }
}

impl Extend<PointI> for PointSet {
    fn extend<I: IntoIterator<Item = PointI>>(&mut self, iter: I) {
        for p in iter {
            self.add(p.x, p.y);
        }
    }
}

impl FromIterator<PointI> for PointSet {
    fn from_iter<I: IntoIterator<Item = PointI>>(iter: I) -> Self {
        let mut set = PointSet::new();
        set.extend(iter);
        set
    }
}
