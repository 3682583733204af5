//! Dark-pixel filters
//!
//! - `simple`: one global intensity cutoff
//! - `adaptive`: Bradley-Roth local-mean threshold over a square window
//! - `integral`: summed-area table backing the adaptive filter
//!
//! Both filters visit pixels row-major (y outer, x inner) and append matches
//! to a caller-owned [`PointSet`]. Validation happens before the first append,
//! so a failed call never leaves partial results behind.

pub mod adaptive;
pub mod integral;
pub mod simple;

use crate::error::{FilterError, Result};
use crate::models::PointSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which filter to run, with its parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum FilterMode {
    /// Select pixels with intensity `<= threshold` (0..=255)
    Simple {
        /// Global intensity cutoff
        threshold: i64,
    },
    /// Select pixels with `p * area <= window_sum * (1 - threshold)`
    Adaptive {
        /// Fraction below the local mean
        threshold: f64,
        /// Half-size of the square window
        radius: i64,
    },
}

impl FilterMode {
    /// Short mode name
    pub fn name(&self) -> &'static str {
        match self {
            FilterMode::Simple { .. } => "simple",
            FilterMode::Adaptive { .. } => "adaptive",
        }
    }

    /// Run the filter, appending matches to `points`
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &self,
        points: &mut PointSet,
        gray: &[u8],
        width: i64,
        height: i64,
        x_origin: i64,
        y_origin: i64,
        parallel: bool,
    ) -> Result<()> {
        match *self {
            FilterMode::Simple { threshold } => {
                simple::scan(points, gray, width, height, x_origin, y_origin, threshold)
            }
            FilterMode::Adaptive { threshold, radius } if parallel => adaptive::scan_par(
                points, gray, width, height, x_origin, y_origin, threshold, radius,
            ),
            FilterMode::Adaptive { threshold, radius } => adaptive::scan(
                points, gray, width, height, x_origin, y_origin, threshold, radius,
            ),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameter-free mode selector, parsed from CLI and config strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    /// Global threshold
    Simple,
    /// Local-mean threshold
    Adaptive,
}

impl FromStr for ModeKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(ModeKind::Simple),
            "adaptive" => Ok(ModeKind::Adaptive),
            other => Err(format!("unknown filter mode '{other}'")),
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeKind::Simple => f.write_str("simple"),
            ModeKind::Adaptive => f.write_str("adaptive"),
        }
    }
}

/// Check signed dimensions and convert them to sizes
pub(crate) fn checked_dims(width: i64, height: i64) -> Result<(usize, usize)> {
    let invalid = FilterError::InvalidDimension { width, height };
    if width < 0 || height < 0 {
        return Err(invalid);
    }
    let w = usize::try_from(width).map_err(|_| invalid.clone())?;
    let h = usize::try_from(height).map_err(|_| invalid.clone())?;
    if w.checked_mul(h).is_none() {
        return Err(invalid);
    }
    Ok((w, h))
}
