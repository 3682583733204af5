use core::fmt;

/// Errors returned by the filters.
///
/// None of these are fatal: a failed call leaves any supplied [`PointSet`]
/// exactly as it was.
///
/// [`PointSet`]: crate::models::PointSet
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Width or height is negative (or their product does not fit in memory).
    InvalidDimension {
        /// Requested width
        width: i64,
        /// Requested height
        height: i64,
    },
    /// Adaptive window radius is negative.
    InvalidRadius(i64),
    /// Threshold outside the domain accepted by the filter.
    InvalidThreshold(String),
    /// Pixel buffer length does not match `width * height`.
    BufferSizeMismatch {
        /// `width * height`
        expected: usize,
        /// Actual buffer length
        actual: usize,
    },
    /// The integral image could not hold `255 * width * height`.
    AccumulatorOverflow {
        /// Image width
        width: usize,
        /// Image height
        height: usize,
    },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimension { width, height } => {
                write!(f, "invalid dimensions: width={width}, height={height}")
            }
            Self::InvalidRadius(radius) => write!(f, "invalid radius: {radius}"),
            Self::InvalidThreshold(threshold) => write!(f, "invalid threshold: {threshold}"),
            Self::BufferSizeMismatch { expected, actual } => {
                write!(f, "buffer size mismatch: expected {expected}, got {actual}")
            }
            Self::AccumulatorOverflow { width, height } => {
                write!(f, "integral image overflow for {width}x{height} image")
            }
        }
    }
}

impl std::error::Error for FilterError {}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = FilterError::InvalidDimension {
            width: -1,
            height: 4,
        };
        assert_eq!(err.to_string(), "invalid dimensions: width=-1, height=4");

        let err = FilterError::BufferSizeMismatch {
            expected: 6,
            actual: 5,
        };
        assert_eq!(err.to_string(), "buffer size mismatch: expected 6, got 5");

        assert_eq!(FilterError::InvalidRadius(-3).to_string(), "invalid radius: -3");
    }
}
