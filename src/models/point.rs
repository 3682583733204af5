/// Integer pixel coordinate, origin offset already applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PointI {
    /// X coordinate
    pub x: i64,
    /// Y coordinate
    pub y: i64,
}

impl PointI {
    /// Create a new integer point
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl From<(i64, i64)> for PointI {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

/// Line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Line {
    /// dy/dx
    pub slope: f64,
    /// y at x = 0
    pub intercept: f64,
}

impl Line {
    /// Create a new line
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }
}
