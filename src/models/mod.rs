pub mod point;
pub mod point_set;
pub mod region;

pub use point::{Line, PointI};
pub use point_set::{DEFAULT_MIN_LINE_POINTS, PointSet};
pub use region::Region;
