use super::checked_dims;
use crate::error::{FilterError, Result};
use crate::models::PointSet;
use log::debug;

/// Global threshold scan.
///
/// Appends `(x + x_origin, y + y_origin)` for every pixel with intensity
/// `<= threshold`, row-major. Fails without touching `points` on negative
/// dimensions or a threshold outside `0..=255`.
///
/// `gray.len() == width * height` is the caller's contract; rows past the end
/// of a short buffer are not visited.
pub fn scan(
    points: &mut PointSet,
    gray: &[u8],
    width: i64,
    height: i64,
    x_origin: i64,
    y_origin: i64,
    threshold: i64,
) -> Result<()> {
    let (w, h) = checked_dims(width, height)?;
    let threshold = u8::try_from(threshold)
        .map_err(|_| FilterError::InvalidThreshold(threshold.to_string()))?;

    if w == 0 || h == 0 {
        return Ok(());
    }

    let before = points.len();
    for (y, row) in gray.chunks_exact(w).take(h).enumerate() {
        let py = y as i64 + y_origin;
        for (x, &pixel) in row.iter().enumerate() {
            if pixel <= threshold {
                points.add(x as i64 + x_origin, py);
            }
        }
    }

    debug!(
        "simple filter: {}x{} threshold={} -> {} points",
        w,
        h,
        threshold,
        points.len() - before
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_applied_row_major() {
        let gray = vec![0u8; 4];
        let mut points = PointSet::new();
        scan(&mut points, &gray, 2, 2, 10, 20, 0).unwrap();
        assert_eq!(points.xs(), &[10, 11, 10, 11]);
        assert_eq!(points.ys(), &[20, 20, 21, 21]);
        assert_eq!(points.xy(), &[10, 20, 11, 20, 10, 21, 11, 21]);
    }

    #[test]
    fn test_threshold_inclusive() {
        let gray = vec![100, 150, 200, 50]; // 2x2 image
        let mut points = PointSet::new();
        scan(&mut points, &gray, 2, 2, 0, 0, 150).unwrap();

        // 100 and 150 (inclusive) on the first row, 50 on the second
        assert_eq!(points.xy(), &[0, 0, 1, 0, 1, 1]);
    }

    #[test]
    fn test_uniform_image_at_threshold_selects_all() {
        let gray = vec![77u8; 6 * 4];
        let mut points = PointSet::new();
        scan(&mut points, &gray, 6, 4, 0, 0, 77).unwrap();
        assert_eq!(points.len(), 24);
    }

    #[test]
    fn test_zero_threshold_without_black_pixels() {
        let gray: Vec<u8> = (1..=25).collect();
        let mut points = PointSet::new();
        scan(&mut points, &gray, 5, 5, 0, 0, 0).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_invalid_arguments_leave_points_untouched() {
        let gray = vec![0u8; 4];
        let mut points = PointSet::new();
        points.add(1, 1);
        let snapshot = points.clone();

        assert!(scan(&mut points, &gray, -1, 2, 0, 0, 10).is_err());
        assert!(scan(&mut points, &gray, 2, -1, 0, 0, 10).is_err());
        assert!(matches!(
            scan(&mut points, &gray, 2, 2, 0, 0, 256),
            Err(FilterError::InvalidThreshold(_))
        ));
        assert!(scan(&mut points, &gray, 2, 2, 0, 0, -1).is_err());
        assert_eq!(points, snapshot);
    }

    #[test]
    fn test_empty_image() {
        let mut points = PointSet::new();
        scan(&mut points, &[], 0, 5, 0, 0, 255).unwrap();
        scan(&mut points, &[], 5, 0, 0, 0, 255).unwrap();
        assert!(points.is_empty());
    }
}
