//! Bradley-Roth adaptive threshold
//!
//! A pixel is selected when it is at most `(1 - t)` times the mean of the
//! square window of half-size `radius` around it. Windows are clipped to the
//! image, so edge pixels compare against a smaller neighborhood. The test is
//! done without division:
//!
//! ```text
//! pixel * area <= window_sum * (1 - t)
//! ```

use super::checked_dims;
use super::integral::IntegralImage;
use crate::error::{FilterError, Result};
use crate::models::PointSet;
use log::debug;
use rayon::prelude::*;

/// Validated scan parameters
struct Params {
    width: usize,
    height: usize,
    radius: i64,
    factor: f64,
}

fn validate(width: i64, height: i64, threshold: f64, radius: i64) -> Result<Params> {
    let (width, height) = checked_dims(width, height)?;
    if radius < 0 {
        return Err(FilterError::InvalidRadius(radius));
    }
    // Any finite threshold is accepted; the rule is applied as written.
    if !threshold.is_finite() {
        return Err(FilterError::InvalidThreshold(threshold.to_string()));
    }
    Ok(Params {
        width,
        height,
        radius,
        factor: 1.0 - threshold,
    })
}

/// Adaptive threshold scan.
///
/// Builds the integral image, then appends `(x + x_origin, y + y_origin)`
/// for every selected pixel, row-major. Fails without touching `points` on
/// negative dimensions, a negative radius, or a non-finite threshold.
#[allow(clippy::too_many_arguments)]
pub fn scan(
    points: &mut PointSet,
    gray: &[u8],
    width: i64,
    height: i64,
    x_origin: i64,
    y_origin: i64,
    threshold: f64,
    radius: i64,
) -> Result<()> {
    let params = validate(width, height, threshold, radius)?;
    if params.width == 0 || params.height == 0 {
        return Ok(());
    }
    let integral = IntegralImage::build(gray, params.width, params.height)?;

    let before = points.len();
    for y in 0..params.height {
        scan_row(points, gray, &integral, &params, y, x_origin, y_origin);
    }

    debug!(
        "adaptive filter: {}x{} t={} r={} -> {} points",
        params.width,
        params.height,
        threshold,
        radius,
        points.len() - before
    );
    Ok(())
}

/// Row-parallel variant of [`scan`].
///
/// Rows are classified independently against the shared integral image and
/// merged in row order, so the output is identical to [`scan`].
#[allow(clippy::too_many_arguments)]
pub fn scan_par(
    points: &mut PointSet,
    gray: &[u8],
    width: i64,
    height: i64,
    x_origin: i64,
    y_origin: i64,
    threshold: f64,
    radius: i64,
) -> Result<()> {
    let params = validate(width, height, threshold, radius)?;
    if params.width == 0 || params.height == 0 {
        return Ok(());
    }
    let integral = IntegralImage::build(gray, params.width, params.height)?;

    let rows: Vec<PointSet> = (0..params.height)
        .into_par_iter()
        .map(|y| {
            let mut row = PointSet::new();
            scan_row(&mut row, gray, &integral, &params, y, x_origin, y_origin);
            row
        })
        .collect();

    let before = points.len();
    for mut row in rows {
        points.append(&mut row);
    }

    debug!(
        "adaptive filter (parallel): {}x{} t={} r={} -> {} points",
        params.width,
        params.height,
        threshold,
        radius,
        points.len() - before
    );
    Ok(())
}

fn scan_row(
    points: &mut PointSet,
    gray: &[u8],
    integral: &IntegralImage,
    params: &Params,
    y: usize,
    x_origin: i64,
    y_origin: i64,
) {
    let (y1, y2) = clip_span(y, params.radius, params.height);
    let rows = (y2 - y1 + 1) as u64;
    let row = &gray[y * params.width..(y + 1) * params.width];

    for (x, &pixel) in row.iter().enumerate() {
        let (x1, x2) = clip_span(x, params.radius, params.width);
        let num_pix = (x2 - x1 + 1) as u64 * rows;
        let sum = integral.window_sum(x1, y1, x2, y2);

        if ((pixel as u64 * num_pix) as f64) <= sum as f64 * params.factor {
            points.add(x as i64 + x_origin, y as i64 + y_origin);
        }
    }
}

/// `[pos - radius, pos + radius]` clipped to `[0, len - 1]`
#[inline]
fn clip_span(pos: usize, radius: i64, len: usize) -> (usize, usize) {
    let pos = pos as i64;
    let lo = pos.saturating_sub(radius).max(0);
    let hi = pos.saturating_add(radius).min(len as i64 - 1);
    (lo as usize, hi as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(gray: &[u8], w: i64, h: i64, t: f64, r: i64) -> PointSet {
        let mut points = PointSet::new();
        scan(&mut points, gray, w, h, 0, 0, t, r).unwrap();
        points
    }

    #[test]
    fn test_clip_span() {
        assert_eq!(clip_span(0, 2, 10), (0, 2));
        assert_eq!(clip_span(5, 2, 10), (3, 7));
        assert_eq!(clip_span(9, 2, 10), (7, 9));
        assert_eq!(clip_span(3, i64::MAX, 10), (0, 9));
        assert_eq!(clip_span(4, 0, 10), (4, 4));
    }

    #[test]
    fn test_radius_zero() {
        let gray: Vec<u8> = (1..=16).collect();

        // p <= p * (1 - t): every pixel at t = 0, none for t > 0 (all pixels non-zero)
        assert_eq!(run(&gray, 4, 4, 0.0, 0).len(), 16);
        assert!(run(&gray, 4, 4, 0.05, 0).is_empty());
        assert_eq!(run(&gray, 4, 4, -0.5, 0).len(), 16);
    }

    #[test]
    fn test_radius_covers_whole_image() {
        // 3x3: dark center on a bright field; global mean = (8*200 + 20) / 9 = 180
        let mut gray = vec![200u8; 9];
        gray[4] = 20;
        let points = run(&gray, 3, 3, 0.2, 3);
        // 20 <= 180 * 0.8 = 144; 200 > 144
        assert_eq!(points.xy(), &[1, 1]);
    }

    #[test]
    fn test_edge_window_is_clipped() {
        // Corner (0,0) sees only the 2x2 block [10, 100; 100, 100] with radius 1
        let mut gray = vec![100u8; 16];
        gray[0] = 10;
        let points = run(&gray, 4, 4, 0.15, 1);
        assert_eq!(points.xy(), &[0, 0]);
    }

    #[test]
    fn test_row_major_order_and_origin() {
        let gray = vec![0u8; 6]; // 3x2, all black: 0 <= 0 everywhere
        let mut points = PointSet::new();
        scan(&mut points, &gray, 3, 2, 5, -1, 0.3, 1).unwrap();
        assert_eq!(points.xs(), &[5, 6, 7, 5, 6, 7]);
        assert_eq!(points.ys(), &[-1, -1, -1, 0, 0, 0]);
    }

    #[test]
    fn test_invalid_arguments_leave_points_untouched() {
        let gray = vec![0u8; 4];
        let mut points = PointSet::new();
        points.add(9, 9);
        let snapshot = points.clone();

        assert!(matches!(
            scan(&mut points, &gray, -2, 2, 0, 0, 0.1, 1),
            Err(FilterError::InvalidDimension { .. })
        ));
        assert!(matches!(
            scan(&mut points, &gray, 2, -2, 0, 0, 0.1, 1),
            Err(FilterError::InvalidDimension { .. })
        ));
        assert_eq!(
            scan(&mut points, &gray, 2, 2, 0, 0, 0.1, -1),
            Err(FilterError::InvalidRadius(-1))
        );
        assert!(scan_par(&mut points, &gray, 2, 2, 0, 0, f64::NAN, 1).is_err());
        assert_eq!(points, snapshot);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (w, h) = (37usize, 23usize);
        let gray: Vec<u8> = (0..w * h)
            .map(|i| ((i * 131 + (i / w) * 17) % 256) as u8)
            .collect();

        for &(t, r) in &[(0.0, 0), (0.1, 2), (0.25, 7), (-0.2, 40)] {
            let seq = run(&gray, w as i64, h as i64, t, r);
            let mut par = PointSet::new();
            scan_par(&mut par, &gray, w as i64, h as i64, 0, 0, t, r).unwrap();
            assert_eq!(seq, par, "t={t} r={r}");
        }
    }

    #[test]
    fn test_matches_brute_force_mean() {
        let (w, h) = (9usize, 6usize);
        let gray: Vec<u8> = (0..w * h).map(|i| ((i * 53 + 7) % 251) as u8).collect();
        let (t, r) = (0.1f64, 2i64);
        let points = run(&gray, w as i64, h as i64, t, r);

        let mut expected = Vec::new();
        for y in 0..h as i64 {
            for x in 0..w as i64 {
                let mut sum = 0u64;
                let mut count = 0u64;
                for yy in (y - r).max(0)..=(y + r).min(h as i64 - 1) {
                    for xx in (x - r).max(0)..=(x + r).min(w as i64 - 1) {
                        sum += gray[yy as usize * w + xx as usize] as u64;
                        count += 1;
                    }
                }
                let p = gray[y as usize * w + x as usize] as u64;
                if ((p * count) as f64) <= sum as f64 * (1.0 - t) {
                    expected.push(x);
                    expected.push(y);
                }
            }
        }
        assert_eq!(points.xy(), expected.as_slice());
    }
}
