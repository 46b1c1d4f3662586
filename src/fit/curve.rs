//! Reference curve builder.
//!
//! At each grid age `xx` we fit a weighted linear regression of normalized
//! score on *centered* age `(age - xx)` over the control observations inside
//! a hard rectangular kernel window (`|age - xx| < kernel_width`). Centering
//! turns the intercept into a trend-adjusted local average, which is the
//! curve value at `xx`; the intercept's prediction standard error and
//! confidence interval come along from the same fit.
//!
//! Each grid point is fit independently from read-only inputs, so the sweep
//! runs under rayon with one output slot per point. A degenerate window
//! (empty, too small, or collinear) yields `None` for that slot and the
//! sweep continues; downstream scoring treats `None` as "no reference
//! available".

use rayon::prelude::*;

use crate::domain::{CurvePoint, ReferenceCurve};
use crate::math::fit_weighted_line;

/// A control observation entering the curve fit.
///
/// Both fields are guaranteed present and finite by the pipeline: controls
/// with a missing age or missing normalized score never reach the fitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPoint {
    pub age: f64,
    pub score: f64,
}

/// Fit the reference curve over the whole grid.
pub fn build_reference_curve(
    controls: &[ControlPoint],
    grid: Vec<f64>,
    kernel_width: f64,
) -> ReferenceCurve {
    let points = grid
        .par_iter()
        .map(|&xx| local_fit(controls, xx, kernel_width))
        .collect();

    ReferenceCurve { grid, points }
}

/// Fit one grid point. `None` means the local fit is degenerate.
fn local_fit(controls: &[ControlPoint], xx: f64, kernel_width: f64) -> Option<CurvePoint> {
    let mut x = Vec::new();
    let mut y = Vec::new();

    // Hard rectangular kernel: inside the window or not, no taper.
    for c in controls {
        if (c.age - xx).abs() < kernel_width {
            x.push(c.age - xx);
            y.push(c.score);
        }
    }

    let w = vec![1.0; x.len()];
    let fit = fit_weighted_line(&x, &y, &w)?;

    Some(CurvePoint {
        mean: fit.beta0,
        se_pred: fit.se_pred0,
        ci_low: fit.ci_low,
        ci_high: fit.ci_high,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::grid::age_grid;

    fn flat_controls() -> Vec<ControlPoint> {
        // Score independent of age: alternating ±0.5 around zero at every age.
        (0..40)
            .map(|i| ControlPoint {
                age: i as f64 * 0.5,
                score: if i % 2 == 0 { 0.5 } else { -0.5 },
            })
            .collect()
    }

    #[test]
    fn age_independent_population_keeps_local_means_near_global_mean() {
        let controls = flat_controls();
        let grid = age_grid(0.0, 19.5, 0.5, 2.5).unwrap();
        let curve = build_reference_curve(&controls, grid.clone(), 2.5);

        // Every grid point inside the control age span is defined and its
        // local mean sits near the global mean of zero (the hard kernel
        // leaves a small window-truncation wobble).
        for (xx, point) in grid.iter().zip(curve.points.iter()) {
            if *xx <= 19.5 {
                let point = point.expect("in-span grid point should be defined");
                assert!(point.mean.abs() < 0.15, "local mean {} at {xx}", point.mean);
                assert!(point.se_pred > 0.0);
                assert!(point.ci_low < point.mean && point.mean < point.ci_high);
            }
        }
    }

    #[test]
    fn linear_trend_is_tracked_by_local_means() {
        let controls: Vec<ControlPoint> = (0..60)
            .map(|i| {
                let age = i as f64 * 0.25;
                ControlPoint {
                    age,
                    score: 0.1 * age - 1.0,
                }
            })
            .collect();
        let grid = age_grid(0.0, 14.75, 0.5, 2.5).unwrap();
        let curve = build_reference_curve(&controls, grid.clone(), 2.5);

        // On the interior of the grid the local fit recovers the trend line.
        for (xx, point) in grid.iter().zip(curve.points.iter()) {
            if *xx <= 14.75 {
                let point = point.expect("interior point should be defined");
                assert!(
                    (point.mean - (0.1 * xx - 1.0)).abs() < 1e-9,
                    "mean at {xx} was {}",
                    point.mean
                );
            }
        }
    }

    #[test]
    fn empty_windows_are_undefined_not_errors() {
        // Controls cluster at low ages; the grid extends far beyond them.
        let controls: Vec<ControlPoint> = (0..10)
            .map(|i| ControlPoint {
                age: i as f64 * 0.1,
                score: (i % 3) as f64 - 1.0,
            })
            .collect();
        let grid = age_grid(0.0, 50.0, 0.5, 2.5).unwrap();
        let curve = build_reference_curve(&controls, grid.clone(), 2.5);

        // Grid points near the cluster are defined, far points are not.
        assert!(curve.points[0].is_some());
        assert!(curve.points.last().unwrap().is_none());
        assert!(curve.defined_count() < curve.len());

        // Undefined slots line up with empty windows.
        for (xx, point) in grid.iter().zip(curve.points.iter()) {
            let in_window = controls.iter().any(|c| (c.age - xx).abs() < 2.5);
            if !in_window {
                assert!(point.is_none());
            }
        }
    }

    #[test]
    fn no_controls_yields_a_fully_undefined_curve() {
        let grid = age_grid(0.0, 5.0, 0.5, 2.5).unwrap();
        let curve = build_reference_curve(&[], grid, 2.5);
        assert_eq!(curve.defined_count(), 0);
        assert!(!curve.is_empty());
    }

    #[test]
    fn kernel_boundary_is_exclusive() {
        // Three controls exactly kernel_width away from the grid point must
        // not enter the window; with nothing else there, the fit is
        // degenerate.
        let controls = vec![
            ControlPoint { age: 2.5, score: 1.0 },
            ControlPoint { age: 2.5, score: 0.0 },
            ControlPoint { age: -2.5, score: 1.0 },
        ];
        let curve = build_reference_curve(&controls, vec![0.0], 2.5);
        assert!(curve.points[0].is_none());
    }

    #[test]
    fn curve_build_is_deterministic() {
        let controls = flat_controls();
        let grid = age_grid(0.0, 19.5, 0.5, 2.5).unwrap();
        let a = build_reference_curve(&controls, grid.clone(), 2.5);
        let b = build_reference_curve(&controls, grid, 2.5);
        assert_eq!(a.points, b.points);
    }
}
