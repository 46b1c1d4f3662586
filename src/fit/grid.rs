//! Age grid generation.
//!
//! The grid spans `[min_age, max_age + kernel_width)` at fixed spacing so
//! that every subject age — including control ages at the top of the range —
//! has a grid point whose kernel window can cover it. The stop bound is
//! exclusive, and element `i` is computed as `start + i * step` rather than
//! by accumulation, so the spacing is exact and the sequence is strictly
//! increasing.

use crate::error::AppError;

/// Build the evenly spaced age grid for the reference curve.
pub fn age_grid(
    min_age: f64,
    max_age: f64,
    step: f64,
    kernel_width: f64,
) -> Result<Vec<f64>, AppError> {
    if !(min_age.is_finite() && max_age.is_finite()) || max_age < min_age {
        return Err(AppError::new(
            3,
            format!("Invalid age range: [{min_age}, {max_age}]."),
        ));
    }
    if !(step.is_finite() && step > 0.0) {
        return Err(AppError::new(
            2,
            format!("Invalid grid step: {step} (must be finite and > 0)."),
        ));
    }
    if !(kernel_width.is_finite() && kernel_width > 0.0) {
        return Err(AppError::new(
            2,
            format!("Invalid kernel width: {kernel_width} (must be finite and > 0)."),
        ));
    }

    let stop = max_age + kernel_width;
    let count = ((stop - min_age) / step).ceil() as usize;
    // `stop > min_age` because the kernel width is positive.
    let count = count.max(1);

    Ok((0..count).map(|i| min_age + i as f64 * step).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_fixed_spacing_and_is_strictly_increasing() {
        let grid = age_grid(6.0, 18.0, 0.5, 2.5).unwrap();
        assert!((grid[0] - 6.0).abs() < 1e-12);
        for pair in grid.windows(2) {
            let d = pair[1] - pair[0];
            assert!((d - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn grid_stop_is_exclusive_and_covers_max_age() {
        let grid = age_grid(0.0, 10.0, 0.5, 2.5).unwrap();
        let last = *grid.last().unwrap();
        assert!(last < 10.0 + 2.5);
        assert!(last >= 10.0);
        // arange semantics: ceil((12.5 - 0) / 0.5) = 25 points, last = 12.0.
        assert_eq!(grid.len(), 25);
        assert!((last - 12.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_single_age_range_still_yields_a_grid() {
        let grid = age_grid(7.0, 7.0, 0.5, 2.5).unwrap();
        assert!(!grid.is_empty());
        assert!((grid[0] - 7.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(age_grid(5.0, 1.0, 0.5, 2.5).is_err());
        assert!(age_grid(0.0, 1.0, 0.0, 2.5).is_err());
        assert!(age_grid(0.0, 1.0, 0.5, 0.0).is_err());
        assert!(age_grid(f64::NAN, 1.0, 0.5, 2.5).is_err());
    }
}
