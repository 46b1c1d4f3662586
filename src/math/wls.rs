//! Weighted least squares for local linear fits.
//!
//! The reference curve repeatedly solves small regression problems of the form:
//!
//! ```text
//! minimize Σ w_i (y_i - β0 - β1 x_i)^2
//! ```
//!
//! where `x_i` is the age *centered* at the current grid point. Centering
//! makes the intercept `β0` the curve value at the grid age, so one ordinary
//! weighted solver covers the whole LOESS-style sweep.
//!
//! Implementation choices:
//! - Rows are scaled by `sqrt(w_i)` and the problem is solved as ordinary
//!   least squares.
//! - The solve uses SVD so that tall design matrices are handled robustly.
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic
//!   for non-square matrices.)
//! - Narrow kernel windows can contain a single distinct age, which makes
//!   the centered design collinear; those fits are reported as `None`
//!   rather than propagated as garbage coefficients.

use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Two-sided confidence level used for the intercept interval.
const CONFIDENCE: f64 = 0.95;

/// Diagnostics of a weighted simple-linear fit `y ~ β0 + β1·x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub beta0: f64,
    pub beta1: f64,
    /// Standard error of the intercept estimate.
    pub se_beta0: f64,
    /// Prediction standard error of the fit evaluated at `x = 0`
    /// (parameter uncertainty plus residual noise).
    pub se_pred0: f64,
    /// Two-sided 95% Student-t interval for the intercept.
    pub ci_low: f64,
    pub ci_high: f64,
    /// Residual degrees of freedom (`n_effective - 2`).
    pub df_resid: usize,
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if the strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y ~ β0 + β1·x` with observation weights.
///
/// Zero-weight observations contribute nothing to the fit and are excluded
/// from the effective sample size. Returns `None` for degenerate problems:
/// fewer than three effective observations (no residual variance estimate
/// otherwise), a singular design, or non-finite diagnostics.
pub fn fit_weighted_line(x: &[f64], y: &[f64], w: &[f64]) -> Option<LineFit> {
    debug_assert_eq!(x.len(), y.len());
    debug_assert_eq!(x.len(), w.len());

    let mut rows: Vec<(f64, f64, f64)> = Vec::with_capacity(x.len());
    for i in 0..x.len() {
        if !(x[i].is_finite() && y[i].is_finite() && w[i].is_finite()) {
            return None;
        }
        if w[i] < 0.0 {
            return None;
        }
        if w[i] > 0.0 {
            rows.push((x[i], y[i], w[i]));
        }
    }

    let n = rows.len();
    if n < 3 {
        return None;
    }
    let df_resid = n - 2;

    let mut xw = DMatrix::<f64>::zeros(n, 2);
    let mut yw = DVector::<f64>::zeros(n);
    for (i, &(xi, yi, wi)) in rows.iter().enumerate() {
        let sw = wi.sqrt();
        xw[(i, 0)] = sw;
        xw[(i, 1)] = xi * sw;
        yw[i] = yi * sw;
    }

    let beta = solve_least_squares(&xw, &yw)?;
    let (beta0, beta1) = (beta[0], beta[1]);

    // (XᵀWX)⁻¹ drives the parameter covariance; a singular design (e.g. one
    // distinct age in the window) has no valid inverse and the fit is
    // reported as degenerate.
    let xtx = xw.transpose() * &xw;
    let inv = xtx.try_inverse()?;
    if !inv.iter().all(|v| v.is_finite()) {
        return None;
    }

    let mut sse = 0.0;
    for &(xi, yi, wi) in &rows {
        let r = yi - beta0 - beta1 * xi;
        sse += wi * r * r;
    }
    let mse = sse / df_resid as f64;
    if !mse.is_finite() {
        return None;
    }

    let var_beta0 = (mse * inv[(0, 0)]).max(0.0);
    let se_beta0 = var_beta0.sqrt();
    let se_pred0 = (mse + var_beta0).sqrt();

    let t = StudentsT::new(0.0, 1.0, df_resid as f64).ok()?;
    let t_crit = t.inverse_cdf(0.5 + CONFIDENCE / 2.0);

    Some(LineFit {
        beta0,
        beta1,
        se_beta0,
        se_pred0,
        ci_low: beta0 - t_crit * se_beta0,
        ci_high: beta0 + t_crit * se_beta0,
        df_resid,
    })
}
