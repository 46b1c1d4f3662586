//! Global z-normalization of the score column.
//!
//! Mean and standard deviation are computed over *present* values only;
//! missing entries stay missing. A zero standard deviation (or an all-missing
//! column) is not guarded against: the division produces non-finite values,
//! which are stored as missing and propagate through scoring as undefined
//! results. That degraded output is the accepted behavior for degenerate
//! inputs, matching the rest of the pipeline's "failure is data" stance.

/// Summary statistics of the normalization pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormStats {
    /// Mean over present values (NaN when none are present).
    pub mean: f64,
    /// Population standard deviation over present values (NaN when none).
    pub std: f64,
    /// Number of present values used.
    pub n_used: usize,
}

/// Rescale a column to zero mean and unit variance, ignoring missing values.
pub fn normalize_column(values: &[Option<f64>]) -> (Vec<Option<f64>>, NormStats) {
    let present: Vec<f64> = values.iter().filter_map(|v| *v).collect();
    let n = present.len();

    if n == 0 {
        let stats = NormStats {
            mean: f64::NAN,
            std: f64::NAN,
            n_used: 0,
        };
        return (vec![None; values.len()], stats);
    }

    let mean = present.iter().sum::<f64>() / n as f64;
    let var = present.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
    let std = var.sqrt();

    let normalized = values
        .iter()
        .map(|v| {
            let z = ((*v)? - mean) / std;
            if z.is_finite() { Some(z) } else { None }
        })
        .collect();

    (
        normalized,
        NormStats {
            mean,
            std,
            n_used: n,
        },
    )
}
