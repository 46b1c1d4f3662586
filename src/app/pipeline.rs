//! The pure analytical pipeline.
//!
//! normalize -> grid -> reference curve -> per-subject scoring -> summary
//!
//! This function performs no I/O: it takes an in-memory table plus a config
//! and returns the scored table. `app::run` handles files at the process
//! boundary, which keeps the whole pass directly testable and trivially
//! deterministic (there is no randomness anywhere in it).

use crate::domain::{ReferenceCurve, RunConfig, SubjectScore};
use crate::error::AppError;
use crate::fit::{ControlPoint, age_grid, build_reference_curve};
use crate::io::ingest::SubjectTable;
use crate::math::{NormStats, normalize_column};
use crate::report::{RunSummary, summarize_run};
use crate::score::score_subject;

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub table: SubjectTable,
    /// One entry per table row, in row order.
    pub scores: Vec<SubjectScore>,
    pub curve: ReferenceCurve,
    pub norm: NormStats,
    pub summary: RunSummary,
}

/// Execute the full pipeline on an in-memory table.
pub fn run_pipeline(table: SubjectTable, config: &RunConfig) -> Result<RunOutput, AppError> {
    // 1) Global z-normalization of the score column (missing stays missing).
    let raw_scores: Vec<Option<f64>> = table.rows.iter().map(|r| r.score).collect();
    let (normalized, norm) = normalize_column(&raw_scores);

    // 2) Age range over all subjects, controls and non-controls alike.
    let mut min_age = f64::INFINITY;
    let mut max_age = f64::NEG_INFINITY;
    for row in &table.rows {
        if let Some(age) = row.age {
            min_age = min_age.min(age);
            max_age = max_age.max(age);
        }
    }
    if !min_age.is_finite() {
        return Err(AppError::new(
            3,
            format!("No valid `{}` values in input.", config.age_col),
        ));
    }

    // 3) Reference curve from the control subsample.
    let grid = age_grid(min_age, max_age, config.grid_step, config.kernel_width)?;
    let controls: Vec<ControlPoint> = table
        .rows
        .iter()
        .zip(normalized.iter())
        .filter_map(|(row, ns)| match (row.is_control, row.age, *ns) {
            (true, Some(age), Some(score)) => Some(ControlPoint { age, score }),
            _ => None,
        })
        .collect();
    let curve = build_reference_curve(&controls, grid, config.kernel_width);

    // 4) Score every subject, control or not, against the curve.
    let scores: Vec<SubjectScore> = table
        .rows
        .iter()
        .zip(normalized.iter())
        .map(|(row, ns)| score_subject(row.age, *ns, &curve))
        .collect();

    let summary = summarize_run(&table, &scores, &curve, &norm, config);
    Ok(RunOutput {
        table,
        scores,
        curve,
        norm,
        summary,
    })
}
