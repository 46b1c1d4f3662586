//! Run summary: counts, diagnostics, and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized
//! - the same summary struct backs both the terminal report and the
//!   optional JSON export

use serde::Serialize;

use crate::domain::{Rank, ReferenceCurve, RunConfig, SubjectScore};
use crate::io::ingest::SubjectTable;
use crate::math::NormStats;

/// Everything a run reports about itself.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub row_errors: usize,
    pub controls: usize,
    /// Controls with both a valid age and a normalized score, i.e. the
    /// observations that actually entered the curve fit.
    pub control_points_used: usize,
    pub normalizer: NormalizerSummary,
    pub grid: GridSummary,
    pub curve: CurveSummary,
    pub ranks: RankCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct NormalizerSummary {
    pub mean: f64,
    pub std: f64,
    pub n_used: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridSummary {
    pub start: f64,
    pub step: f64,
    pub points: usize,
    pub kernel_width: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurveSummary {
    pub defined: usize,
    pub undefined: usize,
}

/// Histogram of assigned ranks, plus the unclassifiable count.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RankCounts {
    pub well_below: usize,
    pub below: usize,
    pub typical: usize,
    pub above: usize,
    pub well_above: usize,
    pub unclassified: usize,
}

/// Tally ranks over all scored subjects.
pub fn rank_counts(scores: &[SubjectScore]) -> RankCounts {
    let mut counts = RankCounts {
        well_below: 0,
        below: 0,
        typical: 0,
        above: 0,
        well_above: 0,
        unclassified: 0,
    };
    for s in scores {
        match s.rank {
            Some(Rank::WellBelow) => counts.well_below += 1,
            Some(Rank::Below) => counts.below += 1,
            Some(Rank::Typical) => counts.typical += 1,
            Some(Rank::Above) => counts.above += 1,
            Some(Rank::WellAbove) => counts.well_above += 1,
            None => counts.unclassified += 1,
        }
    }
    counts
}

/// Assemble the run summary from the pipeline's intermediate outputs.
pub fn summarize_run(
    table: &SubjectTable,
    scores: &[SubjectScore],
    curve: &ReferenceCurve,
    norm: &NormStats,
    config: &RunConfig,
) -> RunSummary {
    let controls = table.rows.iter().filter(|r| r.is_control).count();
    let control_points_used = table
        .rows
        .iter()
        .zip(scores.iter())
        .filter(|(r, s)| r.is_control && r.age.is_some() && s.normalized_score.is_some())
        .count();

    let defined = curve.defined_count();
    RunSummary {
        rows_read: table.rows_read,
        rows_kept: table.rows.len(),
        row_errors: table.row_errors.len(),
        controls,
        control_points_used,
        normalizer: NormalizerSummary {
            mean: norm.mean,
            std: norm.std,
            n_used: norm.n_used,
        },
        grid: GridSummary {
            start: curve.grid.first().copied().unwrap_or(f64::NAN),
            step: config.grid_step,
            points: curve.len(),
            kernel_width: config.kernel_width,
        },
        curve: CurveSummary {
            defined,
            undefined: curve.len() - defined,
        },
        ranks: rank_counts(scores),
    }
}

/// Format the full run summary for the terminal.
pub fn format_run_summary(summary: &RunSummary, config: &RunConfig) -> String {
    let mut out = String::new();

    out.push_str("=== norm - Age-Normed Reference Model ===\n");
    out.push_str(&format!(
        "Input: {} -> {}\n",
        config.input.display(),
        config.output.display()
    ));
    out.push_str(&format!(
        "Columns: age=`{}` score=`{}` control=`{}` (unit: {:?})\n",
        config.age_col, config.score_col, config.control_col, config.age_unit
    ));
    out.push_str(&format!(
        "Rows: read={} kept={} row_errors={}\n",
        summary.rows_read, summary.rows_kept, summary.row_errors
    ));
    out.push_str(&format!(
        "Controls: n={} fitted_points={}\n",
        summary.controls, summary.control_points_used
    ));
    out.push_str(&format!(
        "Normalizer: mean={:.6} std={:.6} n={}\n",
        summary.normalizer.mean, summary.normalizer.std, summary.normalizer.n_used
    ));
    out.push_str(&format!(
        "Grid: start={:.3} step={:.3} points={} kernel={:.3}\n",
        summary.grid.start, summary.grid.step, summary.grid.points, summary.grid.kernel_width
    ));
    out.push_str(&format!(
        "Curve: defined={}/{} undefined={}\n",
        summary.curve.defined, summary.grid.points, summary.curve.undefined
    ));

    out.push_str("\nRanks:\n");
    out.push_str(&format!("  -2  {}\n", summary.ranks.well_below));
    out.push_str(&format!("  -1  {}\n", summary.ranks.below));
    out.push_str(&format!("   0  {}\n", summary.ranks.typical));
    out.push_str(&format!("  +1  {}\n", summary.ranks.above));
    out.push_str(&format!("  +2  {}\n", summary.ranks.well_above));
    out.push_str(&format!("   ?  {} (unclassified)\n", summary.ranks.unclassified));

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_counts_tally_every_bucket() {
        let scores = vec![
            SubjectScore {
                normalized_score: Some(0.0),
                deviation: Some(-2.5),
                rank: Some(Rank::WellBelow),
            },
            SubjectScore {
                normalized_score: Some(0.0),
                deviation: Some(0.2),
                rank: Some(Rank::Typical),
            },
            SubjectScore {
                normalized_score: Some(0.0),
                deviation: Some(0.4),
                rank: Some(Rank::Typical),
            },
            SubjectScore {
                normalized_score: None,
                deviation: None,
                rank: None,
            },
        ];

        let counts = rank_counts(&scores);
        assert_eq!(counts.well_below, 1);
        assert_eq!(counts.typical, 2);
        assert_eq!(counts.unclassified, 1);
        assert_eq!(counts.below + counts.above + counts.well_above, 0);
    }
}
