//! Shared domain types.
//!
//! These types are intentionally lightweight so they can be:
//!
//! - used in-memory during curve building and scoring
//! - exported to CSV/JSON
//! - constructed directly in tests without touching the filesystem

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Unit convention for the `age` column.
///
/// The grid step and kernel width are expressed in the same unit as the age
/// column, so the unit must be explicit: a half-year step is `0.5` when ages
/// are in years but `180` when ages are in days (360-day convention). Getting
/// this wrong does not fail loudly — it silently changes the smoothness of
/// the reference curve — which is why it is a required, documented setting
/// rather than a hidden constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AgeUnit {
    /// Ages in years; default grid step `0.5`.
    Years,
    /// Ages in days; default grid step `180` (half a 360-day year).
    Days,
}

impl AgeUnit {
    /// Default grid spacing: half a year in this unit.
    pub fn default_grid_step(self) -> f64 {
        match self {
            AgeUnit::Years => 0.5,
            AgeUnit::Days => 180.0,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults). The pipeline itself is a
/// pure function of `(table, config)`; paths are only touched in `app`.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,

    /// Column names in the input CSV.
    pub age_col: String,
    pub score_col: String,
    pub control_col: String,

    /// Unit convention for `age` (and therefore for the grid/kernel).
    pub age_unit: AgeUnit,
    /// Grid spacing in age units.
    pub grid_step: f64,
    /// Kernel half-width in age units. Observations with
    /// `|age - grid_age| < kernel_width` enter the local fit.
    pub kernel_width: f64,

    /// Optional machine-readable run summary.
    pub summary_json: Option<PathBuf>,
    /// Suppress the terminal summary (scripting mode).
    pub quiet: bool,
}

/// A parsed subject row.
///
/// `fields` preserves the original CSV record verbatim so the export can
/// reproduce the input table with the derived columns appended, regardless
/// of what extra columns the file carries.
#[derive(Debug, Clone)]
pub struct SubjectRow {
    /// 1-based CSV line number (for row-level error reporting).
    pub line: usize,
    /// Original record fields, untouched.
    pub fields: Vec<String>,

    /// Age in the configured unit. `None` when missing or invalid.
    pub age: Option<f64>,
    /// Raw score. `None` when missing or invalid.
    pub score: Option<f64>,
    /// Whether this subject belongs to the control population used to build
    /// the reference curve.
    pub is_control: bool,
}

/// One defined point of the reference curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    /// Local mean: the intercept of the centered local fit.
    pub mean: f64,
    /// Prediction standard error of the fit at the grid age.
    pub se_pred: f64,
    /// Two-sided 95% confidence interval for the local mean.
    pub ci_low: f64,
    pub ci_high: f64,
}

/// The fitted age-indexed reference curve.
///
/// `points[i]` is `None` when the local fit at `grid[i]` was degenerate
/// (empty window, too few observations, singular design). That is ordinary
/// data — scoring against an undefined point yields an undefined deviation.
#[derive(Debug, Clone)]
pub struct ReferenceCurve {
    pub grid: Vec<f64>,
    pub points: Vec<Option<CurvePoint>>,
}

impl ReferenceCurve {
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn defined_count(&self) -> usize {
        self.points.iter().filter(|p| p.is_some()).count()
    }
}

/// Ordinal severity rank derived from a standardized deviation.
///
/// The numeric values mirror the rank column written to the output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    /// Deviation at or below −2.
    WellBelow,
    /// Deviation in (−2, −1].
    Below,
    /// Deviation in (−1, +1].
    Typical,
    /// Deviation in (+1, +2].
    Above,
    /// Deviation above +2.
    WellAbove,
}

impl Rank {
    /// Ordinal value in {-2, -1, 0, 1, 2}.
    pub fn value(self) -> i8 {
        match self {
            Rank::WellBelow => -2,
            Rank::Below => -1,
            Rank::Typical => 0,
            Rank::Above => 1,
            Rank::WellAbove => 2,
        }
    }

    /// All ranks in ascending order (for histograms).
    pub fn all() -> [Rank; 5] {
        [
            Rank::WellBelow,
            Rank::Below,
            Rank::Typical,
            Rank::Above,
            Rank::WellAbove,
        ]
    }
}

/// Per-subject derived outputs.
///
/// Every field is optional end to end: a missing input value or an undefined
/// reference point propagates as `None`, never as a sentinel number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubjectScore {
    pub normalized_score: Option<f64>,
    pub deviation: Option<f64>,
    pub rank: Option<Rank>,
}
