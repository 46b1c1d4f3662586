//! Command-line parsing for the age-normed reference model.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! modeling/math code. The core pipeline is a pure function of a table and a
//! config; everything configurable here (paths, column names, grid/kernel
//! geometry) is productionization layered on top of it.

use std::path::PathBuf;

use clap::Parser;

use crate::domain::AgeUnit;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "norm",
    version,
    about = "Nonparametric age-normed reference model: fit, score, rank"
)]
pub struct Cli {
    /// Input subject table (CSV).
    #[arg(short = 'i', long, default_value = "phenotypes.csv")]
    pub input: PathBuf,

    /// Output table (input columns plus normalized_score, standardized_deviation, rank).
    #[arg(short = 'o', long, default_value = "phenotypes_scored.csv")]
    pub output: PathBuf,

    /// Name of the age column.
    #[arg(long, default_value = "age")]
    pub age_col: String,

    /// Name of the score column.
    #[arg(long, default_value = "score")]
    pub score_col: String,

    /// Name of the control-membership flag column.
    #[arg(long, default_value = "ctr")]
    pub control_col: String,

    /// Unit of the age column. Determines the default grid step
    /// (half a year: 0.5 for years, 180 for days).
    #[arg(long, value_enum, default_value = "years")]
    pub age_unit: AgeUnit,

    /// Grid spacing in age units (default: half a year in the chosen unit).
    #[arg(long)]
    pub grid_step: Option<f64>,

    /// Kernel half-width in age units (default: 5 x grid step).
    #[arg(long)]
    pub kernel_width: Option<f64>,

    /// Write a machine-readable run summary (JSON) to this path.
    #[arg(long, value_name = "JSON")]
    pub summary_json: Option<PathBuf>,

    /// Suppress the terminal summary (scripting mode).
    #[arg(short = 'q', long)]
    pub quiet: bool,
}
