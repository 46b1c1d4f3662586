//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments into a `RunConfig`
//! - reads the input table (the only input I/O of the run)
//! - runs the pure pipeline
//! - prints the summary and writes the augmented table

use clap::Parser;

use crate::cli::Cli;
use crate::domain::RunConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `norm` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = run_config_from_args(&cli)?;

    let table = crate::io::ingest::load_subject_table(&config)?;
    let output = pipeline::run_pipeline(table, &config)?;

    if !config.quiet {
        println!(
            "{}",
            crate::report::format_run_summary(&output.summary, &config)
        );
    }

    crate::io::export::write_scored_csv(&config.output, &output.table, &output.scores)?;
    if let Some(path) = &config.summary_json {
        crate::io::export::write_summary_json(path, &output.summary)?;
    }

    Ok(())
}

/// Resolve CLI flags into a concrete run configuration.
pub fn run_config_from_args(cli: &Cli) -> Result<RunConfig, AppError> {
    let grid_step = cli.grid_step.unwrap_or(cli.age_unit.default_grid_step());
    if !(grid_step.is_finite() && grid_step > 0.0) {
        return Err(AppError::new(
            2,
            format!("Invalid --grid-step {grid_step} (must be finite and > 0)."),
        ));
    }

    let kernel_width = cli.kernel_width.unwrap_or(5.0 * grid_step);
    if !(kernel_width.is_finite() && kernel_width > 0.0) {
        return Err(AppError::new(
            2,
            format!("Invalid --kernel-width {kernel_width} (must be finite and > 0)."),
        ));
    }

    Ok(RunConfig {
        input: cli.input.clone(),
        output: cli.output.clone(),
        age_col: cli.age_col.clone(),
        score_col: cli.score_col.clone(),
        control_col: cli.control_col.clone(),
        age_unit: cli.age_unit,
        grid_step,
        kernel_width,
        summary_json: cli.summary_json.clone(),
        quiet: cli.quiet,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AgeUnit;

    #[test]
    fn kernel_defaults_to_five_grid_steps() {
        let cli = Cli::parse_from(["norm"]);
        let config = run_config_from_args(&cli).unwrap();
        assert_eq!(config.age_unit, AgeUnit::Years);
        assert!((config.grid_step - 0.5).abs() < 1e-12);
        assert!((config.kernel_width - 2.5).abs() < 1e-12);
    }

    #[test]
    fn day_unit_switches_the_default_step() {
        let cli = Cli::parse_from(["norm", "--age-unit", "days"]);
        let config = run_config_from_args(&cli).unwrap();
        assert!((config.grid_step - 180.0).abs() < 1e-12);
        assert!((config.kernel_width - 900.0).abs() < 1e-12);
    }

    #[test]
    fn explicit_overrides_win_and_are_validated() {
        let cli = Cli::parse_from(["norm", "--grid-step", "1.0", "--kernel-width", "3.0"]);
        let config = run_config_from_args(&cli).unwrap();
        assert!((config.grid_step - 1.0).abs() < 1e-12);
        assert!((config.kernel_width - 3.0).abs() < 1e-12);

        let cli = Cli::parse_from(["norm", "--grid-step=-1.0"]);
        assert!(run_config_from_args(&cli).is_err());
    }
}
