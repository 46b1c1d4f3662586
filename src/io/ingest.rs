//! CSV ingest and validation.
//!
//! This module turns a heterogeneous subject CSV into parsed `SubjectRow`s
//! that are safe to normalize, fit, and score.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation**: a malformed field degrades that row's value
//!   to missing and is reported, but the row stays in the table so the
//!   output remains "the same table, augmented"
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;

use csv::StringRecord;

use crate::domain::{RunConfig, SubjectRow};
use crate::error::AppError;

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the parsed table plus row-level diagnostics.
#[derive(Debug, Clone)]
pub struct SubjectTable {
    /// Original header names, untouched (for pass-through export).
    pub headers: Vec<String>,
    pub rows: Vec<SubjectRow>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load and parse the subject CSV at the configured path.
pub fn load_subject_table(config: &RunConfig) -> Result<SubjectTable, AppError> {
    let file = File::open(&config.input).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open CSV '{}': {e}", config.input.display()),
        )
    })?;
    read_subject_table(file, config)
}

/// Parse a subject table from any reader (exposed for tests).
pub fn read_subject_table<R: Read>(reader: R, config: &RunConfig) -> Result<SubjectTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);

    let age_idx = require_column(&header_map, &config.age_col)?;
    let score_idx = require_column(&header_map, &config.score_col)?;
    let control_idx = require_column(&header_map, &config.control_col)?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        rows.push(parse_row(
            &record,
            line,
            age_idx,
            score_idx,
            control_idx,
            config,
            &mut row_errors,
        ));
    }

    if rows.is_empty() {
        return Err(AppError::new(3, "No data rows in input."));
    }

    Ok(SubjectTable {
        headers: headers.iter().map(str::to_string).collect(),
        rows,
        row_errors,
        rows_read,
    })
}

fn parse_row(
    record: &StringRecord,
    line: usize,
    age_idx: usize,
    score_idx: usize,
    control_idx: usize,
    config: &RunConfig,
    row_errors: &mut Vec<RowError>,
) -> SubjectRow {
    let fields: Vec<String> = record.iter().map(str::to_string).collect();

    let age = match get_field(record, age_idx) {
        None => {
            row_errors.push(RowError {
                line,
                message: format!("Missing `{}` value.", config.age_col),
            });
            None
        }
        Some(s) => match s.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
            _ => {
                row_errors.push(RowError {
                    line,
                    message: format!("Invalid `{}` value '{s}' (must be a number >= 0).", config.age_col),
                });
                None
            }
        },
    };

    // A missing score is allowed data; an unparseable one is reported.
    let score = match get_field(record, score_idx) {
        None => None,
        Some(s) => match s.parse::<f64>() {
            Ok(v) if v.is_finite() => Some(v),
            _ => {
                row_errors.push(RowError {
                    line,
                    message: format!("Invalid `{}` value '{s}'.", config.score_col),
                });
                None
            }
        },
    };

    // Missing flag means non-control; an unrecognized token is reported and
    // the row is kept out of the control sample.
    let is_control = match get_field(record, control_idx) {
        None => false,
        Some(s) => match parse_bool(s) {
            Some(b) => b,
            None => {
                row_errors.push(RowError {
                    line,
                    message: format!("Invalid `{}` value '{s}' (expected a boolean).", config.control_col),
                });
                false
            }
        },
    };

    SubjectRow {
        line,
        fields,
        age,
        score,
        is_control,
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on
    // the first header (e.g. "﻿age"). If we don't strip it, schema
    // validation will incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn require_column(header_map: &HashMap<String, usize>, name: &str) -> Result<usize, AppError> {
    header_map
        .get(&name.to_ascii_lowercase())
        .copied()
        .ok_or_else(|| AppError::new(2, format!("Missing required column: `{name}`")))
}

fn get_field<'a>(record: &'a StringRecord, idx: usize) -> Option<&'a str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Some(true),
        "false" | "f" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AgeUnit;
    use std::path::PathBuf;

    fn test_config() -> RunConfig {
        RunConfig {
            input: PathBuf::from("in.csv"),
            output: PathBuf::from("out.csv"),
            age_col: "age".to_string(),
            score_col: "score".to_string(),
            control_col: "ctr".to_string(),
            age_unit: AgeUnit::Years,
            grid_step: 0.5,
            kernel_width: 2.5,
            summary_json: None,
            quiet: true,
        }
    }

    #[test]
    fn parses_rows_and_preserves_extra_columns() {
        let csv = "id,age,score,ctr,site\nA,6.5,12.0,true,lyon\nB,7.0,,false,paris\n";
        let table = read_subject_table(csv.as_bytes(), &test_config()).unwrap();

        assert_eq!(table.rows_read, 2);
        assert_eq!(table.rows.len(), 2);
        assert!(table.row_errors.is_empty());

        let a = &table.rows[0];
        assert_eq!(a.age, Some(6.5));
        assert_eq!(a.score, Some(12.0));
        assert!(a.is_control);
        assert_eq!(a.fields, vec!["A", "6.5", "12.0", "true", "lyon"]);

        let b = &table.rows[1];
        assert_eq!(b.score, None);
        assert!(!b.is_control);
    }

    #[test]
    fn missing_required_column_fails_fast() {
        let csv = "id,age,ctr\nA,6.5,true\n";
        let err = read_subject_table(csv.as_bytes(), &test_config()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("score"));
    }

    #[test]
    fn header_lookup_is_case_insensitive_and_bom_tolerant() {
        let csv = "\u{feff}Age,SCORE,Ctr\n6.5,12.0,1\n";
        let table = read_subject_table(csv.as_bytes(), &test_config()).unwrap();
        assert_eq!(table.rows[0].age, Some(6.5));
        assert!(table.rows[0].is_control);
    }

    #[test]
    fn malformed_fields_degrade_to_missing_with_row_errors() {
        let csv = "age,score,ctr\nnot-a-number,1.0,true\n8.0,oops,maybe\n-3.0,2.0,false\n";
        let table = read_subject_table(csv.as_bytes(), &test_config()).unwrap();

        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.row_errors.len(), 4);

        assert_eq!(table.rows[0].age, None);
        assert_eq!(table.rows[1].score, None);
        assert!(!table.rows[1].is_control);
        // Negative ages are invalid.
        assert_eq!(table.rows[2].age, None);
    }

    #[test]
    fn empty_control_flag_means_non_control_without_error() {
        let csv = "age,score,ctr\n6.0,1.0,\n";
        let table = read_subject_table(csv.as_bytes(), &test_config()).unwrap();
        assert!(!table.rows[0].is_control);
        assert!(table.row_errors.is_empty());
    }

    #[test]
    fn empty_table_is_fatal() {
        let csv = "age,score,ctr\n";
        let err = read_subject_table(csv.as_bytes(), &test_config()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
