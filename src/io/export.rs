//! Export the augmented subject table (and optional summary JSON).
//!
//! The output is the input table with a leading `row` index column and three
//! derived columns appended. Undefined derived values are written as empty
//! fields, never as sentinel numbers, so downstream tools see them as
//! missing data.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{SubjectRow, SubjectScore};
use crate::error::AppError;
use crate::io::ingest::SubjectTable;
use crate::report::RunSummary;

/// Write the augmented table to a CSV file.
pub fn write_scored_csv(
    path: &Path,
    table: &SubjectTable,
    scores: &[SubjectScore],
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create output CSV '{}': {e}", path.display()),
        )
    })?;
    write_scored_csv_to(file, table, scores)
}

/// Write the augmented table to any writer (exposed for tests).
pub fn write_scored_csv_to<W: Write>(
    writer: W,
    table: &SubjectTable,
    scores: &[SubjectScore],
) -> Result<(), AppError> {
    debug_assert_eq!(table.rows.len(), scores.len());

    // Flexible: the ingest reader accepts ragged rows, so pass-through
    // records may not all have the same length.
    let mut out = csv::WriterBuilder::new().flexible(true).from_writer(writer);

    let mut header: Vec<&str> = Vec::with_capacity(table.headers.len() + 4);
    header.push("row");
    header.extend(table.headers.iter().map(String::as_str));
    header.push("normalized_score");
    header.push("standardized_deviation");
    header.push("rank");
    out.write_record(&header)
        .map_err(|e| AppError::new(2, format!("Failed to write output CSV header: {e}")))?;

    for (idx, (row, score)) in table.rows.iter().zip(scores.iter()).enumerate() {
        write_row(&mut out, idx, row, score)
            .map_err(|e| AppError::new(2, format!("Failed to write output CSV row: {e}")))?;
    }

    out.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush output CSV: {e}")))?;
    Ok(())
}

fn write_row<W: Write>(
    out: &mut csv::Writer<W>,
    idx: usize,
    row: &SubjectRow,
    score: &SubjectScore,
) -> csv::Result<()> {
    let mut record: Vec<String> = Vec::with_capacity(row.fields.len() + 4);
    record.push(idx.to_string());
    record.extend(row.fields.iter().cloned());
    record.push(fmt_opt(score.normalized_score));
    record.push(fmt_opt(score.deviation));
    record.push(
        score
            .rank
            .map(|r| r.value().to_string())
            .unwrap_or_default(),
    );
    out.write_record(&record)
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.6}")).unwrap_or_default()
}

/// Write the machine-readable run summary.
pub fn write_summary_json(path: &Path, summary: &RunSummary) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create summary JSON '{}': {e}", path.display()),
        )
    })?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::new(4, format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Rank;
    use crate::io::ingest::SubjectTable;

    fn table_and_scores() -> (SubjectTable, Vec<SubjectScore>) {
        let table = SubjectTable {
            headers: vec!["id".into(), "age".into(), "score".into(), "ctr".into()],
            rows: vec![
                SubjectRow {
                    line: 2,
                    fields: vec!["A, Inc".into(), "6.5".into(), "12.0".into(), "true".into()],
                    age: Some(6.5),
                    score: Some(12.0),
                    is_control: true,
                },
                SubjectRow {
                    line: 3,
                    fields: vec!["B".into(), "7.0".into(), "".into(), "false".into()],
                    age: Some(7.0),
                    score: None,
                    is_control: false,
                },
            ],
            row_errors: vec![],
            rows_read: 2,
        };
        let scores = vec![
            SubjectScore {
                normalized_score: Some(0.5),
                deviation: Some(-1.25),
                rank: Some(Rank::Below),
            },
            SubjectScore {
                normalized_score: None,
                deviation: None,
                rank: None,
            },
        ];
        (table, scores)
    }

    #[test]
    fn writes_index_passthrough_and_derived_columns() {
        let (table, scores) = table_and_scores();
        let mut buf = Vec::new();
        write_scored_csv_to(&mut buf, &table, &scores).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "row,id,age,score,ctr,normalized_score,standardized_deviation,rank"
        );
        // Fields containing commas survive the round trip quoted.
        assert_eq!(
            lines.next().unwrap(),
            "0,\"A, Inc\",6.5,12.0,true,0.500000,-1.250000,-1"
        );
        // Undefined outputs are empty fields, not sentinels.
        assert_eq!(lines.next().unwrap(), "1,B,7.0,,false,,,");
    }
}
