// src/parse.rs

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::{debug, instrument, trace};

use crate::error::PipelineError;
use crate::normalize::{clean_cell, parse_date, DateLocale};
use crate::table::SelectedTable;

/// Value columns of the selected table, in column order, with one cleaned
/// number per column for every surviving date.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    pub columns: Vec<String>,
    pub rows: Vec<ParsedRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub date: NaiveDate,
    pub values: Vec<f64>,
}

/// Turn the selected table into date-keyed numeric rows, ascending by date.
///
/// Rows whose date cell does not parse are footers ("Total", "Average", ...)
/// and are dropped. `fund_identifiers`, when given, rename the value columns
/// by position; columns past the end of the list keep their header name.
#[instrument(level = "debug", skip(selected, fund_identifiers))]
pub fn parse_rows(
    selected: &SelectedTable,
    locale: DateLocale,
    fund_identifiers: Option<&[String]>,
) -> Result<ParsedTable, PipelineError> {
    let table = &selected.table;
    let date_col = selected.date_column;

    let value_idx: Vec<usize> = (0..table.headers.len()).filter(|&i| i != date_col).collect();
    let mut columns: Vec<String> = value_idx.iter().map(|&i| table.headers[i].clone()).collect();

    if let Some(ids) = fund_identifiers {
        if ids.len() > columns.len() {
            return Err(PipelineError::FundIdentifierMismatch {
                configured: ids.len(),
                columns: columns.len(),
            });
        }
        for (col, id) in columns.iter_mut().zip(ids) {
            *col = id.clone();
        }
    }

    let mut rows = Vec::with_capacity(table.row_count());
    let mut seen = HashSet::new();
    let mut dropped = 0usize;

    for cells in &table.rows {
        let Some(date) = parse_date(&cells[date_col], locale) else {
            trace!(cell = %cells[date_col], "dropping non-date row");
            dropped += 1;
            continue;
        };
        if !seen.insert(date) {
            return Err(PipelineError::DuplicateDate(date));
        }
        let values = value_idx.iter().map(|&i| clean_cell(&cells[i])).collect();
        rows.push(ParsedRow { date, values });
    }

    if rows.is_empty() {
        return Err(PipelineError::NoDataRows);
    }

    rows.sort_by_key(|r| r.date);
    debug!(rows = rows.len(), dropped, columns = columns.len(), "parsed rows");

    Ok(ParsedTable { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{CandidateScore, TableCandidate};

    fn selected(headers: &[&str], date_column: usize, rows: &[&[&str]]) -> SelectedTable {
        let table = TableCandidate::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        );
        SelectedTable {
            score: CandidateScore {
                rows: table.row_count(),
                numeric_columns: 0,
            },
            table,
            date_column,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_rows_sorted_and_footers_dropped() {
        let sel = selected(
            &["A", "Date", "B"],
            1,
            &[
                &["500", "03 Jan 2024", "300"],
                &["1,000", "01 Jan 2024", "(200)"],
                &["1,500", "Total", "100"],
                &["n/a", "02/01/2024", "-"],
            ],
        );
        let parsed = parse_rows(&sel, DateLocale::DayFirst, None).unwrap();
        assert_eq!(parsed.columns, vec!["A", "B"]);
        assert_eq!(
            parsed.rows,
            vec![
                ParsedRow { date: d(2024, 1, 1), values: vec![1000.0, -200.0] },
                ParsedRow { date: d(2024, 1, 2), values: vec![0.0, 0.0] },
                ParsedRow { date: d(2024, 1, 3), values: vec![500.0, 300.0] },
            ]
        );
    }

    #[test]
    fn test_fixed_identifiers_rename_by_position() {
        let sel = selected(&["0", "1", "2", "3"], 0, &[&["01 Jan 2024", "1", "2", "3"]]);
        let ids = vec!["IBIT".to_string(), "FBTC".to_string()];
        let parsed = parse_rows(&sel, DateLocale::DayFirst, Some(ids.as_slice())).unwrap();
        assert_eq!(parsed.columns, vec!["IBIT", "FBTC", "3"]);

        let too_many: Vec<String> = (0..4).map(|i| i.to_string()).collect();
        assert_eq!(
            parse_rows(&sel, DateLocale::DayFirst, Some(too_many.as_slice())),
            Err(PipelineError::FundIdentifierMismatch { configured: 4, columns: 3 })
        );
    }

    #[test]
    fn test_no_parsable_dates() {
        let sel = selected(&["Date", "A"], 0, &[&["Total", "5"], &["Average", "1"]]);
        assert_eq!(
            parse_rows(&sel, DateLocale::DayFirst, None),
            Err(PipelineError::NoDataRows)
        );
    }

    #[test]
    fn test_duplicate_dates_are_rejected() {
        let sel = selected(
            &["Date", "A"],
            0,
            &[&["01 Jan 2024", "5"], &["2024-01-01", "6"]],
        );
        assert_eq!(
            parse_rows(&sel, DateLocale::DayFirst, None),
            Err(PipelineError::DuplicateDate(d(2024, 1, 1)))
        );
    }
}
