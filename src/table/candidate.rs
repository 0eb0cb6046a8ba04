// src/table/candidate.rs

use crate::normalize::{clean_cell, header_key, parse_date, DateLocale};

use super::TableCandidate;

/// Share of rows that must parse as dates for a column without a "Date"
/// header to count as the date column.
pub const DATE_COLUMN_MIN_RATIO: f64 = 0.6;

/// Share of rows that must be non-zero for a column to count as numeric.
pub const NUMERIC_COLUMN_MIN_RATIO: f64 = 0.2;

/// Ordering key for candidate tables. Field order matters: the derived `Ord`
/// compares `rows` first, then `numeric_columns`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CandidateScore {
    pub rows: usize,
    pub numeric_columns: usize,
}

/// A qualifying candidate's score plus the column it dates rows by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredCandidate {
    pub date_column: usize,
    pub score: CandidateScore,
}

/// Index of the column holding dates: a header literally named "Date" wins,
/// otherwise the column parsing as dates most often, if above the threshold.
pub fn find_date_column(table: &TableCandidate, locale: DateLocale) -> Option<usize> {
    if let Some(idx) = table.headers.iter().position(|h| header_key(h) == "date") {
        return Some(idx);
    }

    let mut best: Option<(usize, f64)> = None;
    for idx in 0..table.headers.len() {
        let ratio = ratio(table, idx, |cell| parse_date(cell, locale).is_some());
        if best.map_or(true, |(_, r)| ratio > r) {
            best = Some((idx, ratio));
        }
    }

    best.filter(|(_, r)| *r > DATE_COLUMN_MIN_RATIO)
        .map(|(idx, _)| idx)
}

/// Score a candidate, or `None` if it has no date column.
pub fn score_candidate(table: &TableCandidate, locale: DateLocale) -> Option<ScoredCandidate> {
    let date_column = find_date_column(table, locale)?;

    let numeric_columns = (0..table.headers.len())
        .filter(|&idx| idx != date_column)
        .filter(|&idx| ratio(table, idx, |cell| clean_cell(cell) != 0.0) > NUMERIC_COLUMN_MIN_RATIO)
        .count();

    Some(ScoredCandidate {
        date_column,
        score: CandidateScore {
            rows: table.row_count(),
            numeric_columns,
        },
    })
}

fn ratio(table: &TableCandidate, idx: usize, pred: impl Fn(&str) -> bool) -> f64 {
    let n = table.row_count();
    if n == 0 {
        return 0.0;
    }
    table.column(idx).filter(|c| pred(c)).count() as f64 / n as f64
}
