// src/table/mod.rs
//! Finding the daily flow table inside a page.
//!
//! `extract` turns markup into plain [`TableCandidate`]s, `candidate` scores
//! them without looking at markup, and `select` keeps the winner.

pub mod candidate;
pub mod extract;
pub mod select;

pub use candidate::{find_date_column, score_candidate, CandidateScore, ScoredCandidate};
pub use extract::RawDocument;
pub use select::{select_table, SelectedTable};

/// One `<table>` flattened to strings: unique header names plus body rows,
/// every row exactly `headers.len()` cells wide.
#[derive(Debug, Clone, PartialEq)]
pub struct TableCandidate {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableCandidate {
    /// Build a candidate, padding or truncating rows to the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, String::new());
                r
            })
            .collect();
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cells of column `idx`, top to bottom.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |r| r[idx].as_str())
    }
}
