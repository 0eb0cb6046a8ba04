// src/table/select.rs

use tracing::{debug, instrument, warn};

use crate::error::PipelineError;
use crate::normalize::DateLocale;

use super::candidate::{score_candidate, CandidateScore};
use super::TableCandidate;

/// The table the rest of the pipeline reads rows from.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedTable {
    pub table: TableCandidate,
    pub date_column: usize,
    pub score: CandidateScore,
}

/// Keep the highest-scoring candidate that has a date column. Earlier
/// candidates win ties.
#[instrument(level = "debug", skip(candidates))]
pub fn select_table<I>(candidates: I, locale: DateLocale) -> Result<SelectedTable, PipelineError>
where
    I: IntoIterator<Item = TableCandidate>,
{
    let mut best: Option<SelectedTable> = None;

    for (idx, table) in candidates.into_iter().enumerate() {
        let Some(scored) = score_candidate(&table, locale) else {
            debug!(idx, "no date column, skipping");
            continue;
        };
        debug!(idx, rows = scored.score.rows, numeric = scored.score.numeric_columns, "scored");

        if best.as_ref().map_or(true, |b| scored.score > b.score) {
            best = Some(SelectedTable {
                table,
                date_column: scored.date_column,
                score: scored.score,
            });
        }
    }

    match best {
        Some(sel) => {
            debug!(score = ?sel.score, headers = ?sel.table.headers, "selected table");
            Ok(sel)
        }
        None => {
            warn!("no candidate table has a date column");
            Err(PipelineError::TableNotFound)
        }
    }
}
