// src/error.rs

use chrono::NaiveDate;
use thiserror::Error;

/// Fatal, per-document failures of the extraction pipeline.
///
/// Malformed cells are never reported here: they degrade to zero in
/// [`crate::normalize::clean_num`]. Anything in this enum means the document
/// as a whole cannot be trusted and nothing should be written for it.
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    #[error("no table in the document exposes a usable date column")]
    TableNotFound,

    #[error("selected table has no rows with a parsable date")]
    NoDataRows,

    #[error("no fund columns left to sum after applying the exclusion set")]
    NoFundColumns,

    #[error("date {0} appears in more than one row")]
    DuplicateDate(NaiveDate),

    #[error("{configured} fund identifiers configured but the table has only {columns} value columns")]
    FundIdentifierMismatch { configured: usize, columns: usize },
}
