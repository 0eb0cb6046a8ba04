// src/total.rs

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::PipelineError;
use crate::normalize::header_key;
use crate::parse::ParsedTable;
use crate::series::{DailyRecord, FundSeries};

/// Where the per-day Total comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TotalPolicy {
    /// Use the site's own "Total" column; recompute only if it is missing.
    #[default]
    TrustSite,
    /// Always sum the fund columns. Site totals have been seen to miss
    /// newly listed funds.
    Recompute,
}

/// Split the parsed columns into funds and aggregates and settle the Total.
///
/// Funds are the columns whose lowercased name is not in `exclusion_set`
/// (and which are not the site Total). Excluded columns are dropped.
#[instrument(level = "debug", skip(parsed, exclusion_set))]
pub fn resolve_totals(
    parsed: ParsedTable,
    policy: TotalPolicy,
    exclusion_set: &BTreeSet<String>,
) -> Result<FundSeries, PipelineError> {
    let site_total = parsed.columns.iter().position(|c| header_key(c) == "total");

    let fund_idx: Vec<usize> = parsed
        .columns
        .iter()
        .enumerate()
        .filter(|(i, c)| {
            let key = header_key(c);
            Some(*i) != site_total && key != "date" && !exclusion_set.contains(&key)
        })
        .map(|(i, _)| i)
        .collect();

    let trusted = match (policy, site_total) {
        (TotalPolicy::TrustSite, Some(idx)) => Some(idx),
        (TotalPolicy::TrustSite, None) => {
            warn!("no Total column on the site, recomputing");
            None
        }
        (TotalPolicy::Recompute, _) => None,
    };

    if trusted.is_none() && fund_idx.is_empty() {
        return Err(PipelineError::NoFundColumns);
    }

    let funds: Vec<String> = fund_idx.iter().map(|&i| parsed.columns[i].clone()).collect();
    debug!(funds = ?funds, trusted = trusted.is_some(), "resolved fund columns");

    let records = parsed
        .rows
        .into_iter()
        .map(|row| {
            let flows: Vec<f64> = fund_idx.iter().map(|&i| row.values[i]).collect();
            let total = match trusted {
                Some(idx) => row.values[idx],
                None => flows.iter().sum(),
            };
            DailyRecord {
                date: row.date,
                flows,
                total,
            }
        })
        .collect();

    Ok(FundSeries { funds, records })
}
