use anyhow::{Context, Result};
use clap::Parser;
use etf_flows::{
    normalize::DateLocale,
    table::{score_candidate, select_table, RawDocument},
};
use serde::Serialize;
use std::{fs, path::PathBuf};

/// List every table in an HTML page with the score the selector gives it.
#[derive(Parser, Debug)]
struct Args {
    /// Saved HTML page
    file: PathBuf,

    /// Read ambiguous numeric dates month-first
    #[arg(long)]
    month_first: bool,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct CandidateReport {
    index: usize,
    rows: usize,
    headers: Vec<String>,
    date_column: Option<String>,
    numeric_columns: Option<usize>,
    selected: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let locale = if args.month_first {
        DateLocale::MonthFirst
    } else {
        DateLocale::DayFirst
    };

    let html = fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let candidates = RawDocument::parse(&html).candidates();
    let winner = select_table(candidates.clone(), locale).ok();

    let reports: Vec<CandidateReport> = candidates
        .iter()
        .enumerate()
        .map(|(index, table)| {
            let scored = score_candidate(table, locale);
            CandidateReport {
                index,
                rows: table.row_count(),
                headers: table.headers.clone(),
                date_column: scored.map(|s| table.headers[s.date_column].clone()),
                numeric_columns: scored.map(|s| s.score.numeric_columns),
                selected: winner.as_ref().map_or(false, |w| &w.table == table)
                    && !earlier_identical(&candidates, index),
            }
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for r in &reports {
        let mark = if r.selected { "*" } else { " " };
        match (&r.date_column, r.numeric_columns) {
            (Some(date), Some(n)) => println!(
                "{} #{:<3} rows={:<5} numeric={:<3} date={:?} headers={:?}",
                mark, r.index, r.rows, n, date, r.headers
            ),
            _ => println!(
                "{} #{:<3} rows={:<5} (no date column) headers={:?}",
                mark, r.index, r.rows, r.headers
            ),
        }
    }
    if winner.is_none() {
        println!("no qualifying table");
    }
    Ok(())
}

// the selector keeps the first of equal candidates
fn earlier_identical(
    candidates: &[etf_flows::table::TableCandidate],
    index: usize,
) -> bool {
    candidates[..index].iter().any(|c| *c == candidates[index])
}
