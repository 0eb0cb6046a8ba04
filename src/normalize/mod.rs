// src/normalize/mod.rs
//! Cell text cleanup shared by every stage that reads table cells.

pub mod date;

pub use date::{parse_date, DateLocale};

use once_cell::sync::Lazy;
use regex::Regex;

static WS_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Glyphs the source uses for "nothing happened that day".
const ZERO_PLACEHOLDERS: [&str; 4] = ["", "-", "\u{2013}", "\u{2014}"];

/// Footnote markers that trail some figures, e.g. `123.4*`.
const FOOTNOTE_MARKERS: [char; 3] = ['*', '\u{2020}', '\u{2021}'];

/// Map exotic spaces to plain spaces, collapse runs, trim.
pub fn normalize_text(raw: &str) -> String {
    let mapped: String = raw
        .chars()
        .map(|c| match c {
            '\u{00a0}' | '\u{2009}' | '\u{202f}' => ' ',
            other => other,
        })
        .collect();
    WS_RUN.replace_all(&mapped, " ").trim().to_string()
}

/// Lowercased, normalized header used for name comparisons.
pub fn header_key(raw: &str) -> String {
    normalize_text(raw).to_lowercase()
}

/// Parse a flow cell into millions of currency.
///
/// Any cell that cannot be read as a number is worth `0.0`: a single bad cell
/// must not sink an otherwise good row.
pub fn clean_num(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };

    let mut s: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    if ZERO_PLACEHOLDERS.contains(&s.as_str()) {
        return 0.0;
    }

    if s.len() >= 2 && s.starts_with('(') && s.ends_with(')') {
        s = format!("-{}", &s[1..s.len() - 1]);
    }

    let s = s.replace('\u{2212}', "-");
    let s = s.trim_end_matches(FOOTNOTE_MARKERS.as_slice());

    s.parse::<f64>().unwrap_or(0.0)
}

/// `clean_num` for a cell that is known to be present.
pub fn clean_cell(raw: &str) -> f64 {
    clean_num(Some(raw))
}
