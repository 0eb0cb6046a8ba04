// src/normalize/date.rs

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::normalize_text;

/// Which field comes first when a numeric date is ambiguous (`11/01/2024`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateLocale {
    #[default]
    DayFirst,
    MonthFirst,
}

// 2024-01-11, 11/01/2024, 11.01.24; an optional time part is ignored
static NUMERIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,4})[/.\-](\d{1,2})[/.\-](\d{1,4})(?:[ T]\d{1,2}:\d{2}(?::\d{2})?)?$")
        .expect("numeric date regex")
});

// 11 Jan 2024, 11th January 2024, 11-Jan-24
static DAY_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})(?:st|nd|rd|th)?[ \-]([A-Za-z]{3,9})\.?[ \-](\d{2}|\d{4})$")
        .expect("day-month regex")
});

// Jan 11 2024, January 11th 24 (commas are stripped beforehand)
static MONTH_DAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]{3,9})\.? (\d{1,2})(?:st|nd|rd|th)? (\d{2}|\d{4})$")
        .expect("month-day regex")
});

/// Parse a date cell. Returns `None` for anything that is not a date, which
/// callers treat as "not a data row".
pub fn parse_date(raw: &str, locale: DateLocale) -> Option<NaiveDate> {
    let cleaned = normalize_text(&raw.replace(',', " "));
    let s = cleaned.trim_end_matches(['*', '\u{2020}', '\u{2021}']).trim_end();
    if s.is_empty() {
        return None;
    }

    if let Some(c) = NUMERIC.captures(s) {
        return numeric_date(&c[1], &c[2], &c[3], locale);
    }
    if let Some(c) = DAY_MONTH.captures(s) {
        return ymd(expand_year(&c[3])?, month_from_name(&c[2])?, c[1].parse().ok()?);
    }
    if let Some(c) = MONTH_DAY.captures(s) {
        return ymd(expand_year(&c[3])?, month_from_name(&c[1])?, c[2].parse().ok()?);
    }
    None
}

fn numeric_date(a: &str, b: &str, c: &str, locale: DateLocale) -> Option<NaiveDate> {
    if a.len() == 4 {
        if c.len() > 2 {
            return None;
        }
        return ymd(a.parse().ok()?, b.parse().ok()?, c.parse().ok()?);
    }
    if a.len() > 2 {
        return None;
    }

    let year = expand_year(c)?;
    let first: u32 = a.parse().ok()?;
    let second: u32 = b.parse().ok()?;
    let (day, month) = match locale {
        DateLocale::DayFirst => (first, second),
        DateLocale::MonthFirst => (second, first),
    };
    // an impossible reading in the preferred order falls back to the other one
    ymd(year, month, day).or_else(|| ymd(year, day, month))
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn expand_year(s: &str) -> Option<i32> {
    expand_year_around(s, Utc::now().year())
}

/// Two-digit years land within 50 years of `this_year`: in 2026, `24` is
/// 2024 and `99` is 1999.
fn expand_year_around(s: &str, this_year: i32) -> Option<i32> {
    let y: i32 = s.parse().ok()?;
    match s.len() {
        2 => {
            let year = this_year - this_year % 100 + y;
            if year >= this_year + 50 {
                Some(year - 100)
            } else if year < this_year - 50 {
                Some(year + 100)
            } else {
                Some(year)
            }
        }
        4 => Some(y),
        _ => None,
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    let m = match lower.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_day_first_is_default_reading() {
        let l = DateLocale::DayFirst;
        assert_eq!(parse_date("11 Jan 2024", l), Some(d(2024, 1, 11)));
        assert_eq!(parse_date("11/01/2024", l), Some(d(2024, 1, 11)));
        assert_eq!(parse_date("11-01-2024", l), Some(d(2024, 1, 11)));
        assert_eq!(parse_date("11.01.24", l), Some(d(2024, 1, 11)));
    }

    #[test]
    fn test_month_first_locale() {
        let l = DateLocale::MonthFirst;
        assert_eq!(parse_date("01/11/2024", l), Some(d(2024, 1, 11)));
        // textual months are never ambiguous
        assert_eq!(parse_date("11 Jan 2024", l), Some(d(2024, 1, 11)));
    }

    #[test]
    fn test_impossible_order_falls_back() {
        assert_eq!(parse_date("01/13/2024", DateLocale::DayFirst), Some(d(2024, 1, 13)));
        assert_eq!(parse_date("13/01/2024", DateLocale::MonthFirst), Some(d(2024, 1, 13)));
        assert_eq!(parse_date("31/31/2024", DateLocale::DayFirst), None);
    }

    #[test]
    fn test_textual_and_iso_shapes() {
        let l = DateLocale::DayFirst;
        assert_eq!(parse_date("2024-01-11", l), Some(d(2024, 1, 11)));
        assert_eq!(parse_date("2024/01/11 00:00:00", l), Some(d(2024, 1, 11)));
        assert_eq!(parse_date("11 January 2024", l), Some(d(2024, 1, 11)));
        assert_eq!(parse_date("11-Jan-2024", l), Some(d(2024, 1, 11)));
        assert_eq!(parse_date("Jan 11, 2024", l), Some(d(2024, 1, 11)));
        assert_eq!(parse_date("September 3rd 2024", l), Some(d(2024, 9, 3)));
        assert_eq!(parse_date("\u{00a0}05 Feb 2024*", l), Some(d(2024, 2, 5)));
    }

    #[test]
    fn test_non_dates() {
        let l = DateLocale::DayFirst;
        for cell in ["Total", "Average", "", "1,000", "(200)", "-", "2024", "30 Feb 2024"] {
            assert_eq!(parse_date(cell, l), None, "{cell:?} should not parse");
        }
    }

    #[test]
    fn test_two_digit_years_pivot_around_current_year() {
        assert_eq!(expand_year_around("24", 2026), Some(2024));
        assert_eq!(expand_year_around("75", 2026), Some(2075));
        assert_eq!(expand_year_around("76", 2026), Some(1976));
        assert_eq!(expand_year_around("99", 2026), Some(1999));
        assert_eq!(expand_year_around("10", 2090), Some(2110));
        assert_eq!(expand_year_around("2024", 2026), Some(2024));
        assert_eq!(expand_year_around("024", 2026), None);
    }
}
