// src/views.rs

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::calendar::DenseCalendar;
use crate::series::DailyRecord;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A named table with a header row, ready for any delimited-text sink.
pub trait TabularView {
    /// Short name used in output file names, e.g. `totals_daily`.
    fn name(&self) -> &'static str;
    fn header(&self) -> Vec<String>;
    fn records(&self) -> Vec<Vec<String>>;

    fn to_csv(&self) -> Result<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(self.header())?;
        for rec in self.records() {
            wtr.write_record(&rec)?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| anyhow::anyhow!("flushing {} csv: {}", self.name(), e))?;
        String::from_utf8(bytes).with_context(|| format!("{} csv is not utf-8", self.name()))
    }
}

/// One row per date: `date, fund_1..fund_n, Total`.
#[derive(Debug, Clone, PartialEq)]
pub struct WideView {
    pub funds: Vec<String>,
    pub rows: Vec<DailyRecord>,
}

/// One row per (date, fund): all funds of the first date, then the next date.
#[derive(Debug, Clone, PartialEq)]
pub struct LongView {
    pub rows: Vec<LongRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub date: NaiveDate,
    pub fund: String,
    pub flow: f64,
}

/// One row per date with the running sum of Total.
#[derive(Debug, Clone, PartialEq)]
pub struct TotalsView {
    pub rows: Vec<TotalsRow>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TotalsRow {
    pub date: NaiveDate,
    pub total: f64,
    pub cumulative: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowViews {
    pub wide: WideView,
    pub long: LongView,
    pub totals: TotalsView,
}

impl FlowViews {
    pub fn as_tabular(&self) -> [&dyn TabularView; 3] {
        [&self.wide, &self.long, &self.totals]
    }
}

/// Derive all three views. Totals are copied from the calendar, never
/// recomputed, so every view carries the same per-day value.
pub fn build_views(calendar: &DenseCalendar) -> FlowViews {
    let funds = calendar.funds().to_vec();
    let records = calendar.records();

    let long = records
        .iter()
        .flat_map(|r| {
            funds.iter().zip(&r.flows).map(move |(fund, flow)| LongRow {
                date: r.date,
                fund: fund.clone(),
                flow: *flow,
            })
        })
        .collect();

    let mut running = 0.0;
    let totals = records
        .iter()
        .map(|r| {
            running += r.total;
            TotalsRow {
                date: r.date,
                total: r.total,
                cumulative: running,
            }
        })
        .collect();

    FlowViews {
        wide: WideView {
            funds,
            rows: records.to_vec(),
        },
        long: LongView { rows: long },
        totals: TotalsView { rows: totals },
    }
}

fn fmt_date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

fn fmt_num(v: f64) -> String {
    // no "-0" in output
    if v == 0.0 {
        "0".to_string()
    } else {
        v.to_string()
    }
}

impl TabularView for WideView {
    fn name(&self) -> &'static str {
        "flows_wide_daily"
    }

    fn header(&self) -> Vec<String> {
        let mut h = Vec::with_capacity(self.funds.len() + 2);
        h.push("date".to_string());
        h.extend(self.funds.iter().cloned());
        h.push("Total".to_string());
        h
    }

    fn records(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| {
                let mut rec = Vec::with_capacity(r.flows.len() + 2);
                rec.push(fmt_date(r.date));
                rec.extend(r.flows.iter().map(|v| fmt_num(*v)));
                rec.push(fmt_num(r.total));
                rec
            })
            .collect()
    }
}

impl TabularView for LongView {
    fn name(&self) -> &'static str {
        "flows_long_daily"
    }

    fn header(&self) -> Vec<String> {
        vec!["date".into(), "fund".into(), "flow".into()]
    }

    fn records(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| vec![fmt_date(r.date), r.fund.clone(), fmt_num(r.flow)])
            .collect()
    }
}

impl TabularView for TotalsView {
    fn name(&self) -> &'static str {
        "totals_daily"
    }

    fn header(&self) -> Vec<String> {
        vec!["date".into(), "total".into(), "cumulative".into()]
    }

    fn records(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|r| vec![fmt_date(r.date), fmt_num(r.total), fmt_num(r.cumulative)])
            .collect()
    }
}
