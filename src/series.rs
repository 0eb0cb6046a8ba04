// src/series.rs

use chrono::NaiveDate;

/// One calendar day: a flow per fund (aligned with [`FundSeries::funds`])
/// and the resolved Total, all in millions of currency.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub flows: Vec<f64>,
    pub total: f64,
}

impl DailyRecord {
    /// A day the source did not report.
    pub fn zero(date: NaiveDate, funds: usize) -> Self {
        Self {
            date,
            flows: vec![0.0; funds],
            total: 0.0,
        }
    }
}

/// Every parsed day for one document, ascending by date, unique dates.
/// Each record has exactly one flow per entry of `funds`.
#[derive(Debug, Clone, PartialEq)]
pub struct FundSeries {
    pub funds: Vec<String>,
    pub records: Vec<DailyRecord>,
}

impl FundSeries {
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.date)
    }
}
