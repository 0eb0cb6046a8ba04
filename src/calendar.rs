// src/calendar.rs

use tracing::debug;

use crate::series::{DailyRecord, FundSeries};

/// A [`FundSeries`] with exactly one record for every day between its first
/// and last date, ascending. Only [`densify`] builds one.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseCalendar {
    funds: Vec<String>,
    records: Vec<DailyRecord>,
}

impl DenseCalendar {
    pub fn funds(&self) -> &[String] {
        &self.funds
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Fill the gaps between the first and last reported day with zero-flow days
/// (weekends, holidays). Cumulative sums need the full calendar.
pub fn densify(series: FundSeries) -> DenseCalendar {
    let (Some(start), Some(end)) = (series.first_date(), series.last_date()) else {
        return DenseCalendar {
            funds: series.funds,
            records: series.records,
        };
    };
    let FundSeries { funds, records } = series;

    let span = (end - start).num_days() as usize + 1;
    let mut dense = Vec::with_capacity(span);
    let mut reported = records.into_iter().peekable();

    for day in start.iter_days().take(span) {
        match reported.next_if(|r| r.date == day) {
            Some(r) => dense.push(r),
            None => dense.push(DailyRecord::zero(day, funds.len())),
        }
    }

    debug!(%start, %end, days = dense.len(), "densified calendar");
    DenseCalendar {
        funds,
        records: dense,
    }
}
