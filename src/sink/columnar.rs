// src/sink/columnar.rs

use anyhow::{bail, Context, Result};
use arrow::array::{ArrayRef, Date32Array, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::sync::Arc;

use crate::views::{FlowViews, LongView, TabularView, TotalsView, WideView};

/// 1970-01-01 counted from 0001-01-01 (day 1).
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn date32(d: NaiveDate) -> i32 {
    d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn date_column(dates: impl Iterator<Item = NaiveDate>) -> ArrayRef {
    Arc::new(Date32Array::from(dates.map(date32).collect::<Vec<_>>()))
}

fn f64_column(values: impl Iterator<Item = f64>) -> ArrayRef {
    Arc::new(Float64Array::from(values.collect::<Vec<_>>()))
}

pub fn wide_batch(view: &WideView) -> Result<RecordBatch> {
    let mut fields = vec![Field::new("date", DataType::Date32, false)];
    let mut cols = vec![date_column(view.rows.iter().map(|r| r.date))];
    for (i, fund) in view.funds.iter().enumerate() {
        fields.push(Field::new(fund, DataType::Float64, false));
        cols.push(f64_column(view.rows.iter().map(|r| r.flows[i])));
    }
    fields.push(Field::new("Total", DataType::Float64, false));
    cols.push(f64_column(view.rows.iter().map(|r| r.total)));

    RecordBatch::try_new(Arc::new(Schema::new(fields)), cols).context("building wide batch")
}

pub fn long_batch(view: &LongView) -> Result<RecordBatch> {
    let schema = Schema::new(vec![
        Field::new("date", DataType::Date32, false),
        Field::new("fund", DataType::Utf8, false),
        Field::new("flow", DataType::Float64, false),
    ]);
    let funds: Vec<String> = view.rows.iter().map(|r| r.fund.clone()).collect();
    let cols = vec![
        date_column(view.rows.iter().map(|r| r.date)),
        Arc::new(StringArray::from(funds)) as ArrayRef,
        f64_column(view.rows.iter().map(|r| r.flow)),
    ];
    RecordBatch::try_new(Arc::new(schema), cols).context("building long batch")
}

pub fn totals_batch(view: &TotalsView) -> Result<RecordBatch> {
    let schema = Schema::new(vec![
        Field::new("date", DataType::Date32, false),
        Field::new("total", DataType::Float64, false),
        Field::new("cumulative", DataType::Float64, false),
    ]);
    let cols = vec![
        date_column(view.rows.iter().map(|r| r.date)),
        f64_column(view.rows.iter().map(|r| r.total)),
        f64_column(view.rows.iter().map(|r| r.cumulative)),
    ];
    RecordBatch::try_new(Arc::new(schema), cols).context("building totals batch")
}

/// Snappy-compressed Parquet bytes for one batch.
pub fn to_parquet_bytes(batch: &RecordBatch) -> Result<Vec<u8>> {
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, batch.schema(), Some(props))
        .context("creating Arrow writer")?;
    writer.write(batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(buf)
}

/// Parquet bytes for the view called `name` (see [`TabularView::name`]).
pub fn view_to_parquet(views: &FlowViews, name: &str) -> Result<Vec<u8>> {
    let batch = if name == views.wide.name() {
        wide_batch(&views.wide)?
    } else if name == views.long.name() {
        long_batch(&views.long)?
    } else if name == views.totals.name() {
        totals_batch(&views.totals)?
    } else {
        bail!("no parquet layout for view `{}`", name);
    };
    to_parquet_bytes(&batch)
}
