// src/pipeline.rs

use tracing::{info, instrument};

use crate::calendar::{densify, DenseCalendar};
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::parse::parse_rows;
use crate::table::{select_table, RawDocument};
use crate::total::resolve_totals;
use crate::views::{build_views, FlowViews};

/// The document-to-views transform for one source layout. Holds only its
/// configuration, so one instance can process any number of documents.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config: config.normalized(),
        }
    }

    /// Parse `html` and run the whole pipeline on it.
    pub fn run_html(&self, html: &str) -> Result<FlowViews, PipelineError> {
        let doc = RawDocument::parse(html);
        self.run(&doc)
    }

    /// Locate the daily table, normalize it, settle totals, fill the calendar.
    #[instrument(level = "info", skip_all, fields(policy = ?self.config.total_policy))]
    pub fn calendar(&self, doc: &RawDocument) -> Result<DenseCalendar, PipelineError> {
        let cfg = &self.config;
        let selected = select_table(doc.candidates(), cfg.date_locale)?;
        let parsed = parse_rows(&selected, cfg.date_locale, cfg.fund_identifiers.as_deref())?;
        let series = resolve_totals(parsed, cfg.total_policy, &cfg.exclusion_set)?;
        let calendar = densify(series);

        info!(
            rows = selected.score.rows,
            funds = calendar.funds().len(),
            days = calendar.len(),
            "extracted daily flows"
        );
        Ok(calendar)
    }

    pub fn run(&self, doc: &RawDocument) -> Result<FlowViews, PipelineError> {
        let calendar = self.calendar(doc)?;
        Ok(build_views(&calendar))
    }
}
