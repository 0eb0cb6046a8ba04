// src/sink/mod.rs
//! Persisting the views. Each view is rendered once, then written to the
//! output directory and every mirror (e.g. a static-site data folder).

pub mod columnar;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

use crate::views::{FlowViews, TabularView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Parquet => "parquet",
        }
    }
}

pub struct ViewSink {
    dirs: Vec<PathBuf>,
    format: OutputFormat,
}

impl ViewSink {
    /// `primary` plus any mirrors; all directories are created up front.
    pub fn new(
        primary: impl Into<PathBuf>,
        mirrors: Vec<PathBuf>,
        format: OutputFormat,
    ) -> Result<Self> {
        let mut dirs = vec![primary.into()];
        dirs.extend(mirrors);
        for d in &dirs {
            fs::create_dir_all(d).with_context(|| format!("creating {:?}", d))?;
        }
        Ok(Self { dirs, format })
    }

    /// `<stem>_<view>.<ext>`
    pub fn file_name(&self, stem: &str, view: &str) -> String {
        format!("{}_{}.{}", stem, view, self.format.extension())
    }

    /// Write all three views for one profile; returns every path written.
    #[instrument(level = "info", skip(self, views))]
    pub fn write_views(&self, stem: &str, views: &FlowViews) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for view in views.as_tabular() {
            let bytes = match self.format {
                OutputFormat::Csv => view.to_csv()?.into_bytes(),
                OutputFormat::Parquet => columnar::view_to_parquet(views, view.name())?,
            };
            let name = self.file_name(stem, view.name());
            for dir in &self.dirs {
                let path = dir.join(&name);
                write_atomic(&path, &bytes)?;
                written.push(path);
            }
        }
        info!(files = written.len(), "wrote views");
        Ok(written)
    }
}

/// Write to a hidden temp file next to `path`, then rename over it.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("bad output path {:?}", path))?;
    let tmp_path = dir.join(format!(".{}.tmp", file_name));

    let mut tmp =
        fs::File::create(&tmp_path).with_context(|| format!("creating {:?}", tmp_path))?;
    tmp.write_all(bytes)
        .with_context(|| format!("writing {:?}", tmp_path))?;
    tmp.sync_all()?;
    drop(tmp);

    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))?;
    Ok(())
}
