use anyhow::{bail, Context, Result};
use clap::Parser;
use etf_flows::{
    config::{self, SourceProfile},
    fetch,
    sink::{OutputFormat, ViewSink},
    Pipeline,
};
use futures::{stream::FuturesUnordered, StreamExt};
use rayon::prelude::*;
use std::{fs, path::PathBuf, time::Instant};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

const MAX_CONCURRENCY: usize = 3;

/// Scrape daily ETF flow tables into wide, long and totals views.
#[derive(Parser, Debug)]
struct Args {
    /// Profile to run; repeat for several. Default: every profile
    #[arg(long = "profile")]
    profiles: Vec<String>,

    /// YAML file with profile definitions instead of the built-in ones
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read the page from a local HTML file (exactly one profile)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(long, default_value = "Data")]
    out: PathBuf,

    /// Extra directory receiving a copy of every output; repeatable
    #[arg(long)]
    mirror: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let args = Args::parse();
    let start = Instant::now();

    // ─── 2) resolve profiles ─────────────────────────────────────────
    let all = match &args.config {
        Some(path) => config::load_profiles(path)?,
        None => config::builtin_profiles(),
    };
    let profiles = config::select_profiles(all, &args.profiles)?;
    info!(profiles = ?profiles.iter().map(|p| &p.name).collect::<Vec<_>>(), "startup");

    // ─── 3) get the documents ────────────────────────────────────────
    let documents: Vec<(SourceProfile, Result<String>)> = match &args.input {
        Some(path) => {
            if profiles.len() != 1 {
                bail!("--input needs exactly one --profile, got {}", profiles.len());
            }
            let html = fs::read_to_string(path).with_context(|| format!("reading {:?}", path));
            let profile = profiles.into_iter().next().context("no profile selected")?;
            vec![(profile, html)]
        }
        None => fetch_all(profiles).await?,
    };

    // ─── 4) run pipelines + write outputs off the async runtime ──────
    let sink = ViewSink::new(&args.out, args.mirror.clone(), args.format)?;
    let outcomes = tokio::task::spawn_blocking(move || {
        documents
            .into_par_iter()
            .map(|(profile, html)| {
                let res = html.and_then(|html| process(&profile, &html, &sink));
                (profile.name, res)
            })
            .collect::<Vec<_>>()
    })
    .await?;

    // ─── 5) report ───────────────────────────────────────────────────
    let total = outcomes.len();
    let mut failed = 0;
    for (name, res) in outcomes {
        match res {
            Ok(paths) => info!(profile = %name, files = paths.len(), "done"),
            Err(e) => {
                failed += 1;
                error!(profile = %name, "failed: {:#}", e);
            }
        }
    }

    info!(elapsed = ?start.elapsed(), "all done");
    if failed > 0 {
        bail!("{} of {} profiles failed", failed, total);
    }
    Ok(())
}

async fn fetch_all(profiles: Vec<SourceProfile>) -> Result<Vec<(SourceProfile, Result<String>)>> {
    let client = fetch::build_client()?;
    let mut pending = profiles.into_iter();
    let mut tasks = FuturesUnordered::new();
    let mut out = Vec::new();

    loop {
        while tasks.len() < MAX_CONCURRENCY {
            let Some(profile) = pending.next() else { break };
            let client = client.clone();
            tasks.push(async move {
                let html = fetch::fetch_document(&client, &profile.url).await;
                (profile, html)
            });
        }
        match tasks.next().await {
            Some(done) => out.push(done),
            None => break,
        }
    }
    Ok(out)
}

fn process(profile: &SourceProfile, html: &str, sink: &ViewSink) -> Result<Vec<PathBuf>> {
    let pipeline = Pipeline::new(profile.pipeline_config());
    let views = pipeline
        .run_html(html)
        .with_context(|| format!("extracting {} flows", profile.name))?;
    sink.write_views(&profile.file_stem, &views)
}
