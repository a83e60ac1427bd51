// src/pipeline/fetch.rs

//! Full fetch run: load fallback, aggregate mirrors, replace the listing.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Config, MirrorDescriptor};
use crate::pipeline::aggregate::Aggregator;
use crate::services::{ListingFetch, MirrorFetcher};
use crate::storage::{FallbackSource, LocalStorage, ResultSink};

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub entries_saved: usize,
    pub live_mirrors: usize,
    pub fallback_mirrors: usize,
    pub location: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn elapsed_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Run the pipeline with explicit collaborators.
///
/// The fallback is read before any fetching starts and the sink is written
/// only after every mirror has been resolved.
pub async fn run_fetch_with(
    config: &Config,
    mirrors: &[MirrorDescriptor],
    fetcher: &dyn ListingFetch,
    fallback_source: &dyn FallbackSource,
    sink: &dyn ResultSink,
) -> Result<RunSummary> {
    let started_at = Utc::now();

    let fallback = fallback_source.load_fallback().await;

    log::info!(
        "Fetching listings from {} mirrors ({} at a time)",
        mirrors.len(),
        config.crawler.max_concurrent
    );
    let outcome = Aggregator::new(fetcher)
        .with_concurrency(config.crawler.max_concurrent)
        .run(mirrors, &fallback)
        .await;

    if outcome.fallback_count() > 0 {
        log::warn!(
            "{} of {} mirrors served from fallback data",
            outcome.fallback_count(),
            outcome.reports.len()
        );
    }

    let written = sink.save(&outcome.entries).await?;

    Ok(RunSummary {
        entries_saved: written.row_count,
        live_mirrors: outcome.live_count(),
        fallback_mirrors: outcome.fallback_count(),
        location: written.location,
        started_at,
        finished_at: written.timestamp,
    })
}

/// Run the pipeline from application settings.
///
/// Fails before any network access if the mirror list cannot be loaded.
pub async fn run_fetch(config: &Config) -> Result<RunSummary> {
    let mirrors =
        MirrorDescriptor::load_all(&config.paths.mirrors_file, &config.quota.proxy_tag)?;
    log::info!(
        "Loaded {} mirrors from {}",
        mirrors.len(),
        config.paths.mirrors_file.display()
    );

    let fetcher = MirrorFetcher::from_config(config)?;
    let storage = LocalStorage::new(&config.paths.output_file);

    run_fetch_with(config, &mirrors, &fetcher, &storage, &storage).await
}
