// src/pipeline/aggregate.rs

//! Concurrent live-or-fallback aggregation across mirrors.

use futures::stream::{self, StreamExt};

use crate::models::{FallbackIndex, FileEntry, MirrorDescriptor};
use crate::services::{FetchOutcome, ListingFetch};

/// Default number of mirrors fetched at once.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Where a mirror's rows came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntrySource {
    Live,
    Fallback { reason: String },
}

/// Per-mirror record of one aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorReport {
    pub mirror: String,
    pub source: EntrySource,
    /// Rows this mirror contributed
    pub count: usize,
}

impl MirrorReport {
    pub fn is_live(&self) -> bool {
        self.source == EntrySource::Live
    }
}

/// Merged result of an aggregation run.
#[derive(Debug, Default)]
pub struct AggregateOutcome {
    /// All rows, grouped by mirror in configuration order
    pub entries: Vec<FileEntry>,
    /// One report per mirror, in configuration order
    pub reports: Vec<MirrorReport>,
}

impl AggregateOutcome {
    pub fn live_count(&self) -> usize {
        self.reports.iter().filter(|r| r.is_live()).count()
    }

    pub fn fallback_count(&self) -> usize {
        self.reports.len() - self.live_count()
    }
}

/// Runs a fetcher over every mirror with bounded concurrency.
pub struct Aggregator<'a> {
    fetcher: &'a dyn ListingFetch,
    concurrency: usize,
}

impl<'a> Aggregator<'a> {
    pub fn new(fetcher: &'a dyn ListingFetch) -> Self {
        Self {
            fetcher,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Limit the number of mirrors in flight. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Fetch every mirror and merge live results with fallback entries.
    ///
    /// A failed mirror contributes its cached entries from `fallback` (none if
    /// it has no cache). Failures never reach the caller, and the call
    /// returns only once every mirror has been resolved.
    pub async fn run(
        &self,
        mirrors: &[MirrorDescriptor],
        fallback: &FallbackIndex,
    ) -> AggregateOutcome {
        let mut resolved: Vec<(usize, MirrorReport, Vec<FileEntry>)> =
            stream::iter(mirrors.iter().enumerate())
                .map(|(position, mirror)| async move {
                    let outcome = self.fetcher.fetch(mirror).await;
                    let (report, entries) = resolve(mirror, outcome, fallback);
                    (position, report, entries)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        // Completion order depends on the network; report in config order.
        resolved.sort_by_key(|(position, _, _)| *position);

        let mut outcome = AggregateOutcome {
            entries: Vec::with_capacity(resolved.iter().map(|(_, r, _)| r.count).sum()),
            reports: Vec::with_capacity(resolved.len()),
        };
        for (_, report, entries) in resolved {
            outcome.entries.extend(entries);
            outcome.reports.push(report);
        }
        outcome
    }
}

/// Turn one mirror's fetch outcome into its rows, substituting the fallback
/// on failure.
fn resolve(
    mirror: &MirrorDescriptor,
    outcome: FetchOutcome,
    fallback: &FallbackIndex,
) -> (MirrorReport, Vec<FileEntry>) {
    let (source, files): (EntrySource, Vec<String>) = match outcome {
        FetchOutcome::Success(files) => {
            log::info!(
                "[OK] {}: {} files found from {}",
                mirror.name,
                files.len(),
                mirror.list_url
            );
            (EntrySource::Live, files)
        }
        FetchOutcome::Failure(reason) => {
            let cached = fallback.files_for(&mirror.name).to_vec();
            log::warn!(
                "[FALLBACK] Using {} cached entries for {}: {}",
                cached.len(),
                mirror.name,
                reason
            );
            (EntrySource::Fallback { reason }, cached)
        }
    };

    let entries: Vec<FileEntry> = files
        .into_iter()
        .map(|file| FileEntry::new(&mirror.name, file))
        .collect();
    let report = MirrorReport {
        mirror: mirror.name.clone(),
        source,
        count: entries.len(),
    };
    (report, entries)
}
