//! Ingestion pipeline - fetch, filter, normalize and dedup postings.

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::pipeline::{filter::matches, normalize::normalize};
use crate::traits::{
    source::{source_tag_for, SourceAdapter},
    store::JobStore,
};
use crate::types::{
    config::{FilterPolicy, RunContext},
    job::JobRecord,
};

/// Per-source counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceCounts {
    /// Source name
    pub source: String,

    /// Raw postings returned by the source
    pub fetched: usize,

    /// Postings persisted for the first time
    pub new_jobs: usize,
}

/// Result of one ingestion run.
#[derive(Debug, Clone, Default)]
pub struct IngestResult {
    /// Records inserted for the first time during this run, in fetch order
    pub new_records: Vec<JobRecord>,

    /// Raw postings returned by all sources
    pub fetched: usize,

    /// Postings rejected by the filter
    pub filtered_out: usize,

    /// Postings rejected by the normalizer
    pub invalid: usize,

    /// Postings whose identity was already stored
    pub duplicates: usize,

    /// Names of sources whose fetch failed outright
    pub failed_sources: Vec<String>,

    /// Counts per source, in configured order
    pub per_source: Vec<SourceCounts>,
}

impl IngestResult {
    /// Create a new empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records inserted this run.
    pub fn new_jobs(&self) -> usize {
        self.new_records.len()
    }

    /// Check if every source was fetched.
    pub fn is_success(&self) -> bool {
        self.failed_sources.is_empty()
    }
}

/// Run every source once and persist the postings not seen before.
///
/// Sources are processed sequentially in the given order. A source whose
/// fetch fails is logged, recorded in `failed_sources` and skipped. Storage
/// errors abort the run. Nothing is marked notified here; that is the
/// caller's job once delivery succeeds.
pub async fn ingest<S>(
    sources: &[Box<dyn SourceAdapter>],
    ctx: &RunContext,
    policy: &FilterPolicy,
    store: &S,
) -> Result<IngestResult>
where
    S: JobStore + ?Sized,
{
    let mut result = IngestResult::new();

    for source in sources {
        let name = source.name().to_string();
        let mut counts = SourceCounts {
            source: name.clone(),
            ..Default::default()
        };

        info!(source = %name, "Fetching postings");
        let postings = match source.fetch(ctx).await {
            Ok(postings) => postings,
            Err(e) => {
                warn!(source = %name, error = %e, "Source failed, skipping");
                result.failed_sources.push(name);
                result.per_source.push(counts);
                continue;
            }
        };

        counts.fetched = postings.len();
        result.fetched += postings.len();
        let mode = source.filter_mode();

        for posting in &postings {
            if !matches(
                &posting.title,
                posting.location_text(),
                &ctx.keywords,
                &ctx.locations,
                mode,
                policy,
            ) {
                result.filtered_out += 1;
                continue;
            }

            let tag = source_tag_for(source.as_ref(), posting);
            let record = match normalize(posting, tag, policy.identity_scheme) {
                Ok(record) => record,
                Err(e) => {
                    debug!(source = %name, url = %posting.url, error = %e, "Dropping invalid posting");
                    result.invalid += 1;
                    continue;
                }
            };

            if store.insert_if_absent(&record).await? {
                debug!(source = %record.source, title = %record.title, "New posting");
                counts.new_jobs += 1;
                result.new_records.push(record);
            } else {
                result.duplicates += 1;
            }
        }

        info!(
            source = %name,
            fetched = counts.fetched,
            new = counts.new_jobs,
            "Source processed"
        );
        result.per_source.push(counts);
    }

    info!(
        fetched = result.fetched,
        new = result.new_jobs(),
        filtered_out = result.filtered_out,
        invalid = result.invalid,
        duplicates = result.duplicates,
        failed_sources = result.failed_sources.len(),
        "Ingest complete"
    );

    Ok(result)
}
