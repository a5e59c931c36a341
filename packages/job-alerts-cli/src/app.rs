//! The alert system: sources, store and notifier wired together.

use anyhow::{Context, Result};
use job_alerts::sources::{
    AshbySource, GreenhouseSource, LeverSource, SearchPageSource, SourceAdapter,
};
use job_alerts::{
    deliver_pending, ingest, DeliveryReport, FilterPolicy, HttpSettings, IdentityScheme,
    IngestResult, JobStore, LogNotifier, Notifier, RunContext, SourceResult, SqliteStore,
    StoreStats,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::Config;
use crate::email::EmailNotifier;

/// Outcome of one check.
#[derive(Debug)]
pub struct CheckSummary {
    pub ingest: IngestResult,
    pub delivery: DeliveryReport,
    pub stats: StoreStats,
}

pub struct JobAlertSystem {
    store: SqliteStore,
    sources: Vec<Box<dyn SourceAdapter>>,
    notifier: Box<dyn Notifier>,
    ctx: RunContext,
    policy: FilterPolicy,
    /// Held for the duration of a check so scheduled runs never overlap
    running: Mutex<()>,
}

impl JobAlertSystem {
    /// Open the store and build every enabled source from the config.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store = SqliteStore::new(&config.database_url)
            .await
            .with_context(|| format!("Failed to open job store at {}", config.database_url))?;

        let notifier: Box<dyn Notifier> = match &config.email {
            Some(email) => {
                let notifier = EmailNotifier::new(email)?;
                info!(recipient = %notifier.recipient(), "Email notifications enabled");
                Box::new(notifier)
            }
            None => {
                warn!("RECIPIENT_EMAIL not set; new postings will be logged instead of emailed");
                Box::new(LogNotifier::new())
            }
        };

        let system = Self::new(
            store,
            build_sources(config)?,
            notifier,
            config.run_context(),
            config.filter_policy(),
        );

        info!(
            sources = system.sources.len(),
            keywords = config.keywords.len(),
            locations = config.locations.len(),
            "Job alert system initialized"
        );
        Ok(system)
    }

    pub fn new(
        store: SqliteStore,
        sources: Vec<Box<dyn SourceAdapter>>,
        notifier: Box<dyn Notifier>,
        ctx: RunContext,
        policy: FilterPolicy,
    ) -> Self {
        Self {
            store,
            sources,
            notifier,
            ctx,
            policy,
            running: Mutex::new(()),
        }
    }

    /// Fetch new postings, deliver everything pending and report counts.
    ///
    /// Returns `Ok(None)` when another check is still in progress.
    pub async fn check_for_jobs(&self) -> Result<Option<CheckSummary>> {
        let Ok(_guard) = self.running.try_lock() else {
            warn!("Previous check still running, skipping this one");
            return Ok(None);
        };

        info!("Checking for new jobs");

        let ingested = ingest(&self.sources, &self.ctx, &self.policy, &self.store)
            .await
            .context("Ingestion failed")?;

        let delivery = deliver_pending(&self.store, self.notifier.as_ref())
            .await
            .context("Delivery failed")?;

        let stats = self.store.stats().await.context("Failed to read stats")?;

        info!(
            fetched = ingested.fetched,
            new = ingested.new_jobs(),
            filtered_out = ingested.filtered_out,
            notified = delivery.delivered,
            total = stats.total,
            pending = stats.pending,
            "Check complete"
        );

        Ok(Some(CheckSummary {
            ingest: ingested,
            delivery,
            stats,
        }))
    }
}

/// Sources in polling order; disabled ones are skipped.
pub fn build_sources(config: &Config) -> Result<Vec<Box<dyn SourceAdapter>>> {
    let settings = config.http_settings();
    let mut sources: Vec<Box<dyn SourceAdapter>> = Vec::new();

    if config.sources.indeed {
        sources.push(Box::new(
            search_page(SearchPageSource::indeed, config)
                .context("Failed to build Indeed source")?,
        ));
    }
    if config.sources.linkedin {
        sources.push(Box::new(
            search_page(SearchPageSource::linkedin, config)
                .context("Failed to build LinkedIn source")?,
        ));
    }
    if config.sources.greenhouse {
        sources.push(Box::new(
            GreenhouseSource::greenhouse(config.greenhouse_boards.iter().cloned(), settings)
                .context("Failed to build Greenhouse source")?,
        ));
    }
    if config.sources.ashby {
        sources.push(Box::new(
            AshbySource::ashby(config.ashby_boards.iter().cloned(), settings)
                .context("Failed to build Ashby source")?,
        ));
    }
    if config.sources.lever {
        sources.push(Box::new(
            LeverSource::lever(config.lever_boards.iter().cloned(), settings)
                .context("Failed to build Lever source")?,
        ));
    }

    Ok(sources)
}

/// Search-page source whose links hash the same way as the configured archive.
fn search_page(
    build: fn(HttpSettings) -> SourceResult<SearchPageSource>,
    config: &Config,
) -> SourceResult<SearchPageSource> {
    Ok(build(config.http_settings())?
        .with_verbatim_links(config.identity_scheme == IdentityScheme::Legacy))
}
