//! Internship Job Alerts Library
//!
//! Polls job boards (search pages and ATS APIs), keeps the internship-style
//! postings, deduplicates them against everything seen before and hands the
//! new ones to a notifier.
//!
//! # Design Philosophy
//!
//! - Every posting is stored exactly once, keyed by a stable identity
//! - Every stored posting is delivered at most once, and only marked after
//!   delivery succeeds
//! - One broken board never takes down a run
//! - Library handles mechanics, the binary handles configuration and transport
//!
//! # Usage
//!
//! ```rust,ignore
//! use job_alerts::{deliver_pending, ingest, FilterPolicy, LogNotifier, RunContext, SqliteStore};
//! use job_alerts::sources::{LeverSource, SearchPageSource};
//!
//! let store = SqliteStore::new("sqlite://jobs.db").await?;
//! let sources: Vec<Box<dyn SourceAdapter>> = vec![
//!     Box::new(SearchPageSource::linkedin(settings)?),
//!     Box::new(LeverSource::lever(["netflix"], settings)?),
//! ];
//!
//! let ctx = RunContext::new().with_keywords(["software engineering intern"]);
//! let result = ingest(&sources, &ctx, &FilterPolicy::default(), &store).await?;
//! let report = deliver_pending(&store, &LogNotifier::new()).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (SourceAdapter, JobStore, Notifier)
//! - [`types`] - Job records, raw postings, run and filter configuration
//! - [`sources`] - Source adapters (LinkedIn, Indeed, Greenhouse, Lever, Ashby)
//! - [`pipeline`] - Filter, normalizer, ingestion and delivery
//! - [`stores`] - Dedup stores (MemoryStore, SqliteStore)
//! - [`notify`] - Digest rendering and the log notifier
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod notify;
pub mod pipeline;
pub mod sources;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{AlertError, Result, SourceError, SourceResult};
pub use traits::{notifier::Notifier, source::SourceAdapter, store::JobStore};
pub use types::{
    config::{FilterMode, FilterPolicy, HttpSettings, LocationMatch, RunContext},
    job::{IdentityScheme, JobRecord, StoreStats},
    posting::RawPosting,
};

// Re-export pipeline components
pub use pipeline::{
    deliver_pending, ingest, matches, normalize, DeliveryReport, IngestResult, SourceCounts,
};

// Re-export stores
pub use stores::MemoryStore;

#[cfg(feature = "sqlite")]
pub use stores::SqliteStore;

// Re-export notifiers
pub use notify::{Digest, LogNotifier};

// Re-export testing utilities
pub use testing::{FailingSource, MockNotifier, MockSource};
