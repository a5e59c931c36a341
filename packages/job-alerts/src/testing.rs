//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the job alerts
//! library without making network calls or sending email.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::error::{AlertError, Result, SourceError, SourceResult};
use crate::traits::{notifier::Notifier, source::SourceAdapter};
use crate::types::{
    config::{FilterMode, LocationMatch, RunContext},
    job::JobRecord,
    posting::RawPosting,
};

/// A mock source for testing.
///
/// Returns the same canned postings on every fetch and records each call.
#[derive(Clone)]
pub struct MockSource {
    name: String,
    mode: FilterMode,
    postings: Arc<RwLock<Vec<RawPosting>>>,
    calls: Arc<RwLock<Vec<RunContext>>>,
}

impl MockSource {
    /// Create a mock source with no postings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: FilterMode::ClientSide(LocationMatch::Substring),
            postings: Arc::new(RwLock::new(Vec::new())),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Set the filter mode reported to the pipeline.
    pub fn with_filter_mode(mut self, mode: FilterMode) -> Self {
        self.mode = mode;
        self
    }

    /// Add a canned posting.
    pub fn with_posting(self, posting: RawPosting) -> Self {
        self.postings.write().unwrap().push(posting);
        self
    }

    /// Add multiple canned postings.
    pub fn with_postings(self, postings: impl IntoIterator<Item = RawPosting>) -> Self {
        self.postings.write().unwrap().extend(postings);
        self
    }

    /// Replace the canned postings (between runs).
    pub fn set_postings(&self, postings: impl IntoIterator<Item = RawPosting>) {
        *self.postings.write().unwrap() = postings.into_iter().collect();
    }

    /// Get all contexts this source was fetched with.
    pub fn calls(&self) -> Vec<RunContext> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl SourceAdapter for MockSource {
    async fn fetch(&self, ctx: &RunContext) -> SourceResult<Vec<RawPosting>> {
        self.calls.write().unwrap().push(ctx.clone());
        Ok(self.postings.read().unwrap().clone())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn filter_mode(&self) -> FilterMode {
        self.mode
    }
}

/// A source whose every fetch fails, as if the board were unreachable.
#[derive(Debug, Clone)]
pub struct FailingSource {
    name: String,
}

impl FailingSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl SourceAdapter for FailingSource {
    async fn fetch(&self, _ctx: &RunContext) -> SourceResult<Vec<RawPosting>> {
        Err(SourceError::Http(Box::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "Mock connection refused",
        ))))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn filter_mode(&self) -> FilterMode {
        FilterMode::QueryMatched
    }
}

/// A mock notifier for testing.
///
/// Records every batch it is handed; can be switched to fail delivery.
#[derive(Clone, Default)]
pub struct MockNotifier {
    batches: Arc<RwLock<Vec<Vec<JobRecord>>>>,
    failing: Arc<RwLock<bool>>,
}

impl MockNotifier {
    /// Create a notifier that accepts every batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every delivery fail.
    pub fn failing(self) -> Self {
        self.set_failing(true);
        self
    }

    /// Toggle delivery failure.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.write().unwrap() = failing;
    }

    /// Every batch handed to this notifier, including failed ones.
    pub fn batches(&self) -> Vec<Vec<JobRecord>> {
        self.batches.read().unwrap().clone()
    }

    /// Total jobs handed to this notifier.
    pub fn delivered_count(&self) -> usize {
        self.batches.read().unwrap().iter().map(Vec::len).sum()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, jobs: &[JobRecord]) -> Result<()> {
        self.batches.write().unwrap().push(jobs.to_vec());

        if *self.failing.read().unwrap() {
            return Err(AlertError::notify("Mock SMTP relay unavailable"));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
