//! Notifier trait - delivers a digest of new postings to the user.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::job::JobRecord;

/// Delivery channel for new postings (email, log, ...).
///
/// An `Ok` return is the caller's confirmation that the batch reached the
/// user; only then are the records marked notified.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a batch of postings.
    async fn notify(&self, jobs: &[JobRecord]) -> Result<()>;

    /// Get the notifier name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
