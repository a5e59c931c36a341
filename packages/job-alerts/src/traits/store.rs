//! Dedup store trait.
//!
//! The store is the durable set of every posting ever seen, plus whether
//! each one has been delivered. It is append-only: records are inserted once
//! and only their `notified` flag ever changes.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::job::{JobRecord, StoreStats};

/// Durable, deduplicated archive of job records.
///
/// Storage failures are returned as [`AlertError::Storage`](crate::AlertError::Storage)
/// and are never swallowed.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Whether a record with this identity has ever been persisted.
    async fn exists(&self, identity: &str) -> Result<bool>;

    /// Persist the record unless its identity is already known.
    ///
    /// Check and insert are a single atomic step: of any number of
    /// concurrent attempts for one identity, exactly one returns `true`.
    /// The stored copy always starts with `notified = false` and
    /// `created_at = now`.
    async fn insert_if_absent(&self, record: &JobRecord) -> Result<bool>;

    /// Mark a record as delivered.
    ///
    /// Idempotent; unknown identities are ignored.
    async fn mark_notified(&self, identity: &str) -> Result<()>;

    /// Records not yet delivered, newest first.
    async fn list_unnotified(&self) -> Result<Vec<JobRecord>>;

    /// The `limit` most recently inserted records, newest first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<JobRecord>>;

    /// Fetch a single record by identity.
    async fn get(&self, identity: &str) -> Result<Option<JobRecord>>;

    /// Aggregate counts.
    async fn stats(&self) -> Result<StoreStats>;

    /// Mark several records as delivered.
    async fn mark_all_notified(&self, identities: &[String]) -> Result<()> {
        for identity in identities {
            self.mark_notified(identity).await?;
        }
        Ok(())
    }
}
