//! In-memory dedup store for testing and development.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{AlertError, Result};
use crate::traits::store::JobStore;
use crate::types::job::{JobRecord, StoreStats};

#[derive(Default)]
struct Inner {
    /// identity -> (insertion sequence, record)
    records: HashMap<String, (u64, JobRecord)>,
    next_seq: u64,
}

/// In-memory job store.
///
/// Useful for testing and development. Not suitable for production
/// as data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.records.len())
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| AlertError::storage("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| AlertError::storage("memory store lock poisoned"))
    }

    /// Records matching `keep`, newest first (ties broken by insertion order).
    fn newest_first(&self, keep: impl Fn(&JobRecord) -> bool) -> Result<Vec<JobRecord>> {
        let inner = self.read()?;
        let mut rows: Vec<_> = inner
            .records
            .values()
            .filter(|(_, record)| keep(record))
            .collect();
        rows.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| seq_b.cmp(seq_a))
        });
        Ok(rows.into_iter().map(|(_, record)| record.clone()).collect())
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn exists(&self, identity: &str) -> Result<bool> {
        Ok(self.read()?.records.contains_key(identity))
    }

    async fn insert_if_absent(&self, record: &JobRecord) -> Result<bool> {
        let mut inner = self.write()?;
        if inner.records.contains_key(&record.identity) {
            return Ok(false);
        }

        let mut stored = record.clone();
        stored.created_at = Utc::now();
        stored.notified = false;

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner
            .records
            .insert(stored.identity.clone(), (seq, stored));
        Ok(true)
    }

    async fn mark_notified(&self, identity: &str) -> Result<()> {
        if let Some((_, record)) = self.write()?.records.get_mut(identity) {
            record.notified = true;
        }
        Ok(())
    }

    async fn list_unnotified(&self) -> Result<Vec<JobRecord>> {
        self.newest_first(|record| !record.notified)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<JobRecord>> {
        let mut records = self.newest_first(|_| true)?;
        records.truncate(limit);
        Ok(records)
    }

    async fn get(&self, identity: &str) -> Result<Option<JobRecord>> {
        Ok(self
            .read()?
            .records
            .get(identity)
            .map(|(_, record)| record.clone()))
    }

    async fn stats(&self) -> Result<StoreStats> {
        let inner = self.read()?;
        let total = inner.records.len();
        let notified = inner
            .records
            .values()
            .filter(|(_, record)| record.notified)
            .count();
        let sources: HashSet<&str> = inner
            .records
            .values()
            .map(|(_, record)| record.source.as_str())
            .collect();

        Ok(StoreStats {
            total,
            notified,
            pending: total - notified,
            sources: sources.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(n: usize) -> JobRecord {
        JobRecord::new(
            format!("Intern {n}"),
            "Acme",
            format!("https://a.co/{n}"),
            "test",
        )
    }

    #[tokio::test]
    async fn test_insert_if_absent_once() {
        let store = MemoryStore::new();
        let job = record(1);

        assert!(store.insert_if_absent(&job).await.unwrap());
        assert!(!store.insert_if_absent(&job).await.unwrap());
        assert!(store.exists(&job.identity).await.unwrap());
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_resets_notified() {
        let store = MemoryStore::new();
        let mut job = record(1);
        job.notified = true;

        store.insert_if_absent(&job).await.unwrap();

        let stored = store.get(&job.identity).await.unwrap().unwrap();
        assert!(!stored.notified);
    }

    #[tokio::test]
    async fn test_stats_and_mark_notified() {
        let store = MemoryStore::new();
        for n in 0..3 {
            store.insert_if_absent(&record(n)).await.unwrap();
        }
        assert_eq!(
            store.stats().await.unwrap(),
            StoreStats {
                total: 3,
                notified: 0,
                pending: 3,
                sources: 1
            }
        );

        store.mark_notified(&record(0).identity).await.unwrap();
        store.mark_notified(&record(1).identity).await.unwrap();
        // Idempotent, and unknown identities are ignored
        store.mark_notified(&record(1).identity).await.unwrap();
        store.mark_notified("missing").await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.notified, 2);
        assert_eq!(stats.pending, 1);
    }

    #[tokio::test]
    async fn test_listing_is_newest_first() {
        let store = MemoryStore::new();
        for n in 0..5 {
            store.insert_if_absent(&record(n)).await.unwrap();
        }

        let recent = store.list_recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].title, "Intern 4");
        assert_eq!(recent[1].title, "Intern 3");

        store.mark_notified(&record(4).identity).await.unwrap();
        let pending = store.list_unnotified().await.unwrap();
        assert_eq!(pending.len(), 4);
        assert_eq!(pending[0].title, "Intern 3");
    }

    #[test]
    fn test_poisoned_lock_is_storage_error() {
        let store = Arc::new(MemoryStore::new());
        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.inner.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert!(store.len().unwrap_err().is_storage());
        assert!(store.is_empty().is_err());
        assert!(tokio_test::block_on(store.stats()).unwrap_err().is_storage());
    }

    #[tokio::test]
    async fn test_concurrent_inserts_exactly_once() {
        let store = Arc::new(MemoryStore::new());
        let job = record(7);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                let job = job.clone();
                tokio::spawn(async move { store.insert_if_absent(&job).await.unwrap() })
            })
            .collect();

        let mut inserted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(store.len().unwrap(), 1);
    }
}
