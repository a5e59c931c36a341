//! SQLite dedup store.
//!
//! A file-based storage backend using SQLite. Good for:
//! - The scheduled alert process (survives restarts)
//! - Inspecting history with the CLI (`stats`, `recent`, `pending`)
//! - Testing with persistent data

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::str::FromStr;

use crate::error::{AlertError, Result};
use crate::traits::store::JobStore;
use crate::types::job::{JobRecord, StoreStats};

const SELECT_COLUMNS: &str = "job_id, title, company, location, url, description, posted_date, source, created_at, notified";

/// SQLite-based job store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the store at the given connection URL.
    ///
    /// # Example URLs
    /// - `sqlite::memory:` - In-memory database (ephemeral)
    /// - `sqlite://jobs.db` - File-based database, created if missing
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(AlertError::storage)?
            .create_if_missing(true);

        // Every connection to `:memory:` is its own database, so the pool
        // must hold exactly one and never recycle it.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(AlertError::storage)?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing).
    pub async fn in_memory() -> Result<Self> {
        Self::new("sqlite::memory:").await
    }

    /// Run database migrations.
    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                job_id TEXT UNIQUE NOT NULL,
                title TEXT NOT NULL,
                company TEXT NOT NULL DEFAULT '',
                location TEXT NOT NULL DEFAULT '',
                url TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                posted_date TEXT NOT NULL DEFAULT '',
                source TEXT NOT NULL,
                created_at TEXT NOT NULL,
                notified INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_job_id ON jobs(job_id);
            CREATE INDEX IF NOT EXISTS idx_notified ON jobs(notified);
            CREATE INDEX IF NOT EXISTS idx_created_at ON jobs(created_at);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(AlertError::storage)?;

        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// Row type for sqlx queries.
//
// Optional columns are nullable in databases created by earlier versions
// of the alert script.
#[derive(Debug, FromRow)]
struct JobRow {
    job_id: String,
    title: String,
    company: String,
    location: Option<String>,
    url: String,
    description: Option<String>,
    posted_date: Option<String>,
    source: String,
    created_at: String,
    notified: Option<i64>,
}

impl JobRow {
    fn into_record(self) -> Result<JobRecord> {
        Ok(JobRecord {
            created_at: parse_timestamp(&self.created_at)?,
            identity: self.job_id,
            title: self.title,
            company: self.company,
            location: self.location.unwrap_or_default(),
            url: self.url,
            description: self.description.unwrap_or_default(),
            posted_date: self.posted_date.unwrap_or_default(),
            source: self.source,
            notified: self.notified.unwrap_or(0) != 0,
        })
    }
}

/// RFC 3339 with fixed microsecond precision, so text order is time order.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp.
///
/// Rows written by this store are RFC 3339. Archived rows carry a naive ISO
/// 8601 local time without offset, which is read as UTC.
fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Ok(at.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| AlertError::storage(format!("Invalid date {text:?}: {e}")))
}

#[async_trait]
impl JobStore for SqliteStore {
    async fn exists(&self, identity: &str) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM jobs WHERE job_id = ?")
            .bind(identity)
            .fetch_optional(&self.pool)
            .await
            .map_err(AlertError::storage)?;
        Ok(row.is_some())
    }

    async fn insert_if_absent(&self, record: &JobRecord) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO jobs (job_id, title, company, location, url, description, posted_date, source, created_at, notified)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0)
            ON CONFLICT(job_id) DO NOTHING
            "#,
        )
        .bind(&record.identity)
        .bind(&record.title)
        .bind(&record.company)
        .bind(&record.location)
        .bind(&record.url)
        .bind(&record.description)
        .bind(&record.posted_date)
        .bind(&record.source)
        .bind(timestamp(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(AlertError::storage)?;

        Ok(result.rows_affected() == 1)
    }

    async fn mark_notified(&self, identity: &str) -> Result<()> {
        sqlx::query("UPDATE jobs SET notified = 1 WHERE job_id = ? AND notified = 0")
            .bind(identity)
            .execute(&self.pool)
            .await
            .map_err(AlertError::storage)?;
        Ok(())
    }

    async fn list_unnotified(&self) -> Result<Vec<JobRecord>> {
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM jobs WHERE notified = 0 ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(AlertError::storage)?;

        rows.into_iter().map(JobRow::into_record).collect()
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<JobRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM jobs ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(AlertError::storage)?;

        rows.into_iter().map(JobRow::into_record).collect()
    }

    async fn get(&self, identity: &str) -> Result<Option<JobRecord>> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM jobs WHERE job_id = ?"
        ))
        .bind(identity)
        .fetch_optional(&self.pool)
        .await
        .map_err(AlertError::storage)?;

        row.map(JobRow::into_record).transpose()
    }

    async fn stats(&self) -> Result<StoreStats> {
        let (total, notified, sources): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(notified), 0), COUNT(DISTINCT source) FROM jobs",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(AlertError::storage)?;

        let total = total as usize;
        let notified = notified as usize;
        Ok(StoreStats {
            total,
            notified,
            pending: total - notified,
            sources: sources as usize,
        })
    }
}
