//! Typed errors for the job alerts library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell
//! transient source failures apart from storage and delivery failures.

use thiserror::Error;

/// Errors surfaced by the pipeline, stores and notifiers.
#[derive(Debug, Error)]
pub enum AlertError {
    /// A source could not be used at all
    #[error("source failed: {0}")]
    Source(#[from] SourceError),

    /// Storage operation failed (open, read or write of the dedup store)
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Notification delivery failed
    #[error("delivery error: {0}")]
    Notify(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A raw posting could not be turned into a job record
    #[error("invalid posting: {reason}")]
    InvalidPosting { reason: String },

    /// Configuration error
    #[error("config error: {reason}")]
    Config { reason: String },
}

impl AlertError {
    /// Wrap any error as a storage error.
    pub fn storage(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage(err.into())
    }

    /// Wrap any error as a delivery error.
    pub fn notify(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Notify(err.into())
    }

    /// Whether this error came from the storage layer.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Transient errors raised while fetching from a job source.
///
/// These are recovered locally: the offending item, query combination,
/// board or source is skipped and the run continues.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Remote answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Request timed out
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Response body could not be parsed
    #[error("parse error for {url}: {reason}")]
    Parse { url: String, reason: String },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

impl SourceError {
    /// Classify a reqwest error, keeping timeouts distinct.
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Http(Box::new(err))
        }
    }
}

/// Result type alias for pipeline, store and notifier operations.
pub type Result<T> = std::result::Result<T, AlertError>;

/// Result type alias for source operations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;
