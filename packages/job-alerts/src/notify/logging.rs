use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::error::Result;
use crate::notify::digest::{subject, text_body};
use crate::traits::notifier::Notifier;
use crate::types::job::JobRecord;

/// Notifier that writes the text digest to the log.
///
/// Used when no email transport is configured, so postings are still
/// marked delivered once they have been surfaced somewhere.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, jobs: &[JobRecord]) -> Result<()> {
        if jobs.is_empty() {
            return Ok(());
        }

        info!(
            jobs = jobs.len(),
            subject = %subject(jobs.len()),
            "\n{}",
            text_body(jobs, Utc::now())
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
