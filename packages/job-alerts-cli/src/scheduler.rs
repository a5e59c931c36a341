//! Periodic checks using tokio-cron-scheduler.
//!
//! ```text
//! start ──► check_for_jobs() (immediately)
//!   │
//!   └─► every CHECK_INTERVAL_MINUTES ──► check_for_jobs()
//!                                          (skipped if the previous one is still running)
//! Ctrl-C ──► scheduler shutdown
//! ```

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::app::JobAlertSystem;

/// Run a check now, then on every interval until Ctrl-C.
pub async fn run_scheduled(system: Arc<JobAlertSystem>, interval: Duration) -> Result<()> {
    tracing::info!(
        interval_minutes = interval.as_secs() / 60,
        "Starting job alert system (Ctrl-C to stop)"
    );

    if let Err(e) = system.check_for_jobs().await {
        tracing::error!("Initial check failed: {:#}", e);
    }

    let mut scheduler = JobScheduler::new().await?;

    let check_system = system.clone();
    let check_job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let system = check_system.clone();
        Box::pin(async move {
            if let Err(e) = system.check_for_jobs().await {
                tracing::error!("Scheduled check failed: {:#}", e);
            }
        })
    })?;

    scheduler.add(check_job).await?;
    scheduler.start().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Job alert system stopped by user");

    scheduler.shutdown().await?;
    Ok(())
}
