//! Delivery of pending records, with mark-after-success.

use tracing::{info, warn};

use crate::error::Result;
use crate::traits::{notifier::Notifier, store::JobStore};

/// Outcome of a delivery attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Records that were pending before delivery
    pub pending: usize,

    /// Records delivered and marked notified
    pub delivered: usize,

    /// Delivery error, if the notifier failed; the records stay pending
    pub error: Option<String>,
}

impl DeliveryReport {
    /// Whether everything pending was delivered.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Deliver every unnotified record and mark them on success.
///
/// A notifier failure is reported in the [`DeliveryReport`] and nothing is
/// marked, so the next call redelivers the same batch. Storage errors
/// propagate.
pub async fn deliver_pending<S, N>(store: &S, notifier: &N) -> Result<DeliveryReport>
where
    S: JobStore + ?Sized,
    N: Notifier + ?Sized,
{
    let pending = store.list_unnotified().await?;
    let mut report = DeliveryReport {
        pending: pending.len(),
        ..Default::default()
    };

    if pending.is_empty() {
        return Ok(report);
    }

    match notifier.notify(&pending).await {
        Ok(()) => {
            for record in &pending {
                store.mark_notified(&record.identity).await?;
            }
            report.delivered = pending.len();
            info!(notifier = %notifier.name(), delivered = report.delivered, "Delivered pending postings");
        }
        Err(e) => {
            warn!(
                notifier = %notifier.name(),
                pending = report.pending,
                error = %e,
                "Delivery failed; postings stay pending"
            );
            report.error = Some(e.to_string());
        }
    }

    Ok(report)
}
