//! Delivers due events in locked batches.

use serde::Serialize;
use tracing::{info, trace, warn};

use homecare_core::result::AppResult;
use homecare_entity::notification::NotificationStatus;

use super::service::NotificationService;

/// Outcome counts of one drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// Events locked for this batch.
    pub fetched: usize,
    /// Events the sender accepted.
    pub sent: usize,
    /// Events the sender rejected.
    pub failed: usize,
    /// Events whose template is missing or inactive.
    pub missing_template: usize,
}

impl DrainReport {
    /// Whether the batch had nothing to do.
    pub fn is_empty(&self) -> bool {
        self.fetched == 0
    }
}

impl NotificationService {
    /// Lock a batch of due events, deliver each and record the outcome.
    ///
    /// All writes of the batch commit together. A sender failure only marks
    /// its own event `FAILED`; a persistence failure drops the transaction,
    /// leaving every event of the batch `PENDING` for the next tick.
    pub async fn process_due(&self) -> AppResult<DrainReport> {
        let now = self.clock.now();
        let limit = self.config.effective_batch_size();

        let mut tx = self.store.begin_drain().await?;
        let due = tx.list_due_for_update(now, limit).await?;
        let mut report = DrainReport {
            fetched: due.len(),
            ..DrainReport::default()
        };

        for event in &due {
            let Some(template) = tx.find_template_by_code(&event.template_code).await? else {
                warn!(
                    event_id = %event.id,
                    user_id = %event.user_id,
                    template_code = %event.template_code,
                    "Notification template missing or inactive"
                );
                tx.update_event_status(event.id, NotificationStatus::Failed, None)
                    .await?;
                report.missing_template += 1;
                continue;
            };

            let sent_at = self.clock.now();
            let status = match self.sender.send(event, &template).await {
                Ok(()) => {
                    report.sent += 1;
                    NotificationStatus::Sent
                }
                Err(e) => {
                    warn!(
                        event_id = %event.id,
                        user_id = %event.user_id,
                        template_code = %event.template_code,
                        sender = self.sender.name(),
                        error = %e,
                        "Failed to send notification"
                    );
                    report.failed += 1;
                    NotificationStatus::Failed
                }
            };
            tx.update_event_status(event.id, status, Some(sent_at)).await?;
        }

        tx.commit().await?;

        if report.is_empty() {
            trace!(batch_size = limit, "No due notifications");
        } else {
            info!(
                batch_size = limit,
                fetched = report.fetched,
                sent = report.sent,
                failed = report.failed,
                missing_template = report.missing_template,
                "Processed due notifications"
            );
        }
        Ok(report)
    }
}
