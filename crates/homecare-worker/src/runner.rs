//! Worker runner: ticks the notification engine until cancelled.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use homecare_core::result::AppResult;
use homecare_service::{DrainReport, NotificationService};

/// What a single tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Weekly health-log reminders created by the top-up.
    pub weekly_created: u64,
    /// Outcome of the drain.
    pub drain: DrainReport,
}

/// Periodic driver for weekly top-up and due-event delivery.
#[derive(Debug, Clone)]
pub struct NotificationWorker {
    service: Arc<NotificationService>,
    interval: Duration,
}

impl NotificationWorker {
    /// Create a worker ticking every `interval`.
    pub fn new(service: Arc<NotificationService>, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// Run until the cancel signal flips to `true` or its sender is dropped.
    ///
    /// The first tick runs immediately. The signal is only checked between
    /// ticks, so an in-flight batch always completes.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "Notification worker started");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *cancel.borrow() {
                break;
            }

            tokio::select! {
                biased;
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.run_once().await {
                        warn!(error = %e, "Notification worker tick failed");
                    }
                }
            }
        }

        info!("Notification worker stopped");
    }

    /// Top up weekly reminders, then drain one batch of due events.
    ///
    /// A failed top-up is logged and does not prevent the drain.
    pub async fn run_once(&self) -> AppResult<TickReport> {
        let weekly_created = match self.service.ensure_weekly_reminders().await {
            Ok(created) => created,
            Err(e) => {
                warn!(error = %e, "Weekly reminder top-up failed");
                0
            }
        };

        let drain = self.service.process_due().await?;
        debug!(weekly_created, fetched = drain.fetched, "Worker tick complete");

        Ok(TickReport {
            weekly_created,
            drain,
        })
    }
}
