//! Notification event commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use homecare_core::config::AppConfig;
use homecare_core::error::AppError;
use homecare_core::types::UserId;
use homecare_database::{DatabasePool, PreferenceRepository};
use homecare_worker::NotificationWorker;

use crate::output::{self, OutputFormat};

/// Arguments for notification commands
#[derive(Debug, Args)]
pub struct NotificationArgs {
    /// Notification subcommand
    #[command(subcommand)]
    pub command: NotificationCommand,
}

/// Notification subcommands
#[derive(Debug, Subcommand)]
pub enum NotificationCommand {
    /// List a user's notifications in a time window
    Upcoming {
        /// User ID
        user_id: String,
        /// Inclusive lower bound (RFC 3339)
        #[arg(long)]
        from: Option<String>,
        /// Inclusive upper bound (RFC 3339)
        #[arg(long)]
        to: Option<String>,
    },
    /// Deliver one batch of due notifications
    Drain,
    /// Create any missing weekly health-log reminders
    EnsureWeekly,
    /// Run one worker tick (weekly top-up, then drain)
    Tick,
    /// Opt a user in or out of the weekly health-log reminder
    WeeklyReminder {
        /// User ID
        user_id: String,
        /// Opt the user out
        #[arg(long)]
        disable: bool,
    },
}

/// Notification display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UpcomingRow {
    /// Event ID
    id: String,
    /// Template code
    template_code: String,
    /// Scheduled at
    scheduled_at: String,
    /// Status
    status: String,
}

/// Execute notification commands
pub async fn execute(
    args: &NotificationArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let db = DatabasePool::connect(&config.database).await?;
    let service = Arc::new(super::build_service(config, &db)?);

    match &args.command {
        NotificationCommand::Upcoming { user_id, from, to } => {
            let tz = service.timezone();
            let rows: Vec<UpcomingRow> = service
                .list_upcoming(user_id, from.as_deref(), to.as_deref())
                .await?
                .into_iter()
                .map(|n| UpcomingRow {
                    id: n.id.to_string(),
                    template_code: n.template_code,
                    scheduled_at: n
                        .scheduled_at
                        .with_timezone(&tz)
                        .format("%Y-%m-%d %H:%M %Z")
                        .to_string(),
                    status: n.status.to_string(),
                })
                .collect();
            output::print_list(&rows, format);
        }
        NotificationCommand::Drain => {
            let report = service.process_due().await?;
            output::print_item(&report, format);
        }
        NotificationCommand::EnsureWeekly => {
            let created = service.ensure_weekly_reminders().await?;
            output::print_success(&format!("{created} weekly reminder(s) created"));
        }
        NotificationCommand::Tick => {
            let worker = NotificationWorker::new(Arc::clone(&service), config.worker.interval());
            let report = worker.run_once().await?;
            match format {
                OutputFormat::Table => {
                    output::print_kv("Weekly created", &report.weekly_created.to_string());
                    output::print_kv("Fetched", &report.drain.fetched.to_string());
                    output::print_kv("Sent", &report.drain.sent.to_string());
                    output::print_kv("Failed", &report.drain.failed.to_string());
                    output::print_kv(
                        "Missing template",
                        &report.drain.missing_template.to_string(),
                    );
                }
                OutputFormat::Json => output::print_item(&report, format),
            }
        }
        NotificationCommand::WeeklyReminder { user_id, disable } => {
            let user_id = UserId::parse(user_id, "user_id")?;
            PreferenceRepository::new(db.pool().clone())
                .set_weekly_reminder(user_id, !disable)
                .await?;
            if *disable {
                let cancelled = service.cancel_weekly_reminders(user_id).await?;
                output::print_success(&format!(
                    "Weekly reminder disabled for {user_id}; {cancelled} pending reminder(s) cancelled"
                ));
            } else {
                output::print_success(&format!("Weekly reminder enabled for {user_id}"));
            }
        }
    }

    db.close().await;
    Ok(())
}
