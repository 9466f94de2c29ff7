//! Reminder scheduling and delivery configuration.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

const DEFAULT_SCHEDULE_DAYS: i64 = 7;
const DEFAULT_BATCH_SIZE: i64 = 100;
const DEFAULT_INSERT_CHUNK_SIZE: i64 = 100;

/// Settings for the notification engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// IANA zone in which time slots and weekly reminders are interpreted.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Number of days medicine reminders are projected forward.
    #[serde(default = "default_schedule_days")]
    pub schedule_days: i64,
    /// Local hour of the Monday weekly reminder.
    #[serde(default = "default_weekly_hour")]
    pub weekly_reminder_hour: u32,
    /// Local minute of the Monday weekly reminder.
    #[serde(default)]
    pub weekly_reminder_minute: u32,
    /// Maximum number of due events locked per drain.
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,
    /// Rows per bulk insert statement.
    #[serde(default = "default_insert_chunk_size")]
    pub insert_chunk_size: i64,
    /// Insert the default templates when the notifier starts.
    #[serde(default = "default_true")]
    pub seed_templates_on_start: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            schedule_days: DEFAULT_SCHEDULE_DAYS,
            weekly_reminder_hour: default_weekly_hour(),
            weekly_reminder_minute: 0,
            batch_size: DEFAULT_BATCH_SIZE,
            insert_chunk_size: DEFAULT_INSERT_CHUNK_SIZE,
            seed_templates_on_start: true,
        }
    }
}

impl NotificationConfig {
    /// Resolve the configured zone, falling back to UTC for unknown names.
    pub fn timezone(&self) -> Tz {
        match self.timezone.parse::<Tz>() {
            Ok(tz) => tz,
            Err(e) => {
                tracing::warn!(
                    timezone = %self.timezone,
                    error = %e,
                    "Unknown notification timezone, falling back to UTC"
                );
                Tz::UTC
            }
        }
    }

    /// Horizon in days, never below one.
    pub fn effective_schedule_days(&self) -> u32 {
        u32::try_from(positive_or(self.schedule_days, DEFAULT_SCHEDULE_DAYS)).unwrap_or(u32::MAX)
    }

    /// Drain batch size, never below one.
    pub fn effective_batch_size(&self) -> usize {
        usize::try_from(positive_or(self.batch_size, DEFAULT_BATCH_SIZE)).unwrap_or(usize::MAX)
    }

    /// Bulk insert chunk size, never below one.
    pub fn effective_insert_chunk_size(&self) -> usize {
        usize::try_from(positive_or(self.insert_chunk_size, DEFAULT_INSERT_CHUNK_SIZE))
            .unwrap_or(usize::MAX)
    }

    /// Reject out-of-range weekly reminder times.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.weekly_reminder_hour > 23 {
            return Err(AppError::configuration(format!(
                "notification.weekly_reminder_hour must be 0-23, got {}",
                self.weekly_reminder_hour
            )));
        }
        if self.weekly_reminder_minute > 59 {
            return Err(AppError::configuration(format!(
                "notification.weekly_reminder_minute must be 0-59, got {}",
                self.weekly_reminder_minute
            )));
        }
        Ok(())
    }
}

fn positive_or(value: i64, fallback: i64) -> i64 {
    if value > 0 { value } else { fallback }
}

fn default_timezone() -> String {
    "Asia/Bangkok".to_string()
}

fn default_schedule_days() -> i64 {
    DEFAULT_SCHEDULE_DAYS
}

fn default_weekly_hour() -> u32 {
    9
}

fn default_batch_size() -> i64 {
    DEFAULT_BATCH_SIZE
}

fn default_insert_chunk_size() -> i64 {
    DEFAULT_INSERT_CHUNK_SIZE
}

fn default_true() -> bool {
    true
}
