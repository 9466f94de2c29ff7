//! Notification event rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use homecare_core::types::{NotificationEventId, UserId};

use super::payload::ReminderPayload;
use super::status::NotificationStatus;
use super::template::TemplateCode;

/// One scheduled notification instance.
///
/// `(user_id, template_code, scheduled_at)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationEvent {
    /// Unique event identifier.
    pub id: NotificationEventId,
    /// Recipient.
    pub user_id: UserId,
    /// Code of the template to render.
    pub template_code: String,
    /// Instant at which the event becomes due.
    pub scheduled_at: DateTime<Utc>,
    /// When delivery was attempted.
    pub sent_at: Option<DateTime<Utc>>,
    /// Current status.
    pub status: NotificationStatus,
    /// Correlation keys (JSON).
    pub payload: serde_json::Value,
    /// When the event row was created.
    pub created_at: DateTime<Utc>,
}

impl NotificationEvent {
    /// Decode the correlation payload, if it has a known shape.
    pub fn reminder_payload(&self) -> Option<ReminderPayload> {
        ReminderPayload::from_json(&self.payload)
    }

    /// Check whether the event is due at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == NotificationStatus::Pending && self.scheduled_at <= now
    }
}

/// Data required to schedule a new event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotificationEvent {
    /// Recipient.
    pub user_id: UserId,
    /// Template to render.
    pub template_code: TemplateCode,
    /// Due instant.
    pub scheduled_at: DateTime<Utc>,
    /// Correlation keys.
    pub payload: ReminderPayload,
}

impl NewNotificationEvent {
    /// Build a new pending event.
    pub fn new(
        user_id: UserId,
        template_code: TemplateCode,
        scheduled_at: DateTime<Utc>,
        payload: ReminderPayload,
    ) -> Self {
        Self {
            user_id,
            template_code,
            scheduled_at,
            payload,
        }
    }

    /// Key enforcing event uniqueness.
    pub fn dedup_key(&self) -> (UserId, &'static str, DateTime<Utc>) {
        (self.user_id, self.template_code.as_str(), self.scheduled_at)
    }
}
