//! Read model for the upcoming-notifications query.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use homecare_core::types::NotificationEventId;

use super::model::NotificationEvent;
use super::status::NotificationStatus;

/// One row of a user's notification timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UpcomingNotification {
    /// Event identifier.
    pub id: NotificationEventId,
    /// Template code.
    pub template_code: String,
    /// Due instant.
    pub scheduled_at: DateTime<Utc>,
    /// Current status.
    pub status: NotificationStatus,
}

impl From<&NotificationEvent> for UpcomingNotification {
    fn from(event: &NotificationEvent) -> Self {
        Self {
            id: event.id,
            template_code: event.template_code.clone(),
            scheduled_at: event.scheduled_at,
            status: event.status,
        }
    }
}
