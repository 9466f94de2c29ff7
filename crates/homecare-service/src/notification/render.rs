//! Rendering an event against its template.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use homecare_core::types::{NotificationEventId, UserId};
use homecare_entity::notification::{NotificationEvent, NotificationTemplate};

/// What a sender actually delivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedNotification {
    /// Event being delivered; stable across redelivery attempts.
    pub event_id: NotificationEventId,
    /// Recipient.
    pub user_id: UserId,
    /// Template code.
    pub template_code: String,
    /// Template title.
    pub title: String,
    /// Template body.
    pub body: String,
    /// Template data overlaid with the event payload.
    pub data: serde_json::Value,
    /// Instant the event was due.
    pub scheduled_at: DateTime<Utc>,
}

impl RenderedNotification {
    /// Combine an event with its template.
    ///
    /// Keys of the event payload override keys of the template data.
    pub fn render(event: &NotificationEvent, template: &NotificationTemplate) -> Self {
        let mut data = match &template.data {
            Some(serde_json::Value::Object(map)) => map.clone(),
            _ => serde_json::Map::new(),
        };
        if let serde_json::Value::Object(payload) = &event.payload {
            for (key, value) in payload {
                data.insert(key.clone(), value.clone());
            }
        }

        Self {
            event_id: event.id,
            user_id: event.user_id,
            template_code: event.template_code.clone(),
            title: template.title.clone(),
            body: template.body.clone(),
            data: serde_json::Value::Object(data),
            scheduled_at: event.scheduled_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use homecare_core::types::NotificationTemplateId;
    use homecare_entity::notification::NotificationStatus;
    use serde_json::json;

    #[test]
    fn test_payload_overrides_template_data() {
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
        let event = NotificationEvent {
            id: NotificationEventId::new(),
            user_id: UserId::new(),
            template_code: "WEEKLY_HEALTH_LOG".into(),
            scheduled_at: at,
            sent_at: None,
            status: NotificationStatus::Pending,
            payload: json!({ "type": "weekly_health_log" }),
            created_at: at,
        };
        let template = NotificationTemplate {
            id: NotificationTemplateId::new(),
            code: "WEEKLY_HEALTH_LOG".into(),
            title: "Weekly health log".into(),
            body: "Please complete your weekly health behavior log.".into(),
            data: Some(json!({ "type": "generic", "deeplink": "app://health-log" })),
            is_active: true,
            created_at: at,
        };

        let rendered = RenderedNotification::render(&event, &template);
        assert_eq!(rendered.title, "Weekly health log");
        assert_eq!(
            rendered.data,
            json!({ "type": "weekly_health_log", "deeplink": "app://health-log" })
        );
    }
}
