//! Read-only view of a user's notifications.

use chrono::{DateTime, Utc};

use homecare_core::error::AppError;
use homecare_core::result::AppResult;
use homecare_core::types::UserId;
use homecare_entity::notification::UpcomingNotification;

use super::service::NotificationService;

/// Parse an optional RFC 3339 bound; blank means unbounded.
fn parse_bound(value: Option<&str>, field: &str) -> AppResult<Option<DateTime<Utc>>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| AppError::validation(format!("invalid {field}"))),
    }
}

impl NotificationService {
    /// Events of any status for a user, oldest first, within `[from, to]`.
    pub async fn list_upcoming(
        &self,
        user_id: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> AppResult<Vec<UpcomingNotification>> {
        let user_id = UserId::parse(user_id, "user_id")?;
        let from = parse_bound(from, "from")?;
        let to = parse_bound(to, "to")?;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(AppError::validation("from must not be after to"));
            }
        }

        self.store.list_upcoming(user_id, from, to).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};

    use homecare_core::error::ErrorKind;
    use homecare_core::types::{ScheduleId, UserId};
    use homecare_entity::medicine::MedicineScheduleTrigger;
    use homecare_entity::notification::NotificationStatus;

    use crate::notification::testing::{Harness, utc_config};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap()
    }

    async fn scheduled(h: &Harness, user: UserId) {
        h.service
            .schedule_medicine_reminders(
                user,
                &MedicineScheduleTrigger {
                    schedule_id: ScheduleId::new(),
                    time_slot: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
                    meal_timing: None,
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_validation_messages() {
        let h = Harness::new(t0(), utc_config(3)).await;
        let user = UserId::new().to_string();

        let err = h.service.list_upcoming("nope", None, None).await.unwrap_err();
        assert_eq!((err.kind, err.message.as_str()), (ErrorKind::Validation, "invalid user_id"));

        let err = h
            .service
            .list_upcoming(&user, Some("yesterday"), None)
            .await
            .unwrap_err();
        assert_eq!(err.message, "invalid from");

        let err = h
            .service
            .list_upcoming(&user, None, Some("2026-13-01T00:00:00Z"))
            .await
            .unwrap_err();
        assert_eq!(err.message, "invalid to");

        let err = h
            .service
            .list_upcoming(&user, Some("2026-01-03T00:00:00Z"), Some("2026-01-02T00:00:00Z"))
            .await
            .unwrap_err();
        assert_eq!(err.message, "from must not be after to");
    }

    #[tokio::test]
    async fn test_range_is_inclusive_and_ordered() {
        let h = Harness::new(t0(), utc_config(3)).await;
        let user = UserId::new();
        scheduled(&h, user).await;
        scheduled(&h, UserId::new()).await;

        let all = h
            .service
            .list_upcoming(&user.to_string(), None, Some(""))
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].scheduled_at < w[1].scheduled_at));

        // Offsets are normalised to UTC: 19:00+07:00 is exactly 12:00Z.
        let bounded = h
            .service
            .list_upcoming(
                &user.to_string(),
                Some("2026-01-02T19:00:00+07:00"),
                Some("2026-01-03T12:00:00Z"),
            )
            .await
            .unwrap();
        assert_eq!(bounded.len(), 2);
        assert_eq!(bounded[0].scheduled_at, t0() + Duration::hours(28));
    }

    #[tokio::test]
    async fn test_includes_every_status() {
        let h = Harness::new(t0(), utc_config(2)).await;
        let user = UserId::new();
        scheduled(&h, user).await;
        h.clock.advance(Duration::hours(5));
        h.service.process_due().await.unwrap();

        let items = h
            .service
            .list_upcoming(&user.to_string(), None, None)
            .await
            .unwrap();
        let statuses: Vec<_> = items.iter().map(|i| i.status).collect();
        assert_eq!(statuses, vec![NotificationStatus::Sent, NotificationStatus::Pending]);
    }
}
