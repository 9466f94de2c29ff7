//! Turns triggers into pending notification events.

use chrono::{Days, Duration, Timelike};
use tracing::{debug, info};

use homecare_core::result::AppResult;
use homecare_core::types::UserId;
use homecare_entity::appointment::AppointmentTrigger;
use homecare_entity::medicine::MedicineScheduleTrigger;
use homecare_entity::notification::{NewNotificationEvent, ReminderPayload, TemplateCode};

use super::calendar::{local_instant, next_weekly_time};
use super::service::NotificationService;

/// Minutes of the heads-up reminder before a before-meal slot.
const BEFORE_MEAL_LEAD_MINUTES: i64 = 5;
/// Minutes of the "not taken yet" follow-up after a before-meal slot.
const BEFORE_MEAL_FOLLOW_UP_MINUTES: i64 = 20;

impl NotificationService {
    /// Project a medicine time slot over the configured horizon.
    ///
    /// Before-meal schedules get a reminder five minutes ahead of the slot
    /// and a follow-up twenty minutes after it; every other timing gets one
    /// reminder at the slot. Instants not strictly in the future are
    /// dropped. Returns the number of events newly created.
    pub async fn schedule_medicine_reminders(
        &self,
        user_id: UserId,
        schedule: &MedicineScheduleTrigger,
    ) -> AppResult<u64> {
        let now = self.clock.now();
        let today = now.with_timezone(&self.tz).date_naive();
        let slot = schedule.time_slot.with_nanosecond(0).unwrap_or(schedule.time_slot);

        let mut events = Vec::new();
        for offset in 0..self.config.effective_schedule_days() {
            let Some(date) = today.checked_add_days(Days::new(u64::from(offset))) else {
                break;
            };
            let Some(slot_at) = local_instant(&self.tz, date, slot) else {
                continue;
            };
            let payload = ReminderPayload::Medicine {
                schedule_id: schedule.schedule_id,
                target_date: date,
            };

            let candidates = if schedule.is_before_meal() {
                vec![
                    (
                        slot_at - Duration::minutes(BEFORE_MEAL_LEAD_MINUTES),
                        TemplateCode::MedBeforeMeal5Min,
                    ),
                    (
                        slot_at + Duration::minutes(BEFORE_MEAL_FOLLOW_UP_MINUTES),
                        TemplateCode::MedBeforeMeal20Min,
                    ),
                ]
            } else {
                vec![(slot_at, TemplateCode::MedAfterMealNow)]
            };

            events.extend(
                candidates
                    .into_iter()
                    .filter(|(at, _)| *at > now)
                    .map(|(at, code)| NewNotificationEvent::new(user_id, code, at, payload)),
            );
        }

        let created = self.write_events(&events).await?;
        debug!(
            %user_id,
            schedule_id = %schedule.schedule_id,
            candidates = events.len(),
            created,
            "Scheduled medicine reminders"
        );
        Ok(created)
    }

    /// Schedule the 5-day and 1-day reminders of a hospital appointment.
    ///
    /// `None` and home-visit appointments are a no-op.
    pub async fn schedule_appointment_reminders(
        &self,
        appointment: Option<&AppointmentTrigger>,
    ) -> AppResult<u64> {
        let Some(appointment) = appointment.filter(|a| a.wants_reminders()) else {
            return Ok(0);
        };

        let now = self.clock.now();
        let payload = ReminderPayload::Appointment {
            appointment_id: appointment.id,
        };
        let events: Vec<_> = [(5, TemplateCode::Appt5D), (1, TemplateCode::Appt1D)]
            .into_iter()
            .filter_map(|(days, code)| {
                let at = appointment.appt_datetime.checked_sub_days(Days::new(days))?;
                (at > now).then(|| NewNotificationEvent::new(appointment.user_id, code, at, payload))
            })
            .collect();

        let created = self.write_events(&events).await?;
        debug!(
            user_id = %appointment.user_id,
            appointment_id = %appointment.id,
            created,
            "Scheduled appointment reminders"
        );
        Ok(created)
    }

    /// Schedule next Monday's health-log prompt for every eligible user.
    ///
    /// Every tick within the same week computes the same instant, so
    /// repeated calls are absorbed by insert-or-ignore.
    pub async fn ensure_weekly_reminders(&self) -> AppResult<u64> {
        let users = self.audience.list_weekly_reminder_eligible_users().await?;
        if users.is_empty() {
            return Ok(0);
        }

        let Some(at) = next_weekly_time(
            &self.tz,
            self.clock.now(),
            self.config.weekly_reminder_hour,
            self.config.weekly_reminder_minute,
        ) else {
            return Ok(0);
        };

        let events: Vec<_> = users
            .into_iter()
            .map(|user_id| {
                NewNotificationEvent::new(
                    user_id,
                    TemplateCode::WeeklyHealthLog,
                    at,
                    ReminderPayload::WeeklyHealthLog,
                )
            })
            .collect();

        let created = self.write_events(&events).await?;
        if created > 0 {
            info!(scheduled_at = %at, created, "Scheduled weekly health-log reminders");
        }
        Ok(created)
    }

    async fn write_events(&self, events: &[NewNotificationEvent]) -> AppResult<u64> {
        if events.is_empty() {
            return Ok(0);
        }
        self.store.create_events(events).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveTime, TimeZone, Utc};

    use homecare_core::types::{AppointmentId, ScheduleId, UserId};
    use homecare_entity::appointment::{AppointmentCategory, AppointmentTrigger};
    use homecare_entity::medicine::{MealTiming, MedicineScheduleTrigger};
    use homecare_entity::notification::{NotificationEvent, ReminderPayload};

    use crate::notification::testing::{Harness, utc_config};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap()
    }

    fn schedule(meal_timing: Option<MealTiming>, h: u32, m: u32) -> MedicineScheduleTrigger {
        MedicineScheduleTrigger {
            schedule_id: ScheduleId::new(),
            time_slot: NaiveTime::from_hms_opt(h, m, 0).unwrap(),
            meal_timing,
        }
    }

    fn codes(events: &[NotificationEvent]) -> Vec<(&str, DateTime<Utc>)> {
        events
            .iter()
            .map(|e| (e.template_code.as_str(), e.scheduled_at))
            .collect()
    }

    #[tokio::test]
    async fn test_before_meal_yields_lead_and_follow_up() {
        let h = Harness::new(t0(), utc_config(1)).await;
        let user = UserId::new();

        let created = h
            .service
            .schedule_medicine_reminders(user, &schedule(Some(MealTiming::BeforeMeal), 9, 0))
            .await
            .unwrap();

        assert_eq!(created, 2);
        let events = h.store.events().await;
        assert_eq!(
            codes(&events),
            vec![
                ("MED_BEFORE_MEAL_5MIN", Utc.with_ymd_and_hms(2026, 1, 1, 8, 55, 0).unwrap()),
                ("MED_BEFORE_MEAL_20MIN", Utc.with_ymd_and_hms(2026, 1, 1, 9, 20, 0).unwrap()),
            ]
        );
    }

    #[tokio::test]
    async fn test_other_meal_timings_yield_one_event_per_day() {
        let h = Harness::new(t0(), utc_config(3)).await;
        let user = UserId::new();

        let timings = [None, Some(MealTiming::AfterMeal), Some(MealTiming::BeforeBed)];
        for (i, timing) in timings.into_iter().enumerate() {
            h.service
                .schedule_medicine_reminders(user, &schedule(timing, 20, 10 * i as u32))
                .await
                .unwrap();
        }

        let events = h.store.events().await;
        assert_eq!(events.len(), 9);
        assert!(events.iter().all(|e| e.template_code == "MED_AFTER_MEAL_NOW"));
    }

    #[tokio::test]
    async fn test_passed_slot_skips_today_only() {
        let h = Harness::new(t0(), utc_config(3)).await;
        let user = UserId::new();
        let trigger = schedule(Some(MealTiming::AfterMeal), 7, 30);

        h.service.schedule_medicine_reminders(user, &trigger).await.unwrap();

        let events = h.store.events().await;
        let dates: Vec<String> = events
            .iter()
            .map(|e| match e.reminder_payload() {
                Some(ReminderPayload::Medicine { target_date, .. }) => target_date.to_string(),
                other => panic!("unexpected payload {other:?}"),
            })
            .collect();
        assert_eq!(dates, vec!["2026-01-02", "2026-01-03"]);
    }

    #[tokio::test]
    async fn test_slot_equal_to_now_is_dropped() {
        let h = Harness::new(t0(), utc_config(1)).await;
        let created = h
            .service
            .schedule_medicine_reminders(UserId::new(), &schedule(None, 8, 0))
            .await
            .unwrap();
        assert_eq!(created, 0);
        assert!(h.store.events().await.is_empty());
    }

    #[tokio::test]
    async fn test_scheduling_twice_is_idempotent() {
        let h = Harness::new(t0(), utc_config(7)).await;
        let user = UserId::new();
        let trigger = schedule(Some(MealTiming::BeforeMeal), 12, 0);

        let first = h.service.schedule_medicine_reminders(user, &trigger).await.unwrap();
        let before = h.store.events().await;
        let second = h.service.schedule_medicine_reminders(user, &trigger).await.unwrap();
        let after = h.store.events().await;

        assert_eq!(first, 14);
        assert_eq!(second, 0);
        assert_eq!(codes(&before), codes(&after));
    }

    #[tokio::test]
    async fn test_slot_uses_configured_timezone() {
        let mut config = utc_config(1);
        config.timezone = "Asia/Bangkok".into();
        let h = Harness::new(t0(), config).await;

        // 08:00 UTC is 15:00 in Bangkok; a 20:00 local slot is 13:00 UTC.
        h.service
            .schedule_medicine_reminders(UserId::new(), &schedule(None, 20, 0))
            .await
            .unwrap();

        let events = h.store.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].scheduled_at,
            Utc.with_ymd_and_hms(2026, 1, 1, 13, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_hospital_appointment_gets_two_reminders() {
        let h = Harness::new(t0(), utc_config(7)).await;
        let appointment = AppointmentTrigger {
            id: AppointmentId::new(),
            user_id: UserId::new(),
            appt_type: AppointmentCategory::Hospital,
            appt_datetime: t0() + chrono::Duration::days(10),
        };

        let created = h
            .service
            .schedule_appointment_reminders(Some(&appointment))
            .await
            .unwrap();

        assert_eq!(created, 2);
        let events = h.store.events().await;
        assert_eq!(
            codes(&events),
            vec![
                ("APPT_5D", t0() + chrono::Duration::days(5)),
                ("APPT_1D", t0() + chrono::Duration::days(9)),
            ]
        );
    }

    #[tokio::test]
    async fn test_appointment_gating() {
        let h = Harness::new(t0(), utc_config(7)).await;
        let mut appointment = AppointmentTrigger {
            id: AppointmentId::new(),
            user_id: UserId::new(),
            appt_type: AppointmentCategory::HomeVisit,
            appt_datetime: t0() + chrono::Duration::days(10),
        };

        assert_eq!(h.service.schedule_appointment_reminders(None).await.unwrap(), 0);
        assert_eq!(
            h.service
                .schedule_appointment_reminders(Some(&appointment))
                .await
                .unwrap(),
            0
        );

        // Three days out: the 5-day reminder is already past.
        appointment.appt_type = AppointmentCategory::Hospital;
        appointment.appt_datetime = t0() + chrono::Duration::days(3);
        h.service
            .schedule_appointment_reminders(Some(&appointment))
            .await
            .unwrap();

        let events = h.store.events().await;
        assert_eq!(codes(&events), vec![("APPT_1D", t0() + chrono::Duration::days(2))]);
    }

    #[tokio::test]
    async fn test_weekly_reminders_for_eligible_users() {
        let h = Harness::new(t0(), utc_config(7)).await;
        assert_eq!(h.service.ensure_weekly_reminders().await.unwrap(), 0);

        let users = vec![UserId::new(), UserId::new()];
        h.audience.set_users(users.clone()).await;

        assert_eq!(h.service.ensure_weekly_reminders().await.unwrap(), 2);
        h.clock.advance(chrono::Duration::hours(6));
        assert_eq!(h.service.ensure_weekly_reminders().await.unwrap(), 0);

        let events = h.store.events().await;
        let monday = Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap();
        assert!(events.iter().all(|e| e.scheduled_at == monday));
        assert!(events.iter().all(|e| e.template_code == "WEEKLY_HEALTH_LOG"));
        assert!(
            events
                .iter()
                .all(|e| e.reminder_payload() == Some(ReminderPayload::WeeklyHealthLog))
        );
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let h = Harness::new(t0(), utc_config(1)).await;
        h.store.fail_writes(true).await;

        let err = h
            .service
            .schedule_medicine_reminders(UserId::new(), &schedule(None, 20, 0))
            .await
            .unwrap_err();
        assert!(err.is_database());
    }
}
