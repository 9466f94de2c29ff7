//! Fire-and-forget hooks for the services that own schedules, intakes,
//! appointments and preferences.
//!
//! The primary write of those services must succeed even when reminder
//! bookkeeping fails, so every hook swallows the engine's error after
//! logging it at `warn`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use homecare_core::result::AppResult;
use homecare_core::types::{ScheduleId, UserId};
use homecare_entity::appointment::{AppointmentStatus, AppointmentTrigger};
use homecare_entity::medicine::{IntakeStatus, MedicineScheduleTrigger};

use super::service::NotificationService;

/// Best-effort reminder side effects.
#[derive(Debug, Clone)]
pub struct ReminderTriggers {
    service: Arc<NotificationService>,
}

impl ReminderTriggers {
    /// Creates a new trigger facade.
    pub fn new(service: Arc<NotificationService>) -> Self {
        Self { service }
    }

    /// A medicine schedule was created or its time slot changed.
    pub async fn medicine_schedule_created(&self, user_id: UserId, schedule: &MedicineScheduleTrigger) {
        let result = self.service.schedule_medicine_reminders(user_id, schedule).await;
        swallow(result, "schedule medicine reminders", user_id);
    }

    /// A dose was recorded. Only a `TAKEN` dose tied to a schedule retracts
    /// that day's follow-up.
    pub async fn intake_recorded(
        &self,
        user_id: UserId,
        schedule_id: Option<ScheduleId>,
        target: DateTime<Utc>,
        status: IntakeStatus,
    ) {
        let Some(schedule_id) = schedule_id else {
            return;
        };
        if status != IntakeStatus::Taken {
            return;
        }
        let result = self
            .service
            .cancel_medicine_after_meal_reminder(user_id, schedule_id, target)
            .await;
        swallow(result, "cancel medicine follow-up", user_id);
    }

    /// An appointment was booked.
    pub async fn appointment_created(&self, appointment: &AppointmentTrigger) {
        let result = self
            .service
            .schedule_appointment_reminders(Some(appointment))
            .await;
        swallow(result, "schedule appointment reminders", appointment.user_id);
    }

    /// An appointment changed status; cancellation retracts its reminders.
    pub async fn appointment_status_changed(
        &self,
        appointment: &AppointmentTrigger,
        status: AppointmentStatus,
    ) {
        if status == AppointmentStatus::Cancelled {
            self.retract_appointment(appointment).await;
        }
    }

    /// An appointment was deleted.
    pub async fn appointment_deleted(&self, appointment: &AppointmentTrigger) {
        self.retract_appointment(appointment).await;
    }

    /// A user toggled the weekly health-log reminder.
    ///
    /// Enabling needs no action; the next worker tick picks the user up.
    pub async fn weekly_preference_changed(&self, user_id: UserId, enabled: bool) {
        if enabled {
            return;
        }
        let result = self.service.cancel_weekly_reminders(user_id).await;
        swallow(result, "cancel weekly reminders", user_id);
    }

    async fn retract_appointment(&self, appointment: &AppointmentTrigger) {
        let result = self
            .service
            .cancel_appointment_reminders(appointment.user_id, appointment.id)
            .await;
        swallow(result, "cancel appointment reminders", appointment.user_id);
    }
}

fn swallow<T>(result: AppResult<T>, action: &str, user_id: UserId) {
    if let Err(e) = result {
        warn!(%user_id, action, error = %e, "Reminder side effect failed");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};

    use homecare_core::types::{AppointmentId, ScheduleId, UserId};
    use homecare_entity::appointment::{AppointmentCategory, AppointmentStatus, AppointmentTrigger};
    use homecare_entity::medicine::{IntakeStatus, MealTiming, MedicineScheduleTrigger};
    use homecare_entity::notification::NotificationStatus;

    use super::ReminderTriggers;
    use crate::notification::testing::{Harness, utc_config};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap()
    }

    fn cancelled_count(events: &[homecare_entity::notification::NotificationEvent]) -> usize {
        events
            .iter()
            .filter(|e| e.status == NotificationStatus::Cancelled)
            .count()
    }

    #[tokio::test]
    async fn test_intake_only_taken_cancels() {
        let h = Harness::new(t0(), utc_config(1)).await;
        let triggers = ReminderTriggers::new(Arc::new(h.service.clone()));
        let user = UserId::new();
        let schedule = MedicineScheduleTrigger {
            schedule_id: ScheduleId::new(),
            time_slot: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            meal_timing: Some(MealTiming::BeforeMeal),
        };
        triggers.medicine_schedule_created(user, &schedule).await;

        triggers
            .intake_recorded(user, Some(schedule.schedule_id), t0(), IntakeStatus::Missed)
            .await;
        triggers.intake_recorded(user, None, t0(), IntakeStatus::Taken).await;
        assert_eq!(cancelled_count(&h.store.events().await), 0);

        triggers
            .intake_recorded(user, Some(schedule.schedule_id), t0(), IntakeStatus::Taken)
            .await;
        assert_eq!(cancelled_count(&h.store.events().await), 1);
    }

    #[tokio::test]
    async fn test_appointment_lifecycle() {
        let h = Harness::new(t0(), utc_config(7)).await;
        let triggers = ReminderTriggers::new(Arc::new(h.service.clone()));
        let appointment = AppointmentTrigger {
            id: AppointmentId::new(),
            user_id: UserId::new(),
            appt_type: AppointmentCategory::Hospital,
            appt_datetime: t0() + Duration::days(10),
        };

        triggers.appointment_created(&appointment).await;
        triggers
            .appointment_status_changed(&appointment, AppointmentStatus::Confirmed)
            .await;
        assert_eq!(cancelled_count(&h.store.events().await), 0);

        triggers
            .appointment_status_changed(&appointment, AppointmentStatus::Cancelled)
            .await;
        assert_eq!(cancelled_count(&h.store.events().await), 2);
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let h = Harness::new(t0(), utc_config(7)).await;
        let triggers = ReminderTriggers::new(Arc::new(h.service.clone()));
        let appointment = AppointmentTrigger {
            id: AppointmentId::new(),
            user_id: UserId::new(),
            appt_type: AppointmentCategory::Hospital,
            appt_datetime: t0() + Duration::days(10),
        };

        h.store.fail_writes(true).await;
        triggers.appointment_created(&appointment).await;
        triggers.appointment_deleted(&appointment).await;
        triggers.weekly_preference_changed(appointment.user_id, false).await;

        h.store.fail_writes(false).await;
        assert!(h.store.events().await.is_empty());
    }

    #[tokio::test]
    async fn test_weekly_preference_disable_cancels() {
        let h = Harness::new(t0(), utc_config(7)).await;
        let triggers = ReminderTriggers::new(Arc::new(h.service.clone()));
        let user = UserId::new();
        h.audience.set_users(vec![user]).await;
        h.service.ensure_weekly_reminders().await.unwrap();

        triggers.weekly_preference_changed(user, true).await;
        assert_eq!(cancelled_count(&h.store.events().await), 0);

        triggers.weekly_preference_changed(user, false).await;
        assert_eq!(cancelled_count(&h.store.events().await), 1);
    }
}
