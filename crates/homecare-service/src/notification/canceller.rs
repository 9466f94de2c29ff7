//! Retracts pending events whose trigger became moot.

use chrono::{DateTime, Utc};
use tracing::debug;

use homecare_core::result::AppResult;
use homecare_core::types::{AppointmentId, ScheduleId, UserId};
use homecare_entity::notification::TemplateCode;

use super::service::NotificationService;

impl NotificationService {
    /// Cancel the pending twenty-minute follow-up for one schedule and day.
    ///
    /// `target` is converted to the configured zone to find the local date.
    /// The five-minute heads-up is left alone.
    pub async fn cancel_medicine_after_meal_reminder(
        &self,
        user_id: UserId,
        schedule_id: ScheduleId,
        target: DateTime<Utc>,
    ) -> AppResult<u64> {
        let target_date = target.with_timezone(&self.tz).date_naive();
        let cancelled = self
            .store
            .cancel_pending_by_schedule(user_id, schedule_id, target_date)
            .await?;
        debug!(%user_id, %schedule_id, %target_date, cancelled, "Cancelled medicine follow-up");
        Ok(cancelled)
    }

    /// Cancel every pending reminder of an appointment.
    pub async fn cancel_appointment_reminders(
        &self,
        user_id: UserId,
        appointment_id: AppointmentId,
    ) -> AppResult<u64> {
        let cancelled = self
            .store
            .cancel_pending_by_appointment(user_id, appointment_id)
            .await?;
        debug!(%user_id, %appointment_id, cancelled, "Cancelled appointment reminders");
        Ok(cancelled)
    }

    /// Cancel every pending weekly health-log prompt of a user.
    pub async fn cancel_weekly_reminders(&self, user_id: UserId) -> AppResult<u64> {
        let cancelled = self
            .store
            .cancel_pending_by_template(user_id, TemplateCode::WeeklyHealthLog)
            .await?;
        debug!(%user_id, cancelled, "Cancelled weekly reminders");
        Ok(cancelled)
    }
}
