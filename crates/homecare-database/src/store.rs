//! Store contracts consumed by the notification engine.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use homecare_core::result::AppResult;
use homecare_core::types::{AppointmentId, NotificationEventId, ScheduleId, UserId};
use homecare_entity::notification::{
    NewNotificationEvent, NotificationEvent, NotificationStatus, NotificationTemplate,
    TemplateCode, UpcomingNotification,
};

/// Durable table of notification events.
///
/// Implementations own the `(user_id, template_code, scheduled_at)`
/// uniqueness and the status column. Every cancellation touches `PENDING`
/// rows only.
#[async_trait]
pub trait EventStore: Send + Sync + 'static {
    /// Insert events, silently skipping ones whose key already exists.
    ///
    /// The whole slice is written atomically. Returns the number of rows
    /// actually inserted.
    async fn create_events(&self, events: &[NewNotificationEvent]) -> AppResult<u64>;

    /// Events of any status for `user_id` within the inclusive range,
    /// ordered by `scheduled_at` ascending.
    async fn list_upcoming(
        &self,
        user_id: UserId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<UpcomingNotification>>;

    /// Cancel the pending `MED_BEFORE_MEAL_20MIN` follow-up of one schedule
    /// on one local date.
    async fn cancel_pending_by_schedule(
        &self,
        user_id: UserId,
        schedule_id: ScheduleId,
        target_date: NaiveDate,
    ) -> AppResult<u64>;

    /// Cancel pending reminders of either appointment template.
    async fn cancel_pending_by_appointment(
        &self,
        user_id: UserId,
        appointment_id: AppointmentId,
    ) -> AppResult<u64>;

    /// Cancel every pending event of a template for a user.
    async fn cancel_pending_by_template(
        &self,
        user_id: UserId,
        template_code: TemplateCode,
    ) -> AppResult<u64>;

    /// Open the transaction one drain batch runs in.
    async fn begin_drain(&self) -> AppResult<Box<dyn DrainTransaction>>;
}

/// One drain batch's unit of work.
///
/// Rows returned by [`list_due_for_update`](Self::list_due_for_update) stay
/// claimed until the transaction commits or is dropped; concurrent
/// transactions skip them instead of waiting. Dropping without
/// [`commit`](Self::commit) discards every status write.
#[async_trait]
pub trait DrainTransaction: Send {
    /// Claim up to `limit` pending events due at `now`, oldest first.
    async fn list_due_for_update(
        &mut self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> AppResult<Vec<NotificationEvent>>;

    /// Active template with `code`, if any.
    async fn find_template_by_code(&mut self, code: &str)
    -> AppResult<Option<NotificationTemplate>>;

    /// Move one event to `status`, setting `sent_at` only when provided.
    async fn update_event_status(
        &mut self,
        id: NotificationEventId,
        status: NotificationStatus,
        sent_at: Option<DateTime<Utc>>,
    ) -> AppResult<()>;

    /// Make every write of this batch durable and release the claims.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// Admin-side access to notification templates.
#[async_trait]
pub trait TemplateStore: Send + Sync + 'static {
    /// Every template, active or not, ordered by code.
    async fn list_templates(&self) -> AppResult<Vec<NotificationTemplate>>;

    /// Insert the default content of every [`TemplateCode`] whose code is
    /// absent. Returns the number of templates created.
    async fn seed_default_templates(&self) -> AppResult<u64>;

    /// Toggle a template's `is_active` flag. Returns `false` if no template
    /// has that code.
    async fn set_template_active(&self, code: &str, active: bool) -> AppResult<bool>;
}

/// Source of users who should receive the weekly health-log prompt.
#[async_trait]
pub trait WeeklyReminderAudience: Send + Sync + 'static {
    /// Active patients who have not disabled the weekly reminder.
    async fn list_weekly_reminder_eligible_users(&self) -> AppResult<Vec<UserId>>;
}
