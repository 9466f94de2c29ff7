//! In-memory event and template store.
//!
//! Rows live in a `tokio::sync::Mutex`-guarded table. Drain transactions
//! claim rows in a separate set guarded by a `std::sync::Mutex`, so a
//! dropped transaction can release its claims without awaiting. Lock order
//! is always table then claims.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use homecare_core::error::AppError;
use homecare_core::result::AppResult;
use homecare_core::types::{
    AppointmentId, NotificationEventId, NotificationTemplateId, ScheduleId, UserId,
};
use homecare_entity::notification::{
    NewNotificationEvent, NotificationEvent, NotificationStatus, NotificationTemplate,
    ReminderPayload, TemplateCode, UpcomingNotification,
};

use crate::store::{DrainTransaction, EventStore, TemplateStore};

type ClaimSet = Arc<std::sync::Mutex<HashSet<NotificationEventId>>>;

#[derive(Debug, Default)]
struct InnerState {
    events: Vec<NotificationEvent>,
    templates: HashMap<String, NotificationTemplate>,
    /// Makes a store fail every write, for rollback tests.
    fail_writes: bool,
}

impl InnerState {
    fn cancel_where<F>(&mut self, claims: &HashSet<NotificationEventId>, matches: F) -> u64
    where
        F: Fn(&NotificationEvent) -> bool,
    {
        let mut cancelled = 0;
        for event in self.events.iter_mut() {
            // Claimed rows are mid-delivery; the drain's outcome wins.
            if event.status == NotificationStatus::Pending
                && !claims.contains(&event.id)
                && matches(event)
            {
                event.status = NotificationStatus::Cancelled;
                cancelled += 1;
            }
        }
        cancelled
    }
}

/// In-memory [`EventStore`] and [`TemplateStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryEventStore {
    state: Arc<Mutex<InnerState>>,
    claims: ClaimSet,
}

impl MemoryEventStore {
    /// Create an empty store without templates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding every default template.
    pub async fn with_default_templates() -> AppResult<Self> {
        let store = Self::new();
        store.seed_default_templates().await?;
        Ok(store)
    }

    /// Snapshot of every event, ordered by `scheduled_at`.
    pub async fn events(&self) -> Vec<NotificationEvent> {
        let state = self.state.lock().await;
        let mut events = state.events.clone();
        events.sort_by_key(|e| e.scheduled_at);
        events
    }

    /// Make subsequent writes fail with a database error.
    pub async fn fail_writes(&self, fail: bool) {
        self.state.lock().await.fail_writes = fail;
    }

    fn claims(&self) -> std::sync::MutexGuard<'_, HashSet<NotificationEventId>> {
        lock_claims(&self.claims)
    }
}

fn lock_claims(claims: &ClaimSet) -> std::sync::MutexGuard<'_, HashSet<NotificationEventId>> {
    // The set is only ever inserted into or drained; a poisoned guard is intact.
    claims.lock().unwrap_or_else(|p| p.into_inner())
}

fn write_error(what: &str) -> AppError {
    AppError::database(format!("Failed to {what}: memory store is failing writes"))
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn create_events(&self, events: &[NewNotificationEvent]) -> AppResult<u64> {
        if events.is_empty() {
            return Ok(0);
        }

        let mut state = self.state.lock().await;
        if state.fail_writes {
            return Err(write_error("insert notification events"));
        }

        let mut seen: HashSet<(UserId, String, DateTime<Utc>)> = state
            .events
            .iter()
            .map(|e| (e.user_id, e.template_code.clone(), e.scheduled_at))
            .collect();

        let now = Utc::now();
        let mut inserted = 0;
        for event in events {
            let (user_id, code, scheduled_at) = event.dedup_key();
            if !seen.insert((user_id, code.to_string(), scheduled_at)) {
                continue;
            }
            state.events.push(NotificationEvent {
                id: NotificationEventId::new(),
                user_id: event.user_id,
                template_code: event.template_code.as_str().to_string(),
                scheduled_at: event.scheduled_at,
                sent_at: None,
                status: NotificationStatus::Pending,
                payload: event.payload.to_json(),
                created_at: now,
            });
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn list_upcoming(
        &self,
        user_id: UserId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<UpcomingNotification>> {
        let state = self.state.lock().await;
        let mut items: Vec<UpcomingNotification> = state
            .events
            .iter()
            .filter(|e| e.user_id == user_id)
            .filter(|e| from.is_none_or(|f| e.scheduled_at >= f))
            .filter(|e| to.is_none_or(|t| e.scheduled_at <= t))
            .map(UpcomingNotification::from)
            .collect();
        items.sort_by_key(|i| i.scheduled_at);
        Ok(items)
    }

    async fn cancel_pending_by_schedule(
        &self,
        user_id: UserId,
        schedule_id: ScheduleId,
        target_date: NaiveDate,
    ) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        if state.fail_writes {
            return Err(write_error("cancel medicine reminder"));
        }
        let claims = self.claims();
        let code = TemplateCode::MedBeforeMeal20Min.as_str();
        let cancelled = state.cancel_where(&claims, |e| {
            e.user_id == user_id
                && e.template_code == code
                && matches!(
                    e.reminder_payload(),
                    Some(ReminderPayload::Medicine { schedule_id: s, target_date: d })
                        if s == schedule_id && d == target_date
                )
        });
        debug!(%user_id, %schedule_id, %target_date, cancelled, "Cancelled medicine follow-up");
        Ok(cancelled)
    }

    async fn cancel_pending_by_appointment(
        &self,
        user_id: UserId,
        appointment_id: AppointmentId,
    ) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        if state.fail_writes {
            return Err(write_error("cancel appointment reminders"));
        }
        let claims = self.claims();
        let cancelled = state.cancel_where(&claims, |e| {
            e.user_id == user_id
                && TemplateCode::APPOINTMENT
                    .iter()
                    .any(|c| c.as_str() == e.template_code)
                && matches!(
                    e.reminder_payload(),
                    Some(ReminderPayload::Appointment { appointment_id: a }) if a == appointment_id
                )
        });
        Ok(cancelled)
    }

    async fn cancel_pending_by_template(
        &self,
        user_id: UserId,
        template_code: TemplateCode,
    ) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        if state.fail_writes {
            return Err(write_error("cancel reminders"));
        }
        let claims = self.claims();
        let code = template_code.as_str();
        Ok(state.cancel_where(&claims, |e| e.user_id == user_id && e.template_code == code))
    }

    async fn begin_drain(&self) -> AppResult<Box<dyn DrainTransaction>> {
        Ok(Box::new(MemoryDrainTransaction {
            state: Arc::clone(&self.state),
            claims: Arc::clone(&self.claims),
            held: Vec::new(),
            staged: Vec::new(),
        }))
    }
}

#[async_trait]
impl TemplateStore for MemoryEventStore {
    async fn list_templates(&self) -> AppResult<Vec<NotificationTemplate>> {
        let state = self.state.lock().await;
        let mut templates: Vec<_> = state.templates.values().cloned().collect();
        templates.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(templates)
    }

    async fn seed_default_templates(&self) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let mut created = 0;
        for code in TemplateCode::ALL {
            if state.templates.contains_key(code.as_str()) {
                continue;
            }
            let (title, body) = code.default_content();
            state.templates.insert(
                code.as_str().to_string(),
                NotificationTemplate {
                    id: NotificationTemplateId::new(),
                    code: code.as_str().to_string(),
                    title: title.to_string(),
                    body: body.to_string(),
                    data: None,
                    is_active: true,
                    created_at: now,
                },
            );
            created += 1;
        }
        Ok(created)
    }

    async fn set_template_active(&self, code: &str, active: bool) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.templates.get_mut(code) {
            Some(template) => {
                template.is_active = active;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Drain batch over a [`MemoryEventStore`].
///
/// Status writes are staged and applied on commit. Dropping the value
/// releases its claims and discards the staged writes.
#[derive(Debug)]
pub struct MemoryDrainTransaction {
    state: Arc<Mutex<InnerState>>,
    claims: ClaimSet,
    held: Vec<NotificationEventId>,
    staged: Vec<(NotificationEventId, NotificationStatus, Option<DateTime<Utc>>)>,
}

impl MemoryDrainTransaction {
    fn release(&mut self) {
        if self.held.is_empty() {
            return;
        }
        let mut claims = lock_claims(&self.claims);
        for id in self.held.drain(..) {
            claims.remove(&id);
        }
    }
}

impl Drop for MemoryDrainTransaction {
    fn drop(&mut self) {
        self.release();
    }
}

#[async_trait]
impl DrainTransaction for MemoryDrainTransaction {
    async fn list_due_for_update(
        &mut self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> AppResult<Vec<NotificationEvent>> {
        let state = self.state.lock().await;
        let mut claims = lock_claims(&self.claims);

        let mut due: Vec<&NotificationEvent> = state
            .events
            .iter()
            .filter(|e| e.is_due(now) && !claims.contains(&e.id))
            .collect();
        due.sort_by_key(|e| e.scheduled_at);
        due.truncate(limit);

        let mut locked = Vec::with_capacity(due.len());
        for event in due {
            claims.insert(event.id);
            self.held.push(event.id);
            locked.push(event.clone());
        }
        Ok(locked)
    }

    async fn find_template_by_code(
        &mut self,
        code: &str,
    ) -> AppResult<Option<NotificationTemplate>> {
        let state = self.state.lock().await;
        Ok(state.templates.get(code).filter(|t| t.is_active).cloned())
    }

    async fn update_event_status(
        &mut self,
        id: NotificationEventId,
        status: NotificationStatus,
        sent_at: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        if self.state.lock().await.fail_writes {
            return Err(write_error("update notification status"));
        }
        self.staged.push((id, status, sent_at));
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> AppResult<()> {
        {
            let mut state = self.state.lock().await;
            for (id, status, sent_at) in self.staged.drain(..) {
                if let Some(event) = state.events.iter_mut().find(|e| e.id == id) {
                    event.status = status;
                    if sent_at.is_some() {
                        event.sent_at = sent_at;
                    }
                }
            }
        }
        self.release();
        Ok(())
    }
}
