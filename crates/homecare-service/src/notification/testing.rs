//! Shared fixtures for engine tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use homecare_core::config::NotificationConfig;
use homecare_core::traits::{Clock, FixedClock};
use homecare_core::types::{NotificationEventId, UserId};
use homecare_database::{MemoryAudience, MemoryEventStore};
use homecare_entity::notification::{NotificationEvent, NotificationTemplate};

use super::sender::{NotificationSender, SendError};
use super::service::NotificationService;

/// Engine settings in UTC with a horizon of `days`.
pub(crate) fn utc_config(days: i64) -> NotificationConfig {
    NotificationConfig {
        timezone: "UTC".into(),
        schedule_days: days,
        ..NotificationConfig::default()
    }
}

#[derive(Debug, Default)]
struct Recorded {
    sent: Vec<(NotificationEventId, String)>,
    failing_users: HashSet<UserId>,
    yield_on_send: bool,
}

/// Records deliveries; fails for configured recipients.
#[derive(Debug, Default)]
pub(crate) struct RecordingSender {
    inner: Mutex<Recorded>,
}

impl RecordingSender {
    pub(crate) fn fail_for(&self, user_id: UserId) {
        self.inner.lock().unwrap().failing_users.insert(user_id);
    }

    pub(crate) fn yield_on_send(&self, enabled: bool) {
        self.inner.lock().unwrap().yield_on_send = enabled;
    }

    pub(crate) fn sent_codes(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .sent
            .iter()
            .map(|(_, code)| code.clone())
            .collect()
    }

    pub(crate) fn sent_ids(&self) -> Vec<NotificationEventId> {
        self.inner.lock().unwrap().sent.iter().map(|(id, _)| *id).collect()
    }
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send(
        &self,
        event: &NotificationEvent,
        _template: &NotificationTemplate,
    ) -> Result<(), SendError> {
        let should_yield = self.inner.lock().unwrap().yield_on_send;
        if should_yield {
            tokio::task::yield_now().await;
        }

        let mut inner = self.inner.lock().unwrap();
        if inner.failing_users.contains(&event.user_id) {
            return Err(SendError::Unavailable(format!("recipient {} unreachable", event.user_id)));
        }
        inner.sent.push((event.id, event.template_code.clone()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// A service wired to in-memory collaborators and a pinned clock.
pub(crate) struct Harness {
    pub(crate) store: MemoryEventStore,
    pub(crate) audience: MemoryAudience,
    pub(crate) sender: Arc<RecordingSender>,
    pub(crate) clock: Arc<FixedClock>,
    pub(crate) service: NotificationService,
}

impl Harness {
    pub(crate) async fn new(now: DateTime<Utc>, config: NotificationConfig) -> Self {
        let store = MemoryEventStore::with_default_templates().await.unwrap();
        let audience = MemoryAudience::default();
        let sender = Arc::new(RecordingSender::default());
        let clock = Arc::new(FixedClock::new(now));
        let service = NotificationService::new(
            Arc::new(store.clone()),
            Arc::new(audience.clone()),
            sender.clone(),
            clock.clone(),
            config,
        )
        .unwrap();

        Self {
            store,
            audience,
            sender,
            clock,
            service,
        }
    }

    pub(crate) fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
