//! The notification engine facade.

use std::fmt;
use std::sync::Arc;

use chrono_tz::Tz;

use homecare_core::config::NotificationConfig;
use homecare_core::result::AppResult;
use homecare_core::traits::Clock;
use homecare_database::store::{EventStore, WeeklyReminderAudience};

use super::sender::NotificationSender;

/// Schedules, cancels and delivers reminders.
///
/// Operations are spread over `scheduler`, `canceller`, `drainer` and
/// `upcoming`; this type only holds the injected collaborators.
#[derive(Clone)]
pub struct NotificationService {
    pub(crate) store: Arc<dyn EventStore>,
    pub(crate) audience: Arc<dyn WeeklyReminderAudience>,
    pub(crate) sender: Arc<dyn NotificationSender>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: NotificationConfig,
    pub(crate) tz: Tz,
}

impl NotificationService {
    /// Creates a new notification service.
    ///
    /// Fails if the weekly reminder time in `config` is out of range.
    pub fn new(
        store: Arc<dyn EventStore>,
        audience: Arc<dyn WeeklyReminderAudience>,
        sender: Arc<dyn NotificationSender>,
        clock: Arc<dyn Clock>,
        config: NotificationConfig,
    ) -> AppResult<Self> {
        config.validate()?;
        let tz = config.timezone();
        Ok(Self {
            store,
            audience,
            sender,
            clock,
            config,
            tz,
        })
    }

    /// Zone used for time slots and the weekly cadence.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Effective engine settings.
    pub fn config(&self) -> &NotificationConfig {
        &self.config
    }
}

impl fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationService")
            .field("sender", &self.sender.name())
            .field("clock", &self.clock)
            .field("tz", &self.tz)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
