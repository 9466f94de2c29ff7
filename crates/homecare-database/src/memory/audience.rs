//! In-memory weekly reminder audience.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use homecare_core::result::AppResult;
use homecare_core::types::UserId;

use crate::store::WeeklyReminderAudience;

/// A fixed, replaceable list of eligible users.
#[derive(Debug, Clone, Default)]
pub struct MemoryAudience {
    users: Arc<Mutex<Vec<UserId>>>,
}

impl MemoryAudience {
    /// Start with `users` eligible.
    pub fn new(users: Vec<UserId>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    /// Replace the eligible users.
    pub async fn set_users(&self, users: Vec<UserId>) {
        *self.users.lock().await = users;
    }
}

#[async_trait]
impl WeeklyReminderAudience for MemoryAudience {
    async fn list_weekly_reminder_eligible_users(&self) -> AppResult<Vec<UserId>> {
        Ok(self.users.lock().await.clone())
    }
}
