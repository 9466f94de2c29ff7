//! User preference repository.

use async_trait::async_trait;
use sqlx::PgPool;

use homecare_core::error::{AppError, ErrorKind};
use homecare_core::result::AppResult;
use homecare_core::types::UserId;

use crate::store::WeeklyReminderAudience;

/// Reads `users` and `user_preferences` to find the weekly audience.
#[derive(Debug, Clone)]
pub struct PreferenceRepository {
    pool: PgPool,
}

impl PreferenceRepository {
    /// Create a new preference repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a user's weekly reminder choice.
    pub async fn set_weekly_reminder(&self, user_id: UserId, enabled: bool) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO user_preferences (user_id, weekly_reminder_enabled) VALUES ($1, $2) \
             ON CONFLICT (user_id) DO UPDATE \
             SET weekly_reminder_enabled = EXCLUDED.weekly_reminder_enabled, updated_at = NOW()",
        )
        .bind(user_id)
        .bind(enabled)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert preferences", e))?;
        Ok(())
    }
}

#[async_trait]
impl WeeklyReminderAudience for PreferenceRepository {
    async fn list_weekly_reminder_eligible_users(&self) -> AppResult<Vec<UserId>> {
        // A missing preference row counts as enabled.
        sqlx::query_scalar::<_, UserId>(
            "SELECT users.id FROM users \
             LEFT JOIN user_preferences ON user_preferences.user_id = users.id \
             WHERE users.role::text = 'PATIENT' AND users.is_active = TRUE \
             AND (user_preferences.weekly_reminder_enabled IS NULL \
                  OR user_preferences.weekly_reminder_enabled = TRUE)",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list reminder users", e))
    }
}
