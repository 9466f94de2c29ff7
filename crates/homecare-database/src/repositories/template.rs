//! Notification template repository.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use homecare_core::error::{AppError, ErrorKind};
use homecare_core::result::AppResult;
use homecare_core::types::NotificationTemplateId;
use homecare_entity::notification::{NotificationTemplate, TemplateCode};

use crate::store::TemplateStore;

/// PostgreSQL-backed [`TemplateStore`].
#[derive(Debug, Clone)]
pub struct TemplateRepository {
    pool: PgPool,
}

impl TemplateRepository {
    /// Create a new template repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateStore for TemplateRepository {
    async fn list_templates(&self) -> AppResult<Vec<NotificationTemplate>> {
        sqlx::query_as::<_, NotificationTemplate>(
            "SELECT id, code, title, body, data, is_active, created_at \
             FROM notification_templates ORDER BY code ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list templates", e))
    }

    async fn seed_default_templates(&self) -> AppResult<u64> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO notification_templates (id, code, title, body, is_active) ");
        builder.push_values(TemplateCode::ALL, |mut row, code| {
            let (title, body) = code.default_content();
            row.push_bind(NotificationTemplateId::new())
                .push_bind(code.as_str())
                .push_bind(title)
                .push_bind(body)
                .push_bind(true);
        });
        builder.push(" ON CONFLICT (code) DO NOTHING");

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to seed templates", e))?;

        let created = result.rows_affected();
        if created > 0 {
            tracing::info!(created, "Seeded default notification templates");
        }
        Ok(created)
    }

    async fn set_template_active(&self, code: &str, active: bool) -> AppResult<bool> {
        let result = sqlx::query("UPDATE notification_templates SET is_active = $2 WHERE code = $1")
            .bind(code)
            .bind(active)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update template", e))?;
        Ok(result.rows_affected() > 0)
    }
}
