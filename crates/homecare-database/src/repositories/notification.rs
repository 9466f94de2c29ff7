//! Notification event repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use homecare_core::error::{AppError, ErrorKind};
use homecare_core::result::AppResult;
use homecare_core::types::{AppointmentId, NotificationEventId, ScheduleId, UserId};
use homecare_entity::notification::{
    NewNotificationEvent, NotificationEvent, NotificationStatus, NotificationTemplate,
    TemplateCode, UpcomingNotification,
};

use crate::store::{DrainTransaction, EventStore};

const EVENT_COLUMNS: &str =
    "id, user_id, template_code, scheduled_at, sent_at, status, payload, created_at";

const DEFAULT_INSERT_CHUNK_SIZE: usize = 100;

/// PostgreSQL-backed [`EventStore`].
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
    insert_chunk_size: usize,
}

impl NotificationRepository {
    /// Create a repository using the default insert chunk size.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            insert_chunk_size: DEFAULT_INSERT_CHUNK_SIZE,
        }
    }

    /// Bound the number of rows per bulk insert statement.
    pub fn with_insert_chunk_size(mut self, size: usize) -> Self {
        self.insert_chunk_size = size.max(1);
        self
    }
}

#[async_trait]
impl EventStore for NotificationRepository {
    async fn create_events(&self, events: &[NewNotificationEvent]) -> AppResult<u64> {
        if events.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin insert transaction", e)
        })?;

        let mut inserted = 0;
        for chunk in events.chunks(self.insert_chunk_size) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO notification_events (id, user_id, template_code, scheduled_at, status, payload) ",
            );
            builder.push_values(chunk, |mut row, event| {
                row.push_bind(NotificationEventId::new())
                    .push_bind(event.user_id)
                    .push_bind(event.template_code.as_str())
                    .push_bind(event.scheduled_at)
                    .push_bind(NotificationStatus::Pending)
                    .push_bind(event.payload.to_json());
            });
            builder.push(" ON CONFLICT (user_id, template_code, scheduled_at) DO NOTHING");

            let result = builder.build().execute(&mut *tx).await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to insert notification events", e)
            })?;
            inserted += result.rows_affected();
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit notification events", e)
        })?;

        Ok(inserted)
    }

    async fn list_upcoming(
        &self,
        user_id: UserId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<UpcomingNotification>> {
        sqlx::query_as::<_, UpcomingNotification>(
            "SELECT id, template_code, scheduled_at, status FROM notification_events \
             WHERE user_id = $1 \
             AND ($2::timestamptz IS NULL OR scheduled_at >= $2) \
             AND ($3::timestamptz IS NULL OR scheduled_at <= $3) \
             ORDER BY scheduled_at ASC",
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list upcoming notifications", e))
    }

    async fn cancel_pending_by_schedule(
        &self,
        user_id: UserId,
        schedule_id: ScheduleId,
        target_date: NaiveDate,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notification_events SET status = 'CANCELLED' \
             WHERE user_id = $1 AND status = 'PENDING' AND template_code = $2 \
             AND payload->>'schedule_id' = $3 AND payload->>'target_date' = $4",
        )
        .bind(user_id)
        .bind(TemplateCode::MedBeforeMeal20Min.as_str())
        .bind(schedule_id.to_string())
        .bind(target_date.format("%Y-%m-%d").to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to cancel medicine reminder", e))?;
        Ok(result.rows_affected())
    }

    async fn cancel_pending_by_appointment(
        &self,
        user_id: UserId,
        appointment_id: AppointmentId,
    ) -> AppResult<u64> {
        let codes: Vec<&str> = TemplateCode::APPOINTMENT.iter().map(|c| c.as_str()).collect();
        let result = sqlx::query(
            "UPDATE notification_events SET status = 'CANCELLED' \
             WHERE user_id = $1 AND status = 'PENDING' AND template_code = ANY($2) \
             AND payload->>'appointment_id' = $3",
        )
        .bind(user_id)
        .bind(codes)
        .bind(appointment_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to cancel appointment reminders", e))?;
        Ok(result.rows_affected())
    }

    async fn cancel_pending_by_template(
        &self,
        user_id: UserId,
        template_code: TemplateCode,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notification_events SET status = 'CANCELLED' \
             WHERE user_id = $1 AND status = 'PENDING' AND template_code = $2",
        )
        .bind(user_id)
        .bind(template_code.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to cancel reminders", e))?;
        Ok(result.rows_affected())
    }

    async fn begin_drain(&self) -> AppResult<Box<dyn DrainTransaction>> {
        let tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin drain transaction", e)
        })?;
        Ok(Box::new(PgDrainTransaction { tx }))
    }
}

/// Drain batch backed by a PostgreSQL transaction.
///
/// Due rows are locked with `FOR UPDATE SKIP LOCKED`; dropping the value
/// without committing rolls the transaction back.
pub struct PgDrainTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl DrainTransaction for PgDrainTransaction {
    async fn list_due_for_update(
        &mut self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> AppResult<Vec<NotificationEvent>> {
        sqlx::query_as::<_, NotificationEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM notification_events \
             WHERE status = 'PENDING' AND scheduled_at <= $1 \
             ORDER BY scheduled_at ASC \
             LIMIT $2 \
             FOR UPDATE SKIP LOCKED"
        ))
        .bind(now)
        .bind(limit as i64)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock due notifications", e))
    }

    async fn find_template_by_code(
        &mut self,
        code: &str,
    ) -> AppResult<Option<NotificationTemplate>> {
        sqlx::query_as::<_, NotificationTemplate>(
            "SELECT id, code, title, body, data, is_active, created_at \
             FROM notification_templates WHERE code = $1 AND is_active = TRUE",
        )
        .bind(code)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find template", e))
    }

    async fn update_event_status(
        &mut self,
        id: NotificationEventId,
        status: NotificationStatus,
        sent_at: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE notification_events SET status = $2, sent_at = COALESCE($3, sent_at) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(sent_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update notification status", e))?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit drain transaction", e)
        })
    }
}
