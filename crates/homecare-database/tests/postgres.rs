//! PostgreSQL integration tests.
//!
//! Run with a scratch database:
//! `DATABASE_URL=postgres://... cargo test -p homecare-database -- --ignored`

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use sqlx::PgPool;

use homecare_core::config::DatabaseConfig;
use homecare_core::types::{AppointmentId, ScheduleId, UserId};
use homecare_database::migration::run_migrations;
use homecare_database::{
    DatabasePool, DrainTransaction, EventStore, NotificationRepository, PreferenceRepository, TemplateRepository, TemplateStore,
    WeeklyReminderAudience,
};
use homecare_entity::notification::{
    NewNotificationEvent, NotificationStatus, ReminderPayload, TemplateCode,
};

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&url).await.expect("connect");
    run_migrations(&pool).await.expect("migrate");
    pool
}

async fn insert_user(pool: &PgPool, role: &str, active: bool) -> UserId {
    let id = UserId::new();
    sqlx::query("INSERT INTO users (id, role, is_active) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(role)
        .bind(active)
        .execute(pool)
        .await
        .expect("insert user");
    id
}

fn far_past() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap()
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_bulk_insert_is_idempotent_across_chunks() {
    let pool = pool().await;
    let repo = NotificationRepository::new(pool.clone()).with_insert_chunk_size(2);
    let user = UserId::new();
    let schedule = ScheduleId::new();
    let date = NaiveDate::from_ymd_opt(2030, 3, 1).unwrap();

    let events: Vec<_> = (0..5)
        .map(|i| {
            NewNotificationEvent::new(
                user,
                TemplateCode::MedAfterMealNow,
                Utc.with_ymd_and_hms(2030, 3, 1, 9, 0, 0).unwrap() + Duration::days(i),
                ReminderPayload::Medicine {
                    schedule_id: schedule,
                    target_date: date + Duration::days(i),
                },
            )
        })
        .collect();

    assert_eq!(repo.create_events(&events).await.unwrap(), 5);
    assert_eq!(repo.create_events(&events).await.unwrap(), 0);

    let upcoming = repo.list_upcoming(user, None, None).await.unwrap();
    assert_eq!(upcoming.len(), 5);
    assert!(upcoming.windows(2).all(|w| w[0].scheduled_at < w[1].scheduled_at));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_skip_locked_partitions_due_rows() {
    let pool = pool().await;
    let repo = NotificationRepository::new(pool.clone());
    let user = UserId::new();
    sqlx::query("DELETE FROM notification_events WHERE scheduled_at < $1")
        .bind(far_past() + Duration::days(1))
        .execute(&pool)
        .await
        .unwrap();

    let events: Vec<_> = (0..4)
        .map(|i| {
            NewNotificationEvent::new(
                user,
                TemplateCode::WeeklyHealthLog,
                far_past() + Duration::minutes(i),
                ReminderPayload::WeeklyHealthLog,
            )
        })
        .collect();
    repo.create_events(&events).await.unwrap();

    let mut first = repo.begin_drain().await.unwrap();
    let mut second = repo.begin_drain().await.unwrap();
    let a = first.list_due_for_update(far_past() + Duration::hours(1), 2).await.unwrap();
    let b = second.list_due_for_update(far_past() + Duration::hours(1), 2).await.unwrap();

    assert_eq!(a.len(), 2);
    assert_eq!(b.len(), 2);
    assert!(a.iter().all(|x| b.iter().all(|y| x.id != y.id)));

    for event in &a {
        first
            .update_event_status(event.id, NotificationStatus::Sent, Some(Utc::now()))
            .await
            .unwrap();
    }
    first.commit().await.unwrap();
    drop(second);

    let upcoming = repo.list_upcoming(user, None, None).await.unwrap();
    let sent = upcoming.iter().filter(|u| u.status == NotificationStatus::Sent).count();
    let pending = upcoming.iter().filter(|u| u.status == NotificationStatus::Pending).count();
    assert_eq!((sent, pending), (2, 2));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_cancel_by_appointment_only_touches_pending() {
    let pool = pool().await;
    let repo = NotificationRepository::new(pool.clone());
    let user = UserId::new();
    let appointment = AppointmentId::new();
    let payload = ReminderPayload::Appointment {
        appointment_id: appointment,
    };
    let at = Utc.with_ymd_and_hms(2031, 6, 1, 3, 0, 0).unwrap();

    repo.create_events(&[
        NewNotificationEvent::new(user, TemplateCode::Appt5D, at, payload),
        NewNotificationEvent::new(user, TemplateCode::Appt1D, at + Duration::days(4), payload),
    ])
    .await
    .unwrap();

    assert_eq!(repo.cancel_pending_by_appointment(user, appointment).await.unwrap(), 2);
    assert_eq!(repo.cancel_pending_by_appointment(user, appointment).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_weekly_audience_respects_preferences() {
    let pool = pool().await;
    let prefs = PreferenceRepository::new(pool.clone());

    let default_on = insert_user(&pool, "PATIENT", true).await;
    let opted_out = insert_user(&pool, "PATIENT", true).await;
    let inactive = insert_user(&pool, "PATIENT", false).await;
    let nurse = insert_user(&pool, "NURSE", true).await;
    prefs.set_weekly_reminder(opted_out, false).await.unwrap();

    let users = prefs.list_weekly_reminder_eligible_users().await.unwrap();
    assert!(users.contains(&default_on));
    assert!(!users.contains(&opted_out));
    assert!(!users.contains(&inactive));
    assert!(!users.contains(&nurse));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_template_seeding_is_idempotent() {
    let pool = pool().await;
    let templates = TemplateRepository::new(pool);

    templates.seed_default_templates().await.unwrap();
    assert_eq!(templates.seed_default_templates().await.unwrap(), 0);

    let codes: Vec<String> = templates
        .list_templates()
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.code)
        .collect();
    for code in TemplateCode::ALL {
        assert!(codes.iter().any(|c| c == code.as_str()));
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_pool_health_check_round_trips() {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = DatabasePool::connect(&DatabaseConfig {
        url,
        max_connections: 2,
        min_connections: 1,
        connect_timeout_seconds: 5,
        idle_timeout_seconds: 60,
        run_migrations: false,
    })
    .await
    .expect("connect");

    assert!(db.health_check().await.expect("health check"));

    db.close().await;
    assert!(db.health_check().await.is_err());
}
