//! HomeCare notifier: schedules and delivers patient reminders.
//!
//! Main entry point that wires the engine against PostgreSQL and runs the
//! reminder worker until SIGINT or SIGTERM.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use homecare_core::config::AppConfig;
use homecare_core::error::AppError;
use homecare_core::traits::SystemClock;
use homecare_database::migration::run_migrations;
use homecare_database::{
    DatabasePool, NotificationRepository, PreferenceRepository, TemplateRepository, TemplateStore,
};
use homecare_service::{NotificationService, build_sender};
use homecare_worker::NotificationWorker;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Notifier error");
        std::process::exit(1);
    }
}

/// Load configuration from `config/` and the environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let dir = std::env::var("HOMECARE_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("HOMECARE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load_from(&dir, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.is_json() {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .pretty()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Main notifier run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting HomeCare notifier v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;
    if !db.health_check().await? {
        return Err(AppError::database("Database health check failed"));
    }
    tracing::info!("Database health check passed");

    if config.database.run_migrations {
        tracing::info!("Running database migrations...");
        run_migrations(db.pool()).await?;
    }

    // ── Step 2: Default templates ────────────────────────────────
    if config.notification.seed_templates_on_start {
        TemplateRepository::new(db.pool().clone())
            .seed_default_templates()
            .await?;
    }

    // ── Step 3: Engine ───────────────────────────────────────────
    let events = NotificationRepository::new(db.pool().clone())
        .with_insert_chunk_size(config.notification.effective_insert_chunk_size());
    let audience = PreferenceRepository::new(db.pool().clone());
    let sender = build_sender(&config.sender)?;
    tracing::info!(sender = sender.name(), "Delivery channel ready");

    let service = Arc::new(NotificationService::new(
        Arc::new(events),
        Arc::new(audience),
        sender,
        Arc::new(SystemClock),
        config.notification.clone(),
    )?);

    // ── Step 4: Worker ───────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker_handle = if config.worker.enabled {
        let worker = NotificationWorker::new(Arc::clone(&service), config.worker.interval());
        Some(tokio::spawn(async move { worker.run(shutdown_rx).await }))
    } else {
        tracing::info!("Notification worker disabled");
        None
    };

    // ── Step 5: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
    let _ = shutdown_tx.send(true);

    if let Some(handle) = worker_handle {
        let grace = config.worker.shutdown_grace();
        if tokio::time::timeout(grace, handle).await.is_err() {
            tracing::warn!(
                grace_secs = grace.as_secs(),
                "Worker did not stop within the grace period"
            );
        }
    }

    db.close().await;
    tracing::info!("HomeCare notifier shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
