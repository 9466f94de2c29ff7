//! CLI command definitions and dispatch.

pub mod config;
pub mod migrate;
pub mod notifications;
pub mod templates;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use homecare_core::config::AppConfig;
use homecare_core::error::AppError;
use homecare_core::traits::SystemClock;
use homecare_database::{DatabasePool, NotificationRepository, PreferenceRepository};
use homecare_service::{NotificationService, build_sender};

use crate::output::OutputFormat;

/// HomeCare notification administration
#[derive(Debug, Parser)]
#[command(name = "homecare", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and the environment overlays
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Environment overlay to load from the config directory
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Notification template management
    Templates(templates::TemplateArgs),
    /// Notification event operations
    Notifications(notifications::NotificationArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load_from(&self.config, &self.env)?;
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Templates(args) => templates::execute(args, &config, self.format).await,
            Commands::Notifications(args) => {
                notifications::execute(args, &config, self.format).await
            }
            Commands::Config(args) => config::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: wire the notification engine against PostgreSQL
pub fn build_service(
    config: &AppConfig,
    db: &DatabasePool,
) -> Result<NotificationService, AppError> {
    let events = NotificationRepository::new(db.pool().clone())
        .with_insert_chunk_size(config.notification.effective_insert_chunk_size());
    let audience = PreferenceRepository::new(db.pool().clone());
    let sender = build_sender(&config.sender)?;

    NotificationService::new(
        Arc::new(events),
        Arc::new(audience),
        sender,
        Arc::new(SystemClock),
        config.notification.clone(),
    )
}
