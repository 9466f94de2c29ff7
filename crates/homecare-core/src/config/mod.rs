//! Application configuration schemas.
//!
//! Configuration is layered with the `config` crate: `config/default.toml`,
//! an environment overlay `config/{env}.toml`, then `HOMECARE__*`
//! environment variables.

pub mod database;
pub mod logging;
pub mod notification;
pub mod sender;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::notification::NotificationConfig;
pub use self::sender::{SenderConfig, SenderProvider};
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Reminder scheduling and delivery settings.
    #[serde(default)]
    pub notification: NotificationConfig,
    /// Background worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Delivery channel settings.
    #[serde(default)]
    pub sender: SenderConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load `{dir}/default.toml`, the `{dir}/{env}.toml` overlay and the
    /// `HOMECARE__*` environment, then validate.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("HOMECARE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        app.validate()?;
        Ok(app)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        self.notification.validate()?;
        self.sender.validate()?;
        Ok(())
    }
}
