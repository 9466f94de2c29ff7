//! Background worker configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Periodic reminder worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker loop runs inside the notifier.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between worker ticks.
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
    /// Seconds to wait for an in-flight tick during shutdown.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            interval_seconds: default_interval(),
            shutdown_grace_seconds: default_shutdown_grace(),
        }
    }
}

impl WorkerConfig {
    /// Tick interval; zero falls back to the default.
    pub fn interval(&self) -> Duration {
        let secs = if self.interval_seconds == 0 {
            default_interval()
        } else {
            self.interval_seconds
        };
        Duration::from_secs(secs)
    }

    /// Shutdown grace period.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_seconds)
    }
}

fn default_true() -> bool {
    true
}

fn default_interval() -> u64 {
    60
}

fn default_shutdown_grace() -> u64 {
    30
}
