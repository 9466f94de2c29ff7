//! Delivery channel configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which delivery channel the notifier uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderProvider {
    /// Write each delivery to the log.
    Log,
    /// POST each delivery as JSON to an HTTP endpoint.
    Webhook,
}

/// Sender configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenderConfig {
    /// Delivery channel.
    #[serde(default = "default_provider")]
    pub provider: SenderProvider,
    /// Target URL for the webhook provider.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Request timeout for the webhook provider.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            webhook_url: None,
            timeout_seconds: default_timeout(),
        }
    }
}

impl SenderConfig {
    /// Reject a webhook provider without a target.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.provider == SenderProvider::Webhook
            && self.webhook_url.as_deref().map_or(true, str::is_empty)
        {
            return Err(AppError::configuration(
                "sender.webhook_url is required when sender.provider = \"webhook\"",
            ));
        }
        Ok(())
    }
}

fn default_provider() -> SenderProvider {
    SenderProvider::Log
}

fn default_timeout() -> u64 {
    10
}
