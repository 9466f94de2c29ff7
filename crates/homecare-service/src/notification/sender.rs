//! Delivery channels.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};

use homecare_core::config::{SenderConfig, SenderProvider};
use homecare_core::error::{AppError, ErrorKind};
use homecare_core::result::AppResult;
use homecare_entity::notification::{NotificationEvent, NotificationTemplate};

use super::render::RenderedNotification;

/// Failure to deliver one notification. Never aborts a batch.
#[derive(Debug, Error)]
pub enum SendError {
    /// The request never got a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The receiver answered with a non-success status.
    #[error("rejected with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The channel refused for another reason.
    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for SendError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Delivers one rendered notification.
///
/// Delivery is at-least-once: an event may be sent again if a previous
/// batch crashed before committing.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Deliver `event` rendered with `template`.
    async fn send(
        &self,
        event: &NotificationEvent,
        template: &NotificationTemplate,
    ) -> Result<(), SendError>;

    /// Channel name for logging.
    fn name(&self) -> &'static str;
}

/// Writes each notification to the log.
#[derive(Debug, Default, Clone)]
pub struct LogSender;

#[async_trait]
impl NotificationSender for LogSender {
    async fn send(
        &self,
        event: &NotificationEvent,
        template: &NotificationTemplate,
    ) -> Result<(), SendError> {
        info!(
            user_id = %event.user_id,
            template_code = %event.template_code,
            scheduled_at = %event.scheduled_at,
            title = %template.title,
            "Notification sent"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

const MAX_ERROR_BODY: usize = 512;

/// POSTs each rendered notification as JSON.
#[derive(Debug, Clone)]
pub struct WebhookSender {
    client: Client,
    url: String,
}

impl WebhookSender {
    /// Create a sender posting to `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Failed to build webhook client", e)
        })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl NotificationSender for WebhookSender {
    async fn send(
        &self,
        event: &NotificationEvent,
        template: &NotificationTemplate,
    ) -> Result<(), SendError> {
        let rendered = RenderedNotification::render(event, template);
        debug!(
            event_id = %rendered.event_id,
            template_code = %rendered.template_code,
            "Posting notification to webhook"
        );

        let response = self.client.post(&self.url).json(&rendered).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(SendError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}

/// Build the sender selected by `config`.
pub fn build_sender(config: &SenderConfig) -> AppResult<Arc<dyn NotificationSender>> {
    config.validate()?;
    match config.provider {
        SenderProvider::Log => Ok(Arc::new(LogSender)),
        SenderProvider::Webhook => {
            let url = config.webhook_url.clone().unwrap_or_default();
            let sender = WebhookSender::new(url, Duration::from_secs(config.timeout_seconds.max(1)))?;
            Ok(Arc::new(sender))
        }
    }
}
