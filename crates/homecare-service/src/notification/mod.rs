//! Notification scheduling, cancellation and delivery.

mod calendar;
mod canceller;
mod drainer;
pub mod render;
mod scheduler;
pub mod sender;
pub mod service;
pub mod triggers;
mod upcoming;

#[cfg(test)]
mod testing;

pub use drainer::DrainReport;
pub use render::RenderedNotification;
pub use sender::{LogSender, NotificationSender, SendError, WebhookSender, build_sender};
pub use service::NotificationService;
pub use triggers::ReminderTriggers;
