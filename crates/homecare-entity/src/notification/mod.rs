//! Notification events and templates.

pub mod model;
pub mod payload;
pub mod status;
pub mod template;
pub mod upcoming;

pub use model::{NewNotificationEvent, NotificationEvent};
pub use payload::ReminderPayload;
pub use status::NotificationStatus;
pub use template::{NotificationTemplate, TemplateCode};
pub use upcoming::UpcomingNotification;
