//! # homecare-service
//!
//! The notification engine. [`NotificationService`] turns medicine
//! schedules, appointments and the weekly cadence into pending events,
//! retracts them when they become moot, and drains due events through a
//! [`NotificationSender`]. [`ReminderTriggers`] is the fire-and-forget face
//! the surrounding CRUD services call.
//!
//! Collaborators are injected as `Arc<dyn Trait>` at construction time.

pub mod notification;

pub use notification::{
    DrainReport, LogSender, NotificationSender, NotificationService, ReminderTriggers,
    RenderedNotification, SendError, WebhookSender, build_sender,
};
