//! Background reminder processing for HomeCare.
//!
//! [`NotificationWorker`] tops up the weekly health-log reminders and drains
//! due events on a fixed interval until it is told to stop.

pub mod runner;

pub use runner::{NotificationWorker, TickReport};
