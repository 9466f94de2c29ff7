//! # homecare-database
//!
//! Persistence for the reminder engine: the store contracts consumed by the
//! scheduler, canceller and drainer, their PostgreSQL implementations, and an
//! in-memory implementation with the same locking semantics for tests and
//! single-node runs.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::{DatabasePool, redact_url};
pub use memory::{MemoryAudience, MemoryEventStore};
pub use repositories::{NotificationRepository, PreferenceRepository, TemplateRepository};
pub use store::{DrainTransaction, EventStore, TemplateStore, WeeklyReminderAudience};
