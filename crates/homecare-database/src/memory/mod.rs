//! In-memory store implementations for tests and single-node runs.

pub mod audience;
pub mod store;

pub use audience::MemoryAudience;
pub use store::{MemoryDrainTransaction, MemoryEventStore};
