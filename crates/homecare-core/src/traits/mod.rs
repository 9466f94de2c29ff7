//! Capabilities injected into the engine.

pub mod clock;

pub use clock::{Clock, FixedClock, SystemClock};
