//! Medicine schedule trigger context.

pub mod intake;
pub mod schedule;

pub use intake::IntakeStatus;
pub use schedule::{MealTiming, MedicineScheduleTrigger};
