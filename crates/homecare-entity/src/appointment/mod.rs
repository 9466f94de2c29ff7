//! Appointment trigger context.

pub mod model;
pub mod status;

pub use model::AppointmentTrigger;
pub use status::{AppointmentCategory, AppointmentStatus};
