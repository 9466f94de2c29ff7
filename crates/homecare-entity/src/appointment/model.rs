//! Appointments as seen by the scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use homecare_core::types::{AppointmentId, UserId};

use super::status::AppointmentCategory;

/// An appointment whose reminders should be scheduled or retracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentTrigger {
    /// Appointment identity, copied into each reminder payload.
    pub id: AppointmentId,
    /// Patient the appointment belongs to.
    pub user_id: UserId,
    /// Appointment category.
    pub appt_type: AppointmentCategory,
    /// Appointment instant.
    pub appt_datetime: DateTime<Utc>,
}

impl AppointmentTrigger {
    /// Only hospital appointments get reminders.
    pub fn wants_reminders(&self) -> bool {
        self.appt_type == AppointmentCategory::Hospital
    }
}
