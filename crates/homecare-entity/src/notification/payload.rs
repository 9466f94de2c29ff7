//! Correlation payload stored on each event.
//!
//! The canceller matches pending events by these keys, so the JSON field
//! names (`schedule_id`, `target_date`, `appointment_id`) are part of the
//! storage contract.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use homecare_core::types::{AppointmentId, ScheduleId};

/// Typed correlation key of a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReminderPayload {
    /// A medicine reminder for one schedule on one local day.
    Medicine {
        /// Schedule that produced the reminder.
        schedule_id: ScheduleId,
        /// Local calendar date, serialized as `YYYY-MM-DD`.
        target_date: NaiveDate,
    },
    /// An appointment reminder.
    Appointment {
        /// Appointment that produced the reminder.
        appointment_id: AppointmentId,
    },
    /// The weekly health-log prompt.
    WeeklyHealthLog,
}

impl ReminderPayload {
    /// Encode as a JSON object for storage.
    pub fn to_json(&self) -> serde_json::Value {
        // Every variant is a plain object of strings; encoding cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Decode from a stored JSON object.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}
