//! Appointment category and status enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an appointment takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentCategory {
    /// Visit to a hospital; receives reminders.
    Hospital,
    /// Nurse visit at home; no reminders.
    HomeVisit,
}

impl AppointmentCategory {
    /// Return the category as stored by the appointment service.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hospital => "HOSPITAL",
            Self::HomeVisit => "HOME_VISIT",
        }
    }
}

impl fmt::Display for AppointmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Booking status of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Return the status as stored by the appointment service.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
