//! Notification templates and the codes the engine schedules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use homecare_core::types::NotificationTemplateId;

/// Admin-managed content referenced by events through `code`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationTemplate {
    /// Row identifier.
    pub id: NotificationTemplateId,
    /// Unique symbolic code.
    pub code: String,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub body: String,
    /// Static structured data merged into every rendering.
    pub data: Option<serde_json::Value>,
    /// Inactive templates are treated as missing by the drainer.
    pub is_active: bool,
    /// When the template was created.
    pub created_at: DateTime<Utc>,
}

/// Template codes the scheduler emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateCode {
    /// Five minutes before a before-meal slot.
    #[serde(rename = "MED_BEFORE_MEAL_5MIN")]
    MedBeforeMeal5Min,
    /// Twenty minutes after a before-meal slot, the "not taken yet" nudge.
    #[serde(rename = "MED_BEFORE_MEAL_20MIN")]
    MedBeforeMeal20Min,
    /// At the slot for every other meal timing.
    MedAfterMealNow,
    /// Five days before a hospital appointment.
    #[serde(rename = "APPT_5D")]
    Appt5D,
    /// One day before a hospital appointment.
    #[serde(rename = "APPT_1D")]
    Appt1D,
    /// Monday weekly health-log prompt.
    WeeklyHealthLog,
}

impl TemplateCode {
    /// Every code, in seeding order.
    pub const ALL: [TemplateCode; 6] = [
        Self::MedBeforeMeal5Min,
        Self::MedBeforeMeal20Min,
        Self::MedAfterMealNow,
        Self::Appt5D,
        Self::Appt1D,
        Self::WeeklyHealthLog,
    ];

    /// Codes produced for appointments.
    pub const APPOINTMENT: [TemplateCode; 2] = [Self::Appt5D, Self::Appt1D];

    /// Return the code as stored on events and templates.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MedBeforeMeal5Min => "MED_BEFORE_MEAL_5MIN",
            Self::MedBeforeMeal20Min => "MED_BEFORE_MEAL_20MIN",
            Self::MedAfterMealNow => "MED_AFTER_MEAL_NOW",
            Self::Appt5D => "APPT_5D",
            Self::Appt1D => "APPT_1D",
            Self::WeeklyHealthLog => "WEEKLY_HEALTH_LOG",
        }
    }

    /// Default `(title, body)` used when seeding templates.
    pub fn default_content(&self) -> (&'static str, &'static str) {
        match self {
            Self::MedBeforeMeal5Min => (
                "Medicine reminder",
                "Reminder: take your medicine before meal in 5 minutes.",
            ),
            Self::MedBeforeMeal20Min => (
                "Medicine reminder",
                "Reminder: please take your medicine if you have not yet.",
            ),
            Self::MedAfterMealNow => ("Medicine reminder", "หลังทานอาหารอย่าลืมทานยา"),
            Self::Appt5D => ("Appointment reminder", "Upcoming appointment in 5 days."),
            Self::Appt1D => ("Appointment reminder", "Upcoming appointment tomorrow."),
            Self::WeeklyHealthLog => (
                "Weekly health log",
                "Please complete your weekly health behavior log.",
            ),
        }
    }
}

impl fmt::Display for TemplateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| format!("unknown template code: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_text() {
        for code in TemplateCode::ALL {
            assert_eq!(code.as_str().parse::<TemplateCode>().unwrap(), code);
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert!("MED_SOMETIME".parse::<TemplateCode>().is_err());
    }
}
