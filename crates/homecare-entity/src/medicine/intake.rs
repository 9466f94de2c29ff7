//! Intake outcomes reported by patients.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one scheduled dose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IntakeStatus {
    /// Dose taken; the follow-up nudge is moot.
    Taken,
    Missed,
    Skipped,
}

impl IntakeStatus {
    /// Return the status as stored by the intake service.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Taken => "TAKEN",
            Self::Missed => "MISSED",
            Self::Skipped => "SKIPPED",
        }
    }
}

impl fmt::Display for IntakeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
