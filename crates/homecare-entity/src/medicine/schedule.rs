//! Medicine schedules as seen by the scheduler.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use homecare_core::types::ScheduleId;

/// When a dose is taken relative to a meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealTiming {
    /// Taken shortly before a meal; gets a heads-up and a follow-up.
    BeforeMeal,
    /// Taken after a meal.
    AfterMeal,
    /// Taken right after a meal.
    AfterMealImmediately,
    /// Taken at bedtime.
    BeforeBed,
    /// Taken until the pack runs out.
    UntilFinished,
    /// Not to be taken with milk.
    NoMilk,
    /// Any other instruction.
    Other,
}

impl MealTiming {
    /// Return the timing as stored by the schedule service.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeMeal => "BEFORE_MEAL",
            Self::AfterMeal => "AFTER_MEAL",
            Self::AfterMealImmediately => "AFTER_MEAL_IMMEDIATELY",
            Self::BeforeBed => "BEFORE_BED",
            Self::UntilFinished => "UNTIL_FINISHED",
            Self::NoMilk => "NO_MILK",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for MealTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealTiming {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BEFORE_MEAL" => Ok(Self::BeforeMeal),
            "AFTER_MEAL" => Ok(Self::AfterMeal),
            "AFTER_MEAL_IMMEDIATELY" => Ok(Self::AfterMealImmediately),
            "BEFORE_BED" => Ok(Self::BeforeBed),
            "UNTIL_FINISHED" => Ok(Self::UntilFinished),
            "NO_MILK" => Ok(Self::NoMilk),
            "OTHER" => Ok(Self::Other),
            other => Err(format!("unknown meal timing: {other}")),
        }
    }
}

/// A medicine schedule whose time slot should produce daily reminders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicineScheduleTrigger {
    /// Schedule identity, copied into each reminder payload.
    pub schedule_id: ScheduleId,
    /// Local time of day of the dose.
    pub time_slot: NaiveTime,
    /// Meal timing, if the schedule records one.
    pub meal_timing: Option<MealTiming>,
}

impl MedicineScheduleTrigger {
    /// Whether the slot gets the two-step before-meal treatment.
    pub fn is_before_meal(&self) -> bool {
        self.meal_timing == Some(MealTiming::BeforeMeal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_timing_parse() {
        assert_eq!("before_meal".parse::<MealTiming>().unwrap(), MealTiming::BeforeMeal);
        assert_eq!(
            serde_json::to_string(&MealTiming::AfterMealImmediately).unwrap(),
            "\"AFTER_MEAL_IMMEDIATELY\""
        );
        assert!("LUNCH".parse::<MealTiming>().is_err());
    }
}
