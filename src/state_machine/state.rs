//! Age dialogue state types

use chrono::NaiveDate;

/// Where an age dialogue currently stands
///
/// Each variant carries only the fields collected so far. Finishing the
/// dialogue is not a stored state: the final step computes the report and
/// the session is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgeState {
    /// Fresh session, nothing collected yet
    #[default]
    AwaitingYear,

    AwaitingMonth { year: i32 },

    AwaitingDay { year: i32, month: u32 },

    /// Calendar date known, asking whether the birth time is known
    AwaitingTimeChoice { date: NaiveDate },

    AwaitingHour { date: NaiveDate },

    AwaitingMinute { date: NaiveDate, hour: u32 },
}

impl AgeState {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            AgeState::AwaitingYear => "awaiting_year",
            AgeState::AwaitingMonth { .. } => "awaiting_month",
            AgeState::AwaitingDay { .. } => "awaiting_day",
            AgeState::AwaitingTimeChoice { .. } => "awaiting_time_choice",
            AgeState::AwaitingHour { .. } => "awaiting_hour",
            AgeState::AwaitingMinute { .. } => "awaiting_minute",
        }
    }

    /// Number of fields collected so far, in dialogue order
    pub fn progress(&self) -> u8 {
        match self {
            AgeState::AwaitingYear => 0,
            AgeState::AwaitingMonth { .. } => 1,
            AgeState::AwaitingDay { .. } => 2,
            AgeState::AwaitingTimeChoice { .. } => 3,
            AgeState::AwaitingHour { .. } => 4,
            AgeState::AwaitingMinute { .. } => 5,
        }
    }
}
