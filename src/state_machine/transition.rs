//! Pure state transition function for the age dialogue
//!
//! Given the same state, input and clock reading, a transition always
//! produces the same result. Storage and delivery happen in the caller.

use super::age::{format_report, Age};
use super::AgeState;
use crate::keyboard::{month_picker, time_choice, Reply, MONTH_LABELS, TIME_SKIP, TIME_YES};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

/// Birth years further back than this are rejected
const MAX_AGE_YEARS: i32 = 200;

pub const YEAR_PROMPT: &str = "📅 Enter your birth year (e.g. 1990):";
const MONTH_PROMPT: &str = "✅ Year saved. Now choose month:";
const DAY_PROMPT: &str = "📆 Enter day of month (1–31):";
const TIME_CHOICE_PROMPT: &str = "⏰ Do you know the exact time you were born?";
const HOUR_PROMPT: &str = "⌚ Enter hour (0–23):";
const MINUTE_PROMPT: &str = "🕐 Enter minute (0–59):";
const TRY_AGAIN: &str = "Please try again:";

/// Result of a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// `None` once the dialogue has finished and the session should be dropped
    pub new_state: Option<AgeState>,
    pub reply: Reply,
}

impl TransitionResult {
    pub fn advance(state: AgeState, reply: Reply) -> Self {
        Self {
            new_state: Some(state),
            reply,
        }
    }

    pub fn finish(reply: Reply) -> Self {
        Self {
            new_state: None,
            reply,
        }
    }
}

/// Input rejected at a specific step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("❌ Please enter a number.")]
    NotANumber,
    #[error("❌ Year is in the future.")]
    YearInFuture,
    #[error("❌ That’s over 200 years ago!")]
    TooLongAgo,
    #[error("❌ Please choose month using buttons:")]
    UnknownMonth,
    #[error("❌ That date doesn’t exist in that month.")]
    DateDoesNotExist,
    #[error("⏰ Please answer using the buttons.")]
    UnrecognizedTimeChoice,
    #[error("❌ Hour must be 0–23.")]
    HourOutOfRange,
    #[error("❌ Minute must be 0–59.")]
    MinuteOutOfRange,
    #[error("❌ That’s a future date! Try again with correct values.")]
    FutureDate,
}

/// Advance the dialogue by one message
pub fn transition(
    state: &AgeState,
    text: &str,
    now: NaiveDateTime,
) -> Result<TransitionResult, ValidationError> {
    match *state {
        AgeState::AwaitingYear => {
            let year = parse_number(text)?;
            let current = i64::from(now.year());
            if year > current {
                return Err(ValidationError::YearInFuture);
            }
            if year < current - i64::from(MAX_AGE_YEARS) {
                return Err(ValidationError::TooLongAgo);
            }
            let year = i32::try_from(year).map_err(|_| ValidationError::TooLongAgo)?;
            Ok(TransitionResult::advance(
                AgeState::AwaitingMonth { year },
                Reply::with_keyboard(MONTH_PROMPT, month_picker()),
            ))
        }

        AgeState::AwaitingMonth { year } => {
            let month = month_from_name(text).ok_or(ValidationError::UnknownMonth)?;
            Ok(TransitionResult::advance(
                AgeState::AwaitingDay { year, month },
                Reply::plain(DAY_PROMPT),
            ))
        }

        AgeState::AwaitingDay { year, month } => {
            let day = parse_number(text)?;
            let date = u32::try_from(day)
                .ok()
                .and_then(|day| NaiveDate::from_ymd_opt(year, month, day))
                .ok_or(ValidationError::DateDoesNotExist)?;
            Ok(TransitionResult::advance(
                AgeState::AwaitingTimeChoice { date },
                Reply::with_keyboard(TIME_CHOICE_PROMPT, time_choice()),
            ))
        }

        AgeState::AwaitingTimeChoice { date } => match text {
            TIME_YES => Ok(TransitionResult::advance(
                AgeState::AwaitingHour { date },
                Reply::plain(HOUR_PROMPT),
            )),
            TIME_SKIP => finalize(date.and_time(NaiveTime::MIN), now),
            _ => Err(ValidationError::UnrecognizedTimeChoice),
        },

        AgeState::AwaitingHour { date } => {
            let hour = parse_in_range(text, 23, ValidationError::HourOutOfRange)?;
            Ok(TransitionResult::advance(
                AgeState::AwaitingMinute { date, hour },
                Reply::plain(MINUTE_PROMPT),
            ))
        }

        AgeState::AwaitingMinute { date, hour } => {
            let minute = parse_in_range(text, 59, ValidationError::MinuteOutOfRange)?;
            let time = NaiveTime::from_hms_opt(hour, minute, 0)
                .ok_or(ValidationError::HourOutOfRange)?;
            finalize(date.and_time(time), now)
        }
    }
}

/// Turn a rejected input into the reply for it
///
/// The session stays where it was, except that a future birth moment sends
/// the user back to the year prompt.
pub fn recover(state: &AgeState, error: ValidationError) -> TransitionResult {
    match error {
        ValidationError::UnknownMonth => {
            TransitionResult::advance(*state, Reply::with_keyboard(error.to_string(), month_picker()))
        }
        ValidationError::UnrecognizedTimeChoice => TransitionResult::advance(
            *state,
            Reply::with_keyboard(TIME_CHOICE_PROMPT, time_choice()),
        ),
        ValidationError::FutureDate => TransitionResult::advance(
            AgeState::AwaitingYear,
            Reply::plain(format!("{error}\n{YEAR_PROMPT}")),
        ),
        _ => TransitionResult::advance(*state, Reply::plain(format!("{error}\n{TRY_AGAIN}"))),
    }
}

/// Run one step, folding validation errors into their replies
pub fn step(state: &AgeState, text: &str, now: NaiveDateTime) -> TransitionResult {
    transition(state, text, now).unwrap_or_else(|error| recover(state, error))
}

fn finalize(birth: NaiveDateTime, now: NaiveDateTime) -> Result<TransitionResult, ValidationError> {
    let age = Age::between(birth, now).ok_or(ValidationError::FutureDate)?;
    Ok(TransitionResult::finish(Reply::with_main_menu(format_report(
        birth, &age,
    ))))
}

fn parse_number(text: &str) -> Result<i64, ValidationError> {
    text.parse().map_err(|_| ValidationError::NotANumber)
}

fn parse_in_range(text: &str, max: u32, out_of_range: ValidationError) -> Result<u32, ValidationError> {
    let value = parse_number(text)?;
    u32::try_from(value)
        .ok()
        .filter(|v| *v <= max)
        .ok_or(out_of_range)
}

/// Case-insensitive substring match, first hit in calendar order
///
/// "january" and "Jan" both resolve to 1. Any text containing an
/// abbreviation matches, so "janky" is January too.
pub fn month_from_name(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    MONTH_LABELS
        .iter()
        .position(|label| lower.contains(&label.to_lowercase()))
        .and_then(|idx| u32::try_from(idx + 1).ok())
}
