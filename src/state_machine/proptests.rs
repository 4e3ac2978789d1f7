//! Property-based tests for the age dialogue
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::*;
use super::transition::*;
use crate::keyboard::{TIME_SKIP, TIME_YES};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap()
        .pred_opt()
        .unwrap()
        .day()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1824i32..=2023, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn arb_state() -> impl Strategy<Value = AgeState> {
    prop_oneof![
        Just(AgeState::AwaitingYear),
        (1824i32..=2024).prop_map(|year| AgeState::AwaitingMonth { year }),
        (1824i32..=2024, 1u32..=12).prop_map(|(year, month)| AgeState::AwaitingDay { year, month }),
        arb_date().prop_map(|date| AgeState::AwaitingTimeChoice { date }),
        arb_date().prop_map(|date| AgeState::AwaitingHour { date }),
        (arb_date(), 0u32..24).prop_map(|(date, hour)| AgeState::AwaitingMinute { date, hour }),
    ]
}

fn arb_input() -> impl Strategy<Value = String> {
    prop_oneof![
        "-?[0-9]{1,5}",
        "[a-zA-Z ]{0,12}",
        Just(TIME_YES.to_string()),
        Just(TIME_SKIP.to_string()),
        Just("Feb".to_string()),
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Rejected input leaves the session where it was (future dates restart)
    #[test]
    fn prop_rejection_keeps_state(state in arb_state(), input in arb_input()) {
        if let Err(error) = transition(&state, &input, fixed_now()) {
            let result = step(&state, &input, fixed_now());
            if error == ValidationError::FutureDate {
                prop_assert_eq!(result.new_state, Some(AgeState::AwaitingYear));
            } else {
                prop_assert_eq!(result.new_state, Some(state));
            }
        }
    }

    // One message never advances more than one field
    #[test]
    fn prop_advances_one_step(state in arb_state(), input in arb_input()) {
        if let Ok(result) = transition(&state, &input, fixed_now()) {
            match result.new_state {
                Some(next) => prop_assert_eq!(next.progress(), state.progress() + 1),
                None => {
                    let finishing = matches!(
                        state,
                        AgeState::AwaitingTimeChoice { .. } | AgeState::AwaitingMinute { .. }
                    );
                    prop_assert!(finishing);
                }
            }
        }
    }

    // Exactly the years within the last 200 are accepted
    #[test]
    fn prop_year_window(year in 1700i64..2100) {
        let accepted = transition(&AgeState::AwaitingYear, &year.to_string(), fixed_now()).is_ok();
        prop_assert_eq!(accepted, (1824..=2024).contains(&year));
    }

    // Days are accepted exactly when the calendar date exists
    #[test]
    fn prop_day_matches_calendar(year in 1824i32..=2024, month in 1u32..=12, day in -2i64..34) {
        let state = AgeState::AwaitingDay { year, month };
        let accepted = transition(&state, &day.to_string(), fixed_now()).is_ok();
        let exists = day >= 1 && day <= i64::from(days_in_month(year, month));
        prop_assert_eq!(accepted, exists);
    }

    // Valid values always finish the dialogue for past dates
    #[test]
    fn prop_valid_walk_finishes(date in arb_date(), hour in 0u32..24, minute in 0u32..60) {
        let month_label = crate::keyboard::MONTH_LABELS[date.month0() as usize];
        let mut state = AgeState::AwaitingYear;
        for input in [date.year().to_string(), month_label.to_string(), date.day().to_string(), TIME_YES.to_string(), hour.to_string()] {
            state = transition(&state, &input, fixed_now()).unwrap().new_state.unwrap();
        }
        let result = transition(&state, &minute.to_string(), fixed_now()).unwrap();
        prop_assert!(result.new_state.is_none());
    }
}
