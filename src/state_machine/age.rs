//! Elapsed-time computation and the final age report

use chrono::{Datelike, Duration, Months, NaiveDateTime};

/// Time elapsed since birth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Age {
    pub seconds: i64,
    /// Whole calendar years
    pub years: u32,
    /// Whole days left after removing `years`
    pub days: i64,
    /// Whole hours left after removing `years` and `days`
    pub hours: i64,
}

impl Age {
    /// Returns `None` when `birth` is after `now`.
    ///
    /// Years are counted on the calendar, then days and hours are truncated
    /// from what is left over.
    pub fn between(birth: NaiveDateTime, now: NaiveDateTime) -> Option<Self> {
        if birth > now {
            return None;
        }

        let seconds = (now - birth).num_seconds();
        let (years, anniversary) = whole_years(birth, now);
        let days = (now - anniversary).num_days();
        let hours = (now - (anniversary + Duration::days(days))).num_hours();

        Some(Self {
            seconds,
            years,
            days,
            hours,
        })
    }
}

/// Whole calendar years and the anniversary they end on
///
/// A year counts once month, day and time of day have all come round
/// again, so a Feb 29 birthday completes its year on Mar 1 in common years.
fn whole_years(birth: NaiveDateTime, now: NaiveDateTime) -> (u32, NaiveDateTime) {
    let mut years = now.year() - birth.year();
    if (now.month(), now.day(), now.time()) < (birth.month(), birth.day(), birth.time()) {
        years -= 1;
    }
    let years = u32::try_from(years).unwrap_or(0);
    let anniversary = birth
        .checked_add_months(Months::new(years * 12))
        .unwrap_or(birth);
    (years, anniversary)
}

pub fn format_report(birth: NaiveDateTime, age: &Age) -> String {
    format!(
        "🎉 You were born on {}\nYou are {} seconds old! 🕓\n(≈ {} years, {} days and {} hours)",
        birth.format("%Y-%m-%d %H:%M"),
        group_thousands(age.seconds),
        age.years,
        age.days,
        age.hours,
    )
}

/// `1234567` -> `"1,234,567"`
fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
