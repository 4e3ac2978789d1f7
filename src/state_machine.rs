//! Age dialogue state machine
//!
//! Pure transitions over a sum-type state; the dispatcher owns storage.

mod age;
mod state;
mod transition;

#[cfg(test)]
mod proptests;

pub use state::AgeState;
pub use transition::{step, YEAR_PROMPT};
