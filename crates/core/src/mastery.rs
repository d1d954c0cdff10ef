use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduler::SchedulingState;

/// Interval length, in days, at which a well-rehearsed card counts as mastered.
pub const MASTERY_INTERVAL_DAYS: f64 = 21.0;

/// Coarse mastery label derived from a card's scheduling state.
///
/// Purely a function of the state: wall-clock time never changes a card's
/// mastery, only reviews do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mastery {
    /// Never reviewed and never lapsed.
    New,
    /// One or two successful reviews into the current streak.
    Learning,
    /// Established streak, but the interval is still short. A lapsed card
    /// that has not rebuilt its streak also lands here.
    Reviewing,
    /// Three or more repetitions with a long interval.
    Mastered,
}

impl Mastery {
    /// Classify with the default mastery threshold.
    #[must_use]
    pub fn classify(state: &SchedulingState) -> Self {
        Self::classify_with(state, MASTERY_INTERVAL_DAYS)
    }

    /// Classify with a custom minimum interval for `Mastered`.
    #[must_use]
    pub fn classify_with(state: &SchedulingState, min_interval_days: f64) -> Self {
        if state.repetitions == 0 && state.lapses == 0 {
            Mastery::New
        } else if (1..=2).contains(&state.repetitions) {
            Mastery::Learning
        } else if state.repetitions >= 3 && state.interval_days >= min_interval_days {
            Mastery::Mastered
        } else {
            Mastery::Reviewing
        }
    }
}

/// True when the card's due date falls on today's calendar date.
#[must_use]
pub fn is_due_today(state: &SchedulingState, now: DateTime<Utc>) -> bool {
    state.due_at.date_naive() == now.date_naive()
}

/// True when the card's due date is strictly before today.
#[must_use]
pub fn is_overdue(state: &SchedulingState, now: DateTime<Utc>) -> bool {
    state.due_at.date_naive() < now.date_naive()
}
