use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("current streak ({current}) exceeds longest streak ({longest})")]
    StreakMismatch { current: u32, longest: u32 },
}

/// Longitudinal study progress for one profile.
///
/// Mutated only when a session completes; abandoned sessions leave it
/// untouched. The streak counts consecutive calendar days with at least one
/// completed session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    total_cards_studied: u64,
    current_streak: u32,
    longest_streak: u32,
    last_study_date: Option<NaiveDate>,
}

impl ProgressRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate a record from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `StreakMismatch` if the current streak exceeds the longest.
    pub fn from_persisted(
        total_cards_studied: u64,
        current_streak: u32,
        longest_streak: u32,
        last_study_date: Option<NaiveDate>,
    ) -> Result<Self, ProgressError> {
        if current_streak > longest_streak {
            return Err(ProgressError::StreakMismatch {
                current: current_streak,
                longest: longest_streak,
            });
        }
        Ok(Self {
            total_cards_studied,
            current_streak,
            longest_streak,
            last_study_date,
        })
    }

    #[must_use]
    pub fn total_cards_studied(&self) -> u64 {
        self.total_cards_studied
    }

    #[must_use]
    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    #[must_use]
    pub fn longest_streak(&self) -> u32 {
        self.longest_streak
    }

    #[must_use]
    pub fn last_study_date(&self) -> Option<NaiveDate> {
        self.last_study_date
    }

    /// Fold one completed session into the record.
    ///
    /// Studying the day after the last study date extends the streak;
    /// studying again on the same day leaves it unchanged; any longer gap
    /// (or a first-ever session) restarts it at 1.
    pub fn record_completion(&mut self, cards_reviewed: u32, today: NaiveDate) {
        match self.last_study_date {
            Some(last) if last == today => {}
            Some(last) if (today - last).num_days() == 1 => {
                self.current_streak += 1;
            }
            _ => {
                self.current_streak = 1;
            }
        }

        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.total_cards_studied += u64::from(cards_reviewed);
        self.last_study_date = Some(today);
    }
}
