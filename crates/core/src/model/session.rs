use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::review::RatingTally;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionHistoryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("cards reviewed ({cards_reviewed}) does not match rating counts ({tally_total})")]
    CountMismatch {
        cards_reviewed: u32,
        tally_total: u32,
    },
}

/// How a study session selects its queue size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionMode {
    /// Short session with tight caps.
    Quick,
    /// Regular session with the full daily caps.
    Full,
}

/// Lifecycle state of a study session. Terminal states are never reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Active,
    Completed,
    Abandoned,
}

/// Immutable snapshot written when a session completes.
///
/// Append-only: entries are never edited after the fact. Abandoned sessions
/// never produce one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHistoryEntry {
    mode: SessionMode,
    cards_reviewed: u32,
    tally: RatingTally,
    started_at: DateTime<Utc>,
    duration_seconds: i64,
}

impl SessionHistoryEntry {
    /// Build an entry from a finished session's bookkeeping.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimeRange` if `completed_at` precedes `started_at`, or
    /// `CountMismatch` if the histogram total disagrees with the review count.
    pub fn new(
        mode: SessionMode,
        cards_reviewed: u32,
        tally: RatingTally,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, SessionHistoryError> {
        if completed_at < started_at {
            return Err(SessionHistoryError::InvalidTimeRange);
        }
        if tally.total() != cards_reviewed {
            return Err(SessionHistoryError::CountMismatch {
                cards_reviewed,
                tally_total: tally.total(),
            });
        }

        Ok(Self {
            mode,
            cards_reviewed,
            tally,
            started_at,
            duration_seconds: completed_at.signed_duration_since(started_at).num_seconds(),
        })
    }

    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    #[must_use]
    pub fn cards_reviewed(&self) -> u32 {
        self.cards_reviewed
    }

    #[must_use]
    pub fn tally(&self) -> &RatingTally {
        &self.tally
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Elapsed time for display only; it has no bearing on scheduling.
    #[must_use]
    pub fn duration_seconds(&self) -> i64 {
        self.duration_seconds
    }
}
