use chrono::{DateTime, Utc};

use recall_core::model::{
    CardId, ProfileId, Rating, RatingTally, SessionHistoryEntry, SessionId, SessionMode,
    SessionStatus,
};

use super::progress::SessionProgress;
use crate::error::SessionError;

/// One study session: an ordered queue of cards and a cursor through it.
///
/// State machine: `Active → {Completed | Abandoned}`; terminal sessions are
/// never reopened. Exactly one session may be active per profile at a time —
/// that exclusivity is enforced by the workflow layer that creates these.
///
/// All mutators validate the session contract first and refuse to touch any
/// state when a call arrives out of order.
#[derive(Debug, Clone, PartialEq)]
pub struct StudySession {
    id: SessionId,
    profile_id: ProfileId,
    mode: SessionMode,
    queue: Vec<CardId>,
    current_index: usize,
    tally: RatingTally,
    cards_reviewed: u32,
    started_at: DateTime<Utc>,
    status: SessionStatus,
}

impl StudySession {
    /// Create an active session over a non-empty queue.
    ///
    /// `started_at` should come from the caller's clock to keep time
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoCardsAvailable` for an empty queue.
    pub fn new(
        profile_id: ProfileId,
        mode: SessionMode,
        queue: Vec<CardId>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if queue.is_empty() {
            return Err(SessionError::NoCardsAvailable);
        }

        Ok(Self {
            id: SessionId::generate(),
            profile_id,
            mode,
            queue,
            current_index: 0,
            tally: RatingTally::new(),
            cards_reviewed: 0,
            started_at,
            status: SessionStatus::Active,
        })
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn profile_id(&self) -> ProfileId {
        self.profile_id
    }

    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    #[must_use]
    pub fn queue(&self) -> &[CardId] {
        &self.queue
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn tally(&self) -> &RatingTally {
        &self.tally
    }

    #[must_use]
    pub fn cards_reviewed(&self) -> u32 {
        self.cards_reviewed
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// True once every card in the queue has been answered.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.queue.len()
    }

    /// The card the session expects to be answered next.
    #[must_use]
    pub fn current_card_id(&self) -> Option<CardId> {
        self.queue.get(self.current_index).copied()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.queue.len(),
            answered: self.current_index,
            remaining: self.queue.len().saturating_sub(self.current_index),
            is_exhausted: self.is_exhausted(),
        }
    }

    /// Check that answering `card_id` right now honors the session contract.
    pub(crate) fn ensure_can_review(&self, card_id: CardId) -> Result<(), SessionError> {
        if !self.is_active() {
            return Err(SessionError::NotActive);
        }
        match self.current_card_id() {
            None => Err(SessionError::QueueExhausted),
            Some(expected) if expected != card_id => Err(SessionError::WrongCard {
                expected,
                got: card_id,
            }),
            Some(_) => Ok(()),
        }
    }

    /// Record one answered card and advance the cursor.
    pub(crate) fn note_review(
        &mut self,
        card_id: CardId,
        rating: Rating,
    ) -> Result<(), SessionError> {
        self.ensure_can_review(card_id)?;

        self.tally.record(rating);
        self.cards_reviewed += 1;
        self.current_index += 1;
        Ok(())
    }

    /// Transition to `Completed`, producing the immutable history snapshot.
    ///
    /// Valid only when the queue is exhausted.
    pub(crate) fn complete(
        &mut self,
        completed_at: DateTime<Utc>,
    ) -> Result<SessionHistoryEntry, SessionError> {
        if !self.is_active() {
            return Err(SessionError::NotActive);
        }
        if !self.is_exhausted() {
            return Err(SessionError::QueueNotExhausted {
                remaining: self.queue.len() - self.current_index,
            });
        }

        let entry = SessionHistoryEntry::new(
            self.mode,
            self.cards_reviewed,
            self.tally,
            self.started_at,
            completed_at,
        )?;
        self.status = SessionStatus::Completed;
        Ok(entry)
    }

    /// Transition to `Abandoned`. Valid from `Active` at any index.
    pub(crate) fn abandon(&mut self) -> Result<(), SessionError> {
        if !self.is_active() {
            return Err(SessionError::NotActive);
        }
        self.status = SessionStatus::Abandoned;
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
