use chrono::{DateTime, Utc};

use recall_core::{
    mastery::Mastery,
    model::{Card, CardId, Rating},
    scheduler::{Scheduler, SchedulerConfig, SchedulingState},
    time::Clock,
};
use storage::repository::CardRepository;

use crate::error::ReviewServiceError;

//
// ─── REVIEW RESULT ─────────────────────────────────────────────────────────────
//

/// Outcome of applying one rating to one card.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewResult {
    pub card_id: CardId,
    pub rating: Rating,
    /// Scheduling state after the review.
    pub state: SchedulingState,
    /// Mastery label for the new state, handy for immediate feedback.
    pub mastery: Mastery,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Coordinates applying a user's rating to a card via the review calculator.
///
/// Cards without a `SchedulingState` are initialized on the spot; a missing
/// state is treated as "first contact", never as an error.
#[derive(Debug, Clone)]
pub struct ReviewService {
    clock: Clock,
    scheduler: Scheduler,
}

impl ReviewService {
    /// Review service with default scheduler constants and the real clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: Clock::default(),
            scheduler: Scheduler::new(),
        }
    }

    /// Use custom scheduler constants.
    ///
    /// # Errors
    ///
    /// Returns `ReviewServiceError::Scheduler` if the config is invalid.
    pub fn try_with_config(config: SchedulerConfig) -> Result<Self, ReviewServiceError> {
        Ok(Self {
            clock: Clock::default(),
            scheduler: Scheduler::try_with_config(config)?,
        })
    }

    /// Use a pre-built scheduler.
    #[must_use]
    pub fn with_scheduler(scheduler: Scheduler) -> Self {
        Self {
            clock: Clock::default(),
            scheduler,
        }
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Current time according to the service's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Apply a rating to an in-memory card.
    ///
    /// Initializes the scheduling state for first-contact cards, advances it
    /// through the calculator, and installs the new state on the card. The
    /// calculator itself never mutates its input; the card is the only thing
    /// updated here.
    pub fn review_card(
        &self,
        card: &mut Card,
        rating: Rating,
        reviewed_at: DateTime<Utc>,
    ) -> ReviewResult {
        let current = card
            .scheduling()
            .cloned()
            .unwrap_or_else(|| self.scheduler.initialize(reviewed_at));

        let state = self.scheduler.advance(&current, rating, reviewed_at);
        card.apply_review(state.clone(), reviewed_at);

        ReviewResult {
            card_id: card.id(),
            rating,
            mastery: Mastery::classify(&state),
            state,
        }
    }

    /// Apply a rating and write the new state through to storage.
    ///
    /// The write-through is a side effect, not a dependency: the returned
    /// result reflects the in-memory state even when the adapter buffers the
    /// update. A storage failure is reported but the in-memory review stands;
    /// per-card commits are deliberately not transactional across a session.
    ///
    /// # Errors
    ///
    /// Returns `ReviewServiceError::Storage` if the write-through fails.
    pub async fn review_card_persisted(
        &self,
        card: &mut Card,
        rating: Rating,
        reviewed_at: DateTime<Utc>,
        cards: &dyn CardRepository,
    ) -> Result<ReviewResult, ReviewServiceError> {
        let result = self.review_card(card, rating, reviewed_at);

        cards
            .update_scheduling(card.id(), &result.state, card.practice_count(), reviewed_at)
            .await?;

        Ok(result)
    }
}

impl Default for ReviewService {
    fn default() -> Self {
        Self::new()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
