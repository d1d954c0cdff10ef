use chrono::{DateTime, Utc};
use rand::rng;
use rand::seq::SliceRandom;

use recall_core::mastery::{is_due_today, is_overdue};
use recall_core::model::{Card, CardId, SessionMode};

/// Caps on the two halves of a study queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueCaps {
    /// Maximum overdue + due-today cards.
    pub max_review: usize,
    /// Maximum never-rehearsed cards.
    pub max_new: usize,
}

impl QueueCaps {
    #[must_use]
    pub fn new(max_review: usize, max_new: usize) -> Self {
        Self {
            max_review,
            max_new,
        }
    }

    /// Default caps per session mode.
    #[must_use]
    pub fn for_mode(mode: SessionMode) -> Self {
        match mode {
            SessionMode::Quick => Self::new(10, 3),
            SessionMode::Full => Self::new(100, 20),
        }
    }
}

/// Selection result for a queue build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuePlan {
    pub card_ids: Vec<CardId>,
    pub overdue_selected: usize,
    pub due_selected: usize,
    pub new_selected: usize,
}

impl QueuePlan {
    /// Total number of cards in this plan.
    #[must_use]
    pub fn total(&self) -> usize {
        self.card_ids.len()
    }

    /// True when no cards qualified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.card_ids.is_empty()
    }
}

/// Selects and orders the cards for one study session.
///
/// Candidates fall into three buckets, checked in order so they stay
/// disjoint: overdue (due date before today), due (due date today), and new
/// (no scheduling state, or no repetition streak yet). Cards scheduled for a
/// future day with an intact streak are excluded entirely.
///
/// Ordering: overdue first, most overdue leading; then due by due time; then
/// new cards in discovery order (optionally shuffled). The overdue+due
/// portion is capped by `max_review`, the new portion by `max_new`.
pub struct QueueBuilder {
    caps: QueueCaps,
    shuffle_new: bool,
}

impl QueueBuilder {
    #[must_use]
    pub fn new(caps: QueueCaps) -> Self {
        Self {
            caps,
            shuffle_new: false,
        }
    }

    /// Enable or disable shuffling among new cards before selection.
    #[must_use]
    pub fn with_shuffle_new(mut self, shuffle: bool) -> Self {
        self.shuffle_new = shuffle;
        self
    }

    /// Build a queue plan from pre-filtered candidate cards.
    ///
    /// Returns an empty plan (never an error) when nothing qualifies.
    pub fn build(&self, cards: impl IntoIterator<Item = Card>, now: DateTime<Utc>) -> QueuePlan {
        let mut overdue: Vec<(DateTime<Utc>, CardId)> = Vec::new();
        let mut due: Vec<(DateTime<Utc>, CardId)> = Vec::new();
        let mut fresh: Vec<CardId> = Vec::new();

        for card in cards {
            match card.scheduling() {
                Some(state) if is_overdue(state, now) => {
                    overdue.push((state.due_at, card.id()));
                }
                Some(state) if is_due_today(state, now) => {
                    due.push((state.due_at, card.id()));
                }
                Some(state) if state.repetitions == 0 => fresh.push(card.id()),
                None => fresh.push(card.id()),
                // future-dated with an intact streak: not part of today's work
                Some(_) => {}
            }
        }

        // earliest due date == most overdue
        overdue.sort_by_key(|(due_at, id)| (*due_at, id.value()));
        due.sort_by_key(|(due_at, id)| (*due_at, id.value()));

        let overdue_selected = overdue.len().min(self.caps.max_review);
        let due_selected = due
            .len()
            .min(self.caps.max_review.saturating_sub(overdue_selected));

        let mut card_ids: Vec<CardId> = overdue
            .into_iter()
            .take(overdue_selected)
            .chain(due.into_iter().take(due_selected))
            .map(|(_, id)| id)
            .collect();

        if self.shuffle_new {
            let mut rng = rng();
            fresh.as_mut_slice().shuffle(&mut rng);
        }
        fresh.truncate(self.caps.max_new);
        let new_selected = fresh.len();
        card_ids.extend(fresh);

        QueuePlan {
            card_ids,
            overdue_selected,
            due_selected,
            new_selected,
        }
    }
}
