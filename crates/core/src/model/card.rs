use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{CardId, ProfileId};
use crate::scheduler::SchedulingState;

/// A question/answer unit subject to scheduled review.
///
/// Content comes from outside this subsystem; the scheduler only cares about
/// the scheduling state hanging off the card. `scheduling` starts out absent
/// and is created lazily by the review calculator on first contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    profile_id: ProfileId,
    prompt: String,
    answer: String,
    created_at: DateTime<Utc>,
    scheduling: Option<SchedulingState>,
    practice_count: u32,
    last_practiced_at: Option<DateTime<Utc>>,
}

impl Card {
    #[must_use]
    pub fn new(
        id: CardId,
        profile_id: ProfileId,
        prompt: impl Into<String>,
        answer: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            profile_id,
            prompt: prompt.into(),
            answer: answer.into(),
            created_at,
            scheduling: None,
            practice_count: 0,
            last_practiced_at: None,
        }
    }

    /// Rehydrate a card from persisted storage.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: CardId,
        profile_id: ProfileId,
        prompt: String,
        answer: String,
        created_at: DateTime<Utc>,
        scheduling: Option<SchedulingState>,
        practice_count: u32,
        last_practiced_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            profile_id,
            prompt,
            answer,
            created_at,
            scheduling,
            practice_count,
            last_practiced_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    #[must_use]
    pub fn profile_id(&self) -> ProfileId {
        self.profile_id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn scheduling(&self) -> Option<&SchedulingState> {
        self.scheduling.as_ref()
    }

    #[must_use]
    pub fn practice_count(&self) -> u32 {
        self.practice_count
    }

    #[must_use]
    pub fn last_practiced_at(&self) -> Option<DateTime<Utc>> {
        self.last_practiced_at
    }

    /// True for cards that have not built any repetition streak yet.
    #[must_use]
    pub fn is_new(&self) -> bool {
        match &self.scheduling {
            None => true,
            Some(state) => state.repetitions == 0,
        }
    }

    /// Install the scheduling state produced by the review calculator.
    ///
    /// This is the only mutation path; nothing else in the subsystem writes
    /// to a card.
    pub fn apply_review(&mut self, state: SchedulingState, reviewed_at: DateTime<Utc>) {
        self.scheduling = Some(state);
        self.practice_count = self.practice_count.saturating_add(1);
        self.last_practiced_at = Some(reviewed_at);
    }
}
