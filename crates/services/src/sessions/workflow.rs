use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use recall_core::model::{CardId, ProfileId, ProgressRecord, Rating, SessionHistoryEntry, SessionMode};
use recall_core::scheduler::Scheduler;
use recall_core::time::Clock;
use storage::repository::{Storage, StorageError};

use super::progress::SessionProgress;
use super::queries::SessionQueries;
use super::queue::QueueCaps;
use super::service::StudySession;
use crate::error::SessionError;
use crate::review_service::{ReviewResult, ReviewService};

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

/// What one answered card produced: the review outcome plus where the
/// session now stands.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionAnswerResult {
    pub review: ReviewResult,
    pub progress: SessionProgress,
}

/// Everything written when a session completes.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedSession {
    pub entry_id: i64,
    pub entry: SessionHistoryEntry,
    pub progress: ProgressRecord,
}

//
// ─── STUDY SERVICE ─────────────────────────────────────────────────────────────
//

/// Orchestrates the full session lifecycle against storage.
///
/// The service owns profile exclusivity (one active session per profile) and
/// the write path; the `StudySession` it hands out owns the in-session state
/// machine. Card commits happen immediately per review and are never rolled
/// back — abandoning a session only skips the completion writes (history and
/// streak).
#[derive(Clone)]
pub struct StudyService {
    clock: Clock,
    storage: Storage,
    review: ReviewService,
    active: Arc<Mutex<HashSet<ProfileId>>>,
    shuffle_new: bool,
}

impl StudyService {
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self {
            clock: Clock::default(),
            storage,
            review: ReviewService::new(),
            active: Arc::new(Mutex::new(HashSet::new())),
            shuffle_new: false,
        }
    }

    /// Override the clock (usually for deterministic testing).
    ///
    /// The embedded review service follows the same clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock.clone();
        self.review = self.review.with_clock(clock);
        self
    }

    /// Use custom review-calculator constants.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.review = ReviewService::with_scheduler(scheduler).with_clock(self.clock.clone());
        self
    }

    /// Shuffle new cards when building queues.
    #[must_use]
    pub fn with_shuffle_new(mut self, shuffle: bool) -> Self {
        self.shuffle_new = shuffle;
        self
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn active_set(&self) -> Result<std::sync::MutexGuard<'_, HashSet<ProfileId>>, SessionError> {
        self.active
            .lock()
            .map_err(|e| SessionError::Storage(StorageError::Connection(e.to_string())))
    }

    fn release(&self, profile: ProfileId) -> Result<(), SessionError> {
        self.active_set()?.remove(&profile);
        Ok(())
    }

    /// Start a session for a profile.
    ///
    /// Builds the queue from the profile's cards and registers the profile as
    /// having an active session. The caller owns the returned session and
    /// must bring it back to `end_session` or `abandon_session` to release
    /// the profile.
    ///
    /// # Errors
    ///
    /// `AlreadyActive` if the profile already has a session in flight,
    /// `NoCardsAvailable` if nothing qualifies for the queue, or a storage
    /// error from loading the cards.
    pub async fn start_session(
        &self,
        profile: ProfileId,
        mode: SessionMode,
    ) -> Result<StudySession, SessionError> {
        // Reserve the profile before the storage await; a check-then-insert
        // split across a suspension point would let two concurrent starts
        // both pass the check.
        if !self.active_set()?.insert(profile) {
            return Err(SessionError::AlreadyActive { profile });
        }

        let now = self.now();
        let session = SessionQueries::plan_from_storage(
            profile,
            self.storage.cards.as_ref(),
            QueueCaps::for_mode(mode),
            self.shuffle_new,
            now,
        )
        .await
        .and_then(|plan| StudySession::new(profile, mode, plan.card_ids, now));

        match session {
            Ok(session) => Ok(session),
            Err(err) => {
                self.release(profile)?;
                Err(err)
            }
        }
    }

    /// Answer the session's current card.
    ///
    /// The session contract is checked before anything is written: a wrong
    /// card, an exhausted queue, or a terminal session leaves both the
    /// session and storage untouched. On success the card's new scheduling
    /// state is committed to storage immediately.
    ///
    /// # Errors
    ///
    /// Contract violations (`NotActive`, `WrongCard`, `QueueExhausted`) or
    /// review/storage failures.
    pub async fn record_review(
        &self,
        session: &mut StudySession,
        card_id: CardId,
        rating: Rating,
    ) -> Result<SessionAnswerResult, SessionError> {
        session.ensure_can_review(card_id)?;

        let mut card = self.storage.cards.get(card_id).await?;
        let review = self
            .review
            .review_card_persisted(&mut card, rating, self.now(), self.storage.cards.as_ref())
            .await?;

        session.note_review(card_id, rating)?;
        Ok(SessionAnswerResult {
            review,
            progress: session.progress(),
        })
    }

    /// Complete a session whose queue is exhausted.
    ///
    /// Appends the history entry, folds the session into the profile's
    /// progress record (streak and totals), and releases the profile.
    ///
    /// # Errors
    ///
    /// `NotActive` or `QueueNotExhausted` when called out of order; storage
    /// errors from the completion writes.
    pub async fn end_session(
        &self,
        session: &mut StudySession,
    ) -> Result<CompletedSession, SessionError> {
        let now = self.now();
        let entry = session.complete(now)?;
        let profile = session.profile_id();

        // The session is terminal from here on, so the profile is released
        // even when a completion write fails; otherwise no future session
        // could ever start for it.
        let written = self.write_completion(profile, &entry, now).await;
        self.release(profile)?;
        let (entry_id, progress) = written?;

        Ok(CompletedSession {
            entry_id,
            entry,
            progress,
        })
    }

    async fn write_completion(
        &self,
        profile: ProfileId,
        entry: &SessionHistoryEntry,
        now: DateTime<Utc>,
    ) -> Result<(i64, ProgressRecord), SessionError> {
        let entry_id = self.storage.history.append_entry(profile, entry).await?;

        let mut progress = self
            .storage
            .progress
            .get_progress(profile)
            .await?
            .unwrap_or_default();
        progress.record_completion(entry.cards_reviewed(), now.date_naive());
        self.storage
            .progress
            .upsert_progress(profile, &progress)
            .await?;

        Ok((entry_id, progress))
    }

    /// Abandon an active session.
    ///
    /// Releases the profile without writing history or progress. Card
    /// commits already made during the session stand.
    ///
    /// # Errors
    ///
    /// `NotActive` if the session is already terminal.
    pub async fn abandon_session(&self, session: &mut StudySession) -> Result<(), SessionError> {
        session.abandon()?;
        self.release(session.profile_id())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
