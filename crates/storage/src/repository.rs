use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recall_core::model::{Card, CardId, ProfileId, ProgressRecord, SessionHistoryEntry};
use recall_core::scheduler::SchedulingState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Restriction on the candidate card set.
///
/// `None` in a field means "no restriction on that axis".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardFilter {
    pub profile: Option<ProfileId>,
}

impl CardFilter {
    #[must_use]
    pub fn for_profile(profile: ProfileId) -> Self {
        Self {
            profile: Some(profile),
        }
    }

    #[must_use]
    pub fn matches(&self, card: &Card) -> bool {
        match self.profile {
            Some(profile) => card.profile_id() == profile,
            None => true,
        }
    }
}

/// Card access contract for the scheduler core.
///
/// The scheduler is agnostic to the backing store; `update_scheduling` calls
/// may be buffered by an adapter (eventual durability is acceptable), so the
/// in-memory session state stays authoritative for the session's duration.
#[async_trait]
pub trait CardRepository: Send + Sync {
    /// List cards matching the filter, in stable discovery order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the listing fails.
    async fn list(&self, filter: &CardFilter) -> Result<Vec<Card>, StorageError>;

    /// Fetch a single card.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get(&self, id: CardId) -> Result<Card, StorageError>;

    /// Write back a card's scheduling state after a review.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the card no longer exists.
    async fn update_scheduling(
        &self,
        id: CardId,
        state: &SchedulingState,
        practice_count: u32,
        last_practiced_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Persist or update a whole card (seeding and import paths).
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the card cannot be stored.
    async fn upsert(&self, card: &Card) -> Result<(), StorageError>;
}

/// Per-profile longitudinal progress.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the progress record, or `None` if the profile has never
    /// completed a session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn get_progress(
        &self,
        profile: ProfileId,
    ) -> Result<Option<ProgressRecord>, StorageError>;

    /// Persist the progress record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn upsert_progress(
        &self,
        profile: ProfileId,
        record: &ProgressRecord,
    ) -> Result<(), StorageError>;
}

/// Row handle for a persisted history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionHistoryRow {
    pub id: i64,
    pub entry: SessionHistoryEntry,
}

/// Append-only log of completed sessions.
#[async_trait]
pub trait SessionHistoryRepository: Send + Sync {
    /// Append a history entry, returning its storage ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn append_entry(
        &self,
        profile: ProfileId,
        entry: &SessionHistoryEntry,
    ) -> Result<i64, StorageError>;

    /// Most recent entries for a profile, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on adapter failures.
    async fn recent_entries(
        &self,
        profile: ProfileId,
        limit: u32,
    ) -> Result<Vec<SessionHistoryRow>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    cards: Arc<Mutex<Vec<Card>>>,
    progress: Arc<Mutex<HashMap<ProfileId, ProgressRecord>>>,
    history: Arc<Mutex<Vec<(ProfileId, SessionHistoryRow)>>>,
    next_entry_id: Arc<Mutex<i64>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock<'a, T>(mutex: &'a Mutex<T>) -> Result<std::sync::MutexGuard<'a, T>, StorageError> {
        mutex
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl CardRepository for InMemoryRepository {
    async fn list(&self, filter: &CardFilter) -> Result<Vec<Card>, StorageError> {
        let guard = Self::lock(&self.cards)?;
        Ok(guard
            .iter()
            .filter(|card| filter.matches(card))
            .cloned()
            .collect())
    }

    async fn get(&self, id: CardId) -> Result<Card, StorageError> {
        let guard = Self::lock(&self.cards)?;
        guard
            .iter()
            .find(|card| card.id() == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn update_scheduling(
        &self,
        id: CardId,
        state: &SchedulingState,
        practice_count: u32,
        last_practiced_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.cards)?;
        let card = guard
            .iter_mut()
            .find(|card| card.id() == id)
            .ok_or(StorageError::NotFound)?;

        *card = Card::from_persisted(
            card.id(),
            card.profile_id(),
            card.prompt().to_owned(),
            card.answer().to_owned(),
            card.created_at(),
            Some(state.clone()),
            practice_count,
            Some(last_practiced_at),
        );
        Ok(())
    }

    async fn upsert(&self, card: &Card) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.cards)?;
        match guard.iter_mut().find(|existing| existing.id() == card.id()) {
            Some(existing) => *existing = card.clone(),
            None => guard.push(card.clone()),
        }
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_progress(
        &self,
        profile: ProfileId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let guard = Self::lock(&self.progress)?;
        Ok(guard.get(&profile).cloned())
    }

    async fn upsert_progress(
        &self,
        profile: ProfileId,
        record: &ProgressRecord,
    ) -> Result<(), StorageError> {
        let mut guard = Self::lock(&self.progress)?;
        guard.insert(profile, record.clone());
        Ok(())
    }
}

#[async_trait]
impl SessionHistoryRepository for InMemoryRepository {
    async fn append_entry(
        &self,
        profile: ProfileId,
        entry: &SessionHistoryEntry,
    ) -> Result<i64, StorageError> {
        let id = {
            let mut guard = Self::lock(&self.next_entry_id)?;
            *guard += 1;
            *guard
        };

        let mut guard = Self::lock(&self.history)?;
        guard.push((
            profile,
            SessionHistoryRow {
                id,
                entry: entry.clone(),
            },
        ));
        Ok(id)
    }

    async fn recent_entries(
        &self,
        profile: ProfileId,
        limit: u32,
    ) -> Result<Vec<SessionHistoryRow>, StorageError> {
        let guard = Self::lock(&self.history)?;
        Ok(guard
            .iter()
            .rev()
            .filter(|(owner, _)| *owner == profile)
            .take(limit as usize)
            .map(|(_, row)| row.clone())
            .collect())
    }
}

/// Aggregates the three repositories behind trait objects for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub cards: Arc<dyn CardRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub history: Arc<dyn SessionHistoryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            cards: Arc::new(repo.clone()),
            progress: Arc::new(repo.clone()),
            history: Arc::new(repo),
        }
    }
}
