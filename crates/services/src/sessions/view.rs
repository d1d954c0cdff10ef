use chrono::{DateTime, Utc};

use recall_core::model::{
    ProfileId, ProgressRecord, RatingTally, SessionHistoryEntry, SessionId, SessionMode,
};
use recall_core::time::Clock;
use storage::repository::{SessionHistoryRow, Storage};

use super::queries::{SessionQueries, StudyStats};
use crate::error::SessionError;

/// Which screen the study flow is on.
#[derive(Debug, Clone, PartialEq)]
pub enum StudyView {
    Dashboard,
    Setup { stats: StudyStats },
    Study { session_id: SessionId },
    Complete {
        entry: SessionHistoryEntry,
        progress: ProgressRecord,
    },
}

/// Flattened history row for list rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionHistoryListItem {
    pub id: i64,
    pub mode: SessionMode,
    pub cards_reviewed: u32,
    pub tally: RatingTally,
    pub started_at: DateTime<Utc>,
    pub duration_seconds: i64,
}

impl SessionHistoryListItem {
    #[must_use]
    pub fn from_row(row: &SessionHistoryRow) -> Self {
        Self {
            id: row.id,
            mode: row.entry.mode(),
            cards_reviewed: row.entry.cards_reviewed(),
            tally: *row.entry.tally(),
            started_at: row.entry.started_at(),
            duration_seconds: row.entry.duration_seconds(),
        }
    }
}

/// Read-only facade for the dashboard and setup screens.
///
/// Never mutates anything; safe to call while a session is active.
#[derive(Clone)]
pub struct DashboardService {
    clock: Clock,
    storage: Storage,
}

impl DashboardService {
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self {
            clock: Clock::default(),
            storage,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Mastery and due-status snapshot of the profile's collection.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the cards cannot be loaded.
    pub async fn study_stats(&self, profile: ProfileId) -> Result<StudyStats, SessionError> {
        SessionQueries::stats_from_storage(profile, self.storage.cards.as_ref(), self.clock.now())
            .await
    }

    /// The profile's progress record, or a zeroed one if it has never
    /// completed a session.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the record cannot be loaded.
    pub async fn progress(&self, profile: ProfileId) -> Result<ProgressRecord, SessionError> {
        Ok(self
            .storage
            .progress
            .get_progress(profile)
            .await?
            .unwrap_or_default())
    }

    /// Most recent completed sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the history cannot be loaded.
    pub async fn recent_history(
        &self,
        profile: ProfileId,
        limit: u32,
    ) -> Result<Vec<SessionHistoryListItem>, SessionError> {
        let rows = self.storage.history.recent_entries(profile, limit).await?;
        Ok(rows.iter().map(SessionHistoryListItem::from_row).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::model::{Card, CardId, Rating};
    use recall_core::time::{fixed_clock, fixed_now};

    fn build_entry(cards_reviewed: u32) -> SessionHistoryEntry {
        let mut tally = RatingTally::new();
        for _ in 0..cards_reviewed {
            tally.record(Rating::Good);
        }
        SessionHistoryEntry::new(
            SessionMode::Quick,
            cards_reviewed,
            tally,
            fixed_now(),
            fixed_now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn fresh_profile_reads_as_empty_not_missing() {
        let storage = Storage::in_memory();
        let dashboard = DashboardService::new(storage).with_clock(fixed_clock());
        let profile = ProfileId::new(1);

        let stats = dashboard.study_stats(profile).await.unwrap();
        assert_eq!(stats, StudyStats::default());

        let progress = dashboard.progress(profile).await.unwrap();
        assert_eq!(progress, ProgressRecord::default());

        let history = dashboard.recent_history(profile, 10).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn dashboard_reflects_stored_state() {
        let storage = Storage::in_memory();
        let profile = ProfileId::new(1);

        let card = Card::new(CardId::new(1), profile, "Q", "A", fixed_now());
        storage.cards.upsert(&card).await.unwrap();

        let entry = build_entry(3);
        let entry_id = storage.history.append_entry(profile, &entry).await.unwrap();

        let mut record = ProgressRecord::new();
        record.record_completion(3, fixed_now().date_naive());
        storage.progress.upsert_progress(profile, &record).await.unwrap();

        let dashboard = DashboardService::new(storage).with_clock(fixed_clock());

        let stats = dashboard.study_stats(profile).await.unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.new, 1);

        let progress = dashboard.progress(profile).await.unwrap();
        assert_eq!(progress.total_cards_studied(), 3);

        let history = dashboard.recent_history(profile, 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, entry_id);
        assert_eq!(history[0].cards_reviewed, 3);
        assert_eq!(history[0].tally.count(Rating::Good), 3);
    }
}
