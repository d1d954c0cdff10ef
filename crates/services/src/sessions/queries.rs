use chrono::{DateTime, Utc};
use serde::Serialize;

use recall_core::mastery::{Mastery, is_due_today, is_overdue};
use recall_core::model::{Card, ProfileId};
use storage::repository::{CardFilter, CardRepository};

use super::queue::{QueueBuilder, QueueCaps, QueuePlan};
use crate::error::SessionError;

//
// ─── STUDY STATS ───────────────────────────────────────────────────────────────
//

/// Snapshot of a card collection by mastery level and due status.
///
/// The mastery buckets partition `total`; `due_today` and `overdue` overlap
/// with them (a mastered card can still be overdue).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StudyStats {
    pub total: usize,
    pub new: usize,
    pub learning: usize,
    pub reviewing: usize,
    pub mastered: usize,
    pub due_today: usize,
    pub overdue: usize,
}

/// Classify every card and tally the buckets.
///
/// Cards that have never been scheduled count as new. An empty collection
/// yields the all-zero snapshot.
#[must_use]
pub fn study_stats(cards: &[Card], now: DateTime<Utc>) -> StudyStats {
    let mut stats = StudyStats {
        total: cards.len(),
        ..StudyStats::default()
    };

    for card in cards {
        match card.scheduling() {
            None => stats.new += 1,
            Some(state) => {
                match Mastery::classify(state) {
                    Mastery::New => stats.new += 1,
                    Mastery::Learning => stats.learning += 1,
                    Mastery::Reviewing => stats.reviewing += 1,
                    Mastery::Mastered => stats.mastered += 1,
                }
                if is_overdue(state, now) {
                    stats.overdue += 1;
                } else if is_due_today(state, now) {
                    stats.due_today += 1;
                }
            }
        }
    }

    stats
}

//
// ─── STORAGE-BACKED QUERIES ────────────────────────────────────────────────────
//

/// Read-side helpers shared by the workflow and dashboard layers.
pub(crate) struct SessionQueries;

impl SessionQueries {
    /// Load a profile's cards and build a queue plan over them.
    pub(crate) async fn plan_from_storage(
        profile: ProfileId,
        cards: &dyn CardRepository,
        caps: QueueCaps,
        shuffle_new: bool,
        now: DateTime<Utc>,
    ) -> Result<QueuePlan, SessionError> {
        let candidates = cards.list(&CardFilter::for_profile(profile)).await?;
        Ok(QueueBuilder::new(caps)
            .with_shuffle_new(shuffle_new)
            .build(candidates, now))
    }

    /// Load a profile's cards and compute the stats snapshot.
    pub(crate) async fn stats_from_storage(
        profile: ProfileId,
        cards: &dyn CardRepository,
        now: DateTime<Utc>,
    ) -> Result<StudyStats, SessionError> {
        let all = cards.list(&CardFilter::for_profile(profile)).await?;
        Ok(study_stats(&all, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use recall_core::model::{CardId, Rating};
    use recall_core::scheduler::Scheduler;
    use recall_core::time::fixed_now;

    fn build_card(id: u64) -> Card {
        Card::new(
            CardId::new(id),
            ProfileId::new(1),
            format!("Q{id}"),
            format!("A{id}"),
            fixed_now(),
        )
    }

    fn reviewed_times(id: u64, ratings: &[Rating], reviewed_at: DateTime<Utc>) -> Card {
        let mut card = build_card(id);
        let scheduler = Scheduler::new();
        let mut state = scheduler.initialize(reviewed_at);
        for rating in ratings {
            state = scheduler.advance(&state, *rating, reviewed_at);
        }
        card.apply_review(state, reviewed_at);
        card
    }

    #[test]
    fn empty_collection_yields_all_zeroes() {
        assert_eq!(study_stats(&[], fixed_now()), StudyStats::default());
    }

    #[test]
    fn buckets_partition_by_mastery() {
        let now = fixed_now();
        let cards = vec![
            build_card(1), // never scheduled: new
            reviewed_times(2, &[Rating::Good], now),
            reviewed_times(3, &[Rating::Good, Rating::Good], now),
            reviewed_times(4, &[Rating::Good, Rating::Good, Rating::Again], now),
            reviewed_times(
                5,
                &[Rating::Good, Rating::Good, Rating::Good, Rating::Good],
                now,
            ),
        ];

        let stats = study_stats(&cards, now);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.new, 1);
        assert_eq!(stats.learning, 2);
        assert_eq!(stats.reviewing, 1);
        assert_eq!(stats.mastered, 1);
        assert_eq!(
            stats.new + stats.learning + stats.reviewing + stats.mastered,
            stats.total
        );
    }

    #[test]
    fn due_counters_track_the_calendar() {
        let now = fixed_now();
        let cards = vec![
            // reviewed yesterday, due today
            reviewed_times(1, &[Rating::Good], now - Duration::days(1)),
            // reviewed four days ago, overdue
            reviewed_times(2, &[Rating::Good], now - Duration::days(4)),
            // reviewed just now, due tomorrow
            reviewed_times(3, &[Rating::Good], now),
        ];

        let stats = study_stats(&cards, now);
        assert_eq!(stats.due_today, 1);
        assert_eq!(stats.overdue, 1);
    }

    #[tokio::test]
    async fn storage_backed_stats_filter_by_profile() {
        use storage::repository::InMemoryRepository;

        let repo = InMemoryRepository::new();
        let mine = build_card(1);
        let theirs = Card::new(
            CardId::new(2),
            ProfileId::new(2),
            "Q",
            "A",
            fixed_now(),
        );
        repo.upsert(&mine).await.unwrap();
        repo.upsert(&theirs).await.unwrap();

        let stats = SessionQueries::stats_from_storage(ProfileId::new(1), &repo, fixed_now())
            .await
            .unwrap();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.new, 1);
    }
}
