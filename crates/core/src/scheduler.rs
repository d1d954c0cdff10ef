use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Rating;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchedulerError {
    #[error("ease floor must be at least 1.0, got {provided}")]
    EaseFloorTooLow { provided: f64 },
    #[error("initial ease {initial} is below the ease floor {floor}")]
    InitialEaseBelowFloor { initial: f64, floor: f64 },
    #[error("interval days must be a positive whole number, got {provided}")]
    InvalidInterval { provided: f64 },
}

//
// ─── SCHEDULING STATE ──────────────────────────────────────────────────────────
//

/// Per-card spaced-repetition bookkeeping.
///
/// Created lazily by [`Scheduler::initialize`] on first contact and replaced
/// wholesale by [`Scheduler::advance`] after each review. Nothing else writes
/// it.
///
/// Invariants:
/// - `due_at == last_reviewed_at + interval_days` (calendar days) whenever
///   `last_reviewed_at` is set
/// - `ease_factor` never drops below the configured floor
/// - `repetitions` resets to 0 exactly on a lapse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingState {
    /// Days until the next due date, as of the last review.
    pub interval_days: f64,
    /// Consecutive successful reviews since the last lapse.
    pub repetitions: u32,
    /// Multiplier controlling interval growth.
    pub ease_factor: f64,
    /// Count of failed reviews, ever.
    pub lapses: u32,
    /// Next scheduled review time.
    pub due_at: DateTime<Utc>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

impl SchedulingState {
    /// True if the card has never been successfully reviewed or lapsed.
    #[must_use]
    pub fn is_untouched(&self) -> bool {
        self.repetitions == 0 && self.lapses == 0 && self.last_reviewed_at.is_none()
    }
}

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Tunable constants for the review calculator.
///
/// The defaults follow conventional SM-2 values; all of them are parameters
/// rather than hard requirements, so collections with different retention
/// goals can adjust them without touching the algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub initial_ease: f64,
    pub ease_floor: f64,
    pub lapse_penalty: f64,
    pub first_interval_days: f64,
    pub second_interval_days: f64,
    pub easy_bonus: f64,
    pub perfect_bonus: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            ease_floor: 1.3,
            lapse_penalty: 0.2,
            first_interval_days: 1.0,
            second_interval_days: 6.0,
            easy_bonus: 0.10,
            perfect_bonus: 0.15,
        }
    }
}

//
// ─── SCHEDULER ─────────────────────────────────────────────────────────────────
//

/// SM-2 style review calculator.
///
/// A pure decision engine: both operations map inputs plus an explicit `now`
/// to a fresh [`SchedulingState`]. The input state is never mutated, which is
/// what makes the property tests deterministic.
///
/// # Examples
///
/// ```
/// use recall_core::model::Rating;
/// use recall_core::scheduler::Scheduler;
/// use recall_core::time::fixed_now;
///
/// let scheduler = Scheduler::new();
/// let state = scheduler.initialize(fixed_now());
/// let after = scheduler.advance(&state, Rating::Good, fixed_now());
/// assert_eq!(after.interval_days, 1.0);
/// assert_eq!(after.repetitions, 1);
/// ```
#[derive(Debug, Clone)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a scheduler with the default SM-2 constants.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SchedulerConfig::default(),
        }
    }

    /// Create a scheduler with custom constants, validating them first.
    ///
    /// # Errors
    ///
    /// - `EaseFloorTooLow` if the floor is below 1.0 or not finite
    /// - `InitialEaseBelowFloor` if the starting ease is under the floor
    /// - `InvalidInterval` if either initial interval is non-positive or not
    ///   a whole number of days
    pub fn try_with_config(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        if !config.ease_floor.is_finite() || config.ease_floor < 1.0 {
            return Err(SchedulerError::EaseFloorTooLow {
                provided: config.ease_floor,
            });
        }
        if config.initial_ease < config.ease_floor {
            return Err(SchedulerError::InitialEaseBelowFloor {
                initial: config.initial_ease,
                floor: config.ease_floor,
            });
        }
        // Whole days only: a fractional interval would make due_at diverge
        // from last_reviewed_at + interval_days.
        for interval in [config.first_interval_days, config.second_interval_days] {
            if !interval.is_finite() || interval <= 0.0 || interval.fract() != 0.0 {
                return Err(SchedulerError::InvalidInterval { provided: interval });
            }
        }

        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Scheduling state for a card that has never been reviewed.
    ///
    /// Idempotent: calling this twice at the same instant yields equal values.
    /// The card is due immediately so it can enter a queue right away.
    #[must_use]
    pub fn initialize(&self, now: DateTime<Utc>) -> SchedulingState {
        SchedulingState {
            interval_days: 0.0,
            repetitions: 0,
            ease_factor: self.config.initial_ease,
            lapses: 0,
            due_at: now,
            last_reviewed_at: None,
        }
    }

    /// Apply a rating to a card's state, producing the next state.
    ///
    /// {Again, Hard} count as lapses; {Good, Easy, Perfect} as successes.
    /// On a lapse the repetition streak resets and the interval collapses to
    /// the first interval. On success the interval follows the SM-2 ladder:
    /// first interval, second interval, then `previous * ease` rounded to
    /// whole days.
    #[must_use]
    pub fn advance(
        &self,
        state: &SchedulingState,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> SchedulingState {
        let cfg = &self.config;

        let (repetitions, interval_days, ease_factor, lapses) = if rating.is_lapse() {
            (
                0,
                cfg.first_interval_days,
                (state.ease_factor - cfg.lapse_penalty).max(cfg.ease_floor),
                state.lapses + 1,
            )
        } else {
            let repetitions = state.repetitions + 1;
            let interval_days = match repetitions {
                1 => cfg.first_interval_days,
                2 => cfg.second_interval_days,
                _ => (state.interval_days * state.ease_factor).round().max(1.0),
            };
            let bump = match rating {
                Rating::Easy => cfg.easy_bonus,
                Rating::Perfect => cfg.perfect_bonus,
                _ => 0.0,
            };
            let ease_factor = (state.ease_factor + bump).max(cfg.ease_floor);
            (repetitions, interval_days, ease_factor, state.lapses)
        };

        #[allow(clippy::cast_possible_truncation)]
        let due_at = now + Duration::days(interval_days.round() as i64);

        SchedulingState {
            interval_days,
            repetitions,
            ease_factor,
            lapses,
            due_at,
            last_reviewed_at: Some(now),
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn state(interval_days: f64, repetitions: u32, ease_factor: f64) -> SchedulingState {
        SchedulingState {
            interval_days,
            repetitions,
            ease_factor,
            lapses: 0,
            due_at: fixed_now(),
            last_reviewed_at: Some(fixed_now()),
        }
    }

    #[test]
    fn initialize_is_idempotent() {
        let scheduler = Scheduler::new();
        let now = fixed_now();
        assert_eq!(scheduler.initialize(now), scheduler.initialize(now));
    }

    #[test]
    fn initialize_is_due_immediately() {
        let scheduler = Scheduler::new();
        let now = fixed_now();
        let state = scheduler.initialize(now);

        assert_eq!(state.due_at, now);
        assert_eq!(state.ease_factor, 2.5);
        assert!(state.is_untouched());
    }

    #[test]
    fn success_ladder_from_fresh_card_is_1_6_15() {
        let scheduler = Scheduler::new();
        let mut now = fixed_now();
        let mut state = scheduler.initialize(now);

        let mut intervals = Vec::new();
        for _ in 0..3 {
            state = scheduler.advance(&state, Rating::Good, now);
            intervals.push(state.interval_days);
            now += Duration::days(state.interval_days as i64);
        }

        // round(6 * 2.5) == 15
        assert_eq!(intervals, vec![1.0, 6.0, 15.0]);
    }

    #[test]
    fn any_lapse_rating_resets_repetitions_and_interval() {
        let scheduler = Scheduler::new();
        for rating in [Rating::Again, Rating::Hard] {
            let before = state(40.0, 7, 2.1);
            let after = scheduler.advance(&before, rating, fixed_now());
            assert_eq!(after.repetitions, 0);
            assert_eq!(after.interval_days, 1.0);
            assert_eq!(after.lapses, before.lapses + 1);
        }
    }

    #[test]
    fn lapse_scenario_matches_expected_numbers() {
        // interval 10, ease 2.5, repetitions 4, rated Again
        let scheduler = Scheduler::new();
        let before = state(10.0, 4, 2.5);

        let after = scheduler.advance(&before, Rating::Again, fixed_now());

        assert_eq!(after.interval_days, 1.0);
        assert_eq!(after.repetitions, 0);
        assert!((after.ease_factor - 2.3).abs() < 1e-9);
        assert_eq!(after.lapses, 1);
    }

    #[test]
    fn ease_factor_never_drops_below_floor() {
        let scheduler = Scheduler::new();
        let mut state = scheduler.initialize(fixed_now());
        for _ in 0..50 {
            state = scheduler.advance(&state, Rating::Again, fixed_now());
            assert!(state.ease_factor >= 1.3);
        }
        assert_eq!(state.ease_factor, 1.3);
    }

    #[test]
    fn good_holds_ease_flat_easy_and_perfect_raise_it() {
        let scheduler = Scheduler::new();
        let before = state(6.0, 2, 2.5);

        let good = scheduler.advance(&before, Rating::Good, fixed_now());
        let easy = scheduler.advance(&before, Rating::Easy, fixed_now());
        let perfect = scheduler.advance(&before, Rating::Perfect, fixed_now());

        assert_eq!(good.ease_factor, 2.5);
        assert!((easy.ease_factor - 2.6).abs() < 1e-9);
        assert!((perfect.ease_factor - 2.65).abs() < 1e-9);
        assert!(easy.ease_factor < perfect.ease_factor);
    }

    #[test]
    fn advance_links_due_date_to_review_time() {
        let scheduler = Scheduler::new();
        let now = fixed_now();
        let before = state(6.0, 2, 2.5);

        let after = scheduler.advance(&before, Rating::Good, now);

        assert_eq!(after.last_reviewed_at, Some(now));
        assert_eq!(
            after.due_at,
            now + Duration::days(after.interval_days as i64)
        );
    }

    #[test]
    fn advance_does_not_mutate_input() {
        let scheduler = Scheduler::new();
        let before = state(10.0, 4, 2.5);
        let copy = before.clone();

        let _ = scheduler.advance(&before, Rating::Again, fixed_now());

        assert_eq!(before, copy);
    }

    #[test]
    fn try_with_config_rejects_bad_constants() {
        let mut config = SchedulerConfig::default();
        config.ease_floor = 0.5;
        assert!(matches!(
            Scheduler::try_with_config(config),
            Err(SchedulerError::EaseFloorTooLow { .. })
        ));

        let mut config = SchedulerConfig::default();
        config.initial_ease = 1.0;
        assert!(matches!(
            Scheduler::try_with_config(config),
            Err(SchedulerError::InitialEaseBelowFloor { .. })
        ));

        let mut config = SchedulerConfig::default();
        config.second_interval_days = 0.0;
        assert!(matches!(
            Scheduler::try_with_config(config),
            Err(SchedulerError::InvalidInterval { .. })
        ));
    }

    #[test]
    fn try_with_config_rejects_fractional_intervals() {
        // 0.4 would round to a zero-day due date, making the card due again
        // immediately after every review.
        let mut config = SchedulerConfig::default();
        config.first_interval_days = 0.4;
        assert!(matches!(
            Scheduler::try_with_config(config),
            Err(SchedulerError::InvalidInterval { provided }) if provided == 0.4
        ));

        let mut config = SchedulerConfig::default();
        config.second_interval_days = 6.5;
        assert!(matches!(
            Scheduler::try_with_config(config),
            Err(SchedulerError::InvalidInterval { provided }) if provided == 6.5
        ));
    }

    #[test]
    fn custom_intervals_flow_through_the_ladder() {
        let config = SchedulerConfig {
            first_interval_days: 2.0,
            second_interval_days: 8.0,
            ..SchedulerConfig::default()
        };
        let scheduler = Scheduler::try_with_config(config).unwrap();
        let now = fixed_now();

        let s1 = scheduler.advance(&scheduler.initialize(now), Rating::Good, now);
        let s2 = scheduler.advance(&s1, Rating::Good, now);

        assert_eq!(s1.interval_days, 2.0);
        assert_eq!(s2.interval_days, 8.0);
    }
}
