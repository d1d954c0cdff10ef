use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RatingError {
    #[error("invalid rating value: {0}")]
    InvalidRating(u8),
}

//
// ─── RATING ───────────────────────────────────────────────────────────────────
//

/// Five-level ordinal rating for a single card review.
///
/// The order is total: `Again < Hard < Good < Easy < Perfect`. Ratings feed
/// the review calculator and the session histogram; they are never stored on
/// the card itself.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Rating {
    /// Failed to recall at all.
    Again,
    /// Recalled only with serious difficulty; still counts as a lapse.
    Hard,
    /// Recalled correctly with normal effort.
    Good,
    /// Recalled quickly.
    Easy,
    /// Recalled instantly, no hesitation.
    Perfect,
}

impl Rating {
    pub const ALL: [Rating; 5] = [
        Rating::Again,
        Rating::Hard,
        Rating::Good,
        Rating::Easy,
        Rating::Perfect,
    ];

    /// Converts a numeric rating (0-4) to a `Rating`.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::InvalidRating` if the value is out of range.
    pub fn from_u8(value: u8) -> Result<Self, RatingError> {
        match value {
            0 => Ok(Self::Again),
            1 => Ok(Self::Hard),
            2 => Ok(Self::Good),
            3 => Ok(Self::Easy),
            4 => Ok(Self::Perfect),
            _ => Err(RatingError::InvalidRating(value)),
        }
    }

    /// True for ratings below the success threshold.
    #[must_use]
    pub fn is_lapse(self) -> bool {
        matches!(self, Rating::Again | Rating::Hard)
    }
}

//
// ─── RATING TALLY ─────────────────────────────────────────────────────────────
//

/// Histogram of ratings recorded during one study session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingTally {
    pub again: u32,
    pub hard: u32,
    pub good: u32,
    pub easy: u32,
    pub perfect: u32,
}

impl RatingTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump the bucket for one rating.
    pub fn record(&mut self, rating: Rating) {
        let bucket = match rating {
            Rating::Again => &mut self.again,
            Rating::Hard => &mut self.hard,
            Rating::Good => &mut self.good,
            Rating::Easy => &mut self.easy,
            Rating::Perfect => &mut self.perfect,
        };
        *bucket = bucket.saturating_add(1);
    }

    #[must_use]
    pub fn count(&self, rating: Rating) -> u32 {
        match rating {
            Rating::Again => self.again,
            Rating::Hard => self.hard,
            Rating::Good => self.good,
            Rating::Easy => self.easy,
            Rating::Perfect => self.perfect,
        }
    }

    /// Sum across all buckets.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.again + self.hard + self.good + self.easy + self.perfect
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_conversion_covers_all_five_levels() {
        for (value, rating) in Rating::ALL.iter().enumerate() {
            assert_eq!(Rating::from_u8(value as u8).unwrap(), *rating);
        }
        let err = Rating::from_u8(5).unwrap_err();
        assert!(matches!(err, RatingError::InvalidRating(5)));
    }

    #[test]
    fn ratings_are_totally_ordered() {
        assert!(Rating::Again < Rating::Hard);
        assert!(Rating::Hard < Rating::Good);
        assert!(Rating::Good < Rating::Easy);
        assert!(Rating::Easy < Rating::Perfect);
    }

    #[test]
    fn lapse_boundary_sits_between_hard_and_good() {
        assert!(Rating::Again.is_lapse());
        assert!(Rating::Hard.is_lapse());
        assert!(!Rating::Good.is_lapse());
        assert!(!Rating::Easy.is_lapse());
        assert!(!Rating::Perfect.is_lapse());
    }

    #[test]
    fn tally_counts_each_bucket() {
        let mut tally = RatingTally::new();
        tally.record(Rating::Good);
        tally.record(Rating::Good);
        tally.record(Rating::Again);
        tally.record(Rating::Perfect);

        assert_eq!(tally.count(Rating::Good), 2);
        assert_eq!(tally.count(Rating::Again), 1);
        assert_eq!(tally.count(Rating::Hard), 0);
        assert_eq!(tally.count(Rating::Perfect), 1);
        assert_eq!(tally.total(), 4);
    }
}
