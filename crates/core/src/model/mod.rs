pub mod card;
pub mod ids;
pub mod progress;
pub mod review;
pub mod session;

pub use card::Card;
pub use ids::{CardId, ProfileId, SessionId};
pub use progress::{ProgressError, ProgressRecord};
pub use review::{Rating, RatingError, RatingTally};
pub use session::{
    SessionHistoryEntry, SessionHistoryError, SessionMode, SessionStatus,
};
