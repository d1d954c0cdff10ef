//! Shared error types for the services crate.

use thiserror::Error;

use recall_core::model::{CardId, ProfileId, ProgressError, SessionHistoryError};
use recall_core::scheduler::SchedulerError;
use storage::repository::StorageError;

/// Errors emitted by `ReviewService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReviewServiceError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the session subsystem.
///
/// The first group are recoverable caller conditions with distinct signals;
/// the `WrongCard` / `QueueExhausted` / `QueueNotExhausted` group are
/// programming-contract violations — the session refuses to mutate state and
/// the caller gets told exactly what was out of order.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no cards available to study")]
    NoCardsAvailable,

    #[error("a session is already active for profile {profile}")]
    AlreadyActive { profile: ProfileId },

    #[error("session is not active")]
    NotActive,

    #[error("review out of order: expected card {expected}, got {got}")]
    WrongCard { expected: CardId, got: CardId },

    #[error("queue already exhausted")]
    QueueExhausted,

    #[error("queue not exhausted: {remaining} cards remaining")]
    QueueNotExhausted { remaining: usize },

    #[error(transparent)]
    History(#[from] SessionHistoryError),

    #[error(transparent)]
    Progress(#[from] ProgressError),

    #[error(transparent)]
    Review(#[from] ReviewServiceError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
