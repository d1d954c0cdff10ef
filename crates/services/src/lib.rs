#![forbid(unsafe_code)]

pub mod error;
pub mod review_service;
pub mod sessions;

pub use recall_core::Clock;

pub use error::{ReviewServiceError, SessionError};
pub use review_service::{ReviewResult, ReviewService};

pub use sessions::{
    CompletedSession, DashboardService, QueueBuilder, QueueCaps, QueuePlan,
    SessionAnswerResult, SessionProgress, StudyService, StudySession, StudyStats, StudyView,
};
