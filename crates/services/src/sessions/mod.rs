mod progress;
mod queries;
mod queue;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::SessionProgress;
pub use queries::{StudyStats, study_stats};
pub use queue::{QueueBuilder, QueueCaps, QueuePlan};
pub use service::StudySession;
pub use view::{DashboardService, SessionHistoryListItem, StudyView};
pub use workflow::{CompletedSession, SessionAnswerResult, StudyService};
