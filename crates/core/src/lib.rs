#![forbid(unsafe_code)]

pub mod mastery;
pub mod model;
pub mod scheduler;
pub mod time;

pub use mastery::Mastery;
pub use scheduler::{Scheduler, SchedulerConfig, SchedulingState};
pub use time::Clock;
