#![forbid(unsafe_code)]

pub mod repository;

pub use repository::{
    CardFilter, CardRepository, InMemoryRepository, ProgressRepository,
    SessionHistoryRepository, SessionHistoryRow, Storage, StorageError,
};
