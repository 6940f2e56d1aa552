//! Core domain logic for habitlog.
//! This crate is the single source of truth for habit-tracking invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod persist;
pub mod repo;
pub mod service;
pub mod stats;

pub use clock::{Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::completion::{CompletionLog, DayEntries};
pub use model::state::{
    Action, AppState, Outcome, StoreError, StoreResult, TrackingWindow, ViewMode, ViewSettings,
};
pub use model::task::{Priority, Task, TaskId, TaskPatch, TaskValidationError};
pub use persist::writer::{BackgroundWriter, DiscardSink, SnapshotSink, WriterStats};
pub use repo::habit_repo::{
    CompletionRecord, HabitRepository, RepoError, RepoResult, Salvage, Snapshot,
    SqliteHabitRepository,
};
pub use service::task_store::{StoreOptions, TaskStore};
pub use stats::dashboard::{Chart, Dashboard, SummaryPanel};
pub use stats::engine::{
    DailyPoint, MonthSummary, PriorityStats, StatsEngine, TaskRow, WeekSummary,
    MAX_STREAK_LOOKBACK_DAYS,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
