//! Task store use-case service.
//!
//! # Responsibility
//! - Own the authoritative `AppState` for a session.
//! - Route every mutation through the reducer and persist the result.
//! - Rehydrate state from the local store once at startup.
//!
//! # Invariants
//! - Every successful data mutation submits exactly one full snapshot.
//! - Rejected actions and view changes never submit a snapshot.
//! - Persistence failures never roll back in-memory state.
//! - A store that opened but could not be read is never written.

use crate::clock::{Clock, SystemClock};
use crate::db::open_db;
use crate::model::completion::CompletionLog;
use crate::model::state::{
    Action, AppState, Outcome, StoreError, StoreResult, TrackingWindow, ViewMode, ViewSettings,
};
use crate::model::task::{Priority, Task, TaskId, TaskPatch};
use crate::persist::writer::{BackgroundWriter, DiscardSink, SnapshotSink, WriterStats};
use crate::repo::habit_repo::{RepoResult, Salvage, Snapshot, SqliteHabitRepository};
use crate::stats::dashboard::Dashboard;
use crate::stats::engine::StatsEngine;
use chrono::NaiveDate;
use log::{debug, info, warn};
use rusqlite::Connection;
use std::path::PathBuf;

/// Where a file-backed store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    pub db_path: PathBuf,
}

impl StoreOptions {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

/// Single-writer owner of tasks and completions.
pub struct TaskStore<S: SnapshotSink = BackgroundWriter, C: Clock = SystemClock> {
    state: AppState,
    sink: S,
    clock: C,
}

impl TaskStore<BackgroundWriter, SystemClock> {
    /// Opens a file-backed store using the system clock.
    pub fn open(options: &StoreOptions) -> Self {
        Self::open_with_clock(options, SystemClock)
    }
}

impl TaskStore<DiscardSink, SystemClock> {
    /// Creates an empty store with no durable backing.
    pub fn in_memory() -> Self {
        Self::new(DiscardSink, SystemClock)
    }
}

impl<C: Clock> TaskStore<BackgroundWriter, C> {
    /// Opens (or creates) the store file and loads both collections.
    ///
    /// Never fails. Undecodable rows are skipped and logged. An open error
    /// starts the session empty with writes retrying the open; a read error
    /// starts it empty with writes disabled.
    pub fn open_with_clock(options: &StoreOptions, clock: C) -> Self {
        let (state, sink) = match open_db(&options.db_path) {
            Ok(conn) => match load_state(&conn) {
                Ok(state) => (
                    state,
                    BackgroundWriter::spawn(options.db_path.clone(), Some(conn)),
                ),
                Err(err) => {
                    warn!(
                        "event=store_load module=store status=error error_code=load_failed writes=disabled error={err}"
                    );
                    (AppState::default(), BackgroundWriter::disabled())
                }
            },
            Err(err) => {
                warn!(
                    "event=store_open module=store status=error error_code=store_unavailable error={err}"
                );
                (
                    AppState::default(),
                    BackgroundWriter::spawn(options.db_path.clone(), None),
                )
            }
        };
        Self::with_state(state, sink, clock)
    }

    /// Flushes pending writes and stops the writer.
    pub fn close(self) -> WriterStats {
        self.sink.shutdown()
    }
}

impl<S: SnapshotSink, C: Clock> TaskStore<S, C> {
    pub fn new(sink: S, clock: C) -> Self {
        Self::with_state(AppState::default(), sink, clock)
    }

    pub fn with_state(state: AppState, sink: S, clock: C) -> Self {
        Self { state, sink, clock }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn tasks(&self) -> &[Task] {
        self.state.tasks()
    }

    pub fn completions(&self) -> &CompletionLog {
        self.state.completions()
    }

    pub fn view(&self) -> ViewSettings {
        self.state.view()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Applies one action, logging rejections and persisting data changes.
    pub fn dispatch(&mut self, action: Action) -> StoreResult<Outcome> {
        let event = action_event(&action);
        self.run(event, |state| state.apply(action), Outcome::changes_data)
    }

    /// Adds a task; a blank name is rejected without touching state.
    pub fn add_task(&mut self, name: &str, priority: Priority) -> StoreResult<Task> {
        let created_at = self.clock.now_ms();
        self.run(
            "task_add",
            |state| state.add_task(name, priority, created_at),
            |_| true,
        )
    }

    pub fn update_task(&mut self, id: TaskId, patch: TaskPatch) -> StoreResult<()> {
        self.run("task_update", |state| state.update_task(id, &patch), |_| true)
    }

    /// Removes a task and every completion entry recorded for it.
    pub fn remove_task(&mut self, id: TaskId) -> StoreResult<()> {
        self.run("task_remove", |state| state.remove_task(id), |_| true)
            .map(|_| ())
    }

    /// Flips completion for `(id, date)` and returns the new value.
    pub fn toggle_completion(&mut self, id: TaskId, date: NaiveDate) -> StoreResult<bool> {
        self.run(
            "completion_toggle",
            |state| state.toggle_completion(id, date),
            |_| true,
        )
    }

    pub fn toggle_completion_today(&mut self, id: TaskId) -> StoreResult<bool> {
        let today = self.clock.today();
        self.toggle_completion(id, today)
    }

    pub fn set_tracking_window(&mut self, window: TrackingWindow) -> ViewSettings {
        let view = self.state.set_tracking_window(window);
        debug!("event=view_window module=store status=ok window_days={}", window.days());
        view
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> ViewSettings {
        let view = self.state.set_view_mode(mode);
        debug!("event=view_mode module=store status=ok mode={mode:?}");
        view
    }

    pub fn toggle_summary(&mut self) -> ViewSettings {
        let view = self.state.toggle_summary();
        debug!(
            "event=view_summary module=store status=ok show_summary={}",
            view.show_summary
        );
        view
    }

    /// Statistics for the current state as of the clock's today.
    pub fn stats(&self) -> StatsEngine<'_> {
        StatsEngine::for_state(&self.state, self.clock.today())
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::build(&self.stats(), self.state.view())
    }
}

impl<S: SnapshotSink, C: Clock> TaskStore<S, C> {
    fn run<T>(
        &mut self,
        event: &'static str,
        mutate: impl FnOnce(&mut AppState) -> StoreResult<T>,
        persists: impl FnOnce(&T) -> bool,
    ) -> StoreResult<T> {
        match mutate(&mut self.state) {
            Ok(value) => {
                if persists(&value) {
                    self.sink.submit(Snapshot::capture(&self.state));
                }
                debug!("event={event} module=store status=ok");
                Ok(value)
            }
            Err(err) => {
                match &err {
                    StoreError::Validation(reason) => {
                        debug!("event={event} module=store status=skip reason=\"{reason}\"");
                    }
                    StoreError::NotFound(id) => {
                        warn!(
                            "event={event} module=store status=error error_code=task_not_found task_id={id}"
                        );
                    }
                }
                Err(err)
            }
        }
    }
}

fn load_state(conn: &Connection) -> RepoResult<AppState> {
    let Salvage { snapshot, skipped } = SqliteHabitRepository::new(conn).salvage_snapshot()?;
    if skipped > 0 {
        warn!(
            "event=store_load module=store status=partial error_code=invalid_rows skipped={skipped}"
        );
    }
    info!(
        "event=store_load module=store status=ok tasks={} days={}",
        snapshot.tasks.len(),
        snapshot.completions.len()
    );
    Ok(snapshot.into_state())
}

fn action_event(action: &Action) -> &'static str {
    match action {
        Action::AddTask { .. } => "task_add",
        Action::UpdateTask { .. } => "task_update",
        Action::RemoveTask { .. } => "task_remove",
        Action::ToggleCompletion { .. } => "completion_toggle",
        Action::SetTrackingWindow(_) => "view_window",
        Action::SetViewMode(_) => "view_mode",
        Action::ToggleSummary => "view_summary",
    }
}
