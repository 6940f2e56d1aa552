//! Owned application state and its reducer.
//!
//! # Responsibility
//! - Hold the task list, completion log and view settings in one value.
//! - Apply `Action`s deterministically; no clock or storage access here.
//!
//! # Invariants
//! - `tasks` is always in display order (priority descending, stable).
//! - Task ids are unique within `tasks`.
//! - A rejected action leaves state unchanged.

use crate::model::completion::CompletionLog;
use crate::model::task::{
    palette_color, sort_by_priority, Priority, Task, TaskId, TaskPatch, TaskValidationError,
};
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Non-fatal rejection of a state mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Validation(TaskValidationError),
    NotFound(TaskId),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Trailing period used for completion rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TrackingWindow {
    #[default]
    Week,
    Fortnight,
    Month,
}

impl TrackingWindow {
    pub const ALL: [TrackingWindow; 3] = [Self::Week, Self::Fortnight, Self::Month];

    pub fn days(self) -> u32 {
        match self {
            Self::Week => 7,
            Self::Fortnight => 14,
            Self::Month => 30,
        }
    }

    /// Maps a selector value back to a window; only 7, 14 and 30 are valid.
    pub fn from_days(days: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|window| window.days() == days)
    }
}

/// Chart granularity selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

/// UI configuration. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSettings {
    pub tracking_window: TrackingWindow,
    pub view_mode: ViewMode,
    pub show_summary: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            tracking_window: TrackingWindow::default(),
            view_mode: ViewMode::default(),
            show_summary: true,
        }
    }
}

/// A single state transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AddTask {
        name: String,
        priority: Priority,
        /// Unix epoch milliseconds.
        created_at: i64,
    },
    UpdateTask {
        id: TaskId,
        patch: TaskPatch,
    },
    RemoveTask {
        id: TaskId,
    },
    ToggleCompletion {
        id: TaskId,
        date: NaiveDate,
    },
    SetTrackingWindow(TrackingWindow),
    SetViewMode(ViewMode),
    ToggleSummary,
}

/// What an applied action changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    TaskAdded(Task),
    TaskUpdated(TaskId),
    TaskRemoved {
        id: TaskId,
        entries_removed: usize,
    },
    CompletionToggled {
        id: TaskId,
        date: NaiveDate,
        completed: bool,
    },
    ViewChanged(ViewSettings),
}

impl Outcome {
    /// Whether the outcome touched persisted collections.
    pub fn changes_data(&self) -> bool {
        !matches!(self, Self::ViewChanged(_))
    }
}

/// Complete in-memory state of the tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    tasks: Vec<Task>,
    completions: CompletionLog,
    view: ViewSettings,
}

impl AppState {
    /// Builds state from rehydrated collections.
    ///
    /// Tasks are re-sorted and duplicate ids after the first are dropped.
    pub fn from_parts(tasks: Vec<Task>, completions: CompletionLog) -> Self {
        let mut unique: Vec<Task> = Vec::with_capacity(tasks.len());
        for task in tasks {
            if !unique.iter().any(|existing| existing.id == task.id) {
                unique.push(task);
            }
        }
        sort_by_priority(&mut unique);
        Self {
            tasks: unique,
            completions,
            view: ViewSettings::default(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn completions(&self) -> &CompletionLog {
        &self.completions
    }

    pub fn view(&self) -> ViewSettings {
        self.view
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Applies `action` and reports what changed.
    ///
    /// # Errors
    /// - `Validation` for a blank task name.
    /// - `NotFound` when the action references an unknown task id.
    pub fn apply(&mut self, action: Action) -> StoreResult<Outcome> {
        match action {
            Action::AddTask {
                name,
                priority,
                created_at,
            } => self
                .add_task(&name, priority, created_at)
                .map(Outcome::TaskAdded),
            Action::UpdateTask { id, patch } => self
                .update_task(id, &patch)
                .map(|()| Outcome::TaskUpdated(id)),
            Action::RemoveTask { id } => self.remove_task(id).map(|entries_removed| {
                Outcome::TaskRemoved {
                    id,
                    entries_removed,
                }
            }),
            Action::ToggleCompletion { id, date } => {
                self.toggle_completion(id, date).map(|completed| {
                    Outcome::CompletionToggled {
                        id,
                        date,
                        completed,
                    }
                })
            }
            Action::SetTrackingWindow(window) => {
                Ok(Outcome::ViewChanged(self.set_tracking_window(window)))
            }
            Action::SetViewMode(mode) => Ok(Outcome::ViewChanged(self.set_view_mode(mode))),
            Action::ToggleSummary => Ok(Outcome::ViewChanged(self.toggle_summary())),
        }
    }

    /// View changes never fail; each returns the settings now in effect.
    pub fn set_tracking_window(&mut self, window: TrackingWindow) -> ViewSettings {
        self.view.tracking_window = window;
        self.view
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> ViewSettings {
        self.view.view_mode = mode;
        self.view
    }

    pub fn toggle_summary(&mut self) -> ViewSettings {
        self.view.show_summary = !self.view.show_summary;
        self.view
    }

    /// Inserts a new task with the next palette color.
    pub fn add_task(
        &mut self,
        name: &str,
        priority: Priority,
        created_at: i64,
    ) -> StoreResult<Task> {
        let color = palette_color(self.tasks.len());
        let task = Task::new(name, priority, color, created_at)?;
        self.tasks.push(task.clone());
        sort_by_priority(&mut self.tasks);
        Ok(task)
    }

    pub fn update_task(&mut self, id: TaskId, patch: &TaskPatch) -> StoreResult<()> {
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(StoreError::NotFound(id))?;
        task.apply_patch(patch)?;
        sort_by_priority(&mut self.tasks);
        Ok(())
    }

    /// Deletes a task and cascades through the completion log.
    ///
    /// Returns the number of completion entries removed.
    pub fn remove_task(&mut self, id: TaskId) -> StoreResult<usize> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or(StoreError::NotFound(id))?;
        self.tasks.remove(index);
        Ok(self.completions.remove_task(id))
    }

    /// Flips `(date, id)` and returns the new value.
    pub fn toggle_completion(&mut self, id: TaskId, date: NaiveDate) -> StoreResult<bool> {
        if self.task(id).is_none() {
            return Err(StoreError::NotFound(id));
        }
        Ok(self.completions.toggle(date, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn add(state: &mut AppState, name: &str, priority: Priority) -> Task {
        match state
            .apply(Action::AddTask {
                name: name.to_string(),
                priority,
                created_at: 0,
            })
            .expect("add should succeed")
        {
            Outcome::TaskAdded(task) => task,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn add_assigns_palette_by_current_count() {
        let mut state = AppState::default();
        let first = add(&mut state, "a", Priority::Low);
        let second = add(&mut state, "b", Priority::Low);
        assert_eq!(first.color, palette_color(0));
        assert_eq!(second.color, palette_color(1));
    }

    #[test]
    fn rejected_add_leaves_state_unchanged() {
        let mut state = AppState::default();
        let before = state.clone();
        let err = state
            .apply(Action::AddTask {
                name: "  ".to_string(),
                priority: Priority::High,
                created_at: 0,
            })
            .expect_err("blank name should be rejected");
        assert_eq!(err, StoreError::Validation(TaskValidationError::EmptyName));
        assert_eq!(state, before);
    }

    #[test]
    fn update_resorts_by_priority() {
        let mut state = AppState::default();
        let low = add(&mut state, "low", Priority::Low);
        add(&mut state, "high", Priority::High);

        state
            .apply(Action::UpdateTask {
                id: low.id,
                patch: TaskPatch::reprioritize(Priority::High),
            })
            .expect("reprioritize should succeed");
        let names: Vec<_> = state.tasks().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["low", "high"]);
    }

    #[test]
    fn unknown_ids_report_not_found() {
        let mut state = AppState::default();
        let id = Uuid::now_v7();
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date");

        for action in [
            Action::UpdateTask {
                id,
                patch: TaskPatch::rename("x"),
            },
            Action::RemoveTask { id },
            Action::ToggleCompletion { id, date },
        ] {
            assert_eq!(state.apply(action), Err(StoreError::NotFound(id)));
        }
        assert!(state.completions().is_empty());
    }

    #[test]
    fn view_actions_do_not_change_data() {
        let mut state = AppState::default();
        let outcome = state
            .apply(Action::SetTrackingWindow(TrackingWindow::Month))
            .expect("view action should apply");
        assert!(!outcome.changes_data());
        assert_eq!(state.view().tracking_window.days(), 30);

        state.apply(Action::ToggleSummary).expect("view action should apply");
        assert!(!state.view().show_summary);
    }

    #[test]
    fn from_parts_sorts_and_dedups() {
        let a = Task::new("a", Priority::Low, "#1", 0).expect("valid task");
        let b = Task::new("b", Priority::High, "#2", 0).expect("valid task");
        let state = AppState::from_parts(vec![a.clone(), b.clone(), a], CompletionLog::new());
        assert_eq!(state.tasks().len(), 2);
        assert_eq!(state.tasks()[0].id, b.id);
    }

    #[test]
    fn tracking_window_only_accepts_selector_values() {
        assert_eq!(TrackingWindow::from_days(14), Some(TrackingWindow::Fortnight));
        assert_eq!(TrackingWindow::from_days(10), None);
    }
}
