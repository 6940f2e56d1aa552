//! Task domain model.
//!
//! # Responsibility
//! - Define the recurring habit record tracked by the store.
//! - Own the priority ordering and the default color palette.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `name` is stored trimmed and is never empty.
//! - Completion counters are derived, never stored on the task.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task.
///
/// UUID v7, so ids are ordered by creation time.
pub type TaskId = Uuid;

/// Display tokens assigned round-robin to new tasks.
pub const TASK_COLOR_PALETTE: &[&str] = &[
    "#6366f1", "#22c55e", "#f59e0b", "#ef4444", "#06b6d4", "#a855f7", "#ec4899", "#14b8a6",
];

/// Ordinal importance of a task.
///
/// Declaration order is display order: `High` sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// All priorities in display order.
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Stable string id used in storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Parses a stored priority id.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    /// `High < Medium < Low`, so an ascending sort yields display order.
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors for task fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Name is empty after trimming.
    EmptyName,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "task name cannot be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// A user-defined recurring habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    /// Hex color token from [`TASK_COLOR_PALETTE`].
    pub color: String,
    pub priority: Priority,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Task {
    /// Creates a task with a fresh time-ordered id.
    ///
    /// # Errors
    /// - `EmptyName` when `name` trims to an empty string.
    pub fn new(
        name: &str,
        priority: Priority,
        color: impl Into<String>,
        created_at: i64,
    ) -> Result<Self, TaskValidationError> {
        Ok(Self {
            id: Uuid::now_v7(),
            name: normalize_name(name)?,
            color: color.into(),
            priority,
            created_at,
        })
    }

    /// Applies a partial update.
    ///
    /// Validation runs before any field is touched, so a rejected patch
    /// leaves the task unchanged.
    pub fn apply_patch(&mut self, patch: &TaskPatch) -> Result<(), TaskValidationError> {
        let name = match patch.name.as_deref() {
            Some(name) => Some(normalize_name(name)?),
            None => None,
        };
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        Ok(())
    }
}

/// Partial update for an existing task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub priority: Option<Priority>,
}

impl TaskPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            priority: None,
        }
    }

    pub fn reprioritize(priority: Priority) -> Self {
        Self {
            name: None,
            priority: Some(priority),
        }
    }
}

/// Returns the palette color for the `index`-th task.
pub fn palette_color(index: usize) -> &'static str {
    TASK_COLOR_PALETTE[index % TASK_COLOR_PALETTE.len()]
}

/// Sorts tasks into display order: priority descending, stable otherwise.
pub fn sort_by_priority(tasks: &mut [Task]) {
    tasks.sort_by_key(|task| task.priority);
}

fn normalize_name(name: &str) -> Result<String, TaskValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TaskValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_trims_name_and_rejects_blank() {
        let task = Task::new("  read  ", Priority::Low, "#fff", 0).expect("trimmed name is valid");
        assert_eq!(task.name, "read");
        assert!(!task.id.is_nil());

        let err = Task::new("   ", Priority::Low, "#fff", 0)
            .expect_err("blank name should be rejected");
        assert_eq!(err, TaskValidationError::EmptyName);
    }

    #[test]
    fn sort_is_priority_first_and_stable() {
        let mut tasks = vec![
            Task::new("a", Priority::Low, "#1", 0).expect("valid task"),
            Task::new("b", Priority::High, "#2", 0).expect("valid task"),
            Task::new("c", Priority::Low, "#3", 0).expect("valid task"),
            Task::new("d", Priority::Medium, "#4", 0).expect("valid task"),
            Task::new("e", Priority::High, "#5", 0).expect("valid task"),
        ];
        sort_by_priority(&mut tasks);
        let names: Vec<_> = tasks.iter().map(|task| task.name.as_str()).collect();
        assert_eq!(names, vec!["b", "e", "d", "a", "c"]);
    }

    #[test]
    fn rejected_patch_leaves_task_untouched() {
        let mut task = Task::new("walk", Priority::Medium, "#1", 0).expect("valid task");
        let patch = TaskPatch {
            name: Some(" ".to_string()),
            priority: Some(Priority::High),
        };
        assert_eq!(task.apply_patch(&patch), Err(TaskValidationError::EmptyName));
        assert_eq!(task.name, "walk");
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn palette_wraps_around() {
        assert_eq!(palette_color(0), palette_color(TASK_COLOR_PALETTE.len()));
    }

    #[test]
    fn priority_parse_accepts_stored_ids() {
        for priority in Priority::ALL {
            assert_eq!(Priority::parse(priority.as_str()), Some(priority));
        }
        assert_eq!(Priority::parse("urgent"), None);
    }
}
