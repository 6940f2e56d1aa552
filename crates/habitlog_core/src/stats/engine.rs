//! Derived statistics over tasks and the completion log.
//!
//! # Responsibility
//! - Compute completion rates, streaks and period rollups on demand.
//! - Keep "today" an explicit input so results are reproducible.
//!
//! # Invariants
//! - Every percentage is an integer in `0..=100`, rounded half-up.
//! - Division by zero (no tasks, zero-day window) yields 0, never an error.
//! - Only current tasks count; entries for unknown ids are ignored.

use crate::model::completion::CompletionLog;
use crate::model::state::AppState;
use crate::model::task::{Priority, Task, TaskId};
use chrono::{Datelike, Days, Months, NaiveDate};

/// Fixed lookback cap for streaks, independent of the tracking window.
pub const MAX_STREAK_LOOKBACK_DAYS: u32 = 30;
/// Number of trailing weeks in [`StatsEngine::weekly_summary`].
pub const WEEKLY_SUMMARY_WEEKS: u32 = 4;
/// Number of calendar months in [`StatsEngine::monthly_summary`].
pub const MONTHLY_SUMMARY_MONTHS: u32 = 3;

const DAYS_PER_WEEK: u32 = 7;

/// Completion percentage of one trailing 7-day window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekSummary {
    pub label: String,
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    pub completed: u32,
    pub possible: u32,
    pub percentage: u32,
}

/// Completion percentage of one calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSummary {
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub completed: u32,
    pub possible: u32,
    pub percentage: u32,
}

/// Average completion rate of one priority group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityStats {
    pub priority: Priority,
    pub avg_completion_rate: u32,
    pub task_count: usize,
}

/// One day of the daily chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub completed: u32,
    pub total: u32,
    pub percentage: u32,
}

/// Per-task row of the task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub task: Task,
    pub completion_rate: u32,
    pub streak: u32,
}

/// Read-only view computing statistics for a fixed `today`.
#[derive(Debug, Clone, Copy)]
pub struct StatsEngine<'a> {
    tasks: &'a [Task],
    log: &'a CompletionLog,
    today: NaiveDate,
}

impl<'a> StatsEngine<'a> {
    pub fn new(tasks: &'a [Task], log: &'a CompletionLog, today: NaiveDate) -> Self {
        Self { tasks, log, today }
    }

    pub fn for_state(state: &'a AppState, today: NaiveDate) -> Self {
        Self::new(state.tasks(), state.completions(), today)
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Percentage of days in `[today - window_days + 1, today]` on which the
    /// task was completed.
    pub fn completion_rate(&self, task_id: TaskId, window_days: u32) -> u32 {
        if window_days == 0 || !self.is_known(task_id) {
            return 0;
        }
        let completed = trailing_days(self.today, window_days)
            .filter(|date| self.log.is_completed(*date, task_id))
            .count() as u32;
        percentage(completed, window_days)
    }

    /// Consecutive completed days ending today, looking back at most
    /// [`MAX_STREAK_LOOKBACK_DAYS`] days.
    pub fn streak(&self, task_id: TaskId) -> u32 {
        if !self.is_known(task_id) {
            return 0;
        }
        trailing_days(self.today, MAX_STREAK_LOOKBACK_DAYS)
            .take_while(|date| self.log.is_completed(*date, task_id))
            .count() as u32
    }

    /// Rounded mean of every task's completion rate.
    pub fn overall_score(&self, window_days: u32) -> u32 {
        if self.tasks.is_empty() {
            return 0;
        }
        let total: u32 = self
            .tasks
            .iter()
            .map(|task| self.completion_rate(task.id, window_days))
            .sum();
        percentage_of_mean(total, self.tasks.len() as u32)
    }

    /// The last 28 days as four 7-day windows, oldest first.
    pub fn weekly_summary(&self) -> Vec<WeekSummary> {
        let mut weeks: Vec<WeekSummary> = (0..WEEKLY_SUMMARY_WEEKS)
            .filter_map(|index| {
                let range_end = self.today.checked_sub_days(Days::new(u64::from(
                    index * DAYS_PER_WEEK,
                )))?;
                let range_start =
                    range_end.checked_sub_days(Days::new(u64::from(DAYS_PER_WEEK - 1)))?;
                Some(self.week_summary(range_start, range_end))
            })
            .collect();
        weeks.reverse();
        weeks
    }

    /// The current calendar month and the preceding ones, oldest first.
    pub fn monthly_summary(&self) -> Vec<MonthSummary> {
        let Some(current_start) = self.today.with_day(1) else {
            return Vec::new();
        };
        let mut months: Vec<MonthSummary> = (0..MONTHLY_SUMMARY_MONTHS)
            .filter_map(|offset| {
                let start = current_start.checked_sub_months(Months::new(offset))?;
                Some(self.month_summary(start))
            })
            .collect();
        months.reverse();
        months
    }

    /// Average completion rate per priority, in display order.
    ///
    /// Every priority is present; empty groups report 0.
    pub fn priority_breakdown(&self, window_days: u32) -> Vec<PriorityStats> {
        Priority::ALL
            .into_iter()
            .map(|priority| {
                let rates: Vec<u32> = self
                    .tasks
                    .iter()
                    .filter(|task| task.priority == priority)
                    .map(|task| self.completion_rate(task.id, window_days))
                    .collect();
                PriorityStats {
                    priority,
                    avg_completion_rate: percentage_of_mean(
                        rates.iter().sum(),
                        rates.len() as u32,
                    ),
                    task_count: rates.len(),
                }
            })
            .collect()
    }

    /// Per-day completion counts across all tasks, oldest first.
    pub fn daily_series(&self, window_days: u32) -> Vec<DailyPoint> {
        let total = self.tasks.len() as u32;
        let mut points: Vec<DailyPoint> = trailing_days(self.today, window_days)
            .map(|date| {
                let completed = self.completed_on(date);
                DailyPoint {
                    date,
                    completed,
                    total,
                    percentage: percentage(completed, total),
                }
            })
            .collect();
        points.reverse();
        points
    }

    /// Rate and streak for every task, in display order.
    pub fn task_rows(&self, window_days: u32) -> Vec<TaskRow> {
        self.tasks
            .iter()
            .map(|task| TaskRow {
                task: task.clone(),
                completion_rate: self.completion_rate(task.id, window_days),
                streak: self.streak(task.id),
            })
            .collect()
    }

    fn week_summary(&self, range_start: NaiveDate, range_end: NaiveDate) -> WeekSummary {
        let completed = self.completed_between(range_start, range_end);
        let possible = self.tasks.len() as u32 * DAYS_PER_WEEK;
        WeekSummary {
            label: format!(
                "{} - {}",
                range_start.format("%b %d"),
                range_end.format("%b %d")
            ),
            range_start,
            range_end,
            completed,
            possible,
            percentage: percentage(completed, possible),
        }
    }

    fn month_summary(&self, start: NaiveDate) -> MonthSummary {
        let days = days_in_month(start);
        let end = start
            .checked_add_days(Days::new(u64::from(days.saturating_sub(1))))
            .unwrap_or(start);
        let completed = self.completed_between(start, end);
        let possible = self.tasks.len() as u32 * days;
        MonthSummary {
            label: start.format("%b %Y").to_string(),
            year: start.year(),
            month: start.month(),
            completed,
            possible,
            percentage: percentage(completed, possible),
        }
    }

    fn completed_between(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        start
            .iter_days()
            .take_while(|date| *date <= end)
            .map(|date| self.completed_on(date))
            .sum()
    }

    fn completed_on(&self, date: NaiveDate) -> u32 {
        self.tasks
            .iter()
            .filter(|task| self.log.is_completed(date, task.id))
            .count() as u32
    }

    fn is_known(&self, task_id: TaskId) -> bool {
        self.tasks.iter().any(|task| task.id == task_id)
    }
}

/// `today`, yesterday, ... for `days` days, newest first.
fn trailing_days(today: NaiveDate, days: u32) -> impl Iterator<Item = NaiveDate> {
    (0..days).map_while(move |offset| today.checked_sub_days(Days::new(u64::from(offset))))
}

/// `round(part / whole * 100)` with half-up rounding; 0 when `whole` is 0.
fn percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let part = u64::from(part);
    let whole = u64::from(whole);
    ((200 * part + whole) / (2 * whole)) as u32
}

/// Rounded mean of `count` percentages summing to `total`.
fn percentage_of_mean(total: u32, count: u32) -> u32 {
    if count == 0 {
        return 0;
    }
    let total = u64::from(total);
    let count = u64::from(count);
    ((2 * total + count) / (2 * count)) as u32
}

fn days_in_month(first_of_month: NaiveDate) -> u32 {
    first_of_month
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map_or(28, |last| last.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(3, 7), 43);
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(1, 200), 1);
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(7, 7), 100);
    }

    #[test]
    fn mean_rounds_half_up() {
        assert_eq!(percentage_of_mean(101, 2), 51);
        assert_eq!(percentage_of_mean(100, 3), 33);
        assert_eq!(percentage_of_mean(0, 0), 0);
    }

    #[test]
    fn days_in_month_handles_leap_years_and_december() {
        assert_eq!(days_in_month(date(2024, 2, 1)), 29);
        assert_eq!(days_in_month(date(2026, 2, 1)), 28);
        assert_eq!(days_in_month(date(2026, 12, 1)), 31);
        assert_eq!(days_in_month(date(2026, 4, 1)), 30);
    }

    #[test]
    fn trailing_days_starts_at_today() {
        let days: Vec<_> = trailing_days(date(2026, 3, 2), 3).collect();
        assert_eq!(days, vec![date(2026, 3, 2), date(2026, 3, 1), date(2026, 2, 28)]);
    }
}
