//! Completion log model.
//!
//! # Responsibility
//! - Record per-day, per-task completion flags.
//! - Provide get-or-default lookups so absent entries read as `false`.
//!
//! # Invariants
//! - Date buckets exist only for dates that were explicitly toggled.
//! - Removing a task leaves no entry for it under any date.

use crate::model::task::TaskId;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Storage format for completion dates (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Per-task flags recorded for a single day.
pub type DayEntries = BTreeMap<TaskId, bool>;

/// Two-level mapping `date -> (task id -> completed)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionLog {
    days: BTreeMap<NaiveDate, DayEntries>,
}

impl CompletionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `task_id` was completed on `date`.
    ///
    /// Missing dates and missing task entries both read as `false`.
    pub fn is_completed(&self, date: NaiveDate, task_id: TaskId) -> bool {
        self.days
            .get(&date)
            .and_then(|entries| entries.get(&task_id))
            .copied()
            .unwrap_or(false)
    }

    /// Flips the flag for `(date, task_id)` and returns the new value.
    ///
    /// Creates the date bucket on first write.
    pub fn toggle(&mut self, date: NaiveDate, task_id: TaskId) -> bool {
        let flag = self.days.entry(date).or_default().entry(task_id).or_insert(false);
        *flag = !*flag;
        *flag
    }

    /// Sets the flag for `(date, task_id)` explicitly.
    pub fn set(&mut self, date: NaiveDate, task_id: TaskId, completed: bool) {
        self.days.entry(date).or_default().insert(task_id, completed);
    }

    /// Removes `task_id` from every date bucket.
    ///
    /// Buckets emptied by the cascade are dropped. Returns the number of
    /// entries removed.
    pub fn remove_task(&mut self, task_id: TaskId) -> usize {
        let mut removed = 0;
        self.days.retain(|_, entries| {
            if entries.remove(&task_id).is_some() {
                removed += 1;
            }
            !entries.is_empty()
        });
        removed
    }

    /// Returns whether any date holds an entry for `task_id`.
    pub fn has_entries_for(&self, task_id: TaskId) -> bool {
        self.days.values().any(|entries| entries.contains_key(&task_id))
    }

    /// Entries recorded for one date, if that date was ever toggled.
    pub fn day(&self, date: NaiveDate) -> Option<&DayEntries> {
        self.days.get(&date)
    }

    /// Iterates date buckets in chronological order.
    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, &DayEntries)> {
        self.days.iter().map(|(date, entries)| (*date, entries))
    }

    /// Replaces the entries of one date bucket. Used when rehydrating.
    pub fn insert_day(&mut self, date: NaiveDate, entries: DayEntries) {
        self.days.insert(date, entries);
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }
}

/// Formats a date as its storage key.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses a storage key back into a date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).expect("valid date")
    }

    #[test]
    fn absent_entries_read_as_false() {
        let log = CompletionLog::new();
        assert!(!log.is_completed(day(1), Uuid::now_v7()));
        assert!(log.is_empty());
    }

    #[test]
    fn toggle_twice_restores_value_and_keeps_bucket() {
        let id = Uuid::now_v7();
        let mut log = CompletionLog::new();

        assert!(log.toggle(day(2), id));
        assert!(log.is_completed(day(2), id));
        assert!(!log.toggle(day(2), id));
        assert!(!log.is_completed(day(2), id));
        assert_eq!(log.day(day(2)).expect("bucket should exist").get(&id), Some(&false));
    }

    #[test]
    fn remove_task_cascades_and_drops_empty_buckets() {
        let keep = Uuid::now_v7();
        let gone = Uuid::now_v7();
        let mut log = CompletionLog::new();
        log.toggle(day(1), gone);
        log.toggle(day(2), gone);
        log.toggle(day(2), keep);

        assert_eq!(log.remove_task(gone), 2);
        assert!(!log.has_entries_for(gone));
        assert!(log.day(day(1)).is_none());
        assert!(log.is_completed(day(2), keep));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn date_keys_round_trip() {
        assert_eq!(format_date(day(9)), "2026-03-09");
        assert_eq!(parse_date("2026-03-09"), Some(day(9)));
        assert_eq!(parse_date("03/09/2026"), None);
    }
}
