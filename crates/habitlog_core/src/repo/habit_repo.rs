//! Task/completion repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide read-all, bulk upsert and replace-all over the two collections.
//! - Keep SQL and JSON encoding inside the persistence boundary.
//!
//! # Invariants
//! - Bulk writes run in one transaction; a failure leaves storage untouched.
//! - Strict read paths reject invalid persisted rows instead of masking them.
//! - `salvage_snapshot` skips invalid rows, logging each one.

use crate::db::DbError;
use crate::model::completion::{format_date, parse_date, CompletionLog, DayEntries};
use crate::model::state::AppState;
use crate::model::task::{Priority, Task};
use chrono::NaiveDate;
use log::warn;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for collection reads and writes.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One row of the `completions` collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    /// Record key, stored as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub data: DayEntries,
}

/// Full contents of both collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub completions: Vec<CompletionRecord>,
}

impl Snapshot {
    /// Captures the persisted collections of `state`.
    pub fn capture(state: &AppState) -> Self {
        Self {
            tasks: state.tasks().to_vec(),
            completions: state
                .completions()
                .days()
                .map(|(date, entries)| CompletionRecord {
                    date,
                    data: entries.clone(),
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.completions.is_empty()
    }

    /// Rebuilds owned state; task order is re-derived by priority.
    pub fn into_state(self) -> AppState {
        let mut log = CompletionLog::new();
        for record in self.completions {
            log.insert_day(record.date, record.data);
        }
        AppState::from_parts(self.tasks, log)
    }
}

/// Readable rows of a lenient load plus the number of rows dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Salvage {
    pub snapshot: Snapshot,
    pub skipped: usize,
}

/// Repository interface for the `tasks` and `completions` collections.
pub trait HabitRepository {
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    fn list_completions(&self) -> RepoResult<Vec<CompletionRecord>>;
    fn put_tasks(&self, tasks: &[Task]) -> RepoResult<usize>;
    fn put_completions(&self, records: &[CompletionRecord]) -> RepoResult<usize>;
    /// Overwrites both collections with `snapshot` atomically.
    fn replace_all(&self, snapshot: &Snapshot) -> RepoResult<()>;

    fn load_snapshot(&self) -> RepoResult<Snapshot> {
        Ok(Snapshot {
            tasks: self.list_tasks()?,
            completions: self.list_completions()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowPolicy {
    Reject,
    Skip,
}

const SELECT_TASKS: &str = "SELECT id, name, color, priority, created_at
     FROM tasks
     ORDER BY created_at ASC, id ASC;";
const SELECT_COMPLETIONS: &str = "SELECT id, data FROM completions ORDER BY id ASC;";

/// SQLite-backed repository.
pub struct SqliteHabitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHabitRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Loads both collections, skipping rows that cannot be decoded.
    ///
    /// Statement and connection failures are still returned as errors.
    pub fn salvage_snapshot(&self) -> RepoResult<Salvage> {
        let (tasks, skipped_tasks) =
            self.read_rows(SELECT_TASKS, parse_task_row, RowPolicy::Skip)?;
        let (completions, skipped_days) =
            self.read_rows(SELECT_COMPLETIONS, parse_completion_row, RowPolicy::Skip)?;
        Ok(Salvage {
            snapshot: Snapshot { tasks, completions },
            skipped: skipped_tasks + skipped_days,
        })
    }

    /// Whether both collections hold no rows at all, readable or not.
    pub fn is_empty(&self) -> RepoResult<bool> {
        let rows: i64 = self.conn.query_row(
            "SELECT (SELECT COUNT(*) FROM tasks) + (SELECT COUNT(*) FROM completions);",
            [],
            |row| row.get(0),
        )?;
        Ok(rows == 0)
    }

    fn read_rows<T>(
        &self,
        sql: &str,
        parse: fn(&Row<'_>) -> RepoResult<T>,
        policy: RowPolicy,
    ) -> RepoResult<(Vec<T>, usize)> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        let mut skipped = 0;
        while let Some(row) = rows.next()? {
            match parse(row) {
                Ok(item) => items.push(item),
                Err(err) if policy == RowPolicy::Skip && is_row_defect(&err) => {
                    skipped += 1;
                    warn!("event=row_skip module=repo status=skip reason=\"{err}\"");
                }
                Err(err) => return Err(err),
            }
        }
        Ok((items, skipped))
    }
}

impl HabitRepository for SqliteHabitRepository<'_> {
    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        self.read_rows(SELECT_TASKS, parse_task_row, RowPolicy::Reject)
            .map(|(tasks, _)| tasks)
    }

    fn list_completions(&self) -> RepoResult<Vec<CompletionRecord>> {
        self.read_rows(SELECT_COMPLETIONS, parse_completion_row, RowPolicy::Reject)
            .map(|(records, _)| records)
    }

    fn put_tasks(&self, tasks: &[Task]) -> RepoResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        upsert_tasks(&tx, tasks)?;
        tx.commit()?;
        Ok(tasks.len())
    }

    fn put_completions(&self, records: &[CompletionRecord]) -> RepoResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        upsert_completions(&tx, records)?;
        tx.commit()?;
        Ok(records.len())
    }

    fn replace_all(&self, snapshot: &Snapshot) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM tasks;", [])?;
        tx.execute("DELETE FROM completions;", [])?;
        upsert_tasks(&tx, &snapshot.tasks)?;
        upsert_completions(&tx, &snapshot.completions)?;
        tx.commit()?;
        Ok(())
    }
}

fn upsert_tasks(conn: &Connection, tasks: &[Task]) -> RepoResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO tasks (id, name, color, priority, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            color = excluded.color,
            priority = excluded.priority,
            created_at = excluded.created_at;",
    )?;
    for task in tasks {
        stmt.execute(params![
            task.id.to_string(),
            task.name.as_str(),
            task.color.as_str(),
            task.priority.as_str(),
            task.created_at,
        ])?;
    }
    Ok(())
}

fn upsert_completions(conn: &Connection, records: &[CompletionRecord]) -> RepoResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO completions (id, data)
         VALUES (?1, ?2)
         ON CONFLICT(id) DO UPDATE SET data = excluded.data;",
    )?;
    for record in records {
        let data = serde_json::to_string(&record.data).map_err(|err| {
            RepoError::InvalidData(format!(
                "cannot encode completions for {}: {err}",
                format_date(record.date)
            ))
        })?;
        stmt.execute(params![format_date(record.date), data])?;
    }
    Ok(())
}

/// Decoding failures confined to one row, as opposed to statement failures.
fn is_row_defect(err: &RepoError) -> bool {
    matches!(
        err,
        RepoError::InvalidData(_)
            | RepoError::Db(DbError::Sqlite(
                rusqlite::Error::InvalidColumnType(..)
                    | rusqlite::Error::FromSqlConversionFailure(..)
            ))
    )
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in tasks.id"))
    })?;

    let priority_text: String = row.get("priority")?;
    let priority = Priority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in tasks.priority"
        ))
    })?;

    let name: String = row.get("name")?;
    if name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty name for task {id} in tasks.name"
        )));
    }

    Ok(Task {
        id,
        name,
        color: row.get("color")?,
        priority,
        created_at: row.get("created_at")?,
    })
}

fn parse_completion_row(row: &Row<'_>) -> RepoResult<CompletionRecord> {
    let date_text: String = row.get("id")?;
    let date = parse_date(&date_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid date `{date_text}` in completions.id"))
    })?;

    let data_text: String = row.get("data")?;
    let data: DayEntries = serde_json::from_str(&data_text).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid completion map for {date_text} in completions.data: {err}"
        ))
    })?;

    Ok(CompletionRecord { date, data })
}
