//! Ordered, best-effort snapshot persistence.
//!
//! # Responsibility
//! - Move snapshot writes off the mutating thread.
//! - Write snapshots in submission order with overwrite semantics.
//!
//! # Invariants
//! - A failed write is logged and counted; it never blocks later writes.
//! - When the store could not be opened, every write retries the open.
//! - A store opened late is only written when it holds no rows; the session
//!   never loaded anything from it.
//! - Dropping the writer drains queued snapshots before the thread exits.

use crate::db::open_db;
use crate::repo::habit_repo::{HabitRepository, Snapshot, SqliteHabitRepository};
use log::{error, info, warn};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Destination for snapshots produced by store mutations.
pub trait SnapshotSink {
    /// Queues `snapshot` for persistence. Must not block on I/O.
    fn submit(&self, snapshot: Snapshot);
}

/// Sink that drops every snapshot; for stores with no durable backing.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl SnapshotSink for DiscardSink {
    fn submit(&self, _snapshot: Snapshot) {}
}

/// Write counters reported by [`BackgroundWriter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub written: u64,
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    written: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> WriterStats {
        WriterStats {
            written: self.written.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
        }
    }
}

/// Single background thread that persists snapshots to a store file.
pub struct BackgroundWriter {
    tx: Option<Sender<Snapshot>>,
    handle: Option<JoinHandle<()>>,
    counters: Arc<Counters>,
}

impl BackgroundWriter {
    /// Spawns the writer thread.
    ///
    /// `conn` is an already-open connection to `path`; pass `None` when the
    /// open failed so the first write retries it.
    pub fn spawn(path: impl Into<PathBuf>, conn: Option<Connection>) -> Self {
        let path = path.into();
        let counters = Arc::new(Counters::default());
        let (tx, rx) = mpsc::channel::<Snapshot>();

        let thread_counters = Arc::clone(&counters);
        let handle = thread::Builder::new()
            .name("habitlog-writer".to_string())
            .spawn(move || writer_loop(path, conn, rx, thread_counters));

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(err) => {
                error!(
                    "event=writer_spawn module=persist status=error error_code=thread_spawn_failed error={err}"
                );
                None
            }
        };

        Self {
            tx: handle.as_ref().map(|_| tx),
            handle,
            counters,
        }
    }

    /// Writer that persists nothing; every submitted snapshot counts as failed.
    ///
    /// For stores that opened but could not be read.
    pub fn disabled() -> Self {
        Self {
            tx: None,
            handle: None,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Current write counters.
    pub fn stats(&self) -> WriterStats {
        self.counters.snapshot()
    }

    /// Drains queued snapshots, stops the thread and returns final counters.
    pub fn shutdown(mut self) -> WriterStats {
        self.stop();
        self.counters.snapshot()
    }

    fn stop(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("event=writer_stop module=persist status=error error_code=writer_panicked");
            }
        }
    }
}

impl SnapshotSink for BackgroundWriter {
    fn submit(&self, snapshot: Snapshot) {
        let Some(tx) = self.tx.as_ref() else {
            self.counters.failed.fetch_add(1, Ordering::SeqCst);
            warn!("event=snapshot_submit module=persist status=error error_code=writer_unavailable");
            return;
        };
        if tx.send(snapshot).is_err() {
            self.counters.failed.fetch_add(1, Ordering::SeqCst);
            warn!("event=snapshot_submit module=persist status=error error_code=writer_disconnected");
        }
    }
}

impl Drop for BackgroundWriter {
    fn drop(&mut self) {
        self.stop();
    }
}

fn writer_loop(
    path: PathBuf,
    mut conn: Option<Connection>,
    rx: Receiver<Snapshot>,
    counters: Arc<Counters>,
) {
    while let Ok(snapshot) = rx.recv() {
        let started_at = Instant::now();

        if conn.is_none() {
            match open_unloaded(&path) {
                Ok(opened) => conn = Some(opened),
                Err(error_code) => {
                    counters.failed.fetch_add(1, Ordering::SeqCst);
                    error!("event=snapshot_write module=persist status=error {error_code}");
                    continue;
                }
            }
        }
        let Some(active) = conn.as_ref() else {
            continue;
        };

        match SqliteHabitRepository::new(active).replace_all(&snapshot) {
            Ok(()) => {
                counters.written.fetch_add(1, Ordering::SeqCst);
                info!(
                    "event=snapshot_write module=persist status=ok tasks={} days={} duration_ms={}",
                    snapshot.tasks.len(),
                    snapshot.completions.len(),
                    started_at.elapsed().as_millis()
                );
            }
            Err(err) => {
                counters.failed.fetch_add(1, Ordering::SeqCst);
                error!(
                    "event=snapshot_write module=persist status=error error_code=write_failed duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
            }
        }
    }
}

/// Opens a store the session never loaded, refusing one that already has rows.
fn open_unloaded(path: &Path) -> Result<Connection, String> {
    let conn = open_db(path)
        .map_err(|err| format!("error_code=store_unavailable error={err}"))?;
    match SqliteHabitRepository::new(&conn).is_empty() {
        Ok(true) => Ok(conn),
        Ok(false) => Err("error_code=store_not_loaded".to_string()),
        Err(err) => Err(format!("error_code=store_unavailable error={err}")),
    }
}
