//! Run persistence for crew kickoffs
//!
//! Every kickoff (chat, console, train, replay, test) is recorded with its
//! inputs and output so a run can be inspected or replayed by task ID.
//! Conversation state itself is deliberately not persisted here.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS runs (
    id TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    inputs TEXT NOT NULL,
    output TEXT NOT NULL,
    created_at TEXT NOT NULL
);
";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A recorded crew run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: String,
    pub kind: String,
    /// Kickoff inputs as JSON
    pub inputs: String,
    /// Kickoff output as JSON
    pub output: String,
    pub created_at: DateTime<Utc>,
}

/// Thread-safe handle to the run store
#[derive(Clone)]
pub struct RunStore {
    conn: Arc<Mutex<Connection>>,
}

impl RunStore {
    /// Open or create the store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Record one completed run
    pub fn record_run(&self, id: &str, kind: &str, inputs: &str, output: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO runs (id, kind, inputs, output, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, kind, inputs, output, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Fetch a run by ID
    pub fn get_run(&self, id: &str) -> StoreResult<Option<RunRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, kind, inputs, output, created_at FROM runs WHERE id = ?1",
        )?;

        let mut rows = stmt.query_map(params![id], row_to_record)?;
        match rows.next() {
            Some(record) => Ok(Some(record?)),
            None => Ok(None),
        }
    }

    /// Most recent runs, newest first
    pub fn recent_runs(&self, limit: i64) -> StoreResult<Vec<RunRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, kind, inputs, output, created_at FROM runs
             ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit], row_to_record)?;
        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }
        Ok(records)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<RunRecord> {
    let created_at: String = row.get(4)?;
    Ok(RunRecord {
        id: row.get(0)?,
        kind: row.get(1)?,
        inputs: row.get(2)?,
        output: row.get(3)?,
        created_at: created_at
            .parse::<DateTime<Utc>>()
            .unwrap_or_else(|_| Utc::now()),
    })
}
