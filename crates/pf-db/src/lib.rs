//! Storage layer for screen flow analytics.
//!
//! Provides an append-only event store using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. Separate processes are
//! serialized by `SQLite`'s own file locking.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 UTC with nanosecond precision
//! (e.g., `2024-01-15T10:30:00.000400000Z`). The form is fixed-width, so
//! lexicographic order matches chronological order, and sub-millisecond
//! gaps survive a round trip.
//!
//! ## Append Order
//!
//! Rows are keyed by an autoincrement integer. [`Database::list_events`]
//! returns rows in that order, which is the input order the timeline builder
//! uses to break timestamp ties.

use std::path::Path;

use pf_core::{Event, EventStore, RawEvent, format_timestamp_precise};
use rusqlite::{Connection, params};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// Per-session activity, for status output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: String,
    pub event_count: i64,
    pub last_event: String,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Events table: raw page views, never updated or deduplicated
            -- timestamp: RFC 3339 UTC, nanoseconds (e.g., '2024-01-15T10:30:00.000000000Z')
            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                screen_id TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_events_session ON events(session_id);
            CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp);
            ",
        )?;
        Ok(())
    }

    /// Appends a batch of events in one transaction.
    ///
    /// Either every event is stored or none is.
    pub fn insert_events(&mut self, events: &[Event]) -> Result<usize, DbError> {
        if events.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO events (session_id, screen_id, timestamp)
                VALUES (?, ?, ?)
                ",
            )?;
            for event in events {
                inserted += stmt.execute(params![
                    event.session_id.as_str(),
                    event.screen_id.as_str(),
                    format_timestamp_precise(event.timestamp),
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(inserted, "appended events");
        Ok(inserted)
    }

    /// Lists all events in append order.
    pub fn list_events(&self) -> Result<Vec<RawEvent>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT session_id, screen_id, timestamp
            FROM events
            ORDER BY id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(RawEvent {
                session_id: row.get(0)?,
                screen_id: row.get(1)?,
                timestamp: row.get(2)?,
            })
        })?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }

    /// Number of stored events.
    pub fn event_count(&self) -> Result<i64, DbError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Event count and latest timestamp per session, ordered by session ID.
    pub fn session_summaries(&self) -> Result<Vec<SessionSummary>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT session_id, COUNT(*), MAX(timestamp)
            FROM events
            GROUP BY session_id
            ORDER BY session_id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SessionSummary {
                session_id: row.get(0)?,
                event_count: row.get(1)?,
                last_event: row.get(2)?,
            })
        })?;
        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?);
        }
        Ok(summaries)
    }
}

impl EventStore for Database {
    type Error = DbError;

    fn append(&mut self, event: &Event) -> Result<(), Self::Error> {
        self.insert_events(std::slice::from_ref(event))?;
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<RawEvent>, Self::Error> {
        self.list_events()
    }
}
