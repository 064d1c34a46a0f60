//! Storage layer for media time.
//!
//! Persists sessions in `SQLite` using `rusqlite` and implements
//! [`SessionStore`] so the tracker can run on top of it.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` can be moved between threads but not shared without external
//! synchronization. The CLI opens one connection per invocation.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 UTC with millisecond precision
//! (e.g., `2024-01-15T10:30:00.000Z`). The fixed width keeps lexicographic
//! ordering equal to chronological ordering, which the range queries rely on.
//!
//! ## Ordering
//!
//! `seq` is an autoincrementing rowid. Listing by `seq` returns sessions in
//! insertion order, independent of their start times.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use mt_core::{
    ActivityType, Session, SessionError, SessionId, SessionStore, UnknownActivityType,
    ValidationError,
};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for session {session_id}: {timestamp}")]
    TimestampParse {
        session_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored activity type is not one we know.
    #[error("invalid activity type for session {session_id}")]
    InvalidActivityType {
        session_id: String,
        #[source]
        source: UnknownActivityType,
    },
    /// A stored session id is blank.
    #[error("invalid session id: {0}")]
    InvalidId(#[from] ValidationError),
    /// A stored row violates a session invariant.
    #[error("invalid session: {0}")]
    InvalidSession(#[from] SessionError),
    /// No row exists for the session.
    #[error("session {0} not found")]
    NotFound(SessionId),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A session row as stored, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SessionRow {
    id: String,
    start_time: String,
    end_time: Option<String>,
    activity_type: String,
    description: String,
}

impl SessionRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            start_time: row.get(1)?,
            end_time: row.get(2)?,
            activity_type: row.get(3)?,
            description: row.get(4)?,
        })
    }

    fn into_session(self) -> Result<Session, DbError> {
        let start_time = parse_timestamp(&self.start_time, &self.id)?;
        let end_time = self
            .end_time
            .as_deref()
            .map(|end| parse_timestamp(end, &self.id))
            .transpose()?;
        let activity_type = self
            .activity_type
            .parse::<ActivityType>()
            .map_err(|source| DbError::InvalidActivityType {
                session_id: self.id.clone(),
                source,
            })?;
        let id = SessionId::new(self.id)?;
        let session = Session::restore(id, start_time, end_time, activity_type, self.description)?;
        Ok(session)
    }
}

const SESSION_COLUMNS: &str = "id, start_time, end_time, activity_type, description";

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        tracing::debug!(path = %path.display(), "opened database");
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
            -- start_time/end_time: RFC 3339 UTC, e.g. '2024-01-15T10:30:00.000Z'
            -- end_time: NULL while the session is running
            -- activity_type: 'consuming' or 'creating'
            CREATE TABLE IF NOT EXISTS sessions (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                start_time TEXT NOT NULL,
                end_time TEXT,
                activity_type TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_start ON sessions(start_time);
            CREATE INDEX IF NOT EXISTS idx_sessions_active ON sessions(end_time)
                WHERE end_time IS NULL;
            ",
        )?;
        Ok(())
    }

    /// Lists sessions that started within a time range, in insertion order.
    ///
    /// The range is inclusive of `start` and exclusive of `end`.
    pub fn list_sessions_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Session>, DbError> {
        if end <= start {
            return Ok(Vec::new());
        }
        self.query_sessions(
            &format!(
                "SELECT {SESSION_COLUMNS} FROM sessions
                 WHERE start_time >= ?1 AND start_time < ?2
                 ORDER BY seq ASC"
            ),
            params![format_timestamp(start), format_timestamp(end)],
        )
    }

    /// Deletes a session. Returns `false` if it did not exist.
    pub fn delete_session(&mut self, id: &SessionId) -> Result<bool, DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM sessions WHERE id = ?1", [id.as_str()])?;
        tracing::debug!(session_id = %id, deleted, "delete session");
        Ok(deleted > 0)
    }

    fn query_sessions(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Session>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, SessionRow::from_row)?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?.into_session()?);
        }
        Ok(sessions)
    }
}

impl SessionStore for Database {
    type Error = DbError;

    fn insert(&mut self, session: &Session) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO sessions (id, start_time, end_time, activity_type, description)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                session.id().as_str(),
                format_timestamp(session.start_time()),
                session.end_time().map(format_timestamp),
                session.activity_type().as_str(),
                session.description(),
            ],
        )?;
        Ok(())
    }

    fn update(&mut self, session: &Session) -> Result<(), DbError> {
        let updated = self.conn.execute(
            "
            UPDATE sessions
            SET start_time = ?2, end_time = ?3, activity_type = ?4, description = ?5
            WHERE id = ?1
            ",
            params![
                session.id().as_str(),
                format_timestamp(session.start_time()),
                session.end_time().map(format_timestamp),
                session.activity_type().as_str(),
                session.description(),
            ],
        )?;
        if updated == 0 {
            return Err(DbError::NotFound(session.id().clone()));
        }
        Ok(())
    }

    fn sessions(&self) -> Result<Vec<Session>, DbError> {
        self.query_sessions(
            &format!("SELECT {SESSION_COLUMNS} FROM sessions ORDER BY seq ASC"),
            [],
        )
    }

    fn get(&self, id: &SessionId) -> Result<Option<Session>, DbError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"),
                [id.as_str()],
                SessionRow::from_row,
            )
            .optional()?;
        row.map(SessionRow::into_session).transpose()
    }

    fn active_sessions(&self) -> Result<Vec<Session>, DbError> {
        self.query_sessions(
            &format!(
                "SELECT {SESSION_COLUMNS} FROM sessions WHERE end_time IS NULL ORDER BY seq ASC"
            ),
            [],
        )
    }
}

fn parse_timestamp(timestamp: &str, session_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            session_id: session_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    use mt_core::ActivityType::{Consuming, Creating};
    use mt_core::{MemoryStore, NoopSink, Tracker};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    fn stopped(activity_type: ActivityType, start: &str, end: &str) -> Session {
        let mut session = Session::starting_at(activity_type, "", at(start));
        session.stop_at(at(end));
        session
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");

        let columns = table_columns(&db.conn, "sessions");
        assert_eq!(
            columns,
            vec![
                "seq",
                "id",
                "start_time",
                "end_time",
                "activity_type",
                "description",
            ]
        );

        let indexes = index_names(&db.conn, "sessions");
        assert!(indexes.contains("idx_sessions_start"));
        assert!(indexes.contains("idx_sessions_active"));
    }

    #[test]
    fn init_is_idempotent() {
        let db = Database::open_in_memory().expect("open in-memory db");
        db.init().expect("second init");
        db.init().expect("third init");
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("prepare table_info");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info");
        rows.map(|row| row.expect("table_info row")).collect()
    }

    fn index_names(conn: &Connection, table: &str) -> HashSet<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA index_list({table})"))
            .expect("prepare index_list");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query index_list");
        rows.map(|row| row.expect("index_list row")).collect()
    }

    #[test]
    fn insert_and_list_preserves_insertion_order() {
        let mut db = Database::open_in_memory().unwrap();
        let later = stopped(Creating, "2025-01-02T10:00:00Z", "2025-01-02T11:00:00Z");
        let earlier = stopped(Consuming, "2025-01-01T10:00:00Z", "2025-01-01T10:30:00Z");

        db.insert(&later).unwrap();
        db.insert(&earlier).unwrap();

        assert_eq!(db.sessions().unwrap(), vec![later, earlier]);
    }

    #[test]
    fn round_trips_every_field() {
        let mut db = Database::open_in_memory().unwrap();
        let mut session = Session::starting_at(
            ActivityType::Consuming,
            "Watching television or streaming content",
            at("2025-03-04T05:06:07.089Z"),
        );
        db.insert(&session).unwrap();
        assert_eq!(db.get(session.id()).unwrap(), Some(session.clone()));

        session.stop_at(at("2025-03-04T06:00:00Z"));
        db.update(&session).unwrap();
        assert_eq!(db.get(session.id()).unwrap(), Some(session));
    }

    #[test]
    fn duplicate_insert_fails() {
        let mut db = Database::open_in_memory().unwrap();
        let session = stopped(Creating, "2025-01-02T10:00:00Z", "2025-01-02T11:00:00Z");
        db.insert(&session).unwrap();
        assert!(matches!(db.insert(&session), Err(DbError::Sqlite(_))));
    }

    #[test]
    fn update_unknown_session_is_not_found() {
        let mut db = Database::open_in_memory().unwrap();
        let session = stopped(Creating, "2025-01-02T10:00:00Z", "2025-01-02T11:00:00Z");
        let err = db.update(&session).unwrap_err();
        assert!(matches!(err, DbError::NotFound(id) if &id == session.id()));
    }

    #[test]
    fn active_sessions_have_no_end_time() {
        let mut db = Database::open_in_memory().unwrap();
        let done = stopped(Creating, "2025-01-02T10:00:00Z", "2025-01-02T11:00:00Z");
        let running = Session::starting_at(ActivityType::Consuming, "", at("2025-01-02T12:00:00Z"));
        db.insert(&done).unwrap();
        db.insert(&running).unwrap();

        assert_eq!(db.active_sessions().unwrap(), vec![running]);
    }

    #[test]
    fn range_query_uses_half_open_start_window() {
        let mut db = Database::open_in_memory().unwrap();
        let before = stopped(Creating, "2025-01-01T23:59:59Z", "2025-01-02T00:30:00Z");
        let first = stopped(Creating, "2025-01-02T00:00:00Z", "2025-01-02T00:30:00Z");
        let boundary = stopped(Creating, "2025-01-03T00:00:00Z", "2025-01-03T00:30:00Z");
        for s in [&before, &first, &boundary] {
            db.insert(s).unwrap();
        }

        let found = db
            .list_sessions_in_range(at("2025-01-02T00:00:00Z"), at("2025-01-03T00:00:00Z"))
            .unwrap();
        assert_eq!(found, vec![first]);

        let empty = db
            .list_sessions_in_range(at("2025-01-03T00:00:00Z"), at("2025-01-02T00:00:00Z"))
            .unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn delete_session_reports_whether_it_existed() {
        let mut db = Database::open_in_memory().unwrap();
        let session = stopped(Creating, "2025-01-02T10:00:00Z", "2025-01-02T11:00:00Z");
        db.insert(&session).unwrap();

        assert!(db.delete_session(session.id()).unwrap());
        assert!(!db.delete_session(session.id()).unwrap());
        assert!(db.sessions().unwrap().is_empty());
    }

    #[test]
    fn corrupt_rows_surface_typed_errors() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO sessions (id, start_time, end_time, activity_type, description)
                 VALUES ('bad-type', '2025-01-02T10:00:00.000Z', NULL, 'idle', '')",
                [],
            )
            .unwrap();
        assert!(matches!(
            db.sessions(),
            Err(DbError::InvalidActivityType { .. })
        ));

        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO sessions (id, start_time, end_time, activity_type, description)
                 VALUES ('backwards', '2025-01-02T10:00:00.000Z',
                         '2025-01-02T09:00:00.000Z', 'creating', '')",
                [],
            )
            .unwrap();
        assert!(matches!(db.sessions(), Err(DbError::InvalidSession(_))));

        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO sessions (id, start_time, end_time, activity_type, description)
                 VALUES ('bad-time', 'yesterday', NULL, 'creating', '')",
                [],
            )
            .unwrap();
        assert!(matches!(db.sessions(), Err(DbError::TimestampParse { .. })));
    }

    #[test]
    fn sessions_persist_across_reopen() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("mt.db");

        let id = {
            let mut tracker = Tracker::new(Database::open(&path).unwrap(), NoopSink);
            let started = tracker
                .start_at(ActivityType::Creating, "Code", at("2025-01-02T10:00:00Z"))
                .unwrap()
                .into_value();
            tracker
                .stop_at(started.id(), at("2025-01-02T10:45:00Z"))
                .unwrap();
            started.id().clone()
        };

        let db = Database::open(&path).unwrap();
        let session = db.get(&id).unwrap().unwrap();
        assert_eq!(session.description(), "Code");
        assert_eq!(session.end_time(), Some(at("2025-01-02T10:45:00Z")));
        assert!(!session.is_active());
    }

    #[test]
    fn tracker_behaves_the_same_on_memory_and_sqlite() {
        fn run<S: SessionStore>(store: S) -> Vec<(ActivityType, bool)> {
            let mut tracker = Tracker::new(store, NoopSink);
            tracker
                .start_at(ActivityType::Consuming, "", at("2025-01-02T10:00:00Z"))
                .unwrap();
            tracker.switch_active().unwrap();
            tracker.stop_active_at(at("2025-01-02T10:10:00Z")).unwrap();
            tracker
                .start_at(ActivityType::Consuming, "", at("2025-01-02T11:00:00Z"))
                .unwrap();
            tracker
                .sessions()
                .unwrap()
                .iter()
                .map(|s| (s.activity_type(), s.is_active()))
                .collect()
        }

        let expected = vec![
            (ActivityType::Creating, false),
            (ActivityType::Consuming, true),
        ];
        assert_eq!(run(MemoryStore::new()), expected);
        assert_eq!(run(Database::open_in_memory().unwrap()), expected);
    }
}
