use crate::app_dirs::AppDirs;
use crate::session::{ExerciseResult, ResultSink, SaveError, SessionResult};
use chrono::{DateTime, Local, Utc};
use rusqlite::{params, Connection, Result};
use std::path::{Path, PathBuf};

/// One finished session as read back from the database.
#[derive(Debug, Clone)]
pub struct HistoryRow {
    pub workout_id: String,
    pub workout_name: String,
    pub started_at: DateTime<Local>,
    pub elapsed_secs: f64,
    pub rest_secs: f64,
    pub completed_sets: usize,
    pub total_sets: usize,
}

/// Database of finished sessions. This is the concrete result-save
/// collaborator handed to the session controller.
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Open (and initialize) the on-disk database.
    pub fn new() -> Result<Self> {
        let db_path =
            AppDirs::history_db_path().unwrap_or_else(|| PathBuf::from("repset_history.db"));

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(&db_path)?;
        Self::init(conn)
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workout_id TEXT NOT NULL,
                workout_name TEXT NOT NULL,
                started_at TEXT NOT NULL,
                elapsed_secs REAL NOT NULL,
                rest_secs REAL NOT NULL,
                completed_sets INTEGER NOT NULL,
                total_sets INTEGER NOT NULL,
                exercises TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_sessions_started_at ON sessions(started_at)",
            [],
        )?;

        Ok(HistoryDb { conn })
    }

    /// Persist one finished session. Exercise details go in as a JSON
    /// column; the queryable totals get their own columns.
    pub fn record_session(&self, result: &SessionResult) -> Result<()> {
        let started_at = DateTime::<Utc>::from(result.started_at).to_rfc3339();
        let exercises = serde_json::to_string(&result.exercises).map_err(|e| {
            rusqlite::Error::ToSqlConversionFailure(Box::new(e))
        })?;

        self.conn.execute(
            r#"
            INSERT INTO sessions
            (workout_id, workout_name, started_at, elapsed_secs, rest_secs, completed_sets, total_sets, exercises)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                result.workout_id,
                result.workout_name,
                started_at,
                result.total_elapsed_secs,
                result.total_rest_secs,
                result.completed_sets() as i64,
                result.total_sets() as i64,
                exercises,
            ],
        )?;

        Ok(())
    }

    /// Most recent sessions, newest first.
    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<HistoryRow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT workout_id, workout_name, started_at, elapsed_secs, rest_secs, completed_sets, total_sets
            FROM sessions
            ORDER BY started_at DESC
            LIMIT ?1
            "#,
        )?;

        let row_iter = stmt.query_map([limit as i64], |row| {
            let started_str: String = row.get(2)?;
            let started_at = DateTime::parse_from_rfc3339(&started_str)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        2,
                        "started_at".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            Ok(HistoryRow {
                workout_id: row.get(0)?,
                workout_name: row.get(1)?,
                started_at,
                elapsed_secs: row.get(3)?,
                rest_secs: row.get(4)?,
                completed_sets: row.get::<_, i64>(5)? as usize,
                total_sets: row.get::<_, i64>(6)? as usize,
            })
        })?;

        let mut rows = Vec::new();
        for row in row_iter {
            rows.push(row?);
        }

        Ok(rows)
    }

    /// Exercise details of a session, keyed by its started_at timestamp.
    pub fn session_exercises(&self, started_at: &DateTime<Local>) -> Result<Vec<ExerciseResult>> {
        let key = started_at.with_timezone(&Utc).to_rfc3339();
        let json: String = self.conn.query_row(
            "SELECT exercises FROM sessions WHERE started_at = ?1",
            [key],
            |row| row.get(0),
        )?;
        serde_json::from_str(&json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e)))
    }

    /// Dump the whole history as CSV, one line per session.
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let rows = self.recent_sessions(usize::MAX >> 1)?;
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record([
            "date",
            "workout",
            "elapsed_secs",
            "rest_secs",
            "completed_sets",
            "total_sets",
        ])?;

        for row in &rows {
            writer.write_record([
                row.started_at.format("%c").to_string(),
                row.workout_name.clone(),
                format!("{:.2}", row.elapsed_secs),
                format!("{:.2}", row.rest_secs),
                row.completed_sets.to_string(),
                row.total_sets.to_string(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Clear all history (for testing or reset purposes)
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM sessions", [])?;
        Ok(())
    }
}

impl ResultSink for HistoryDb {
    fn save(&mut self, result: &SessionResult) -> Result<(), SaveError> {
        self.record_session(result)
            .map_err(|e| SaveError(e.to_string()))
    }
}
