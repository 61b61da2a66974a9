// SQLite persistence layer for the session snapshot and score history.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use matchday_core::snapshot::Snapshot;

/// Key under which the session snapshot is stored in `app_state`.
pub const SESSION_KEY: &str = "session";

/// One participant's delta from one scoring pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    pub week: u32,
    pub participant_id: u32,
    pub points: i64,
    pub recorded_at: String,
}

/// SQLite-backed persistence: key-value app state plus a scoring log.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS app_state (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS score_history (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                week           INTEGER NOT NULL,
                participant_id INTEGER NOT NULL,
                points         INTEGER NOT NULL,
                recorded_at    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );

            CREATE INDEX IF NOT EXISTS idx_score_history_participant
                ON score_history(participant_id, week);
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Key-value state
    // ------------------------------------------------------------------

    /// Store an arbitrary JSON value under `key`, replacing any previous one.
    pub fn save_state(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.conn();
        let json_str =
            serde_json::to_string(value).context("failed to serialize state value")?;
        conn.execute(
            "INSERT OR REPLACE INTO app_state (key, value) VALUES (?1, ?2)",
            params![key, json_str],
        )
        .context("failed to save state")?;
        Ok(())
    }

    /// Load a previously saved JSON value by `key`. Returns `None` if the key
    /// does not exist.
    pub fn load_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT value FROM app_state WHERE key = ?1")
            .context("failed to prepare load_state query")?;

        let mut rows = stmt
            .query_map(params![key], |row| {
                let json_str: String = row.get(0)?;
                Ok(json_str)
            })
            .context("failed to query app state")?;

        match rows.next() {
            Some(row_result) => {
                let json_str = row_result.context("failed to read state row")?;
                let value: serde_json::Value = serde_json::from_str(&json_str)
                    .context("failed to deserialize state value")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------
    // Session snapshot
    // ------------------------------------------------------------------

    pub fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let value = serde_json::to_value(snapshot).context("failed to serialize snapshot")?;
        self.save_state(SESSION_KEY, &value)
    }

    /// The stored session, if any. A stored value that no longer parses is an
    /// error rather than `None` so the caller can decide whether to discard it.
    pub fn load_snapshot(&self) -> Result<Option<Snapshot>> {
        match self.load_state(SESSION_KEY)? {
            Some(value) => {
                let snapshot = serde_json::from_value(value)
                    .context("stored session snapshot is malformed")?;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    /// Remove the stored session and the scoring log.
    pub fn clear_session(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM app_state WHERE key = ?1", params![SESSION_KEY])
            .context("failed to clear session")?;
        conn.execute("DELETE FROM score_history", [])
            .context("failed to clear score history")?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Score history
    // ------------------------------------------------------------------

    /// Append one row per `(participant id, delta)` in a single transaction.
    pub fn record_scores(
        &self,
        week: u32,
        deltas: &[(u32, i64)],
        recorded_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .context("failed to begin score transaction")?;
        let stamp = recorded_at.to_rfc3339();
        for (participant_id, points) in deltas {
            tx.execute(
                "INSERT INTO score_history (week, participant_id, points, recorded_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![week, participant_id, points, stamp],
            )
            .context("failed to record score")?;
        }
        tx.commit().context("failed to commit scores")?;
        Ok(())
    }

    /// Score rows in insertion order, optionally for one participant.
    pub fn load_score_history(&self, participant_id: Option<u32>) -> Result<Vec<ScoreRecord>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT week, participant_id, points, recorded_at
                 FROM score_history
                 WHERE ?1 IS NULL OR participant_id = ?1
                 ORDER BY id",
            )
            .context("failed to prepare score history query")?;

        let rows = stmt
            .query_map(params![participant_id], |row| {
                Ok(ScoreRecord {
                    week: row.get(0)?,
                    participant_id: row.get(1)?,
                    points: row.get(2)?,
                    recorded_at: row.get(3)?,
                })
            })
            .context("failed to query score history")?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to read score history row")
    }
}
