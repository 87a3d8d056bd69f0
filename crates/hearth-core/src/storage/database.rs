//! SQLite-backed storage.
//!
//! Provides persistent storage for:
//! - Key-value documents (stock, menus, tasks, monitor state)
//! - Connection history for the WiFi monitor

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};

use super::{data_dir, KeyValueStore};
use crate::error::{DatabaseError, Result};
use crate::monitor::ConnectionEvent;

/// SQLite database behind [`KeyValueStore`] and connection history.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/hearth.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("hearth.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS connections (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp       INTEGER NOT NULL,
                ssid            TEXT NOT NULL,
                is_first_of_day INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_connections_timestamp ON connections(timestamp);",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Append one connection to the history.
    pub fn record_connection(&self, event: &ConnectionEvent) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO connections (timestamp, ssid, is_first_of_day) VALUES (?1, ?2, ?3)",
            params![event.timestamp, event.ssid, event.is_first_of_day],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Connections from the last `days` days, newest first.
    pub fn connection_history(
        &self,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<ConnectionEvent>, rusqlite::Error> {
        let cutoff = (now - Duration::days(i64::from(days))).timestamp_millis();
        let mut stmt = self.conn.prepare(
            "SELECT timestamp, ssid, is_first_of_day
             FROM connections
             WHERE timestamp >= ?1
             ORDER BY timestamp DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![cutoff], |row| {
            Ok(ConnectionEvent {
                timestamp: row.get(0)?,
                ssid: row.get(1)?,
                is_first_of_day: row.get(2)?,
            })
        })?;
        let history = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(history)
    }

    /// Delete connections older than `days_to_keep` days. Returns rows removed.
    pub fn cleanup_connections(
        &self,
        days_to_keep: u32,
        now: DateTime<Utc>,
    ) -> Result<usize, rusqlite::Error> {
        let cutoff = (now - Duration::days(i64::from(days_to_keep))).timestamp_millis();
        self.conn
            .execute("DELETE FROM connections WHERE timestamp < ?1", params![cutoff])
    }
}

impl KeyValueStore for Database {
    fn load_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.kv_get(key)?)
    }

    fn save_raw(&self, key: &str, json: &str) -> Result<()> {
        Ok(self.kv_set(key, json)?)
    }

    fn remove(&self, key: &str) -> Result<()> {
        Ok(self.kv_delete(key)?)
    }
}
