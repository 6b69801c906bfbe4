//! SQLite-backed durable key-value backend.
//!
//! # Invariants
//! - Connections are opened through `db::open_db*`, so `kv_entries` exists.
//! - `set` is an upsert; `remove` of a missing key succeeds.

use super::{KeyValueStorage, StorageResult};
use crate::db::open_db;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Durable backend storing one row per key in `kv_entries`.
pub struct SqliteKvStorage {
    conn: Connection,
}

impl SqliteKvStorage {
    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Returns stored keys sorted by name.
    pub fn keys(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_entries ORDER BY key ASC;")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

const UPSERT_SQL: &str = "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
     ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = (strftime('%s', 'now') * 1000);";

impl KeyValueStorage for SqliteKvStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(UPSERT_SQL, params![key, value])?;
        Ok(())
    }

    fn set_many(&mut self, entries: &[(&str, &str)]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(UPSERT_SQL)?;
            for (key, value) in entries {
                stmt.execute(params![key, value])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}
