//! SQLite-backed durable local storage.
//!
//! Holds the key-value blob store used for the session snapshot. The
//! snapshot is what makes timer recovery survive an ungraceful shutdown,
//! so writes here must be cheap enough to run roughly once per second.

use rusqlite::{params, Connection};

use super::data_dir;
use crate::error::StorageError;

/// Local SQLite database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/grind/grind.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("grind.db");
        let conn = Connection::open(&path).map_err(|source| StorageError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Delete a key from the kv store.
    pub fn kv_delete(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_roundtrip() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("snapshot").unwrap().is_none());
        db.kv_set("snapshot", "{}").unwrap();
        assert_eq!(db.kv_get("snapshot").unwrap().unwrap(), "{}");
        db.kv_set("snapshot", "{\"a\":1}").unwrap();
        assert_eq!(db.kv_get("snapshot").unwrap().unwrap(), "{\"a\":1}");
        db.kv_delete("snapshot").unwrap();
        assert!(db.kv_get("snapshot").unwrap().is_none());
    }
}
