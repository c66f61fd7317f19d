//! Key-value contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide get/set/remove of string items, mirroring browser local storage.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `set_item` is an upsert; the last write for a key wins.
//! - `set_items` is all-or-nothing.
//! - Removing a missing key is not an error.

use crate::db::migrations::latest_version;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

const UPSERT_SQL: &str = "INSERT INTO kv_items (key, value, updated_at)
     VALUES (?1, ?2, CAST(strftime('%s', 'now') AS INTEGER) * 1000)
     ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at;";

/// String key-value storage.
pub trait KeyValueStore {
    /// Returns the stored value, or `None` when the key is absent.
    fn get_item(&self, key: &str) -> RepoResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> RepoResult<()>;
    /// Writes every pair or none of them.
    fn set_items(&self, items: &[(&str, &str)]) -> RepoResult<()>;
    fn remove_item(&self, key: &str) -> RepoResult<()>;
}

/// SQLite-backed key-value store over the `kv_items` table.
pub struct SqliteKeyValueStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKeyValueStore<'conn> {
    /// Wraps a connection returned by `open_db` / `open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version =
            conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKeyValueStore<'_> {
    fn get_item(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_items WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(UPSERT_SQL, params![key, value])?;
        Ok(())
    }

    fn set_items(&self, items: &[(&str, &str)]) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in items {
            tx.execute(UPSERT_SQL, params![key, value])?;
        }
        tx.commit()?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM kv_items WHERE key = ?1;", [key])?;
        Ok(())
    }
}
