//! # keel-db
//!
//! Storage for the Keel decision journal.
//!
//! The append-only JSONL journal (`journal`) is the source of truth. A libSQL
//! index (`index`) holds the resolved current state of every decision, with
//! association tables and an FTS5 table for search. `sync` keeps the two
//! consistent, `query` serves reads, and `service::KeelService` ties them
//! together for the CLI.
//!
//! Uses the `libsql` crate (C `SQLite` fork) for native FTS5 support.

pub mod error;
pub mod helpers;
pub mod index;
pub mod journal;
mod migrations;
pub mod query;
pub mod service;
pub mod sync;

mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Handle on the local index database.
pub struct KeelDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl KeelDb {
    /// Open a local database at the given path, or `":memory:"` for tests.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let keel_db = Self { db, conn };
        keel_db.run_migrations().await?;
        Ok(keel_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Read a value from the `metadata` table.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn get_metadata(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut rows = self
            .conn
            .query("SELECT value FROM metadata WHERE key = ?1", [key])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<String>(0)?)),
            None => Ok(None),
        }
    }

    /// Insert or overwrite a value in the `metadata` table.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the write fails.
    pub async fn set_metadata(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO metadata (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                [key, value],
            )
            .await?;
        Ok(())
    }

    /// Remove a key from the `metadata` table. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the delete fails.
    pub async fn delete_metadata(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM metadata WHERE key = ?1", [key])
            .await?;
        Ok(())
    }
}
