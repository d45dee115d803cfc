//! Database error types for keel-db.

use keel_core::errors::CoreError;
use thiserror::Error;

/// Errors from journal, index, and query operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or was rejected.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., unknown row schema version).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Reading or appending the decision journal failed.
    #[error("Journal I/O failed: {0}")]
    Journal(#[from] std::io::Error),

    /// A domain error raised while handling a request.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
