//! Typed view of a `decisions` row.
//!
//! The scalar columns exist for filtering and search. The authoritative
//! content is `raw_json`: the merged `DecisionRecord`, tagged with the
//! `schema_version` it was written under.

use keel_core::decision::{Decision, DecisionRecord};

use crate::error::DatabaseError;

/// Version of the `raw_json` encoding written by this build.
pub const SCHEMA_VERSION: i64 = 1;

/// Columns selected for every decision query, in `DecisionRow` order.
/// Queries alias `decisions` as `d`.
pub const ROW_COLUMNS: &str = "d.id, d.schema_version, d.raw_json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRow {
    pub id: String,
    pub schema_version: i64,
    pub raw_json: String,
}

impl DecisionRow {
    /// Read a row selected with [`ROW_COLUMNS`].
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a column is missing or has the wrong type.
    pub fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        Ok(Self {
            id: row.get::<String>(0)?,
            schema_version: row.get::<i64>(1)?,
            raw_json: row.get::<String>(2)?,
        })
    }

    /// Decode the stored record.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for an unknown schema version or
    /// JSON that no longer parses.
    pub fn into_record(self) -> Result<DecisionRecord, DatabaseError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(DatabaseError::InvalidState(format!(
                "decision {} has schema_version {}, expected {SCHEMA_VERSION}; run `keel rebuild`",
                self.id, self.schema_version
            )));
        }
        serde_json::from_str(&self.raw_json).map_err(|e| {
            DatabaseError::InvalidState(format!("decision {} has corrupt raw_json: {e}", self.id))
        })
    }

    /// Decode the stored record as a complete decision.
    ///
    /// Returns `Ok(None)` for an orphan (a record that never had a creation
    /// entry), logging a warning.
    ///
    /// # Errors
    ///
    /// Same as [`DecisionRow::into_record`].
    pub fn into_decision(self) -> Result<Option<Decision>, DatabaseError> {
        match Decision::try_from(self.into_record()?) {
            Ok(decision) => Ok(Some(decision)),
            Err(incomplete) => {
                tracing::warn!("{incomplete}");
                Ok(None)
            }
        }
    }
}
