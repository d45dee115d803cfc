//! Index writes: upsert of resolved records and full rebuild.
//!
//! Every row in `decisions` holds the merged state of one ID. `upsert`
//! merges an incoming journal record over the stored one, so feeding records
//! one at a time produces the same rows as `rebuild` over the whole journal.

mod marker;
pub mod row;

use keel_core::decision::DecisionRecord;
use keel_core::state::{ResolvedState, resolve};

use crate::KeelDb;
use crate::error::DatabaseError;
use crate::helpers::format_timestamp;
use row::{DecisionRow, ROW_COLUMNS, SCHEMA_VERSION};

/// Association tables and the column holding the associated value.
const ASSOCIATIONS: [(&str, &str); 3] = [
    ("decision_files", "path"),
    ("decision_symbols", "symbol"),
    ("decision_beads", "bead_id"),
];

impl KeelDb {
    /// Merge `record` into the stored state for its ID and write the result.
    ///
    /// Runs in one transaction. Applying the same record twice leaves the
    /// index unchanged. Returns the merged record.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the stored row cannot be decoded or any
    /// write fails. Nothing is written on error.
    pub async fn upsert(&self, record: &DecisionRecord) -> Result<DecisionRecord, DatabaseError> {
        let tx = self.conn.transaction().await?;
        let merged = match load_record(&tx, &record.id).await? {
            Some(mut existing) => {
                existing.merge(record.clone());
                existing
            }
            None => record.clone(),
        };
        write_record(&tx, &merged).await?;
        tx.commit().await?;
        Ok(merged)
    }

    /// Replace the whole index with the state resolved from `records`.
    ///
    /// Runs in one transaction, so readers never see a half-built index.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if any write fails. The previous index is left
    /// intact on error.
    pub async fn rebuild(
        &self,
        records: Vec<DecisionRecord>,
    ) -> Result<ResolvedState, DatabaseError> {
        let state = resolve(records);
        let tx = self.conn.transaction().await?;
        clear_all(&tx).await?;
        for record in state.records() {
            write_record(&tx, record).await?;
        }
        tx.commit().await?;
        tracing::info!(
            decisions = state.len() - state.orphans().len(),
            orphans = state.orphans().len(),
            "rebuilt decision index"
        );
        Ok(state)
    }

    /// Remove every decision and association row. Metadata is kept.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a delete fails.
    pub async fn clear(&self) -> Result<(), DatabaseError> {
        let tx = self.conn.transaction().await?;
        clear_all(&tx).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Whether any row (complete or orphan) exists for `id`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn contains(&self, id: &str) -> Result<bool, DatabaseError> {
        let mut rows = self
            .conn
            .query("SELECT 1 FROM decisions WHERE id = ?1", [id])
            .await?;
        Ok(rows.next().await?.is_some())
    }

    /// Stored record for `id`, orphan or not.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or the row cannot be
    /// decoded.
    pub async fn record(&self, id: &str) -> Result<Option<DecisionRecord>, DatabaseError> {
        load_record(&self.conn, id).await
    }
}

async fn load_record(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Option<DecisionRecord>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {ROW_COLUMNS} FROM decisions d WHERE d.id = ?1"),
            [id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(DecisionRow::from_row(&row)?.into_record()?)),
        None => Ok(None),
    }
}

async fn write_record(
    conn: &libsql::Connection,
    record: &DecisionRecord,
) -> Result<(), DatabaseError> {
    let raw_json = serde_json::to_string(record).map_err(|e| DatabaseError::Other(e.into()))?;
    let complete = record.missing_required_fields().is_empty();
    let created_at = record.created_at.as_ref().map(format_timestamp);
    let role = record.decided_by.as_ref().map(|d| d.role.as_str());
    let identifier = record
        .decided_by
        .as_ref()
        .and_then(|d| d.identifier.as_deref());

    conn.execute(
        "INSERT INTO decisions (id, created_at, type, problem, choice, rationale, status,
                                superseded_by, supersedes, decided_by_role, decided_by_identifier,
                                hypothesis, success_criteria, complete, schema_version, raw_json)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
         ON CONFLICT(id) DO UPDATE SET
             created_at = excluded.created_at,
             type = excluded.type,
             problem = excluded.problem,
             choice = excluded.choice,
             rationale = excluded.rationale,
             status = excluded.status,
             superseded_by = excluded.superseded_by,
             supersedes = excluded.supersedes,
             decided_by_role = excluded.decided_by_role,
             decided_by_identifier = excluded.decided_by_identifier,
             hypothesis = excluded.hypothesis,
             success_criteria = excluded.success_criteria,
             complete = excluded.complete,
             schema_version = excluded.schema_version,
             raw_json = excluded.raw_json",
        libsql::params![
            record.id.as_str(),
            created_at.as_deref(),
            record.kind.map(|k| k.as_str()),
            record.problem.as_deref(),
            record.choice.as_deref(),
            record.rationale.as_deref(),
            record.status.map(|s| s.as_str()),
            record.superseded_by.as_deref(),
            record.supersedes.as_deref(),
            role,
            identifier,
            record.hypothesis.as_deref(),
            record.success_criteria.as_deref(),
            i64::from(complete),
            SCHEMA_VERSION,
            raw_json.as_str()
        ],
    )
    .await?;

    let values: [&[String]; 3] = [record.files(), record.symbols(), record.beads()];
    for ((table, column), values) in ASSOCIATIONS.iter().zip(values) {
        conn.execute(
            &format!("DELETE FROM {table} WHERE decision_id = ?1"),
            [record.id.as_str()],
        )
        .await?;
        for value in values {
            conn.execute(
                &format!("INSERT OR IGNORE INTO {table} (decision_id, {column}) VALUES (?1, ?2)"),
                [record.id.as_str(), value.as_str()],
            )
            .await?;
        }
    }
    Ok(())
}

async fn clear_all(conn: &libsql::Connection) -> Result<(), DatabaseError> {
    for (table, _) in ASSOCIATIONS {
        conn.execute(&format!("DELETE FROM {table}"), ()).await?;
    }
    conn.execute("DELETE FROM decisions", ()).await?;
    Ok(())
}
