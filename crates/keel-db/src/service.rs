//! Service layer: the journal and the index behind one handle.
//!
//! `KeelService` owns a `KeelDb` and a `DecisionJournal`. Opening it
//! reconciles the index with the journal. Every write follows the same
//! protocol:
//! 1. Validate and resolve everything that can fail
//! 2. Append the record to the journal (the durable step)
//! 3. Apply it to the index through `SyncController::record_write`
//!
//! A failure in step 3 is logged and left for the next open to repair.
//! Query methods live in `query.rs`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use keel_core::decision::{Decision, DecisionRecord};
use keel_core::errors::CoreError;
use keel_core::ids::{generate_id, normalize_id};
use keel_core::responses::{RebuildReport, StatusResponse, SupersedeResponse};
use keel_core::validation::{DecisionInput, ValidDecisionInput, validate_input};

use crate::KeelDb;
use crate::error::DatabaseError;
use crate::journal::DecisionJournal;
use crate::sync::{SyncController, SyncOutcome};

/// Attempts at drawing an ID not already present in the index.
const MAX_ID_ATTEMPTS: usize = 16;

pub struct KeelService {
    db: KeelDb,
    journal: DecisionJournal,
    index_path: String,
    opened_with: SyncOutcome,
}

impl KeelService {
    /// Open the journal and index, rebuilding the index if it is stale.
    ///
    /// # Arguments
    ///
    /// * `journal_path` — Path to `decisions.jsonl`. It need not exist yet.
    /// * `index_path` — Path to the libSQL index file, or `":memory:"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the index cannot be opened or the
    /// reconcile fails.
    pub async fn open(
        journal_path: impl Into<PathBuf>,
        index_path: &str,
    ) -> Result<Self, DatabaseError> {
        if index_path != ":memory:" {
            if let Some(parent) = Path::new(index_path).parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let db = KeelDb::open_local(index_path).await?;
        Self::from_parts(db, DecisionJournal::new(journal_path), index_path).await
    }

    /// Wrap an already-open index and reconcile it with `journal`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the reconcile fails.
    pub async fn from_parts(
        db: KeelDb,
        journal: DecisionJournal,
        index_path: &str,
    ) -> Result<Self, DatabaseError> {
        let opened_with = SyncController::reconcile(&db, &journal).await?;
        if let SyncOutcome::Rebuilt(ref report) = opened_with {
            tracing::info!(
                records = report.records_read,
                skipped = report.lines_skipped,
                "index rebuilt from journal"
            );
        }
        Ok(Self {
            db,
            journal,
            index_path: index_path.to_string(),
            opened_with,
        })
    }

    /// Access the underlying index handle.
    #[must_use]
    pub const fn db(&self) -> &KeelDb {
        &self.db
    }

    #[must_use]
    pub const fn journal(&self) -> &DecisionJournal {
        &self.journal
    }

    /// What reconciling did when this service was opened.
    #[must_use]
    pub const fn opened_with(&self) -> &SyncOutcome {
        &self.opened_with
    }

    /// Record a new decision.
    ///
    /// If the input names a decision it supersedes, that decision must exist
    /// and be active; it is marked superseded right after the new decision is
    /// appended.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` / `CoreError::AlreadySuperseded` (wrapped)
    /// for a bad supersession target, `DatabaseError::InvalidState` if no
    /// unused ID could be drawn, or `DatabaseError::Journal` if the append
    /// fails. Nothing is appended on error.
    pub async fn record_decision(
        &self,
        input: ValidDecisionInput,
    ) -> Result<Decision, DatabaseError> {
        let target = match input.supersedes.as_deref() {
            Some(id) => Some(self.supersedable(id).await?),
            None => None,
        };

        let id = self.unused_id(&input.problem, &input.choice).await?;
        let decision = input.into_decision(id, Utc::now());
        self.append(&DecisionRecord::from(decision.clone())).await?;

        if let Some(old) = target {
            self.append(&DecisionRecord::supersession(old.id, decision.id.clone()))
                .await?;
        }
        tracing::info!(id = %decision.id, kind = %decision.kind, "recorded decision");
        Ok(decision)
    }

    /// Replace an active decision with a new one.
    ///
    /// `type`, `files`, `symbols`, and `beads` default to the old decision's
    /// values when the input leaves them out.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidIdentifier`, `CoreError::NotFound`,
    /// `CoreError::AlreadySuperseded`, or `CoreError::Validation` (wrapped)
    /// before anything is appended, or any error from
    /// [`KeelService::record_decision`].
    pub async fn supersede(
        &self,
        old_id: &str,
        mut input: DecisionInput,
    ) -> Result<SupersedeResponse, DatabaseError> {
        let old = self.supersedable(old_id).await?;

        if input.kind.is_none() {
            input.kind = Some(old.kind.as_str().to_string());
        }
        if input.files.is_none() {
            input.files.clone_from(&old.files);
        }
        if input.symbols.is_none() {
            input.symbols.clone_from(&old.symbols);
        }
        if input.beads.is_none() {
            input.beads.clone_from(&old.beads);
        }
        input.supersedes = Some(old.id.clone());

        let valid = validate_input(&input).map_err(CoreError::from)?;
        let created = self.record_decision(valid).await?;
        Ok(SupersedeResponse {
            superseded: old.id,
            created,
        })
    }

    /// Rebuild the index from the journal unconditionally.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the journal cannot be read or the rebuild
    /// fails.
    pub async fn rebuild(&self) -> Result<RebuildReport, DatabaseError> {
        SyncController::rebuild(&self.db, &self.journal).await
    }

    /// Paths, staleness, and size of the index.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the staleness check or count fails.
    pub async fn status(&self) -> Result<StatusResponse, DatabaseError> {
        Ok(StatusResponse {
            journal_path: self.journal.path().display().to_string(),
            index_path: self.index_path.clone(),
            journal_exists: self.journal.exists(),
            stale: self.db.is_stale(&self.journal).await?,
            indexed_decisions: self.count().await?,
        })
    }

    async fn supersedable(&self, id: &str) -> Result<Decision, DatabaseError> {
        let id = normalize_id(id)?;
        let decision = self
            .by_id(&id)
            .await?
            .ok_or_else(|| CoreError::NotFound { id: id.clone() })?;
        if !decision.is_active() {
            return Err(CoreError::AlreadySuperseded {
                id,
                superseded_by: decision.superseded_by,
            }
            .into());
        }
        Ok(decision)
    }

    async fn unused_id(&self, problem: &str, choice: &str) -> Result<String, DatabaseError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = generate_id(problem, choice);
            if !self.db.contains(&id).await? {
                return Ok(id);
            }
            tracing::debug!(%id, "generated ID already in use, drawing again");
        }
        Err(DatabaseError::InvalidState(format!(
            "no unused decision ID after {MAX_ID_ATTEMPTS} attempts"
        )))
    }

    async fn append(&self, record: &DecisionRecord) -> Result<(), DatabaseError> {
        let before = self.journal.signature()?;
        let appended = self.journal.append(record)?;
        if let Err(e) =
            SyncController::record_write(&self.db, &self.journal, record, before, appended).await
        {
            tracing::warn!(
                id = %record.id,
                "index update failed after journal append, next open will rebuild: {e}"
            );
        }
        Ok(())
    }
}
