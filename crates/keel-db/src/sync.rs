//! Keeps the index in line with the journal.
//!
//! Two entry points: `reconcile` on open (rebuild if the journal moved since
//! the index last saw it) and `record_write` after each append made by this
//! process (apply the record directly, advance the marker only when nothing
//! else touched the journal in between).

use std::time::Instant;

use keel_core::decision::DecisionRecord;
use keel_core::responses::RebuildReport;

use crate::KeelDb;
use crate::error::DatabaseError;
use crate::journal::{DecisionJournal, LogSignature};

/// Result of reconciling the index on open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The index already reflected the journal.
    Fresh,
    /// The index was rebuilt from the journal.
    Rebuilt(RebuildReport),
}

pub struct SyncController;

impl SyncController {
    /// Rebuild the index if it is stale.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the index cannot be read or rebuilt.
    pub async fn reconcile(
        db: &KeelDb,
        journal: &DecisionJournal,
    ) -> Result<SyncOutcome, DatabaseError> {
        if !db.is_stale(journal).await? {
            tracing::debug!("index is fresh");
            return Ok(SyncOutcome::Fresh);
        }
        tracing::debug!(path = %journal.path().display(), "index is stale, rebuilding");
        Ok(SyncOutcome::Rebuilt(Self::rebuild(db, journal).await?))
    }

    /// Rebuild the index from the full journal and advance the marker.
    ///
    /// The signature is taken before reading. If the journal grows during
    /// the read, the marker lags and the next open rebuilds again.
    ///
    /// An unreadable journal yields an empty index with the marker cleared,
    /// so the next open retries.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the rebuild itself fails.
    pub async fn rebuild(
        db: &KeelDb,
        journal: &DecisionJournal,
    ) -> Result<RebuildReport, DatabaseError> {
        let start = Instant::now();
        let snapshot = journal
            .signature()
            .and_then(|signature| Ok((signature, journal.read_all()?)));
        let (signature, read) = match snapshot {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::warn!(
                    path = %journal.path().display(),
                    %error,
                    "journal is unreadable, indexing nothing"
                );
                db.rebuild(Vec::new()).await?;
                db.set_journal_marker(None).await?;
                return Ok(RebuildReport {
                    rebuilt: true,
                    records_read: 0,
                    lines_skipped: 0,
                    decisions_indexed: 0,
                    orphans: 0,
                    duration_ms: elapsed_ms(start),
                });
            }
        };
        let records_read = read.records.len();
        let lines_skipped = read.warnings.len();

        let state = db.rebuild(read.records).await?;
        db.set_journal_marker(signature).await?;

        let orphans = state.orphans().len();
        Ok(RebuildReport {
            rebuilt: true,
            records_read: to_u32(records_read),
            lines_skipped: to_u32(lines_skipped),
            decisions_indexed: to_u32(state.len() - orphans),
            orphans: to_u32(orphans),
            duration_ms: elapsed_ms(start),
        })
    }

    /// Apply a record this process just appended.
    ///
    /// `before` is the journal signature taken right before the append and
    /// `appended` the byte count the append reported. The marker advances
    /// only if it matched `before` and the journal grew by exactly
    /// `appended` bytes; otherwise another writer got in between and the
    /// marker is left behind so the next open rebuilds.
    ///
    /// Returns whether the marker advanced.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the upsert or marker update fails.
    pub async fn record_write(
        db: &KeelDb,
        journal: &DecisionJournal,
        record: &DecisionRecord,
        before: Option<LogSignature>,
        appended: u64,
    ) -> Result<bool, DatabaseError> {
        let stored = db.journal_marker().await?;
        db.upsert(record).await?;

        let after = journal.signature()?;
        let expected_len = before.map_or(0, |sig| sig.len) + appended;
        let in_lockstep = stored == before && after.is_some_and(|sig| sig.len == expected_len);

        if in_lockstep {
            db.set_journal_marker(after).await?;
        } else {
            tracing::debug!(
                id = %record.id,
                "journal changed outside this write; index will rebuild on next open"
            );
        }
        Ok(in_lockstep)
    }
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
