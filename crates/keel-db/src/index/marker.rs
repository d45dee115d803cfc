//! The journal signature stored in `metadata`, and the staleness check.

use crate::KeelDb;
use crate::error::DatabaseError;
use crate::journal::{DecisionJournal, LogSignature};

const JOURNAL_MARKER_KEY: &str = "journal_signature";

impl KeelDb {
    /// Signature of the journal the index was last brought in line with.
    ///
    /// An unreadable marker counts as no marker.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the metadata query fails.
    pub async fn journal_marker(&self) -> Result<Option<LogSignature>, DatabaseError> {
        let Some(raw) = self.get_metadata(JOURNAL_MARKER_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(sig) => Ok(Some(sig)),
            Err(e) => {
                tracing::warn!("ignoring unreadable journal marker {raw:?}: {e}");
                Ok(None)
            }
        }
    }

    /// Record `signature` as the journal state the index reflects.
    /// `None` clears the marker.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the metadata write fails.
    pub async fn set_journal_marker(
        &self,
        signature: Option<LogSignature>,
    ) -> Result<(), DatabaseError> {
        match signature {
            Some(sig) => {
                let raw = serde_json::to_string(&sig).map_err(|e| DatabaseError::Other(e.into()))?;
                self.set_metadata(JOURNAL_MARKER_KEY, &raw).await
            }
            None => self.delete_metadata(JOURNAL_MARKER_KEY).await,
        }
    }

    /// Whether the index may not reflect the journal.
    ///
    /// A missing journal is never stale. Otherwise the index is stale unless
    /// the stored marker equals the journal's current signature. A journal
    /// whose metadata cannot be read counts as stale.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the marker cannot be read.
    pub async fn is_stale(&self, journal: &DecisionJournal) -> Result<bool, DatabaseError> {
        let current = match journal.signature() {
            Ok(Some(current)) => current,
            Ok(None) => return Ok(false),
            Err(error) => {
                tracing::debug!(%error, "journal signature unavailable, treating index as stale");
                return Ok(true);
            }
        };
        let stored = self.journal_marker().await?;
        Ok(stored != Some(current))
    }
}
