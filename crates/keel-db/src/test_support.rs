//! Shared test utilities for keel-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use keel_core::decision::{DecidedBy, DecisionRecord};
    use keel_core::enums::{DecisionStatus, DecisionType};
    use keel_core::validation::{DecisionInput, ValidDecisionInput, validate_input};
    use tempfile::TempDir;

    use crate::KeelDb;
    use crate::journal::DecisionJournal;
    use crate::service::KeelService;

    /// In-memory index with a journal in a fresh temp dir.
    ///
    /// Keep the returned `TempDir` alive for the duration of the test.
    pub async fn test_service() -> (TempDir, KeelService) {
        let dir = TempDir::new().unwrap();
        let db = KeelDb::open_local(":memory:").await.unwrap();
        let journal = DecisionJournal::new(dir.path().join(".keel").join("decisions.jsonl"));
        let svc = KeelService::from_parts(db, journal, ":memory:")
            .await
            .unwrap();
        (dir, svc)
    }

    /// A complete creation record with fixed timestamp and choice `C1`.
    pub fn creation(id: &str, kind: DecisionType, problem: &str) -> DecisionRecord {
        DecisionRecord {
            id: id.to_string(),
            created_at: Some("2026-03-01T10:00:00Z".parse().unwrap()),
            kind: Some(kind),
            problem: Some(problem.to_string()),
            choice: Some("C1".into()),
            decided_by: Some(DecidedBy::human(Some("dev@example.com".into()))),
            status: Some(DecisionStatus::Active),
            ..DecisionRecord::default()
        }
    }

    /// Validated input for `KeelService::record_decision`.
    pub fn decide(kind: DecisionType, problem: &str, choice: &str) -> ValidDecisionInput {
        validate_input(&DecisionInput {
            kind: Some(kind.as_str().into()),
            problem: Some(problem.into()),
            choice: Some(choice.into()),
            ..DecisionInput::default()
        })
        .unwrap()
    }
}
