//! Journal / index integration tests
//!
//! End-to-end behavior with a file-backed index, across reopens:
//! - Journal as source of truth: reopen after external appends rebuilds
//! - Rebuilt index equals direct resolution of the journal
//! - Constraint lifecycle through raw journal records
//! - Full-text search with the substring fallback

use std::collections::BTreeSet;
use std::io::Write;

use tempfile::TempDir;

use keel_core::decision::{DecidedBy, Decision, DecisionRecord};
use keel_core::enums::{DecisionStatus, DecisionType};
use keel_core::state::resolve;
use keel_core::validation::{DecisionInput, validate_input};
use keel_db::journal::DecisionJournal;
use keel_db::query::QueryFilter;
use keel_db::service::KeelService;
use keel_db::sync::SyncOutcome;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn journal_path(&self) -> std::path::PathBuf {
        self.dir.path().join(".keel").join("decisions.jsonl")
    }

    fn index_path(&self) -> String {
        self.dir
            .path()
            .join(".keel")
            .join("index.db")
            .display()
            .to_string()
    }

    async fn open(&self) -> KeelService {
        KeelService::open(self.journal_path(), &self.index_path())
            .await
            .unwrap()
    }

    /// Append a record the way another process (or a git merge) would.
    fn append_externally(&self, record: &DecisionRecord) {
        DecisionJournal::new(self.journal_path()).append(record).unwrap();
    }
}

fn creation(id: &str, kind: DecisionType, problem: &str, choice: &str) -> DecisionRecord {
    DecisionRecord {
        id: id.to_string(),
        created_at: Some(chrono::Utc::now()),
        kind: Some(kind),
        problem: Some(problem.to_string()),
        choice: Some(choice.to_string()),
        decided_by: Some(DecidedBy::agent(Some("planner".into()))),
        status: Some(DecisionStatus::Active),
        ..DecisionRecord::default()
    }
}

fn id_set(decisions: &[Decision]) -> BTreeSet<String> {
    decisions.iter().map(|d| d.id.clone()).collect()
}

// ---------------------------------------------------------------------------
// Staleness and rebuild
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_open_of_empty_project_is_fresh() {
    let project = Project::new();
    let svc = project.open().await;
    assert_eq!(svc.opened_with(), &SyncOutcome::Fresh);
    assert!(svc.all(QueryFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn reopen_after_own_writes_does_not_rebuild() {
    let project = Project::new();
    {
        let svc = project.open().await;
        for i in 0..3 {
            let input = validate_input(&DecisionInput {
                kind: Some("process".into()),
                problem: Some(format!("Problem {i}")),
                choice: Some("Choice".into()),
                ..DecisionInput::default()
            })
            .unwrap();
            svc.record_decision(input).await.unwrap();
        }
    }

    let svc = project.open().await;
    assert_eq!(svc.opened_with(), &SyncOutcome::Fresh);
    assert_eq!(svc.count().await.unwrap(), 3);
}

#[tokio::test]
async fn external_append_triggers_rebuild_matching_direct_resolution() {
    let project = Project::new();
    {
        let svc = project.open().await;
        let input = validate_input(&DecisionInput {
            kind: Some("product".into()),
            problem: Some("Pricing page".into()),
            choice: Some("Three tiers".into()),
            ..DecisionInput::default()
        })
        .unwrap();
        svc.record_decision(input).await.unwrap();
    }

    project.append_externally(&creation("DEC-0b0b", DecisionType::Learning, "Merged in", "from a branch"));
    project.append_externally(&DecisionRecord::supersession("DEC-0b0b", "DEC-0c0c"));
    project.append_externally(&DecisionRecord::supersession("DEC-dddd", "DEC-0b0b"));
    {
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(project.journal_path())
            .unwrap();
        file.write_all(b"<<<<<<< conflict marker\n").unwrap();
    }

    let svc = project.open().await;
    let SyncOutcome::Rebuilt(report) = svc.opened_with() else {
        panic!("expected a rebuild, got {:?}", svc.opened_with());
    };
    assert_eq!(report.records_read, 4);
    assert_eq!(report.lines_skipped, 1);
    assert_eq!(report.decisions_indexed, 2);
    assert_eq!(report.orphans, 1);

    let read = svc.journal().read_all().unwrap();
    let expected = resolve(read.records).decisions();
    let all = svc
        .all(QueryFilter::default())
        .await
        .unwrap();
    assert_eq!(id_set(&all), id_set(&expected));
    for decision in &expected {
        assert_eq!(svc.by_id(&decision.id).await.unwrap().as_ref(), Some(decision));
    }

    let orphans = svc.orphans().await.unwrap();
    assert_eq!(orphans.len(), 1);
    assert_eq!(orphans[0].id, "DEC-dddd");

    let status = svc.status().await.unwrap();
    assert!(!status.stale);
}

#[tokio::test]
async fn deleted_index_is_rebuilt_from_journal() {
    let project = Project::new();
    project.append_externally(&creation("DEC-0001", DecisionType::Product, "P", "C"));
    {
        let svc = project.open().await;
        assert!(matches!(svc.opened_with(), SyncOutcome::Rebuilt(_)));
    }
    std::fs::remove_file(project.index_path()).unwrap();

    let svc = project.open().await;
    assert!(matches!(svc.opened_with(), SyncOutcome::Rebuilt(_)));
    assert!(svc.by_id("DEC-0001").await.unwrap().is_some());
}

#[tokio::test]
async fn unreadable_journal_opens_with_empty_index() {
    let project = Project::new();
    std::fs::create_dir_all(project.journal_path()).unwrap();

    let svc = project.open().await;
    let SyncOutcome::Rebuilt(report) = svc.opened_with() else {
        panic!("expected a rebuild, got {:?}", svc.opened_with());
    };
    assert_eq!(report.records_read, 0);
    assert_eq!(svc.count().await.unwrap(), 0);
    assert!(svc.status().await.unwrap().stale);
}

// ---------------------------------------------------------------------------
// Constraint lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn constraint_lifecycle_through_journal_records() {
    let project = Project::new();
    project.append_externally(&creation("DEC-aaaa", DecisionType::Constraint, "P1", "C1"));

    let svc = project.open().await;
    let found = svc.by_id("DEC-aaaa").await.unwrap().unwrap();
    assert_eq!(found.status, DecisionStatus::Active);
    assert_eq!(found.problem, "P1");
    assert!(svc
        .active_constraints()
        .await
        .unwrap()
        .iter()
        .any(|d| d.id == "DEC-aaaa"));

    // Full-text and type filter see it while active.
    assert_eq!(
        id_set(&svc.full_text("P1", QueryFilter::default()).await.unwrap()),
        BTreeSet::from(["DEC-aaaa".to_string()])
    );
    let constraints = QueryFilter {
        kind: Some(DecisionType::Constraint),
        ..QueryFilter::default()
    };
    assert_eq!(
        id_set(&svc.all(constraints).await.unwrap()),
        BTreeSet::from(["DEC-aaaa".to_string()])
    );

    // Unbalanced search syntax still finds it through the fallback, exactly
    // as a literal substring search would.
    let primary = svc.full_text("P1 OR (", QueryFilter::default()).await.unwrap();
    let literal = svc
        .substring_search("P1 OR (", QueryFilter::default())
        .await
        .unwrap();
    assert_eq!(id_set(&primary), id_set(&literal));
    drop(svc);

    project.append_externally(&DecisionRecord::supersession("DEC-aaaa", "DEC-bbbb"));
    let svc = project.open().await;
    let found = svc.by_id("DEC-aaaa").await.unwrap().unwrap();
    assert_eq!(found.status, DecisionStatus::Superseded);
    assert_eq!(found.superseded_by.as_deref(), Some("DEC-bbbb"));
    assert_eq!(found.problem, "P1");
    assert!(svc
        .active_constraints()
        .await
        .unwrap()
        .iter()
        .all(|d| d.id != "DEC-aaaa"));
}
