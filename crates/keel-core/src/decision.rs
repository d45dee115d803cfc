//! The `Decision` entity and its partial journal form.
//!
//! The journal never stores a decision as one mutable object. Each line is a
//! `DecisionRecord`: an `id` plus whichever fields that write set. A creation
//! record carries every required field; a supersession record carries only
//! `status` and `superseded_by`. The current `Decision` is the field-wise
//! merge of all records sharing an `id`, in append order.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::{DecisionRole, DecisionStatus, DecisionType};

/// Who made a decision, optionally with a free-form identifier
/// (git email, agent name).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DecidedBy {
    pub role: DecisionRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl DecidedBy {
    #[must_use]
    pub const fn human(identifier: Option<String>) -> Self {
        Self {
            role: DecisionRole::Human,
            identifier,
        }
    }

    #[must_use]
    pub const fn agent(identifier: Option<String>) -> Self {
        Self {
            role: DecisionRole::Agent,
            identifier,
        }
    }
}

/// Current, fully-resolved state of a decision.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Decision {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: DecisionType,
    pub problem: String,
    pub choice: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tradeoffs: Option<Vec<String>>,
    pub decided_by: DecidedBy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beads: Option<Vec<String>>,
    pub status: DecisionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supersedes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hypothesis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_criteria: Option<String>,
}

impl Decision {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == DecisionStatus::Active
    }

    #[must_use]
    pub fn files(&self) -> &[String] {
        self.files.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn symbols(&self) -> &[String] {
        self.symbols.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn beads(&self) -> &[String] {
        self.beads.as_deref().unwrap_or_default()
    }
}

/// One journal line: a partial view of a decision.
///
/// Every field except `id` is either present with a value or absent. Absent
/// fields are omitted when serialized; an explicit `null` on read is treated
/// the same as absent, so a record can add or override a field but never
/// clear one.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DecisionRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DecisionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tradeoffs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<DecidedBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beads: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DecisionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supersedes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hypothesis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_criteria: Option<String>,
}

/// Overwrite `acc` only when `next` carries a value.
fn overlay<T>(acc: &mut Option<T>, next: Option<T>) {
    if next.is_some() {
        *acc = next;
    }
}

impl DecisionRecord {
    /// The status-only mutation appended when `id` is superseded by `successor`.
    #[must_use]
    pub fn supersession(id: impl Into<String>, successor: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: Some(DecisionStatus::Superseded),
            superseded_by: Some(successor.into()),
            ..Self::default()
        }
    }

    /// Merge a later record for the same ID over this one.
    ///
    /// Only fields present in `next` are touched. `id` never changes.
    pub fn merge(&mut self, next: Self) {
        debug_assert_eq!(self.id, next.id, "merging records of different decisions");
        overlay(&mut self.created_at, next.created_at);
        overlay(&mut self.kind, next.kind);
        overlay(&mut self.problem, next.problem);
        overlay(&mut self.choice, next.choice);
        overlay(&mut self.rationale, next.rationale);
        overlay(&mut self.tradeoffs, next.tradeoffs);
        overlay(&mut self.decided_by, next.decided_by);
        overlay(&mut self.files, next.files);
        overlay(&mut self.symbols, next.symbols);
        overlay(&mut self.beads, next.beads);
        overlay(&mut self.status, next.status);
        overlay(&mut self.superseded_by, next.superseded_by);
        overlay(&mut self.supersedes, next.supersedes);
        overlay(&mut self.hypothesis, next.hypothesis);
        overlay(&mut self.success_criteria, next.success_criteria);
    }

    /// Required fields this record still lacks to form a `Decision`.
    #[must_use]
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.created_at.is_none() {
            missing.push("created_at");
        }
        if self.kind.is_none() {
            missing.push("type");
        }
        if self.problem.is_none() {
            missing.push("problem");
        }
        if self.choice.is_none() {
            missing.push("choice");
        }
        if self.decided_by.is_none() {
            missing.push("decided_by");
        }
        if self.status.is_none() {
            missing.push("status");
        }
        missing
    }

    /// Association lists, empty when absent.
    #[must_use]
    pub fn files(&self) -> &[String] {
        self.files.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn symbols(&self) -> &[String] {
        self.symbols.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn beads(&self) -> &[String] {
        self.beads.as_deref().unwrap_or_default()
    }
}

impl From<Decision> for DecisionRecord {
    fn from(d: Decision) -> Self {
        Self {
            id: d.id,
            created_at: Some(d.created_at),
            kind: Some(d.kind),
            problem: Some(d.problem),
            choice: Some(d.choice),
            rationale: d.rationale,
            tradeoffs: d.tradeoffs,
            decided_by: Some(d.decided_by),
            files: d.files,
            symbols: d.symbols,
            beads: d.beads,
            status: Some(d.status),
            superseded_by: d.superseded_by,
            supersedes: d.supersedes,
            hypothesis: d.hypothesis,
            success_criteria: d.success_criteria,
        }
    }
}

/// A resolved record that never received a creation entry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Decision {id} is incomplete (missing: {})", missing.join(", "))]
pub struct IncompleteRecord {
    pub id: String,
    pub missing: Vec<&'static str>,
}

impl TryFrom<DecisionRecord> for Decision {
    type Error = IncompleteRecord;

    fn try_from(r: DecisionRecord) -> Result<Self, Self::Error> {
        let missing = r.missing_required_fields();
        match (r.created_at, r.kind, r.problem, r.choice, r.decided_by, r.status) {
            (
                Some(created_at),
                Some(kind),
                Some(problem),
                Some(choice),
                Some(decided_by),
                Some(status),
            ) => Ok(Self {
                id: r.id,
                created_at,
                kind,
                problem,
                choice,
                rationale: r.rationale,
                tradeoffs: r.tradeoffs,
                decided_by,
                files: r.files,
                symbols: r.symbols,
                beads: r.beads,
                status,
                superseded_by: r.superseded_by,
                supersedes: r.supersedes,
                hypothesis: r.hypothesis,
                success_criteria: r.success_criteria,
            }),
            _ => Err(IncompleteRecord { id: r.id, missing }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn creation(id: &str) -> DecisionRecord {
        DecisionRecord {
            id: id.to_string(),
            created_at: Some("2026-03-01T10:00:00Z".parse().unwrap()),
            kind: Some(DecisionType::Constraint),
            problem: Some("P1".into()),
            choice: Some("C1".into()),
            rationale: Some("because".into()),
            decided_by: Some(DecidedBy::human(Some("dev@example.com".into()))),
            files: Some(vec!["src/lib.rs".into()]),
            status: Some(DecisionStatus::Active),
            ..DecisionRecord::default()
        }
    }

    #[test]
    fn merge_overwrites_only_present_fields() {
        let mut acc = creation("DEC-aaaa");
        acc.merge(DecisionRecord::supersession("DEC-aaaa", "DEC-bbbb"));

        let mut expected = creation("DEC-aaaa");
        expected.status = Some(DecisionStatus::Superseded);
        expected.superseded_by = Some("DEC-bbbb".into());
        assert_eq!(acc, expected);
    }

    #[test]
    fn merge_never_clears_fields() {
        let mut acc = creation("DEC-aaaa");
        acc.merge(DecisionRecord {
            id: "DEC-aaaa".into(),
            ..DecisionRecord::default()
        });
        assert_eq!(acc, creation("DEC-aaaa"));
    }

    #[test]
    fn explicit_null_reads_as_absent() {
        let record: DecisionRecord = serde_json::from_str(
            r#"{"id":"DEC-aaaa","status":"superseded","superseded_by":"DEC-bbbb","rationale":null}"#,
        )
        .unwrap();
        assert!(record.rationale.is_none());

        let mut acc = creation("DEC-aaaa");
        acc.merge(record);
        assert_eq!(acc.rationale.as_deref(), Some("because"));
    }

    #[test]
    fn supersession_serializes_only_mutated_fields() {
        let json = serde_json::to_value(DecisionRecord::supersession("DEC-aaaa", "DEC-bbbb")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "DEC-aaaa", "status": "superseded", "superseded_by": "DEC-bbbb"})
        );
    }

    #[test]
    fn complete_record_converts_to_decision() {
        let decision = Decision::try_from(creation("DEC-aaaa")).unwrap();
        assert_eq!(decision.kind, DecisionType::Constraint);
        assert_eq!(decision.files(), ["src/lib.rs".to_string()]);
        assert!(decision.symbols().is_empty());
        assert!(decision.is_active());

        let back = DecisionRecord::from(decision);
        assert_eq!(back, creation("DEC-aaaa"));
    }

    #[test]
    fn orphan_record_lists_missing_fields() {
        let err = Decision::try_from(DecisionRecord::supersession("DEC-cccc", "DEC-dddd")).unwrap_err();
        assert_eq!(err.id, "DEC-cccc");
        assert_eq!(
            err.missing,
            vec!["created_at", "type", "problem", "choice", "decided_by"]
        );
    }

    #[test]
    fn decision_json_uses_type_key_and_omits_absent_fields() {
        let decision = Decision::try_from(creation("DEC-aaaa")).unwrap();
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["type"], "constraint");
        assert!(json.get("kind").is_none());
        assert!(json.get("tradeoffs").is_none());
        assert!(json.get("superseded_by").is_none());
        assert_eq!(json["decided_by"]["role"], "human");
    }
}
