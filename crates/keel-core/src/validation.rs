//! Boundary validation for new decisions.
//!
//! Input arrives loosely typed (CLI flags, JSON from an agent). `validate_input`
//! checks it against the closed enums and required-field rules and returns
//! either a typed `ValidDecisionInput` or every field-level violation at once.
//! Nothing reaches the journal without passing through here.

use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::decision::{DecidedBy, Decision};
use crate::enums::{DecisionRole, DecisionStatus, DecisionType};
use crate::ids::normalize_id;

/// Loosely-typed input for a new decision.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DecisionInput {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub problem: Option<String>,
    #[serde(default)]
    pub choice: Option<String>,
    #[serde(default)]
    pub rationale: Option<String>,
    #[serde(default)]
    pub tradeoffs: Option<Vec<String>>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub files: Option<Vec<String>>,
    #[serde(default)]
    pub symbols: Option<Vec<String>>,
    #[serde(default)]
    pub beads: Option<Vec<String>>,
    #[serde(default)]
    pub hypothesis: Option<String>,
    #[serde(default)]
    pub success_criteria: Option<String>,
    #[serde(default)]
    pub supersedes: Option<String>,
}

/// Input that passed validation. Blank optional text is normalized to absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDecisionInput {
    pub kind: DecisionType,
    pub problem: String,
    pub choice: String,
    pub rationale: Option<String>,
    pub tradeoffs: Option<Vec<String>>,
    pub decided_by: DecidedBy,
    pub files: Option<Vec<String>>,
    pub symbols: Option<Vec<String>>,
    pub beads: Option<Vec<String>>,
    pub hypothesis: Option<String>,
    pub success_criteria: Option<String>,
    pub supersedes: Option<String>,
}

impl ValidDecisionInput {
    /// Build the creation-state `Decision` for a freshly assigned ID.
    #[must_use]
    pub fn into_decision(self, id: String, created_at: DateTime<Utc>) -> Decision {
        Decision {
            id,
            created_at,
            kind: self.kind,
            problem: self.problem,
            choice: self.choice,
            rationale: self.rationale,
            tradeoffs: self.tradeoffs,
            decided_by: self.decided_by,
            files: self.files,
            symbols: self.symbols,
            beads: self.beads,
            status: DecisionStatus::Active,
            superseded_by: None,
            supersedes: self.supersedes,
            hypothesis: self.hypothesis,
            success_criteria: self.success_criteria,
        }
    }
}

/// A single rejected field.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Every violation found in one input.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ValidationErrors {
    pub violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Names of the offending fields, in the order they were checked.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.field.as_str()).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .violations
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate a loosely-typed input.
///
/// # Errors
///
/// Returns `ValidationErrors` listing every offending field.
pub fn validate_input(input: &DecisionInput) -> Result<ValidDecisionInput, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let kind = match input.kind.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push("type", "is required");
            None
        }
        Some(raw) => raw.parse::<DecisionType>().map_or_else(
            |_| {
                errors.push(
                    "type",
                    format!("'{raw}' is not one of product, process, constraint, learning"),
                );
                None
            },
            Some,
        ),
    };

    let problem = required_text(&mut errors, "problem", input.problem.as_deref());
    let choice = required_text(&mut errors, "choice", input.choice.as_deref());

    let role = match input.role.as_deref().map(str::trim) {
        None | Some("" | "human") => Some(DecisionRole::Human),
        Some("agent") => Some(DecisionRole::Agent),
        Some(other) => {
            errors.push("role", format!("'{other}' is not one of human, agent"));
            None
        }
    };

    let tradeoffs = list(&mut errors, "tradeoffs", input.tradeoffs.as_deref());
    let files = list(&mut errors, "files", input.files.as_deref());
    let symbols = list(&mut errors, "symbols", input.symbols.as_deref());
    let beads = list(&mut errors, "beads", input.beads.as_deref());

    let supersedes = match optional_text(input.supersedes.as_deref()) {
        None => None,
        Some(raw) => normalize_id(&raw).map_or_else(
            |_| {
                errors.push("supersedes", format!("'{raw}' is not a decision ID"));
                None
            },
            Some,
        ),
    };

    match (kind, problem, choice, role) {
        (Some(kind), Some(problem), Some(choice), Some(role)) if errors.is_empty() => {
            Ok(ValidDecisionInput {
                kind,
                problem,
                choice,
                rationale: optional_text(input.rationale.as_deref()),
                tradeoffs,
                decided_by: DecidedBy {
                    role,
                    identifier: optional_text(input.identifier.as_deref()),
                },
                files,
                symbols,
                beads,
                hypothesis: optional_text(input.hypothesis.as_deref()),
                success_criteria: optional_text(input.success_criteria.as_deref()),
                supersedes,
            })
        }
        _ => Err(errors),
    }
}

/// Validate an untyped JSON object.
///
/// # Errors
///
/// Returns `ValidationErrors` if the value is not an object of the expected
/// shape or fails [`validate_input`].
pub fn validate_value(value: &serde_json::Value) -> Result<ValidDecisionInput, ValidationErrors> {
    let input: DecisionInput = serde_json::from_value(value.clone()).map_err(|e| {
        let mut errors = ValidationErrors::default();
        errors.push("$", e.to_string());
        errors
    })?;
    validate_input(&input)
}

fn required_text(errors: &mut ValidationErrors, field: &str, value: Option<&str>) -> Option<String> {
    let text = optional_text(value);
    if text.is_none() {
        errors.push(field, "must be a non-empty string");
    }
    text
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn list(errors: &mut ValidationErrors, field: &str, values: Option<&[String]>) -> Option<Vec<String>> {
    let values = values?;
    let mut out = Vec::with_capacity(values.len());
    for (idx, value) in values.iter().enumerate() {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            errors.push(format!("{field}[{idx}]"), "must not be blank");
        } else if !out.iter().any(|seen: &String| seen == trimmed) {
            out.push(trimmed.to_string());
        }
    }
    if out.is_empty() { None } else { Some(out) }
}
