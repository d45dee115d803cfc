use std::io::Read as _;
use std::path::Path;

use anyhow::Context;
use keel_core::decision::DecidedBy;
use keel_core::enums::DecisionRole;
use keel_core::validation::DecisionInput;

use crate::cli::root_commands::DecisionFields;

/// Build a loosely-typed input from command-line flags.
///
/// Empty repeatable flags become absent, so `supersede` can fall back to the
/// old decision's lists. File paths under `project_root` are made relative.
#[must_use]
pub fn from_fields(fields: &DecisionFields, project_root: &Path) -> DecisionInput {
    DecisionInput {
        kind: fields.kind.clone(),
        problem: fields.problem.clone(),
        choice: fields.choice.clone(),
        rationale: fields.rationale.clone(),
        tradeoffs: non_empty(&fields.tradeoffs),
        role: Some(if fields.agent { "agent" } else { "human" }.to_string()),
        identifier: fields.identifier.clone(),
        files: non_empty(&fields.files).map(|files| {
            files
                .iter()
                .map(|file| relative_to_root(file, project_root))
                .collect()
        }),
        symbols: non_empty(&fields.symbols),
        beads: non_empty(&fields.beads),
        hypothesis: fields.hypothesis.clone(),
        success_criteria: fields.success_criteria.clone(),
        supersedes: None,
    }
}

/// The `--json` argument, read from stdin when it is `-`.
pub fn read_json_arg(raw: &str) -> anyhow::Result<serde_json::Value> {
    let text = if raw == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read decision JSON from stdin")?;
        buf
    } else {
        raw.to_string()
    };
    serde_json::from_str(&text).context("--json is not valid JSON")
}

/// Humans without an explicit identifier are attributed to `fallback`.
pub fn attribute(decided_by: &mut DecidedBy, fallback: impl FnOnce() -> Option<String>) {
    if decided_by.role == DecisionRole::Human && decided_by.identifier.is_none() {
        decided_by.identifier = fallback();
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values.to_vec())
    }
}

fn relative_to_root(path: &str, project_root: &Path) -> String {
    Path::new(path)
        .strip_prefix(project_root)
        .ok()
        .and_then(Path::to_str)
        .map_or_else(|| path.to_string(), String::from)
}
