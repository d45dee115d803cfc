//! Human-readable decision cards and lists.

use std::fmt::Write as _;

use keel_core::decision::Decision;
use keel_core::responses::DecisionContext;

use super::table::{Table, TableOptions, color_code};

const DECISION_COLUMNS: [&str; 5] = ["id", "type", "status", "problem", "choice"];

/// One row per decision.
#[must_use]
pub fn list(decisions: &[Decision], options: TableOptions) -> String {
    if decisions.is_empty() {
        return String::from("No decisions found.");
    }
    let mut table = Table::new(DECISION_COLUMNS);
    for decision in decisions {
        table.push_row(vec![
            decision.id.clone(),
            decision.kind.to_string(),
            decision.status.to_string(),
            decision.problem.clone(),
            decision.choice.clone(),
        ]);
    }
    table.render(options)
}

/// Every field of one decision, blank sections omitted.
#[must_use]
pub fn card(decision: &Decision, color: bool) -> String {
    let tint = |value: &str| paint(value, color);
    let mut out = String::new();

    let _ = writeln!(out, "Decision {}", decision.id);
    let _ = writeln!(out);
    let _ = writeln!(out, "Type:     {}", tint(decision.kind.as_str()));
    let _ = writeln!(out, "Status:   {}", tint(decision.status.as_str()));
    let _ = writeln!(out, "Created:  {}", decision.created_at.to_rfc3339());

    section(&mut out, "Problem", Some(decision.problem.as_str()));
    section(&mut out, "Choice", Some(decision.choice.as_str()));
    section(&mut out, "Rationale", decision.rationale.as_deref());
    bullets(&mut out, "Tradeoffs", decision.tradeoffs.as_deref(), "- ");
    bullets(&mut out, "Files", decision.files.as_deref(), "");
    bullets(&mut out, "Symbols", decision.symbols.as_deref(), "");
    bullets(&mut out, "Beads", decision.beads.as_deref(), "");

    let _ = writeln!(out);
    let who = &decision.decided_by;
    match who.identifier.as_deref() {
        Some(identifier) => {
            let _ = writeln!(out, "Decided by: {} ({identifier})", who.role);
        }
        None => {
            let _ = writeln!(out, "Decided by: {}", who.role);
        }
    }
    if let Some(old) = &decision.supersedes {
        let _ = writeln!(out, "Supersedes: {old}");
    }
    if let Some(new) = &decision.superseded_by {
        let _ = writeln!(out, "Superseded by: {new}");
    }

    section(&mut out, "Hypothesis", decision.hypothesis.as_deref());
    section(&mut out, "Success Criteria", decision.success_criteria.as_deref());

    out.trim_end().to_string()
}

/// Matching decisions followed by the active constraints.
#[must_use]
pub fn context(result: &DecisionContext, options: TableOptions) -> String {
    let mut out = String::new();
    if result.decisions.is_empty() {
        out.push_str("No decisions directly affect this target.");
    } else {
        out.push_str("Decisions affecting this target:\n\n");
        out.push_str(&list(&result.decisions, options));
    }

    if !result.constraints.is_empty() {
        out.push_str("\n\nActive constraints:\n\n");
        let mut table = Table::new(["id", "choice"]);
        for constraint in &result.constraints {
            table.push_row(vec![constraint.id.clone(), constraint.choice.clone()]);
        }
        out.push_str(&table.render(options));
    }
    out
}

fn section(out: &mut String, title: &str, body: Option<&str>) {
    if let Some(body) = body {
        let _ = write!(out, "\n{title}\n{body}\n");
    }
}

fn bullets(out: &mut String, title: &str, items: Option<&[String]>, marker: &str) {
    let Some(items) = items.filter(|items| !items.is_empty()) else {
        return;
    };
    let _ = write!(out, "\n{title}\n");
    for item in items {
        let _ = writeln!(out, "  {marker}{item}");
    }
}

fn paint(value: &str, color: bool) -> String {
    match color_code(value) {
        Some(code) if color => format!("\u{1b}[{code}m{value}\u{1b}[0m"),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use keel_core::decision::{DecidedBy, Decision};
    use keel_core::enums::{DecisionStatus, DecisionType};
    use keel_core::responses::DecisionContext;

    use super::{card, context, list};
    use crate::output::table::TableOptions;

    fn decision(id: &str, kind: DecisionType) -> Decision {
        Decision {
            id: id.into(),
            created_at: Utc::now(),
            kind,
            problem: "Index drifts after crashes".into(),
            choice: "Rebuild on signature change".into(),
            rationale: None,
            tradeoffs: Some(vec!["Full replay".into()]),
            decided_by: DecidedBy::human(Some("dev@example.com".into())),
            files: Some(vec!["src/sync.rs".into()]),
            symbols: None,
            beads: None,
            status: DecisionStatus::Active,
            superseded_by: None,
            supersedes: Some("DEC-0001".into()),
            hypothesis: None,
            success_criteria: None,
        }
    }

    #[test]
    fn card_skips_absent_sections() {
        let out = card(&decision("DEC-a1b2", DecisionType::Constraint), false);
        assert!(out.starts_with("Decision DEC-a1b2"));
        assert!(out.contains("Type:     constraint"));
        assert!(out.contains("  - Full replay"));
        assert!(out.contains("  src/sync.rs"));
        assert!(out.contains("Decided by: human (dev@example.com)"));
        assert!(out.contains("Supersedes: DEC-0001"));
        assert!(!out.contains("Rationale"));
        assert!(!out.contains("Symbols"));
        assert!(!out.contains('\u{1b}'));
    }

    #[test]
    fn card_colors_type_and_status() {
        let out = card(&decision("DEC-a1b2", DecisionType::Product), true);
        assert!(out.contains("\u{1b}[34mproduct\u{1b}[0m"));
        assert!(out.contains("\u{1b}[32mactive\u{1b}[0m"));
    }

    #[test]
    fn empty_list_has_a_message() {
        assert_eq!(list(&[], TableOptions::default()), "No decisions found.");
    }

    #[test]
    fn context_lists_constraints_after_matches() {
        let result = DecisionContext {
            decisions: vec![],
            constraints: vec![decision("DEC-c0de", DecisionType::Constraint)],
        };
        let out = context(&result, TableOptions::default());
        assert!(out.starts_with("No decisions directly affect this target."));
        let constraints_at = out.find("Active constraints:").unwrap();
        assert!(out[constraints_at..].contains("DEC-c0de"));
    }
}
