use anyhow::bail;
use keel_core::decision::{Decision, DecisionRecord};
use keel_core::responses::{DecisionContext, RebuildReport, StatusResponse};
use keel_core::validation::DecisionInput;
use schemars::schema_for;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

/// Handle `keel schema`. Needs no project, so it runs before the journal is
/// opened.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = schema_for_type(&args.type_name)?;
    output(&schema, flags.format)
}

fn schema_for_type(type_name: &str) -> anyhow::Result<serde_json::Value> {
    let schema = match type_name.trim().to_ascii_lowercase().as_str() {
        "record" => schema_for!(DecisionRecord),
        "decision" => schema_for!(Decision),
        "input" => schema_for!(DecisionInput),
        "context" => schema_for!(DecisionContext),
        "rebuild" => schema_for!(RebuildReport),
        "status" => schema_for!(StatusResponse),
        other => bail!(
            "unknown schema type '{other}': expected record, decision, input, context, rebuild, or status"
        ),
    };
    Ok(serde_json::to_value(schema)?)
}
