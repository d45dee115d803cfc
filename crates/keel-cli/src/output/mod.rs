use keel_core::decision::Decision;
use keel_core::responses::DecisionContext;
use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::ui;

pub mod decision;
pub mod table;

use table::{Table, TableOptions};

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(&serde_json::to_value(value)?, table_options()),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Print a decision list; tables get the fixed decision columns.
pub fn output_decisions(decisions: &[Decision], format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Table {
        println!("{}", decision::list(decisions, table_options()));
        return Ok(());
    }
    output(&decisions, format)
}

/// Print one decision; tables get the full card.
pub fn output_decision(value: &Decision, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Table {
        println!("{}", decision::card(value, ui::prefs().color));
        return Ok(());
    }
    output(value, format)
}

pub fn output_context(value: &DecisionContext, format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Table {
        println!("{}", decision::context(value, table_options()));
        return Ok(());
    }
    output(value, format)
}

fn table_options() -> TableOptions {
    let prefs = ui::prefs();
    TableOptions {
        max_width: prefs.term_width,
        color: prefs.color,
    }
}

/// Generic table: arrays of objects become columns (first-seen key order),
/// a single object becomes key/value rows.
fn render_table(value: &Value, options: TableOptions) -> anyhow::Result<String> {
    let table = match value {
        Value::Array(items) if items.is_empty() => return Ok(String::from("(no rows)")),
        Value::Array(items) if items.iter().all(Value::is_object) => {
            let mut headers: Vec<&str> = Vec::new();
            for key in items.iter().filter_map(Value::as_object).flat_map(|m| m.keys()) {
                if !headers.contains(&key.as_str()) {
                    headers.push(key);
                }
            }
            let mut table = Table::new(headers.iter().copied());
            for map in items.iter().filter_map(Value::as_object) {
                table.push_row(
                    headers
                        .iter()
                        .map(|header| map.get(*header).map_or_else(|| String::from("-"), value_to_cell))
                        .collect(),
                );
            }
            table
        }
        Value::Array(items) => {
            let mut table = Table::new(["value"]);
            for item in items {
                table.push_row(vec![value_to_cell(item)]);
            }
            table
        }
        Value::Object(map) => {
            let mut table = Table::new(["key", "value"]);
            for (key, value) in map {
                table.push_row(vec![key.clone(), value_to_cell(value)]);
            }
            table
        }
        scalar => {
            let mut table = Table::new(["value"]);
            table.push_row(vec![value_to_cell(scalar)]);
            table
        }
    };
    Ok(table.render(options))
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
