//! Output formatting for decoded result rows.
//!
//! Supports table, JSON, and CSV output formats.

use std::str::FromStr;

use anyhow::{anyhow, Result};
use comfy_table::{Cell, ContentArrangement, Table};
use quarry_common::Value;
use serde_json::{json, Value as JsonValue};

/// How decoded rows are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Bordered table.
    Table,
    /// JSON output.
    Json,
    /// CSV output.
    Csv,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(anyhow!("unknown output format '{other}'")),
        }
    }
}

/// Decoded rows with their column names.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Formats rows according to the specified format.
pub fn format_result(result: &ResultSet, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(format_table(result)),
        OutputFormat::Json => format_json(result),
        OutputFormat::Csv => format_csv(result),
    }
}

fn column_name(result: &ResultSet, index: usize) -> String {
    result
        .columns
        .get(index)
        .cloned()
        .unwrap_or_else(|| format!("column_{index}"))
}

/// Bordered table with the header row on top.
fn format_table(result: &ResultSet) -> String {
    let mut table = Table::new();

    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);

    if !result.columns.is_empty() {
        table.set_header(result.columns.iter().map(Cell::new));
    }

    for row in &result.rows {
        table.add_row(row.iter().map(|v| Cell::new(v.to_string())));
    }

    table.to_string()
}

/// Formats the result as an array of JSON objects.
fn format_json(result: &ResultSet) -> Result<String> {
    let rows: Vec<JsonValue> = result
        .rows
        .iter()
        .map(|row| {
            let object = row
                .iter()
                .enumerate()
                .map(|(i, value)| (column_name(result, i), value_to_json(value)))
                .collect();
            JsonValue::Object(object)
        })
        .collect();

    Ok(serde_json::to_string_pretty(&rows)?)
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Boolean(b) => json!(*b),
        Value::Integer(i) => json!(*i),
        Value::String(s) => json!(s),
        Value::Timestamp(_) => json!(value.to_string()),
    }
}

/// Formats the result as CSV. Nulls become empty cells.
fn format_csv(result: &ResultSet) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    if !result.columns.is_empty() {
        writer.write_record(&result.columns)?;
    }
    for row in &result.rows {
        writer.write_record(row.iter().map(|v| match v {
            Value::Null => String::new(),
            other => other.to_string(),
        }))?;
    }

    let bytes = writer.into_inner().map_err(|e| anyhow!("{}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}
