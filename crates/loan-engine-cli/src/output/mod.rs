pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Per-period arrays, in the order a single-table formatter should prefer them.
const ROW_ARRAYS: [&str; 4] = ["schedule", "rows", "balance_trace", "yearly_summary"];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` object of a computation envelope, or the value itself.
fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Scalar fields of a result, with nested objects flattened to dotted keys.
/// Arrays of objects are skipped; formatters render them as their own tables.
fn flatten_scalars(map: &Map<String, Value>) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten_into("", map, &mut out);
    out
}

fn flatten_into(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, out),
            Value::Array(items) if items.iter().any(Value::is_object) => {}
            _ => out.push((name, format_scalar(val))),
        }
    }
}

/// Named arrays of row objects inside a result, e.g. the amortisation schedule.
fn row_arrays(map: &Map<String, Value>) -> Vec<(&str, &[Value])> {
    ROW_ARRAYS
        .iter()
        .filter_map(|key| match map.get(*key) {
            Some(Value::Array(rows)) if !rows.is_empty() => Some((*key, rows.as_slice())),
            _ => None,
        })
        .collect()
}

/// Column names across every row, in first-seen order. Tagged values such as
/// break-even months flatten differently per row.
fn row_headers(rows: &[Value]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for map in rows.iter().filter_map(Value::as_object) {
        for (key, _) in flatten_scalars(map) {
            if !headers.contains(&key) {
                headers.push(key);
            }
        }
    }
    headers
}

/// One cell per header for a row object; missing columns are blank.
fn row_cells(headers: &[String], row: &Map<String, Value>) -> Vec<String> {
    let flat = flatten_scalars(row);
    headers
        .iter()
        .map(|h| {
            flat.iter()
                .find(|(k, _)| k == h)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        })
        .collect()
}

fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_scalar).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
