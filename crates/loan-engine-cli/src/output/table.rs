use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten_scalars, format_scalar, result_of, row_arrays, row_cells, row_headers};

/// Render a result as a Field/Value table followed by one table per row array
/// (schedule, offers, balance trace, yearly summary).
pub fn print_table(value: &Value) {
    match result_of(value) {
        Value::Object(result) => {
            print_fields(result);
            for (name, rows) in row_arrays(result) {
                println!("\n{}:", heading(name));
                print_rows(rows);
            }
        }
        other => println!("{}", format_scalar(other)),
    }

    if let Some(envelope) = value.as_object() {
        print_envelope_notes(envelope);
    }
}

fn print_fields(result: &Map<String, Value>) {
    let fields = flatten_scalars(result);
    if fields.is_empty() {
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        builder.push_record([key, val]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    let headers = row_headers(rows);
    if headers.is_empty() {
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for row in rows {
        if let Value::Object(map) = row {
            let cells = row_cells(&headers, map);
            builder.push_record(cells);
        }
    }
    println!("{}", Table::from(builder));
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {meth}");
    }
}

fn heading(name: &str) -> String {
    match name {
        "schedule" => "Amortisation schedule".into(),
        "rows" => "Offers".into(),
        "balance_trace" => "Balance by month".into(),
        "yearly_summary" => "Yearly summary".into(),
        other => other.replace('_', " "),
    }
}
