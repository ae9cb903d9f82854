use serde_json::Value;
use std::io;

use super::{flatten_scalars, format_scalar, result_of, row_arrays, row_cells, row_headers};

/// Write a result as CSV to stdout.
///
/// Results carrying per-period rows (schedule, offers, balance trace) emit the
/// first such array, one line per row; everything else is written as
/// `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match result_of(value) {
        Value::Object(result) => match row_arrays(result).first() {
            Some((_, rows)) => write_rows(&mut wtr, rows),
            None => {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in flatten_scalars(result) {
                    let _ = wtr.write_record([key, val]);
                }
            }
        },
        other => {
            let _ = wtr.write_record([format_scalar(other)]);
        }
    }

    let _ = wtr.flush();
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) {
    let headers = row_headers(rows);
    if headers.is_empty() {
        return;
    }
    let _ = wtr.write_record(&headers);

    for row in rows {
        if let Value::Object(map) = row {
            let record = row_cells(&headers, map);
            let _ = wtr.write_record(&record);
        }
    }
}
