use serde_json::Value;
use std::io;

use crate::export::delimited::{cell, write_result_values};

/// Write output as CSV to stdout.
///
/// A maturity table prints one row per scenario; anything else prints
/// field/value pairs of its `result`.
pub fn print_csv(value: &Value) {
    if let Some(results) = super::scenario_results(value) {
        if let Err(e) = write_result_values(io::stdout().lock(), results) {
            eprintln!("CSV write error: {}", e);
        }
        return;
    }

    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let fields = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match fields {
        Value::Object(map) => {
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in map {
                let _ = wtr.write_record([key.as_str(), &cell(val)]);
            }
        }
        _ => {
            let _ = wtr.write_record([&cell(fields)]);
        }
    }

    let _ = wtr.flush();
}
