use serde_json::Value;
use std::io;

use maturity_core::maturity::calculator::ScenarioResult;

pub const RESULT_HEADERS: [&str; 4] = ["Return (%)", "Payment ($)", "Method", "Prediction"];

fn writer<W: io::Write>(inner: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(inner)
}

/// Write the header and one row per result.
pub fn write_results<W: io::Write>(
    inner: W,
    results: &[ScenarioResult],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = writer(inner);
    wtr.write_record(RESULT_HEADERS)?;
    for r in results {
        wtr.write_record([
            r.underlying_return.to_string(),
            r.payment.to_string(),
            r.method.to_string(),
            r.prediction.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn results_to_csv(results: &[ScenarioResult]) -> Result<String, Box<dyn std::error::Error>> {
    let mut buffer = Vec::new();
    write_results(&mut buffer, results)?;
    Ok(String::from_utf8(buffer)?)
}

/// Same rows, read back from a serialized `results` array.
pub fn write_result_values<W: io::Write>(
    inner: W,
    results: &[Value],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = writer(inner);
    wtr.write_record(RESULT_HEADERS)?;
    for item in results {
        let row: Vec<String> = ["return", "payment", "method", "prediction"]
            .iter()
            .map(|key| item.get(*key).map(cell).unwrap_or_default())
            .collect();
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
