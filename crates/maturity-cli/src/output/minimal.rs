use serde_json::Value;

use crate::export::delimited::cell;

/// Print just the key answer: `return payment` per scenario for a maturity
/// table, otherwise the first priority field found in the result.
pub fn print_minimal(value: &Value) {
    if let Some(results) = super::scenario_results(value) {
        for r in results {
            println!(
                "{} {}",
                r.get("return").map(cell).unwrap_or_default(),
                r.get("payment").map(cell).unwrap_or_default()
            );
        }
        return;
    }

    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = ["monthly_rate", "monthly_interest"];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", cell(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, cell(val));
            return;
        }
    }

    println!("{}", cell(result_obj));
}
