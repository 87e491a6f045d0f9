use colored::Colorize;
use serde_json::Value;
use tabled::{builder::Builder, settings::Style, Table};

use maturity_core::maturity::calculator::ScenarioResult;
use maturity_core::report::summary_line;

use crate::export::delimited::{cell, RESULT_HEADERS};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    if let Some(results) = super::scenario_results(value) {
        print_maturity_table(results, value);
        return;
    }

    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => print_flat_object(result),
            None => print_flat_object(value),
        },
        _ => println!("{}", value),
    }
}

fn print_maturity_table(results: &[Value], envelope: &Value) {
    if results.is_empty() {
        println!("(no scenarios)");
    } else {
        let mut builder = Builder::default();
        builder.push_record(RESULT_HEADERS);
        for r in results {
            builder.push_record(
                ["return", "payment", "method", "prediction"]
                    .iter()
                    .map(|key| r.get(*key).map(cell).unwrap_or_default()),
            );
        }
        let mut table = Table::from(builder);
        table.with(Style::rounded());
        println!("{}", table);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow().bold());
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w.yellow());
            }
        }
    }

    let typed: Result<Vec<ScenarioResult>, _> =
        results.iter().cloned().map(serde_json::from_value::<ScenarioResult>).collect();
    if let Ok(typed) = typed {
        println!("\n{}", summary_line(&typed).bold());
    }

    if let Some(result) = envelope.get("result") {
        if let (Some(rate), Some(interest)) =
            (result.get("monthly_rate"), result.get("monthly_interest"))
        {
            println!(
                "Monthly rate: {}%  Monthly interest: ${}",
                cell(rate),
                cell(interest)
            );
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("Methodology: {}", meth);
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &cell(val)]);
        }
        let table = Table::from(builder);
        println!("{}", table);
    } else {
        println!("{}", cell(value));
    }
}
