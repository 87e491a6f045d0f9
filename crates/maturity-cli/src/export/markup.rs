use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::{self, Write};

use maturity_core::maturity::calculator::{Prediction, ScenarioResult};
use maturity_core::report::MaturityReport;

const DOCX_STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 20px; }
table { border-collapse: collapse; width: 100%; margin: 20px 0; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
th { background-color: #f2f2f2; }
.protected { color: green; }
.at-risk { color: orange; }";

const CELL: &str = "padding: 8px;";

fn fixed4(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.4}", rounded)
}

fn prediction_class(prediction: Prediction) -> &'static str {
    match prediction {
        Prediction::Protected => "protected",
        Prediction::AtRisk => "at-risk",
    }
}

fn prediction_color(prediction: Prediction) -> &'static str {
    match prediction {
        Prediction::Protected => "green",
        Prediction::AtRisk => "orange",
    }
}

/// HTML markup saved with a `.docx` name, which word processors open as a document.
pub fn word_document(report: &MaturityReport) -> Result<String, fmt::Error> {
    let mut html = String::new();
    write_word_document(&mut html, report)?;
    Ok(html)
}

/// Self-contained page with inline styles, laid out for printing to PDF.
pub fn print_document(report: &MaturityReport) -> Result<String, fmt::Error> {
    let mut html = String::new();
    write_print_document(&mut html, report)?;
    Ok(html)
}

fn write_word_document(html: &mut String, report: &MaturityReport) -> fmt::Result {
    let p = &report.parameters;

    writeln!(html, "<html>")?;
    writeln!(html, "<head>\n<style>\n{}\n</style>\n</head>", DOCX_STYLE)?;
    writeln!(html, "<body>")?;
    writeln!(html, "<h1>Maturity Payment Table</h1>")?;
    writeln!(html, "<p>Generated: {}</p>", report.generated_at.format("%Y-%m-%d"))?;

    writeln!(html, "<h2>Parameters</h2>")?;
    writeln!(html, "<p>Principal: ${}</p>", p.principal)?;
    writeln!(html, "<p>Interest Rate (Year): {}%</p>", p.interest_rate_year)?;
    writeln!(html, "<p>Interest Rate (Month): {}%</p>", fixed4(p.interest_rate_month))?;
    writeln!(html, "<p>Threshold: {}%</p>", p.threshold)?;
    writeln!(html, "<p>Buffer: {}%</p>", p.buffer)?;

    writeln!(html, "<h2>Summary</h2>")?;
    writeln!(html, "<p>Total Scenarios: {}</p>", report.total_scenarios)?;
    writeln!(html, "<p>Protected: {}</p>", report.protected_count)?;
    writeln!(html, "<p>At Risk: {}</p>", report.at_risk_count)?;

    writeln!(html, "<h2>Results</h2>")?;
    writeln!(html, "<table>")?;
    writeln!(
        html,
        "<tr><th>Underlying Return (%)</th><th>Payment at Maturity ($)</th><th>Method</th><th>Prediction</th></tr>"
    )?;
    for r in &report.results {
        writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td></tr>",
            r.underlying_return,
            r.payment,
            r.method,
            prediction_class(r.prediction),
            r.prediction
        )?;
    }
    writeln!(html, "</table>")?;
    writeln!(html, "</body>\n</html>")
}

fn write_print_document(html: &mut String, report: &MaturityReport) -> fmt::Result {
    let p = &report.parameters;

    writeln!(html, "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">")?;
    writeln!(html, "<title>Maturity Payment Table</title>\n</head>")?;
    writeln!(html, "<body onload=\"window.print()\">")?;
    writeln!(html, "<div style=\"font-family: Arial; padding: 20px;\">")?;
    writeln!(html, "<h1>Maturity Payment Table</h1>")?;
    writeln!(html, "<p>Generated: {}</p>", report.generated_at.format("%Y-%m-%d"))?;

    writeln!(html, "<h2>Parameters</h2>")?;
    writeln!(html, "<p>Principal: ${}</p>", p.principal)?;
    writeln!(html, "<p>Interest Rate: {}% per year</p>", p.interest_rate_year)?;
    writeln!(html, "<p>Monthly Rate: {}%</p>", fixed4(p.interest_rate_month))?;
    writeln!(html, "<p>Threshold: {}%</p>", p.threshold)?;
    writeln!(html, "<p>Buffer: {}%</p>", p.buffer)?;

    writeln!(html, "<h2>Summary</h2>")?;
    writeln!(html, "<p>Total: {} scenarios</p>", report.total_scenarios)?;
    writeln!(html, "<p>Protected: {}</p>", report.protected_count)?;
    writeln!(html, "<p>At Risk: {}</p>", report.at_risk_count)?;

    writeln!(html, "<h2>Results</h2>")?;
    writeln!(
        html,
        "<table border=\"1\" style=\"border-collapse: collapse; width: 100%;\">"
    )?;
    writeln!(
        html,
        "<tr style=\"background: #f0f0f0;\"><th style=\"{CELL}\">Underlying Return (%)</th>\
         <th style=\"{CELL}\">Payment at Maturity ($)</th><th style=\"{CELL}\">Method</th>\
         <th style=\"{CELL}\">Prediction</th></tr>"
    )?;
    for r in &report.results {
        write_print_row(html, r)?;
    }
    writeln!(html, "</table>\n</div>\n</body>\n</html>")
}

fn write_print_row(html: &mut String, r: &ScenarioResult) -> fmt::Result {
    writeln!(
        html,
        "<tr><td style=\"{CELL}\">{}</td><td style=\"{CELL}\">{}</td><td style=\"{CELL}\">{}</td>\
         <td style=\"{CELL} color: {};\">{}</td></tr>",
        r.underlying_return,
        r.payment,
        r.method,
        prediction_color(r.prediction),
        r.prediction
    )
}
