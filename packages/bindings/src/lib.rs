use chrono::Utc;
use napi::Result as NapiResult;
use napi_derive::napi;

use maturity_core::maturity::{calculator, scenarios};
use maturity_core::report::{MaturityReport, ReportParameters};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Maturity table
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_maturity_table(input_json: String) -> NapiResult<String> {
    let input: calculator::MaturityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = calculator::calculate_maturity_table(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn parse_scenarios(text: String, separator: Option<String>) -> NapiResult<String> {
    let separator = separator.as_deref().unwrap_or(scenarios::DEFAULT_SEPARATOR);
    let parsed = scenarios::parse_scenarios_with_separator(&text, separator);
    serde_json::to_string(&parsed).map_err(to_napi_error)
}

#[napi]
pub fn compute_monthly_rate(annual_rate: String) -> NapiResult<String> {
    let annual_rate: rust_decimal::Decimal = annual_rate.trim().parse().map_err(to_napi_error)?;
    Ok(calculator::compute_monthly_rate(annual_rate).to_string())
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Structured report document for the JSON download, stamped with the current time.
#[napi]
pub fn maturity_report(input_json: String) -> NapiResult<String> {
    let input: calculator::MaturityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = calculator::calculate_maturity_table(&input).map_err(to_napi_error)?;
    let report = MaturityReport::new(
        ReportParameters::from_config(&input.config()),
        output.result.results,
        Utc::now(),
    );
    serde_json::to_string(&report).map_err(to_napi_error)
}
