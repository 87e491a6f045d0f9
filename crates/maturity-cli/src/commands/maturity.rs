use chrono::Utc;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::path::PathBuf;

use maturity_core::maturity::calculator::{self, MaturityInput, ScenarioSource};
use maturity_core::report::{MaturityReport, ReportParameters};

use crate::config::CalculatorDefaults;
use crate::export::{self, ExportFormat};
use crate::input::{self, NoteInput};

/// Note terms and scenarios shared by `table` and `export`
#[derive(Args, Debug, Clone, Default)]
pub struct NoteArgs {
    /// Principal invested (e.g. 1000)
    #[arg(long, allow_hyphen_values = true)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 12.2)
    #[arg(long, allow_hyphen_values = true)]
    pub annual_rate: Option<Decimal>,

    /// Threshold return in percent (e.g. -10)
    #[arg(long, allow_hyphen_values = true)]
    pub threshold: Option<Decimal>,

    /// Buffer in percent (e.g. 10)
    #[arg(long, allow_hyphen_values = true)]
    pub buffer: Option<Decimal>,

    /// Underlying returns in percent, e.g. "60, 40, -10.01, -200"
    #[arg(long, allow_hyphen_values = true)]
    pub returns: Option<String>,

    /// Separator between returns
    #[arg(long)]
    pub separator: Option<String>,

    /// Path to JSON input file (individual flags override its fields)
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Accept a negative principal
    #[arg(long)]
    pub allow_negative_principal: bool,
}

/// Arguments for generating a maturity table
#[derive(Args, Debug)]
pub struct TableArgs {
    #[command(flatten)]
    pub note: NoteArgs,
}

/// Arguments for exporting a maturity table to a file
#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub note: NoteArgs,

    /// Export format
    #[arg(long, value_enum)]
    pub format: ExportFormat,

    /// Output path (defaults to the format's file name)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Arguments for the monthly rate calculation
#[derive(Args, Debug)]
pub struct MonthlyRateArgs {
    /// Annual interest rate in percent
    #[arg(long, allow_hyphen_values = true)]
    pub annual_rate: Option<Decimal>,

    /// Principal, to also report one month of interest
    #[arg(long, allow_hyphen_values = true)]
    pub principal: Option<Decimal>,
}

/// Layer the inputs: flags over `--input` file or stdin over configured defaults.
pub fn resolve_input(
    args: &NoteArgs,
    defaults: &CalculatorDefaults,
) -> Result<MaturityInput, Box<dyn std::error::Error>> {
    let from_json = match args.input {
        Some(ref path) => Some(input::read_note_file(path)?),
        None => input::stdin::read_note_stdin()?,
    };
    resolve_input_from(args, defaults.to_input(), from_json)
}

fn resolve_input_from(
    args: &NoteArgs,
    mut note: MaturityInput,
    from_json: Option<NoteInput>,
) -> Result<MaturityInput, Box<dyn std::error::Error>> {
    if let Some(layer) = from_json {
        note = layer.apply(note);
    }
    let note = args.overrides().apply(note);

    if note.principal < Decimal::ZERO && !args.allow_negative_principal {
        return Err(format!(
            "principal must not be negative (got {}); pass --allow-negative-principal to override",
            note.principal
        )
        .into());
    }

    Ok(note)
}

impl NoteArgs {
    /// The flags given on the command line, as the topmost input layer.
    fn overrides(&self) -> NoteInput {
        NoteInput {
            principal: self.principal,
            annual_rate: self.annual_rate,
            threshold: self.threshold,
            buffer: self.buffer,
            scenarios: self.returns.clone().map(ScenarioSource::Text),
            separator: self.separator.clone(),
        }
    }
}

pub fn run_table(
    args: TableArgs,
    defaults: &CalculatorDefaults,
) -> Result<Value, Box<dyn std::error::Error>> {
    let note = resolve_input(&args.note, defaults)?;
    let result = calculator::calculate_maturity_table(&note)?;
    tracing::info!(
        scenarios = result.result.results.len(),
        warnings = result.warnings.len(),
        "maturity table generated"
    );
    Ok(serde_json::to_value(result)?)
}

pub fn run_export(
    args: ExportArgs,
    defaults: &CalculatorDefaults,
) -> Result<Value, Box<dyn std::error::Error>> {
    let note = resolve_input(&args.note, defaults)?;
    let output = calculator::calculate_maturity_table(&note)?;

    let report = MaturityReport::new(
        ReportParameters::from_config(&note.config()),
        output.result.results,
        Utc::now(),
    );

    let path = args.out.unwrap_or_else(|| {
        let file_name = args.format.default_file_name();
        match defaults.output_dir {
            Some(ref dir) => PathBuf::from(dir).join(file_name),
            None => PathBuf::from(file_name),
        }
    });
    let written = export::write_export(args.format, &report, &path)?;

    Ok(json!({
        "result": {
            "path": written.display().to_string(),
            "total_scenarios": report.total_scenarios,
            "protected_count": report.protected_count,
            "at_risk_count": report.at_risk_count,
        },
        "warnings": output.warnings,
    }))
}

pub fn run_monthly_rate(
    args: MonthlyRateArgs,
    defaults: &CalculatorDefaults,
) -> Result<Value, Box<dyn std::error::Error>> {
    let annual_rate = args.annual_rate.unwrap_or(defaults.annual_rate);
    let principal = args.principal.unwrap_or(defaults.principal);
    let monthly_interest = calculator::compute_monthly_interest(principal, annual_rate)?;

    Ok(json!({
        "result": {
            "annual_rate": annual_rate,
            "monthly_rate": calculator::compute_monthly_rate(annual_rate).normalize(),
            "principal": principal,
            "monthly_interest": monthly_interest.normalize(),
        }
    }))
}
