mod commands;
mod config;
mod export;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::maturity::{ExportArgs, MonthlyRateArgs, TableArgs};
use config::CalculatorDefaults;

/// Payment-at-maturity tables for buffered structured notes
#[derive(Parser)]
#[command(
    name = "maturity",
    version,
    about = "Payment-at-maturity tables for buffered structured notes",
    long_about = "Classifies each underlying-return scenario as Protected (principal plus \
                  one month of interest) or At Risk (principal less the loss beyond the \
                  buffer, floored at zero), and exports the table as CSV, JSON, a \
                  word-processor document or a print-ready page."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// TOML file with default note inputs
    #[arg(long, env = "MATURITY_CONFIG", global = true)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the payment-at-maturity table
    Table(TableArgs),
    /// Write the table to a CSV, JSON, DOCX or print-ready file
    Export(ExportArgs),
    /// Monthly interest rate (and interest amount) for an annual rate
    MonthlyRate(MonthlyRateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("MATURITY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let defaults = match CalculatorDefaults::load(cli.config.as_deref()) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Table(args) => commands::maturity::run_table(args, &defaults),
        Commands::Export(args) => commands::maturity::run_export(args, &defaults),
        Commands::MonthlyRate(args) => commands::maturity::run_monthly_rate(args, &defaults),
        Commands::Version => {
            println!("maturity {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
