//! File exports of a maturity report.

pub mod delimited;
pub mod markup;

use clap::ValueEnum;
use std::fs;
use std::path::{Path, PathBuf};

use maturity_core::report::MaturityReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Delimited rows: Return, Payment, Method, Prediction
    Csv,
    /// Parameters, results and summary counts as JSON
    Json,
    /// Word-processor markup report
    Docx,
    /// Print-ready document, to print to PDF from a browser
    Pdf,
}

impl ExportFormat {
    pub fn default_file_name(self) -> &'static str {
        match self {
            ExportFormat::Csv => "maturity-table.csv",
            ExportFormat::Json => "maturity-data.json",
            ExportFormat::Docx => "maturity-report.docx",
            ExportFormat::Pdf => "maturity-report.html",
        }
    }
}

/// Render the report in the given format.
pub fn render(
    format: ExportFormat,
    report: &MaturityReport,
) -> Result<String, Box<dyn std::error::Error>> {
    let rendered = match format {
        ExportFormat::Csv => delimited::results_to_csv(&report.results)?,
        ExportFormat::Json => serde_json::to_string_pretty(report)?,
        ExportFormat::Docx => markup::word_document(report)?,
        ExportFormat::Pdf => markup::print_document(report)?,
    };
    Ok(rendered)
}

/// Render and write the report, returning the path written.
pub fn write_export(
    format: ExportFormat,
    report: &MaturityReport,
    path: &Path,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let rendered = render(format, report)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
        }
    }
    fs::write(path, rendered).map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
    tracing::info!(path = %path.display(), ?format, "export written");
    Ok(path.to_path_buf())
}
