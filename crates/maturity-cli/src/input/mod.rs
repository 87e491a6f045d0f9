//! Note terms given as JSON, in an `--input` file or piped on stdin.

pub mod stdin;

use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use maturity_core::maturity::calculator::{MaturityInput, ScenarioSource};

/// One layer of note terms. Fields left out keep the value of the layer below.
///
/// ```json
/// {"principal": 2500, "returns": "10; -40", "separator": ";"}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NoteInput {
    pub principal: Option<Decimal>,
    pub annual_rate: Option<Decimal>,
    pub threshold: Option<Decimal>,
    pub buffer: Option<Decimal>,
    #[serde(alias = "returns")]
    pub scenarios: Option<ScenarioSource>,
    pub separator: Option<String>,
}

impl NoteInput {
    /// Parse a JSON layer. `source` names where it came from in errors.
    pub fn from_json(text: &str, source: &str) -> Result<Self, Box<dyn std::error::Error>> {
        serde_json::from_str(text).map_err(|e| format!("Failed to parse {}: {}", source, e).into())
    }

    /// Overlay the fields present here onto `note`.
    pub fn apply(self, mut note: MaturityInput) -> MaturityInput {
        if let Some(principal) = self.principal {
            note.principal = principal;
        }
        if let Some(annual_rate) = self.annual_rate {
            note.annual_rate = annual_rate;
        }
        if let Some(threshold) = self.threshold {
            note.threshold = threshold;
        }
        if let Some(buffer) = self.buffer {
            note.buffer = buffer;
        }
        if let Some(scenarios) = self.scenarios {
            note.scenarios = scenarios;
        }
        if let Some(separator) = self.separator {
            note.separator = Some(separator);
        }
        note
    }
}

/// Read an `--input` JSON file.
pub fn read_note_file(path: &Path) -> Result<NoteInput, Box<dyn std::error::Error>> {
    if path.is_dir() {
        return Err(format!("Not a file: {}", path.display()).into());
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    NoteInput::from_json(&contents, &format!("'{}'", path.display()))
}
