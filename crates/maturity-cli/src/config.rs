//! Defaults for the note inputs, optionally loaded from a TOML file.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fs;

use maturity_core::maturity::calculator::{MaturityInput, ScenarioSource};

/// Values used for any input not given on the command line or in `--input`.
///
/// ```toml
/// principal = 5000
/// annual_rate = 9.5
/// returns = "30, 0, -15, -40"
/// output_dir = "reports"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorDefaults {
    #[serde(default = "default_principal")]
    pub principal: Decimal,

    #[serde(default = "default_annual_rate")]
    pub annual_rate: Decimal,

    #[serde(default = "default_threshold")]
    pub threshold: Decimal,

    #[serde(default = "default_buffer")]
    pub buffer: Decimal,

    /// Underlying returns, as typed into the returns field
    #[serde(default = "default_returns")]
    pub returns: String,

    #[serde(default = "default_separator")]
    pub separator: String,

    /// Directory exports are written to when `--out` is not given
    #[serde(default)]
    pub output_dir: Option<String>,
}

fn default_principal() -> Decimal {
    dec!(1000)
}

fn default_annual_rate() -> Decimal {
    dec!(12.2)
}

fn default_threshold() -> Decimal {
    dec!(-10)
}

fn default_buffer() -> Decimal {
    dec!(10)
}

fn default_returns() -> String {
    "60, 40, 20, 5, 0, -5, -10, -10.01, -20, -30, -40, -60, -80, -100, -200".to_string()
}

fn default_separator() -> String {
    ",".to_string()
}

impl Default for CalculatorDefaults {
    fn default() -> Self {
        Self {
            principal: default_principal(),
            annual_rate: default_annual_rate(),
            threshold: default_threshold(),
            buffer: default_buffer(),
            returns: default_returns(),
            separator: default_separator(),
            output_dir: None,
        }
    }
}

impl CalculatorDefaults {
    /// Load defaults from a TOML file. Missing keys keep their built-in values.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config '{}': {}", path, e))?;
        let defaults = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config '{}': {}", path, e))?;
        Ok(defaults)
    }

    /// Built-in defaults unless a config path is given.
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn to_input(&self) -> MaturityInput {
        MaturityInput {
            principal: self.principal,
            annual_rate: self.annual_rate,
            threshold: self.threshold,
            buffer: self.buffer,
            scenarios: ScenarioSource::Text(self.returns.clone()),
            separator: Some(self.separator.clone()),
        }
    }
}
