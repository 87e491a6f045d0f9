//! Export-side view of a maturity table: parameters, results and summary counts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::maturity::calculator::{
    compute_monthly_rate, MaturityConfig, Prediction, ScenarioResult,
};
use crate::types::{Money, Percent};

/// Note terms as printed on every export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportParameters {
    pub principal: Money,
    pub interest_rate_year: Percent,
    pub interest_rate_month: Percent,
    pub threshold: Percent,
    pub buffer: Percent,
}

impl ReportParameters {
    pub fn from_config(config: &MaturityConfig) -> Self {
        Self {
            principal: config.principal,
            interest_rate_year: config.annual_rate,
            interest_rate_month: compute_monthly_rate(config.annual_rate),
            threshold: config.threshold,
            buffer: config.buffer,
        }
    }
}

/// The structured export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaturityReport {
    pub parameters: ReportParameters,
    pub results: Vec<ScenarioResult>,
    pub generated_at: DateTime<Utc>,
    pub total_scenarios: usize,
    pub protected_count: usize,
    pub at_risk_count: usize,
}

impl MaturityReport {
    pub fn new(
        parameters: ReportParameters,
        results: Vec<ScenarioResult>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let (protected_count, at_risk_count) = count_predictions(&results);
        Self {
            parameters,
            total_scenarios: results.len(),
            results,
            generated_at,
            protected_count,
            at_risk_count,
        }
    }
}

/// Count (protected, at risk) results.
pub fn count_predictions(results: &[ScenarioResult]) -> (usize, usize) {
    results
        .iter()
        .fold((0, 0), |(protected, at_risk), r| match r.prediction {
            Prediction::Protected => (protected + 1, at_risk),
            Prediction::AtRisk => (protected, at_risk + 1),
        })
}

/// One-line summary, e.g. `Results (17) - 7 Protected, 10 At Risk`.
pub fn summary_line(results: &[ScenarioResult]) -> String {
    let (protected, at_risk) = count_predictions(results);
    format!(
        "Results ({}) - {} Protected, {} At Risk",
        results.len(),
        protected,
        at_risk
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maturity::calculator::generate_table;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn sample_report() -> MaturityReport {
        let config = MaturityConfig {
            principal: dec!(1000),
            annual_rate: dec!(12.20),
            threshold: dec!(-10),
            buffer: dec!(10),
        };
        let table = generate_table(&config, &[dec!(60), dec!(-10), dec!(-10.01), dec!(-200)]).unwrap();
        let generated_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        MaturityReport::new(ReportParameters::from_config(&config), table.results, generated_at)
    }

    #[test]
    fn test_counts() {
        let report = sample_report();
        assert_eq!(report.total_scenarios, 4);
        assert_eq!(report.protected_count, 2);
        assert_eq!(report.at_risk_count, 2);
        assert_eq!(summary_line(&report.results), "Results (4) - 2 Protected, 2 At Risk");
    }

    #[test]
    fn test_empty_report() {
        let report = MaturityReport::new(
            sample_report().parameters,
            Vec::new(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        );
        assert_eq!(report.total_scenarios, 0);
        assert_eq!(count_predictions(&report.results), (0, 0));
        assert_eq!(summary_line(&report.results), "Results (0) - 0 Protected, 0 At Risk");
    }

    #[test]
    fn test_document_keys() {
        let value = serde_json::to_value(sample_report()).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "parameters",
            "results",
            "generatedAt",
            "totalScenarios",
            "protectedCount",
            "atRiskCount",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(value["generatedAt"], "2024-03-01T12:00:00Z");
        assert_eq!(value["parameters"]["interestRateYear"], "12.20");
        assert!(value["parameters"].get("interestRateMonth").is_some());
    }
}
