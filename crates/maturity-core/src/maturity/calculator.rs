use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use super::scenarios::{parse_scenarios_with_separator, DEFAULT_SEPARATOR};
use crate::error::MaturityError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::MaturityResult;

/// Decimal places kept on every payment at maturity.
pub const PAYMENT_DECIMAL_PLACES: u32 = 4;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// How the payment at maturity was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoffMethod {
    /// Principal plus one month of contingent interest
    Interest,
    /// Principal adjusted by the loss left over after the buffer
    Buffer,
}

impl std::fmt::Display for PayoffMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayoffMethod::Interest => write!(f, "Interest"),
            PayoffMethod::Buffer => write!(f, "Buffer"),
        }
    }
}

/// Payoff regime a scenario falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prediction {
    Protected,
    #[serde(rename = "At Risk")]
    AtRisk,
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prediction::Protected => write!(f, "Protected"),
            Prediction::AtRisk => write!(f, "At Risk"),
        }
    }
}

/// Note terms shared by every scenario of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaturityConfig {
    /// Amount invested. Not validated here: callers decide whether a
    /// negative principal is acceptable.
    pub principal: Money,
    /// Annual contingent interest rate, in percent
    pub annual_rate: Percent,
    /// Lowest underlying return (percent) that still pays principal plus interest
    pub threshold: Percent,
    /// Loss (percent) absorbed before it reaches the holder
    pub buffer: Percent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    #[serde(rename = "return")]
    pub underlying_return: Percent,
    pub payment: Money,
    pub method: PayoffMethod,
    pub prediction: Prediction,
}

/// Per-scenario results in input order, plus the floor warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaturityTable {
    pub results: Vec<ScenarioResult>,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Core calculation
// ---------------------------------------------------------------------------

/// Monthly rate in percent: `annual_rate / 12`, unrounded.
pub fn compute_monthly_rate(annual_rate: Percent) -> Percent {
    annual_rate / MONTHS_PER_YEAR
}

/// One month of interest on the principal, unrounded.
pub fn compute_monthly_interest(principal: Money, annual_rate: Percent) -> MaturityResult<Money> {
    percent_of(principal, compute_monthly_rate(annual_rate))
        .ok_or_else(|| out_of_range("principal", format!("monthly interest on {principal}")))
}

/// `amount * pct / 100`, or `None` past the decimal range.
fn percent_of(amount: Money, pct: Percent) -> Option<Money> {
    match amount.checked_mul(pct) {
        Some(product) => product.checked_div(HUNDRED),
        None => None,
    }
}

fn out_of_range(field: &str, what: String) -> MaturityError {
    MaturityError::InvalidInput {
        field: field.into(),
        reason: format!("{what} exceeds the decimal range"),
    }
}

/// Build the payment-at-maturity table for a list of underlying returns.
///
/// For a return `r`:
///
/// - `r >= threshold` (Protected): `principal + principal * monthly_rate / 100`.
///   The size of `r` plays no further part.
/// - `r < threshold` (At Risk): `principal + principal * (r + buffer) / 100`.
///
/// A negative payment is floored at zero and reported in `warnings`. Payments
/// are rounded to [`PAYMENT_DECIMAL_PLACES`] once, after the floor.
///
/// An at-risk payment past the `Decimal` range on the loss side is floored
/// like any negative payment. Any other payment that cannot be represented
/// is an [`MaturityError::InvalidInput`], and no partial table is returned.
pub fn generate_table(
    config: &MaturityConfig,
    scenarios: &[Percent],
) -> MaturityResult<MaturityTable> {
    let monthly_rate = compute_monthly_rate(config.annual_rate);
    let mut table = MaturityTable {
        results: Vec::with_capacity(scenarios.len()),
        warnings: Vec::new(),
    };

    for &underlying_return in scenarios {
        let underlying_return = underlying_return.normalize();

        let (raw_payment, method, prediction) = if underlying_return >= config.threshold {
            let payment = percent_of(config.principal, monthly_rate)
                .and_then(|interest| config.principal.checked_add(interest));
            (payment, PayoffMethod::Interest, Prediction::Protected)
        } else {
            let payment = underlying_return
                .checked_add(config.buffer)
                .and_then(|loss_or_gain_pct| percent_of(config.principal, loss_or_gain_pct))
                .and_then(|adjustment| config.principal.checked_add(adjustment));
            (payment, PayoffMethod::Buffer, Prediction::AtRisk)
        };

        let payment = match raw_payment {
            Some(payment) if payment < Decimal::ZERO => {
                warn!(%underlying_return, raw_payment = %payment, "payment floored at zero");
                table.warnings.push(floor_warning(underlying_return));
                Decimal::ZERO
            }
            Some(payment) => payment,
            None if method == PayoffMethod::Buffer && loss_past_range(config, underlying_return) => {
                warn!(%underlying_return, "payment below decimal range floored at zero");
                table.warnings.push(floor_warning(underlying_return));
                Decimal::ZERO
            }
            None => {
                warn!(%underlying_return, %method, "payment out of decimal range");
                return Err(out_of_range(
                    "scenarios",
                    format!("payment for {underlying_return}%"),
                ));
            }
        };

        let payment = round_payment(payment);
        debug!(%underlying_return, %payment, %method, "scenario priced");

        table.results.push(ScenarioResult {
            underlying_return,
            payment,
            method,
            prediction,
        });
    }

    Ok(table)
}

fn floor_warning(underlying_return: Percent) -> String {
    format!("Payment for {underlying_return}% cannot be negative - set to 0")
}

/// An at-risk payment that overflowed is certainly negative when a positive
/// principal takes a net loss. `r + buffer` can only overflow with both
/// terms of the same sign.
fn loss_past_range(config: &MaturityConfig, underlying_return: Percent) -> bool {
    let net_loss = match underlying_return.checked_add(config.buffer) {
        Some(loss_or_gain_pct) => loss_or_gain_pct < Decimal::ZERO,
        None => underlying_return < Decimal::ZERO,
    };
    config.principal > Decimal::ZERO && net_loss
}

fn round_payment(payment: Money) -> Money {
    let rounded = payment
        .round_dp_with_strategy(PAYMENT_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

// ---------------------------------------------------------------------------
// Envelope entry point
// ---------------------------------------------------------------------------

/// Underlying returns, either as typed into the returns field or already parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScenarioSource {
    Returns(Vec<Percent>),
    Text(String),
}

impl ScenarioSource {
    pub fn resolve(&self, separator: &str) -> Vec<Percent> {
        match self {
            ScenarioSource::Returns(returns) => returns.clone(),
            ScenarioSource::Text(text) => parse_scenarios_with_separator(text, separator),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaturityInput {
    pub principal: Money,
    pub annual_rate: Percent,
    pub threshold: Percent,
    pub buffer: Percent,
    #[serde(alias = "returns")]
    pub scenarios: ScenarioSource,
    /// Separator for text scenarios, `,` when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

impl MaturityInput {
    pub fn config(&self) -> MaturityConfig {
        MaturityConfig {
            principal: self.principal,
            annual_rate: self.annual_rate,
            threshold: self.threshold,
            buffer: self.buffer,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaturityTableOutput {
    /// Monthly interest rate in percent
    pub monthly_rate: Percent,
    /// One month of interest on the principal
    pub monthly_interest: Money,
    pub results: Vec<ScenarioResult>,
}

/// Resolve the scenarios, generate the table and wrap it in the standard envelope.
///
/// Floor warnings are surfaced as the envelope's `warnings`.
pub fn calculate_maturity_table(
    input: &MaturityInput,
) -> MaturityResult<ComputationOutput<MaturityTableOutput>> {
    let start = Instant::now();

    let separator = input.separator.as_deref().unwrap_or(DEFAULT_SEPARATOR);
    if separator.is_empty() {
        return Err(MaturityError::InvalidInput {
            field: "separator".into(),
            reason: "Separator must not be empty".into(),
        });
    }

    let scenarios = input.scenarios.resolve(separator);
    let config = input.config();
    let MaturityTable { results, warnings } = generate_table(&config, &scenarios)?;

    let output = MaturityTableOutput {
        monthly_rate: compute_monthly_rate(config.annual_rate),
        monthly_interest: compute_monthly_interest(config.principal, config.annual_rate)?,
        results,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    with_metadata(
        "Buffered note payment at maturity (threshold test, buffer-reduced loss, zero floor)",
        input,
        warnings,
        elapsed,
        output,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Term sheet from the reference example: $1,000, 12.20% p.a., -10% threshold, 10% buffer.
    fn sample_config() -> MaturityConfig {
        MaturityConfig {
            principal: dec!(1000),
            annual_rate: dec!(12.20),
            threshold: dec!(-10),
            buffer: dec!(10),
        }
    }

    fn single(r: Decimal) -> (ScenarioResult, Vec<String>) {
        let table = generate_table(&sample_config(), &[r]).unwrap();
        assert_eq!(table.results.len(), 1);
        (table.results[0].clone(), table.warnings)
    }

    #[test]
    fn test_monthly_rate_is_unrounded() {
        let monthly = compute_monthly_rate(dec!(12.20));
        assert!((monthly - dec!(1.0166666667)).abs() < dec!(0.0000000001));
        assert!(monthly.scale() > PAYMENT_DECIMAL_PLACES);
    }

    #[test]
    fn test_protected_above_threshold() {
        let (res, warnings) = single(dec!(60));
        assert_eq!(res.payment, dec!(1010.1667));
        assert_eq!(res.method, PayoffMethod::Interest);
        assert_eq!(res.prediction, Prediction::Protected);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_threshold_tie_is_protected() {
        let (res, _) = single(dec!(-10));
        assert_eq!(res.payment, dec!(1010.1667));
        assert_eq!(res.method, PayoffMethod::Interest);
        assert_eq!(res.prediction, Prediction::Protected);
    }

    #[test]
    fn test_just_below_threshold_is_at_risk() {
        // 1000 + 1000 * (-10.01 + 10) / 100 = 999.9
        let (res, warnings) = single(dec!(-10.01));
        assert_eq!(res.payment, dec!(999.9));
        assert_eq!(res.method, PayoffMethod::Buffer);
        assert_eq!(res.prediction, Prediction::AtRisk);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_negative_payment_floored_with_warning() {
        // Raw payment: 1000 * (1 + (-200 + 10) / 100) = -900
        let (res, warnings) = single(dec!(-200));
        assert_eq!(res.payment, Decimal::ZERO);
        assert_eq!(res.method, PayoffMethod::Buffer);
        assert_eq!(res.prediction, Prediction::AtRisk);
        assert_eq!(
            warnings,
            vec!["Payment for -200% cannot be negative - set to 0".to_string()]
        );
    }

    #[test]
    fn test_total_loss_edge_is_zero_without_warning() {
        // -110 + 10 = -100: exactly wiped out, not negative
        let (res, warnings) = single(dec!(-110));
        assert_eq!(res.payment, Decimal::ZERO);
        assert!(!res.payment.is_sign_negative());
        assert!(warnings.is_empty());

        let (res, warnings) = single(dec!(-110.1));
        assert_eq!(res.payment, Decimal::ZERO);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_buffer_can_leave_a_gain() {
        // Threshold above the return, but the buffer more than covers it
        let config = MaturityConfig {
            threshold: dec!(0),
            ..sample_config()
        };
        let table = generate_table(&config, &[dec!(-5)]).unwrap();
        assert_eq!(table.results[0].payment, dec!(1050));
        assert_eq!(table.results[0].prediction, Prediction::AtRisk);
    }

    #[test]
    fn test_reference_table() {
        let returns = [
            dec!(60.00),
            dec!(40.00),
            dec!(20.00),
            dec!(5.00),
            dec!(0.00),
            dec!(-5.00),
            dec!(-10.00),
            dec!(-10.01),
            dec!(-20.00),
            dec!(-30.00),
            dec!(-40.00),
            dec!(-60.00),
            dec!(-80.00),
            dec!(-100),
            dec!(-110),
            dec!(-110.1),
            dec!(-200.00),
        ];
        let expected = [
            dec!(1010.1667),
            dec!(1010.1667),
            dec!(1010.1667),
            dec!(1010.1667),
            dec!(1010.1667),
            dec!(1010.1667),
            dec!(1010.1667),
            dec!(999.9),
            dec!(900),
            dec!(800),
            dec!(700),
            dec!(500),
            dec!(300),
            dec!(100),
            dec!(0),
            dec!(0),
            dec!(0),
        ];

        let table = generate_table(&sample_config(), &returns).unwrap();
        let payments: Vec<Decimal> = table.results.iter().map(|r| r.payment).collect();
        assert_eq!(payments, expected.to_vec());
        assert_eq!(
            table.warnings,
            vec![
                "Payment for -110.1% cannot be negative - set to 0".to_string(),
                "Payment for -200% cannot be negative - set to 0".to_string(),
            ]
        );
    }

    #[test]
    fn test_method_prediction_consistent_with_threshold() {
        let config = sample_config();
        let returns = [dec!(-9.99), dec!(-10), dec!(-10.0001), dec!(3), dec!(-50)];
        let table = generate_table(&config, &returns).unwrap();
        for res in &table.results {
            let protected = res.underlying_return >= config.threshold;
            assert_eq!(res.method == PayoffMethod::Interest, protected);
            assert_eq!(res.prediction == Prediction::Protected, protected);
            assert!(res.payment >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_order_preserved_and_idempotent() {
        let returns = [dec!(-200), dec!(60), dec!(-10.01), dec!(60), dec!(-10)];
        let first = generate_table(&sample_config(), &returns).unwrap();
        let second = generate_table(&sample_config(), &returns).unwrap();
        assert_eq!(first, second);

        let echoed: Vec<Decimal> = first.results.iter().map(|r| r.underlying_return).collect();
        assert_eq!(echoed, returns.to_vec());
    }

    #[test]
    fn test_empty_scenarios() {
        let table = generate_table(&sample_config(), &[]).unwrap();
        assert!(table.results.is_empty());
        assert!(table.warnings.is_empty());
    }

    #[test]
    fn test_negative_principal_is_not_rejected() {
        let config = MaturityConfig {
            principal: dec!(-1000),
            ..sample_config()
        };
        let table = generate_table(&config, &[dec!(60)]).unwrap();
        // -1000 - 10.1667 is negative, so it floors
        assert_eq!(table.results[0].payment, Decimal::ZERO);
        assert_eq!(table.warnings.len(), 1);
    }

    #[test]
    fn test_payment_past_decimal_range_is_an_error() {
        let config = MaturityConfig {
            principal: Decimal::from_scientific("1e28").unwrap(),
            annual_rate: dec!(1200),
            ..sample_config()
        };
        let err = generate_table(&config, &[dec!(60)]).unwrap_err();
        assert!(matches!(err, MaturityError::InvalidInput { ref field, .. } if field == "scenarios"));
        assert!(err.to_string().contains("payment for 60%"));

        // A negative principal turns the huge loss into a huge gain
        let config = MaturityConfig {
            principal: dec!(-1000),
            ..sample_config()
        };
        let err = generate_table(&config, &[dec!(10), Decimal::MIN]).unwrap_err();
        assert!(err.to_string().contains("exceeds the decimal range"));
    }

    #[test]
    fn test_loss_past_decimal_range_is_floored() {
        // r + buffer overflows on the way down
        let config = MaturityConfig {
            buffer: dec!(-10),
            ..sample_config()
        };
        let table = generate_table(&config, &[Decimal::MIN]).unwrap();
        assert_eq!(table.results[0].payment, Decimal::ZERO);
        assert_eq!(table.results[0].prediction, Prediction::AtRisk);
        assert_eq!(
            table.warnings,
            vec![format!("Payment for {}% cannot be negative - set to 0", Decimal::MIN)]
        );

        // principal * (r + buffer) overflows
        let table = generate_table(&sample_config(), &[Decimal::MIN]).unwrap();
        assert_eq!(table.results[0].payment, Decimal::ZERO);
        assert_eq!(table.warnings.len(), 1);
    }

    #[test]
    fn test_extreme_return_within_range_still_prices() {
        let returns = [Decimal::MAX, dec!(-100000000000000000000)];
        let table = generate_table(&sample_config(), &returns).unwrap();
        assert_eq!(table.results[0].payment, dec!(1010.1667));
        assert_eq!(table.results[1].payment, Decimal::ZERO);
        assert_eq!(table.warnings.len(), 1);
    }

    #[test]
    fn test_envelope_reports_overflow() {
        let input = MaturityInput {
            principal: Decimal::MAX,
            annual_rate: dec!(12.20),
            threshold: dec!(-10),
            buffer: dec!(10),
            scenarios: ScenarioSource::Returns(vec![]),
            separator: None,
        };
        // No scenarios to price, but the monthly interest still overflows
        let err = calculate_maturity_table(&input).unwrap_err();
        assert!(matches!(err, MaturityError::InvalidInput { ref field, .. } if field == "principal"));
    }

    #[test]
    fn test_envelope_from_text() {
        let input = MaturityInput {
            principal: dec!(1000),
            annual_rate: dec!(12.20),
            threshold: dec!(-10),
            buffer: dec!(10),
            scenarios: ScenarioSource::Text("60, abc, -200".into()),
            separator: None,
        };
        let out = calculate_maturity_table(&input).unwrap();
        assert_eq!(out.result.results.len(), 2);
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.result.monthly_interest.round_dp(4), dec!(10.1667));
        assert_eq!(out.result.monthly_rate, compute_monthly_rate(dec!(12.20)));
    }

    #[test]
    fn test_envelope_rejects_empty_separator() {
        let input = MaturityInput {
            principal: dec!(1000),
            annual_rate: dec!(12.20),
            threshold: dec!(-10),
            buffer: dec!(10),
            scenarios: ScenarioSource::Text("60".into()),
            separator: Some(String::new()),
        };
        let err = calculate_maturity_table(&input).unwrap_err();
        assert!(matches!(err, MaturityError::InvalidInput { ref field, .. } if field == "separator"));
    }

    #[test]
    fn test_input_accepts_list_or_text() {
        let from_list: MaturityInput = serde_json::from_str(
            r#"{"principal": 1000, "annual_rate": 12.2, "threshold": -10, "buffer": 10, "scenarios": [60, -10.01]}"#,
        )
        .unwrap();
        assert_eq!(
            from_list.scenarios,
            ScenarioSource::Returns(vec![dec!(60), dec!(-10.01)])
        );

        let from_text: MaturityInput = serde_json::from_str(
            r#"{"principal": 1000, "annual_rate": 12.2, "threshold": -10, "buffer": 10, "returns": "60; 20", "separator": ";"}"#,
        )
        .unwrap();
        assert_eq!(from_text.scenarios.resolve(";"), vec![dec!(60), dec!(20)]);
    }

    #[test]
    fn test_result_serialization_names() {
        let (res, _) = single(dec!(-20));
        let value = serde_json::to_value(&res).unwrap();
        assert_eq!(value["return"], "-20");
        assert_eq!(value["payment"], "900");
        assert_eq!(value["method"], "Buffer");
        assert_eq!(value["prediction"], "At Risk");
    }
}
