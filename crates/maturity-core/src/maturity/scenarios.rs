use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::warn;

use crate::types::Percent;

/// Separator used by the returns text field when none is given.
pub const DEFAULT_SEPARATOR: &str = ",";

/// Parse a comma-separated list of underlying returns.
///
/// See [`parse_scenarios_with_separator`].
pub fn parse_scenarios(text: &str) -> Vec<Percent> {
    parse_scenarios_with_separator(text, DEFAULT_SEPARATOR)
}

/// Parse free-form text into an ordered list of underlying returns.
///
/// Each token is trimmed and read up to the end of its leading number, so
/// `5%` is `5` and `60abc` is `60`. A number is an optional sign, digits with
/// an optional decimal point (`.5` and `5.` included) and an optional
/// exponent, or `Infinity`. Tokens with no leading number, empty ones
/// included, are dropped in place. Parsing never fails: empty or fully
/// malformed text gives an empty list.
///
/// Magnitudes below `Decimal` precision read as `0`. Numbers past its range
/// saturate at [`Decimal::MAX`] or [`Decimal::MIN`], which keeps their side of
/// the threshold.
///
/// An empty separator treats the whole text as a single token.
pub fn parse_scenarios_with_separator(text: &str, separator: &str) -> Vec<Percent> {
    if separator.is_empty() {
        return parse_token(text).into_iter().collect();
    }
    text.split(separator).filter_map(parse_token).collect()
}

/// Smallest magnitude a `Decimal` can hold (scale 28).
const DECIMAL_EPSILON: f64 = 1e-28;

fn parse_token(token: &str) -> Option<Percent> {
    let number = leading_number(token.trim())?;
    if let Ok(value) = Decimal::from_str(number).or_else(|_| Decimal::from_scientific(number)) {
        return Some(value);
    }

    let value: f64 = number.parse().ok()?;
    if value.abs() < DECIMAL_EPSILON {
        return Some(Decimal::ZERO);
    }
    match Decimal::try_from(value) {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(token = number, "return outside decimal range, saturated");
            if value.is_sign_negative() {
                Some(Decimal::MIN)
            } else {
                Some(Decimal::MAX)
            }
        }
    }
}

/// The longest prefix of `token` that reads as a number, if any.
fn leading_number(token: &str) -> Option<&str> {
    const INFINITY: &str = "Infinity";

    let bytes = token.as_bytes();
    let digits_from = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if token[end..].starts_with(INFINITY) {
        return Some(&token[..end + INFINITY.len()]);
    }

    let int_digits = digits_from(end);
    end += int_digits;
    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(end + 1);
        end += 1 + frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits_from(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }

    Some(&token[..end])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
