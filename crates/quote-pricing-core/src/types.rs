use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PricingError;
use crate::PricingResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Percentages as entered by users (25 = 25%). Never as fractions.
pub type Percent = Decimal;

/// Margin shortfall, in percentage points, that flags a project at risk.
pub const DEFAULT_AT_RISK_THRESHOLD: Percent = rust_decimal_macros::dec!(5);

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// `numerator / denominator * 100`, or zero when the denominator is zero.
pub fn safe_percent(numerator: Decimal, denominator: Decimal) -> PricingResult<Percent> {
    if denominator.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let ratio = checked_div("percent", numerator, denominator)?;
    checked_mul("percent", ratio, Decimal::ONE_HUNDRED)
}

/// Reject negative values. Used for quantities, prices, amounts, hours and rates.
pub(crate) fn ensure_non_negative(field: &str, value: Decimal) -> PricingResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(PricingError::invalid(
            field,
            format!("must not be negative, got {value}"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Checked arithmetic
// ---------------------------------------------------------------------------

fn out_of_range(field: &str) -> PricingError {
    PricingError::invalid(field, "result exceeds the representable decimal range")
}

pub(crate) fn checked_add(field: &str, a: Decimal, b: Decimal) -> PricingResult<Decimal> {
    a.checked_add(b).ok_or_else(|| out_of_range(field))
}

pub(crate) fn checked_sub(field: &str, a: Decimal, b: Decimal) -> PricingResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| out_of_range(field))
}

pub(crate) fn checked_mul(field: &str, a: Decimal, b: Decimal) -> PricingResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| out_of_range(field))
}

/// Division by zero is reported as out of range as well.
pub(crate) fn checked_div(field: &str, a: Decimal, b: Decimal) -> PricingResult<Decimal> {
    a.checked_div(b).ok_or_else(|| out_of_range(field))
}

pub(crate) fn checked_sum<I>(field: &str, values: I) -> PricingResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| checked_add(field, acc, value))
}

/// `value * percent / 100`
pub(crate) fn percent_of(field: &str, value: Decimal, percent: Percent) -> PricingResult<Decimal> {
    Ok(checked_mul(field, value, percent)? / Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_safe_percent_zero_denominator() {
        assert_eq!(safe_percent(dec!(10), Decimal::ZERO).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_safe_percent_regular() {
        assert_eq!(safe_percent(dec!(3000), dec!(15000)).unwrap(), dec!(20));
    }

    #[test]
    fn test_safe_percent_tiny_denominator_is_an_error() {
        let err = safe_percent(Decimal::MAX, dec!(0.0000001)).unwrap_err();
        assert!(matches!(err, PricingError::InvalidInput { .. }));
    }

    #[test]
    fn test_checked_sum_overflow() {
        assert_eq!(
            checked_sum("total", [dec!(1), dec!(2), dec!(3)]).unwrap(),
            dec!(6)
        );
        assert!(checked_sum("total", [Decimal::MAX, Decimal::ONE]).is_err());
    }

    #[test]
    fn test_checked_div_by_zero() {
        assert!(checked_div("ratio", dec!(1), Decimal::ZERO).is_err());
    }

    #[test]
    fn test_ensure_non_negative() {
        assert!(ensure_non_negative("quantity", dec!(0)).is_ok());
        assert!(ensure_non_negative("quantity", dec!(1.5)).is_ok());
        assert!(ensure_non_negative("quantity", dec!(-0.01)).is_err());
    }
}
