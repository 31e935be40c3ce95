use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{checked_add, checked_div, ensure_non_negative, percent_of, Money, Percent};
use crate::PricingResult;

/// Finnish general VAT rate.
pub const STANDARD_VAT_PERCENT: Decimal = dec!(25.5);

/// Reverse-charge construction services carry no VAT on the invoice.
pub const CONSTRUCTION_SERVICE_VAT_PERCENT: Decimal = Decimal::ZERO;

/// VAT treatment of a quotation.
///
/// Strings other than the two known modes deserialize to `Unrecognized`,
/// which is priced as `Standard` and reported as a warning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VatMode {
    #[default]
    Standard,
    ConstructionService,
    Unrecognized(String),
}

impl VatMode {
    pub fn parse(raw: &str) -> VatMode {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "standard" => VatMode::Standard,
            "construction_service" | "constructionservice" | "reverse_charge" => {
                VatMode::ConstructionService
            }
            _ => VatMode::Unrecognized(raw.to_string()),
        }
    }

    /// The mode actually used for pricing.
    pub fn effective(&self) -> VatMode {
        match self {
            VatMode::Unrecognized(_) => VatMode::Standard,
            other => other.clone(),
        }
    }

    pub fn vat_percentage(&self) -> Percent {
        match self {
            VatMode::Standard | VatMode::Unrecognized(_) => STANDARD_VAT_PERCENT,
            VatMode::ConstructionService => CONSTRUCTION_SERVICE_VAT_PERCENT,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            VatMode::Standard => "standard",
            VatMode::ConstructionService => "construction_service",
            VatMode::Unrecognized(raw) => raw,
        }
    }

    /// Warning text for an unrecognized mode, `None` otherwise.
    pub fn warning(&self) -> Option<String> {
        match self {
            VatMode::Unrecognized(raw) => Some(format!(
                "Unrecognized VAT mode '{raw}'; defaulting to standard ({STANDARD_VAT_PERCENT}%)"
            )),
            _ => None,
        }
    }
}

impl From<String> for VatMode {
    fn from(raw: String) -> Self {
        let mode = VatMode::parse(&raw);
        if let VatMode::Unrecognized(_) = mode {
            tracing::warn!(vat_mode = %raw, "unrecognized VAT mode, defaulting to standard");
        }
        mode
    }
}

impl From<VatMode> for String {
    fn from(mode: VatMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for VatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// VAT applied to a pre-VAT subtotal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatBreakdown {
    pub vat_mode: VatMode,
    pub subtotal: Money,
    pub vat_percentage: Percent,
    /// subtotal * vat_percentage / 100
    pub vat_amount: Money,
    /// subtotal + vat_amount
    pub total_with_vat: Money,
}

/// Apply the VAT rate selected by `mode` to `subtotal`.
pub fn calculate_vat(subtotal: Money, mode: &VatMode) -> PricingResult<VatBreakdown> {
    ensure_non_negative("subtotal", subtotal)?;
    let vat_percentage = mode.vat_percentage();
    let vat_amount = percent_of("vat_amount", subtotal, vat_percentage)?;
    Ok(VatBreakdown {
        vat_mode: mode.effective(),
        subtotal,
        vat_percentage,
        vat_amount,
        total_with_vat: checked_add("total_with_vat", subtotal, vat_amount)?,
    })
}

/// Recover the pre-VAT subtotal from a VAT-inclusive total.
pub fn remove_vat(total_with_vat: Money, mode: &VatMode) -> PricingResult<Money> {
    ensure_non_negative("total_with_vat", total_with_vat)?;
    let factor = Decimal::ONE + mode.vat_percentage() / Decimal::ONE_HUNDRED;
    checked_div("subtotal", total_with_vat, factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_vat() {
        let vat = calculate_vat(dec!(15000), &VatMode::Standard).unwrap();
        assert_eq!(vat.vat_percentage, dec!(25.5));
        assert_eq!(vat.vat_amount, dec!(3825));
        assert_eq!(vat.total_with_vat, dec!(18825));
    }

    #[test]
    fn test_construction_service_is_zero_rated() {
        let vat = calculate_vat(dec!(15000), &VatMode::ConstructionService).unwrap();
        assert_eq!(vat.vat_amount, Decimal::ZERO);
        assert_eq!(vat.total_with_vat, dec!(15000));
    }

    #[test]
    fn test_round_trip_both_modes() {
        for mode in [VatMode::Standard, VatMode::ConstructionService] {
            let subtotal = dec!(12345.67);
            let vat = calculate_vat(subtotal, &mode).unwrap();
            let recovered = remove_vat(vat.total_with_vat, &mode).unwrap();
            assert!((recovered - subtotal).abs() < dec!(0.000001));
        }
    }

    #[test]
    fn test_unrecognized_mode_priced_as_standard() {
        let mode: VatMode = serde_json::from_str("\"reduced\"").unwrap();
        assert_eq!(mode, VatMode::Unrecognized("reduced".into()));
        assert!(mode.warning().is_some());
        let vat = calculate_vat(dec!(100), &mode).unwrap();
        assert_eq!(vat.vat_mode, VatMode::Standard);
        assert_eq!(vat.total_with_vat, dec!(125.5));
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let err = calculate_vat(dec!(-100), &VatMode::Standard).unwrap_err();
        assert!(err.to_string().contains("subtotal"));
        assert!(remove_vat(dec!(-125.5), &VatMode::Standard).is_err());
        assert!(calculate_vat(Decimal::ZERO, &VatMode::Standard).is_ok());
    }

    #[test]
    fn test_mode_serialization() {
        let json = serde_json::to_string(&VatMode::ConstructionService).unwrap();
        assert_eq!(json, "\"construction_service\"");
        let parsed: VatMode = serde_json::from_str("\"construction-service\"").unwrap();
        assert_eq!(parsed, VatMode::ConstructionService);
    }
}
