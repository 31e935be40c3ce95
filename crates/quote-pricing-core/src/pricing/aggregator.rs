use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::category::CostCategory;
use crate::error::PricingError;
use crate::pricing::breakdown::CostBreakdown;
use crate::pricing::line_items::Section;
use crate::pricing::markup::{apply_markup, CategoryPricing, MarkupConfig};
use crate::pricing::vat::{calculate_vat, VatMode};
use crate::types::{
    checked_sub, checked_sum, percent_of, safe_percent, with_metadata, ComputationOutput, Money,
    Percent,
};
use crate::PricingResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Pricing configuration of a quotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default)]
    pub category_markups: MarkupConfig,
    /// Sales commission, computed on material cost
    #[serde(default)]
    pub commission_percentage: Percent,
    #[serde(default)]
    pub vat_mode: VatMode,
}

impl PricingConfig {
    pub fn validate(&self) -> PricingResult<()> {
        if self.commission_percentage < Decimal::ZERO
            || self.commission_percentage > Decimal::ONE_HUNDRED
        {
            return Err(PricingError::invalid(
                "commission_percentage",
                format!(
                    "Commission must be between 0 and 100%, got {}",
                    self.commission_percentage
                ),
            ));
        }
        Ok(())
    }
}

/// Input for a full quotation pricing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingInput {
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(flatten)]
    pub config: PricingConfig,
}

/// Derived pricing of a quotation. Recomputed on every edit, never stored on
/// its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingCalculation {
    pub category_markups: BTreeMap<CostCategory, Percent>,
    pub commission_percentage: Percent,
    pub vat_mode: VatMode,
    pub vat_percentage: Percent,
    /// One entry per category, zero-cost categories included
    pub breakdown: BTreeMap<CostCategory, CategoryPricing>,
    /// Σ breakdown.cost
    pub material_cost_total: Money,
    /// Σ breakdown.markup
    pub markup_total: Money,
    /// material_cost_total * commission_percentage / 100; paid out of the margin
    pub commission_amount: Money,
    /// Σ breakdown.selling_price; the VAT base
    pub selling_price_ex_vat: Money,
    /// selling_price_ex_vat - material_cost_total
    pub profit_amount: Money,
    /// profit_amount / selling_price_ex_vat * 100 (0 when nothing is sold)
    pub profit_percent: Percent,
    /// profit_amount - commission_amount
    pub profit_after_commission: Money,
    pub vat_amount: Money,
    pub total_with_vat: Money,
}

impl PricingCalculation {
    pub fn category(&self, category: CostCategory) -> Option<&CategoryPricing> {
        self.breakdown.get(&category)
    }

    /// Budgeted cost per category, as used by post-calculation.
    pub fn budget(&self) -> BTreeMap<CostCategory, Money> {
        self.breakdown
            .iter()
            .map(|(cat, pricing)| (*cat, pricing.cost))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Price a set of quotation sections: cost roll-up, per-category markup,
/// commission on cost and VAT on the selling price.
pub fn calculate_pricing(
    input: &PricingInput,
) -> PricingResult<ComputationOutput<PricingCalculation>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let costs = CostBreakdown::from_sections(&input.sections)?;
    let calculation = price_breakdown(&costs, &input.config, &mut warnings)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Cost roll-up with per-category markup, commission on cost, VAT on selling price",
        &input.config,
        warnings,
        elapsed,
        calculation,
    ))
}

/// Price an already aggregated cost breakdown.
pub fn price_breakdown(
    costs: &CostBreakdown,
    config: &PricingConfig,
    warnings: &mut Vec<String>,
) -> PricingResult<PricingCalculation> {
    config.validate()?;

    if let Some(warning) = config.vat_mode.warning() {
        warnings.push(warning);
    }

    let breakdown: BTreeMap<CostCategory, CategoryPricing> = CostCategory::ALL
        .iter()
        .map(|cat| -> PricingResult<(CostCategory, CategoryPricing)> {
            let cost = costs.cost(*cat);
            let pricing = apply_markup(cost, config.category_markups.percent(*cat))?;
            Ok((*cat, pricing))
        })
        .collect::<PricingResult<_>>()?;

    let material_cost_total: Money =
        checked_sum("material_cost_total", breakdown.values().map(|p| p.cost))?;
    let markup_total: Money =
        checked_sum("markup_total", breakdown.values().map(|p| p.markup))?;
    let selling_price_ex_vat: Money = checked_sum(
        "selling_price_ex_vat",
        breakdown.values().map(|p| p.selling_price),
    )?;
    let commission_amount = percent_of(
        "commission_amount",
        material_cost_total,
        config.commission_percentage,
    )?;
    let profit_amount =
        checked_sub("profit_amount", selling_price_ex_vat, material_cost_total)?;
    let profit_percent = safe_percent(profit_amount, selling_price_ex_vat)?;
    let profit_after_commission =
        checked_sub("profit_after_commission", profit_amount, commission_amount)?;

    let vat = calculate_vat(selling_price_ex_vat, &config.vat_mode)?;

    if profit_after_commission < Decimal::ZERO {
        warnings.push(format!(
            "Commission ({commission_amount}) exceeds markup ({profit_amount}); \
             the quotation loses money"
        ));
    }

    tracing::debug!(
        material_cost_total = %material_cost_total,
        selling_price_ex_vat = %selling_price_ex_vat,
        total_with_vat = %vat.total_with_vat,
        "priced quotation"
    );

    Ok(PricingCalculation {
        category_markups: config.category_markups.effective(),
        commission_percentage: config.commission_percentage,
        vat_mode: vat.vat_mode,
        vat_percentage: vat.vat_percentage,
        breakdown,
        material_cost_total,
        markup_total,
        commission_amount,
        selling_price_ex_vat,
        profit_amount,
        profit_percent,
        profit_after_commission,
        vat_amount: vat.vat_amount,
        total_with_vat: vat.total_with_vat,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::line_items::LineItem;
    use rust_decimal_macros::dec;

    fn scenario_config() -> PricingConfig {
        PricingConfig {
            category_markups: MarkupConfig::uniform(dec!(25)).unwrap(),
            commission_percentage: dec!(4),
            vat_mode: VatMode::Standard,
        }
    }

    fn scenario_costs() -> CostBreakdown {
        let mut costs = BTreeMap::new();
        costs.insert(CostCategory::Elements, dec!(10000));
        costs.insert(CostCategory::Installation, dec!(2000));
        CostBreakdown::from_costs(&costs).unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let mut warnings = Vec::new();
        let calc = price_breakdown(&scenario_costs(), &scenario_config(), &mut warnings).unwrap();

        assert_eq!(calc.material_cost_total, dec!(12000));
        assert_eq!(calc.markup_total, dec!(3000));
        assert_eq!(calc.selling_price_ex_vat, dec!(15000));
        assert_eq!(calc.commission_amount, dec!(480));
        assert_eq!(calc.profit_amount, dec!(3000));
        assert_eq!(calc.profit_percent, dec!(20));
        assert_eq!(calc.profit_after_commission, dec!(2520));
        assert_eq!(calc.vat_amount, dec!(3825));
        assert_eq!(calc.total_with_vat, dec!(18825));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_zero_cost_categories_present_but_zero() {
        let mut warnings = Vec::new();
        let calc = price_breakdown(&scenario_costs(), &scenario_config(), &mut warnings).unwrap();
        let design = calc.category(CostCategory::Design).unwrap();
        assert_eq!(design.markup_percentage, dec!(25));
        assert_eq!(design.selling_price, Decimal::ZERO);
        assert_eq!(calc.breakdown.len(), CostCategory::ALL.len());
    }

    #[test]
    fn test_commission_out_of_range() {
        let mut config = scenario_config();
        config.commission_percentage = dec!(120);
        let mut warnings = Vec::new();
        assert!(price_breakdown(&scenario_costs(), &config, &mut warnings).is_err());
    }

    #[test]
    fn test_commission_above_markup_warns() {
        let config = PricingConfig {
            category_markups: MarkupConfig::uniform(dec!(2)).unwrap(),
            commission_percentage: dec!(5),
            vat_mode: VatMode::Standard,
        };
        let mut warnings = Vec::new();
        let calc = price_breakdown(&scenario_costs(), &config, &mut warnings).unwrap();
        assert!(calc.profit_after_commission < Decimal::ZERO);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_calculate_pricing_from_json() {
        let json = r#"{
            "sections": [
                {"id": "s1", "name": "Elements", "items": [
                    {"type": "element", "id": "e1", "quantity": "10", "unit_price": "1000"}
                ]},
                {"id": "s2", "name": "Installation", "category": "installation", "items": [
                    {"type": "product", "id": "i1", "quantity": "40", "unit_price": "50"}
                ]}
            ],
            "category_markups": {"elements": "25", "installation": "25"},
            "commission_percentage": "4",
            "vat_mode": "construction_service"
        }"#;
        let input: PricingInput = serde_json::from_str(json).unwrap();
        let out = calculate_pricing(&input).unwrap();
        assert_eq!(out.result.selling_price_ex_vat, dec!(15000));
        assert_eq!(out.result.vat_amount, Decimal::ZERO);
        assert_eq!(out.result.total_with_vat, dec!(15000));
    }

    #[test]
    fn test_unrecognized_vat_mode_warns() {
        let input = PricingInput {
            sections: vec![Section::new("s", "S")
                .with_item(LineItem::element("e", dec!(1), dec!(100)))],
            config: PricingConfig {
                vat_mode: VatMode::parse("reduced"),
                ..PricingConfig::default()
            },
        };
        let out = calculate_pricing(&input).unwrap();
        assert_eq!(out.result.vat_mode, VatMode::Standard);
        assert_eq!(out.result.total_with_vat, dec!(125.5));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_overflowing_item_is_an_error() {
        let input = PricingInput {
            sections: vec![Section::new("s", "S").with_item(LineItem::element(
                "e1",
                dec!(100000000000000000),
                dec!(100000000000000000),
            ))],
            config: scenario_config(),
        };
        let err = calculate_pricing(&input).unwrap_err();
        assert!(matches!(err, PricingError::InvalidInput { .. }));
    }

    #[test]
    fn test_selling_price_overflow_is_an_error() {
        let mut costs = BTreeMap::new();
        costs.insert(CostCategory::Elements, dec!(35000000000000000000000000000));
        costs.insert(CostCategory::Trusses, dec!(35000000000000000000000000000));
        let costs = CostBreakdown::from_costs(&costs).unwrap();
        let mut warnings = Vec::new();
        assert!(price_breakdown(&costs, &scenario_config(), &mut warnings).is_err());
    }
}
