use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::category::CostCategory;
use crate::post_calculation::cost_entry::{CostEntry, CostType};
use crate::types::{
    checked_add, checked_sub, checked_sum, ensure_non_negative, safe_percent, with_metadata,
    ComputationOutput, Money, Percent, DEFAULT_AT_RISK_THRESHOLD,
};
use crate::PricingResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Budget figures plus realized cost entries for one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationInput {
    /// Budgeted cost per category (the quotation's cost breakdown)
    pub budget: BTreeMap<CostCategory, Money>,
    /// Selling price the customer pays, VAT excluded
    pub selling_price_ex_vat: Money,
    /// Margin the quotation was priced at
    pub budgeted_profit_percent: Percent,
    #[serde(default)]
    pub cost_entries: Vec<CostEntry>,
    /// Margin shortfall that triggers `at_risk`; defaults to 5 points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_risk_threshold: Option<Percent>,
}

#[cfg(feature = "pricing")]
impl ReconciliationInput {
    /// Reconcile against a computed quotation price.
    pub fn from_pricing(
        pricing: &crate::pricing::aggregator::PricingCalculation,
        cost_entries: Vec<CostEntry>,
    ) -> Self {
        ReconciliationInput {
            budget: pricing.budget(),
            selling_price_ex_vat: pricing.selling_price_ex_vat,
            budgeted_profit_percent: pricing.profit_percent,
            cost_entries,
            at_risk_threshold: None,
        }
    }
}

/// Budget vs realized for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryReconciliation {
    pub category: CostCategory,
    pub budget: Money,
    pub realized: Money,
    /// budget - realized; negative means an overrun
    pub variance: Money,
    /// realized / budget * 100 (0 when there is no budget)
    pub percent_used: Percent,
    pub over_budget: bool,
}

/// Realized cost for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRealized {
    /// "YYYY-MM"
    pub month: String,
    pub material: Money,
    pub labor: Money,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationOutput {
    pub categories: Vec<CategoryReconciliation>,
    pub budget_total: Money,
    pub realized_total: Money,
    pub realized_material_total: Money,
    pub realized_labor_total: Money,
    pub labor_hours_total: Decimal,
    /// budget_total - realized_total
    pub total_variance: Money,
    pub selling_price_ex_vat: Money,
    /// selling_price_ex_vat - realized_total
    pub realized_profit: Money,
    pub realized_margin_percent: Percent,
    pub budgeted_margin_percent: Percent,
    /// realized_margin_percent - budgeted_margin_percent
    pub margin_delta: Percent,
    /// Realized margin more than the threshold below the budgeted margin
    pub at_risk: bool,
    pub monthly: Vec<MonthlyRealized>,
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Compare realized cost entries against the quotation budget.
pub fn reconcile(
    input: &ReconciliationInput,
) -> PricingResult<ComputationOutput<ReconciliationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    ensure_non_negative("selling_price_ex_vat", input.selling_price_ex_vat)?;
    for (category, amount) in &input.budget {
        ensure_non_negative(&format!("budget.{category}"), *amount)?;
    }
    for entry in &input.cost_entries {
        entry.validate()?;
    }
    let threshold = input.at_risk_threshold.unwrap_or(DEFAULT_AT_RISK_THRESHOLD);
    ensure_non_negative("at_risk_threshold", threshold)?;

    let mut realized: BTreeMap<CostCategory, Money> = BTreeMap::new();
    let mut realized_material_total = Decimal::ZERO;
    let mut realized_labor_total = Decimal::ZERO;
    let mut labor_hours_total = Decimal::ZERO;
    let mut monthly: BTreeMap<(i32, u32), MonthlyRealized> = BTreeMap::new();

    for entry in &input.cost_entries {
        let amount = entry.amount;
        let category_total = realized.entry(entry.category).or_insert(Decimal::ZERO);
        accumulate(&format!("realized.{}", entry.category), category_total, amount)?;

        let month = monthly
            .entry((entry.date.year(), entry.date.month()))
            .or_insert_with(|| MonthlyRealized {
                month: format!("{:04}-{:02}", entry.date.year(), entry.date.month()),
                material: Decimal::ZERO,
                labor: Decimal::ZERO,
                total: Decimal::ZERO,
            });
        accumulate("monthly.total", &mut month.total, amount)?;

        match entry.cost_type {
            CostType::Material => {
                accumulate(
                    "realized_material_total",
                    &mut realized_material_total,
                    amount,
                )?;
                accumulate("monthly.material", &mut month.material, amount)?;
            }
            CostType::Labor => {
                accumulate("realized_labor_total", &mut realized_labor_total, amount)?;
                let hours = entry.labor_hours.unwrap_or(Decimal::ZERO);
                accumulate("labor_hours_total", &mut labor_hours_total, hours)?;
                accumulate("monthly.labor", &mut month.labor, amount)?;
            }
        }
    }

    let categories: Vec<CategoryReconciliation> = CostCategory::ALL
        .iter()
        .map(|cat| -> PricingResult<CategoryReconciliation> {
            let budget = input.budget.get(cat).copied().unwrap_or(Decimal::ZERO);
            let realized = realized.get(cat).copied().unwrap_or(Decimal::ZERO);
            let variance = checked_sub(&format!("variance.{cat}"), budget, realized)?;
            Ok(CategoryReconciliation {
                category: *cat,
                budget,
                realized,
                variance,
                percent_used: safe_percent(realized, budget)?,
                over_budget: variance < Decimal::ZERO,
            })
        })
        .collect::<PricingResult<_>>()?;

    for row in categories.iter().filter(|r| r.over_budget) {
        if row.budget.is_zero() {
            warnings.push(format!(
                "Unbudgeted costs of {} recorded in category '{}'",
                row.realized, row.category
            ));
        } else {
            warnings.push(format!(
                "Category '{}' over budget by {}",
                row.category, -row.variance
            ));
        }
    }

    let budget_total: Money =
        checked_sum("budget_total", categories.iter().map(|r| r.budget))?;
    let realized_total: Money =
        checked_sum("realized_total", categories.iter().map(|r| r.realized))?;
    let total_variance = checked_sub("total_variance", budget_total, realized_total)?;
    let realized_profit =
        checked_sub("realized_profit", input.selling_price_ex_vat, realized_total)?;
    let realized_margin_percent = safe_percent(realized_profit, input.selling_price_ex_vat)?;
    let margin_delta = checked_sub(
        "margin_delta",
        realized_margin_percent,
        input.budgeted_profit_percent,
    )?;
    let at_risk_below = checked_sub(
        "at_risk_threshold",
        input.budgeted_profit_percent,
        threshold,
    )?;
    let at_risk = realized_margin_percent < at_risk_below;

    if at_risk {
        tracing::warn!(
            realized_margin = %realized_margin_percent,
            budgeted_margin = %input.budgeted_profit_percent,
            "project margin at risk"
        );
    }
    tracing::debug!(
        entries = input.cost_entries.len(),
        realized_total = %realized_total,
        "reconciled post-calculation"
    );

    let output = ReconciliationOutput {
        categories,
        budget_total,
        realized_total,
        realized_material_total,
        realized_labor_total,
        labor_hours_total,
        total_variance,
        selling_price_ex_vat: input.selling_price_ex_vat,
        realized_profit,
        realized_margin_percent,
        budgeted_margin_percent: input.budgeted_profit_percent,
        margin_delta,
        at_risk,
        monthly: monthly.into_values().collect(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Post-calculation: realized cost entries against budgeted category costs",
        &serde_json::json!({
            "at_risk_threshold": threshold,
            "entries": input.cost_entries.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn accumulate(field: &str, total: &mut Money, amount: Money) -> PricingResult<()> {
    *total = checked_add(field, *total, amount)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn base_input(entries: Vec<CostEntry>) -> ReconciliationInput {
        let mut budget = BTreeMap::new();
        budget.insert(CostCategory::Elements, dec!(10000));
        budget.insert(CostCategory::Installation, dec!(2000));
        ReconciliationInput {
            budget,
            selling_price_ex_vat: dec!(15000),
            budgeted_profit_percent: dec!(20),
            cost_entries: entries,
            at_risk_threshold: None,
        }
    }

    #[test]
    fn test_overrun_has_negative_variance() {
        let input = base_input(vec![
            CostEntry::material(
                "a",
                date(2024, 4, 2),
                CostCategory::Elements,
                "Delivery 1",
                dec!(7000),
            ),
            CostEntry::material(
                "b",
                date(2024, 4, 20),
                CostCategory::Elements,
                "Delivery 2",
                dec!(5000),
            ),
        ]);
        let out = reconcile(&input).unwrap().result;
        let elements = &out.categories[0];
        assert_eq!(elements.category, CostCategory::Elements);
        assert_eq!(elements.realized, dec!(12000));
        assert_eq!(elements.variance, dec!(-2000));
        assert_eq!(elements.percent_used, dec!(120));
        assert!(elements.over_budget);
    }

    #[test]
    fn test_realized_margin() {
        let input = base_input(vec![
            CostEntry::material("a", date(2024, 4, 2), CostCategory::Elements, "", dec!(9000)),
            CostEntry::labor(
                "b",
                date(2024, 5, 3),
                CostCategory::Installation,
                "",
                dec!(40),
                dec!(50),
            )
            .unwrap(),
        ]);
        let out = reconcile(&input).unwrap().result;
        assert_eq!(out.realized_total, dec!(11000));
        assert_eq!(out.realized_profit, dec!(4000));
        assert!((out.realized_margin_percent - dec!(26.67)).abs() < dec!(0.01));
        assert!(!out.at_risk);
        assert_eq!(out.realized_labor_total, dec!(2000));
        assert_eq!(out.labor_hours_total, dec!(40));
        assert_eq!(out.monthly.len(), 2);
        assert_eq!(out.monthly[0].month, "2024-04");
        assert_eq!(out.monthly[1].labor, dec!(2000));
    }

    #[test]
    fn test_at_risk_threshold() {
        // realized margin 10% vs budgeted 20% -> 10 points short
        let input = base_input(vec![CostEntry::material(
            "a",
            date(2024, 4, 2),
            CostCategory::Elements,
            "",
            dec!(13500),
        )]);
        let out = reconcile(&input).unwrap().result;
        assert_eq!(out.realized_margin_percent, dec!(10));
        assert!(out.at_risk);

        let mut lenient = input.clone();
        lenient.at_risk_threshold = Some(dec!(15));
        assert!(!reconcile(&lenient).unwrap().result.at_risk);
    }

    #[test]
    fn test_zero_budget_and_zero_selling_price_guarded() {
        let input = ReconciliationInput {
            budget: BTreeMap::new(),
            selling_price_ex_vat: Decimal::ZERO,
            budgeted_profit_percent: Decimal::ZERO,
            cost_entries: vec![CostEntry::material(
                "a",
                date(2024, 1, 1),
                CostCategory::Design,
                "",
                dec!(300),
            )],
            at_risk_threshold: None,
        };
        let out = reconcile(&input).unwrap();
        let design = out
            .result
            .categories
            .iter()
            .find(|r| r.category == CostCategory::Design)
            .unwrap();
        assert_eq!(design.percent_used, Decimal::ZERO);
        assert_eq!(out.result.realized_margin_percent, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_invalid_entry_rejected() {
        let input = base_input(vec![CostEntry::material(
            "a",
            date(2024, 1, 1),
            CostCategory::Elements,
            "",
            dec!(-1),
        )]);
        assert!(reconcile(&input).is_err());
    }

    #[test]
    fn test_realized_sum_overflow_rejected() {
        let huge = dec!(50000000000000000000000000000);
        let input = base_input(vec![
            CostEntry::material("a", date(2024, 1, 1), CostCategory::Elements, "", huge),
            CostEntry::material("b", date(2024, 1, 2), CostCategory::Elements, "", huge),
        ]);
        let err = reconcile(&input).unwrap_err();
        assert!(err.to_string().contains("realized.elements"));
    }

    #[test]
    fn test_margin_overflow_rejected() {
        let mut input = base_input(vec![CostEntry::material(
            "a",
            date(2024, 1, 1),
            CostCategory::Elements,
            "",
            dec!(70000000000000000000000000000),
        )]);
        input.selling_price_ex_vat = dec!(0.001);
        assert!(reconcile(&input).is_err());
    }
}
