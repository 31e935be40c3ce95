use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::CostCategory;
use crate::pricing::line_items::Section;
use crate::types::{checked_add, checked_sum, ensure_non_negative, Money};
use crate::PricingResult;

/// Cost per category, before any markup.
///
/// Every category is always present; categories without items hold zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    costs: BTreeMap<CostCategory, Money>,
}

impl Default for CostBreakdown {
    fn default() -> Self {
        CostBreakdown {
            costs: CostCategory::ALL
                .iter()
                .map(|cat| (*cat, Decimal::ZERO))
                .collect(),
        }
    }
}

impl CostBreakdown {
    /// Roll up `quantity * unit_price` of every item into its resolved category.
    pub fn from_sections(sections: &[Section]) -> PricingResult<Self> {
        let mut breakdown = CostBreakdown::default();
        for section in sections {
            for (category, item) in section.categorized_items() {
                item.validate()?;
                breakdown.add(category, item.total_price()?)?;
            }
        }
        Ok(breakdown)
    }

    /// Build from pre-aggregated category costs. Missing categories are zero.
    pub fn from_costs(costs: &BTreeMap<CostCategory, Money>) -> PricingResult<Self> {
        let mut breakdown = CostBreakdown::default();
        for (category, amount) in costs {
            ensure_non_negative(&format!("costs.{category}"), *amount)?;
            breakdown.add(*category, *amount)?;
        }
        Ok(breakdown)
    }

    fn add(&mut self, category: CostCategory, amount: Money) -> PricingResult<()> {
        let cost = self.costs.entry(category).or_insert(Decimal::ZERO);
        *cost = checked_add(&format!("costs.{category}"), *cost, amount)?;
        Ok(())
    }

    pub fn cost(&self, category: CostCategory) -> Money {
        self.costs.get(&category).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn total(&self) -> PricingResult<Money> {
        checked_sum("material_cost_total", self.costs.values().copied())
    }

    pub fn iter(&self) -> impl Iterator<Item = (CostCategory, Money)> + '_ {
        self.costs.iter().map(|(cat, amount)| (*cat, *amount))
    }

    pub fn as_map(&self) -> &BTreeMap<CostCategory, Money> {
        &self.costs
    }
}
