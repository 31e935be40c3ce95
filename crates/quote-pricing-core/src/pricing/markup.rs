use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::CostCategory;
use crate::error::PricingError;
use crate::types::{checked_add, percent_of, Money, Percent};
use crate::PricingResult;

/// Upper bound for a single category markup.
pub const MAX_MARKUP_PERCENT: Decimal = dec!(500);

/// Validated per-category markup percentages.
///
/// Categories without an entry carry a 0% markup. Construction rejects
/// negative values and values above [`MAX_MARKUP_PERCENT`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<CostCategory, Percent>", into = "BTreeMap<CostCategory, Percent>")]
pub struct MarkupConfig {
    percentages: BTreeMap<CostCategory, Percent>,
}

impl MarkupConfig {
    pub fn new(percentages: BTreeMap<CostCategory, Percent>) -> PricingResult<Self> {
        for (category, pct) in &percentages {
            validate_markup(*category, *pct)?;
        }
        Ok(MarkupConfig { percentages })
    }

    /// The same markup on every category.
    pub fn uniform(pct: Percent) -> PricingResult<Self> {
        MarkupConfig::new(CostCategory::ALL.iter().map(|cat| (*cat, pct)).collect())
    }

    /// Copy with one category's markup replaced.
    pub fn with_markup(&self, category: CostCategory, pct: Percent) -> PricingResult<Self> {
        validate_markup(category, pct)?;
        let mut percentages = self.percentages.clone();
        percentages.insert(category, pct);
        Ok(MarkupConfig { percentages })
    }

    pub fn percent(&self, category: CostCategory) -> Percent {
        self.percentages
            .get(&category)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Every category with its effective percentage.
    pub fn effective(&self) -> BTreeMap<CostCategory, Percent> {
        CostCategory::ALL
            .iter()
            .map(|cat| (*cat, self.percent(*cat)))
            .collect()
    }
}

impl TryFrom<BTreeMap<CostCategory, Percent>> for MarkupConfig {
    type Error = PricingError;

    fn try_from(percentages: BTreeMap<CostCategory, Percent>) -> Result<Self, Self::Error> {
        MarkupConfig::new(percentages)
    }
}

impl From<MarkupConfig> for BTreeMap<CostCategory, Percent> {
    fn from(config: MarkupConfig) -> Self {
        config.percentages
    }
}

fn validate_markup(category: CostCategory, pct: Percent) -> PricingResult<()> {
    if pct < Decimal::ZERO || pct > MAX_MARKUP_PERCENT {
        return Err(PricingError::invalid(
            format!("category_markups.{category}"),
            format!("Markup must be between 0 and {MAX_MARKUP_PERCENT}%, got {pct}"),
        ));
    }
    Ok(())
}

/// Markup applied to a single category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPricing {
    pub cost: Money,
    pub markup_percentage: Percent,
    /// cost * markup_percentage / 100
    pub markup: Money,
    /// cost + markup
    pub selling_price: Money,
    /// Equal to markup; commission is accounted for at the aggregate level
    pub profit: Money,
}

/// Apply a markup percentage to a category cost.
///
/// A zero cost yields zero markup, selling price and profit whatever the
/// configured percentage.
pub fn apply_markup(cost: Money, markup_percentage: Percent) -> PricingResult<CategoryPricing> {
    if cost.is_zero() {
        return Ok(CategoryPricing {
            cost: Decimal::ZERO,
            markup_percentage,
            markup: Decimal::ZERO,
            selling_price: Decimal::ZERO,
            profit: Decimal::ZERO,
        });
    }
    let markup = percent_of("markup", cost, markup_percentage)?;
    Ok(CategoryPricing {
        cost,
        markup_percentage,
        markup,
        selling_price: checked_add("selling_price", cost, markup)?,
        profit: markup,
    })
}
