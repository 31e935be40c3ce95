use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::category::CostCategory;
use crate::error::PricingError;
use crate::types::{checked_mul, ensure_non_negative, Money};
use crate::PricingResult;

/// Allowed gap between `amount` and `labor_hours * labor_rate`.
const LABOR_AMOUNT_TOLERANCE: Decimal = dec!(0.01);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostType {
    Material,
    Labor,
}

/// A realized expense recorded during project execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEntry {
    pub id: String,
    pub date: NaiveDate,
    pub category: CostCategory,
    #[serde(default)]
    pub description: String,
    pub amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    pub cost_type: CostType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labor_hours: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labor_rate: Option<Money>,
}

impl CostEntry {
    pub fn material(
        id: impl Into<String>,
        date: NaiveDate,
        category: CostCategory,
        description: impl Into<String>,
        amount: Money,
    ) -> Self {
        CostEntry {
            id: id.into(),
            date,
            category,
            description: description.into(),
            amount,
            supplier: None,
            cost_type: CostType::Material,
            labor_hours: None,
            labor_rate: None,
        }
    }

    /// Labor entry; `amount` is derived from hours and rate.
    pub fn labor(
        id: impl Into<String>,
        date: NaiveDate,
        category: CostCategory,
        description: impl Into<String>,
        hours: Decimal,
        rate: Money,
    ) -> PricingResult<Self> {
        let id = id.into();
        let amount = checked_mul(&format!("cost_entries[{id}].amount"), hours, rate)?;
        Ok(CostEntry {
            id,
            date,
            category,
            description: description.into(),
            amount,
            supplier: None,
            cost_type: CostType::Labor,
            labor_hours: Some(hours),
            labor_rate: Some(rate),
        })
    }

    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    pub fn validate(&self) -> PricingResult<()> {
        if self.id.trim().is_empty() {
            return Err(PricingError::invalid("cost_entry.id", "must not be empty"));
        }
        ensure_non_negative(&format!("cost_entries[{}].amount", self.id), self.amount)?;
        if let Some(hours) = self.labor_hours {
            ensure_non_negative(&format!("cost_entries[{}].labor_hours", self.id), hours)?;
        }
        if let Some(rate) = self.labor_rate {
            ensure_non_negative(&format!("cost_entries[{}].labor_rate", self.id), rate)?;
        }
        if let (Some(hours), Some(rate)) = (self.labor_hours, self.labor_rate) {
            let field = format!("cost_entries[{}].amount", self.id);
            let expected = checked_mul(&field, hours, rate)?;
            if (expected - self.amount).abs() > LABOR_AMOUNT_TOLERANCE {
                return Err(PricingError::invalid(
                    field,
                    format!(
                        "Labor amount {} does not equal {hours} h x {rate} = {expected}",
                        self.amount
                    ),
                ));
            }
        }
        Ok(())
    }
}
