use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::CostCategory;
use crate::error::PricingError;
use crate::post_calculation::cost_entry::CostEntry;
use crate::types::{checked_add, checked_sum, Money};
use crate::PricingResult;

/// Append-only record of realized costs for one project.
///
/// Entries are removed only explicitly, by id. Mutators return a new ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CostEntry>", into = "Vec<CostEntry>")]
pub struct CostLedger {
    entries: Vec<CostEntry>,
}

impl CostLedger {
    pub fn new(entries: Vec<CostEntry>) -> PricingResult<Self> {
        entries
            .into_iter()
            .try_fold(CostLedger::default(), |ledger, entry| ledger.with_entry(entry))
    }

    pub fn with_entry(&self, entry: CostEntry) -> PricingResult<Self> {
        entry.validate()?;
        if self.get(&entry.id).is_some() {
            return Err(PricingError::Duplicate {
                kind: "cost entry".into(),
                id: entry.id,
            });
        }
        let mut entries = self.entries.clone();
        entries.push(entry);
        Ok(CostLedger { entries })
    }

    pub fn without_entry(&self, id: &str) -> PricingResult<Self> {
        if self.get(id).is_none() {
            return Err(PricingError::NotFound {
                kind: "cost entry".into(),
                id: id.to_string(),
            });
        }
        Ok(CostLedger {
            entries: self.entries.iter().filter(|e| e.id != id).cloned().collect(),
        })
    }

    pub fn get(&self, id: &str) -> Option<&CostEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entries(&self) -> &[CostEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> PricingResult<Money> {
        checked_sum("ledger.total", self.entries.iter().map(|e| e.amount))
    }

    pub fn by_category(&self) -> PricingResult<BTreeMap<CostCategory, Money>> {
        let mut totals: BTreeMap<CostCategory, Money> = CostCategory::ALL
            .iter()
            .map(|cat| (*cat, Decimal::ZERO))
            .collect();
        for entry in &self.entries {
            let total = totals.entry(entry.category).or_insert(Decimal::ZERO);
            let field = format!("ledger.{}", entry.category);
            *total = checked_add(&field, *total, entry.amount)?;
        }
        Ok(totals)
    }
}

impl TryFrom<Vec<CostEntry>> for CostLedger {
    type Error = PricingError;

    fn try_from(entries: Vec<CostEntry>) -> Result<Self, Self::Error> {
        CostLedger::new(entries)
    }
}

impl From<CostLedger> for Vec<CostEntry> {
    fn from(ledger: CostLedger) -> Self {
        ledger.entries
    }
}
