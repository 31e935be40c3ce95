use serde::{Deserialize, Serialize};

use crate::error::PricingError;
use crate::post_calculation::ledger::CostLedger;
use crate::post_calculation::reconciler::{reconcile, ReconciliationInput, ReconciliationOutput};
use crate::pricing::aggregator::{price_breakdown, PricingCalculation, PricingConfig};
use crate::pricing::breakdown::CostBreakdown;
use crate::pricing::line_items::{LineItem, Section};
use crate::quotation::actions::QuotationAction;
use crate::quotation::status::QuotationStatus;
use crate::types::{ComputationOutput, Percent};
use crate::PricingResult;

/// Stored form of a quotation. Derived pricing is not part of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(default)]
    pub status: QuotationStatus,
    #[serde(default)]
    pub revision: u32,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub pricing_config: PricingConfig,
    #[serde(default)]
    pub cost_entries: CostLedger,
}

/// Immutable quotation snapshot with its pricing derived from the current
/// line items and configuration.
///
/// Every edit goes through [`Quotation::apply`], which returns a new snapshot
/// and leaves the old one untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuotationRecord")]
pub struct Quotation {
    id: String,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer: Option<String>,
    status: QuotationStatus,
    revision: u32,
    sections: Vec<Section>,
    pricing_config: PricingConfig,
    cost_entries: CostLedger,
    pricing: PricingCalculation,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

impl TryFrom<QuotationRecord> for Quotation {
    type Error = PricingError;

    fn try_from(record: QuotationRecord) -> Result<Self, Self::Error> {
        Quotation::from_record(record)
    }
}

impl Quotation {
    /// Empty draft quotation.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        pricing_config: PricingConfig,
    ) -> PricingResult<Self> {
        Quotation::from_record(QuotationRecord {
            id: id.into(),
            title: title.into(),
            customer: None,
            status: QuotationStatus::Draft,
            revision: 0,
            sections: Vec::new(),
            pricing_config,
            cost_entries: CostLedger::default(),
        })
    }

    pub fn from_record(record: QuotationRecord) -> PricingResult<Self> {
        ensure_unique_section_ids(&record.sections)?;
        let mut warnings = Vec::new();
        let pricing = derive_pricing(&record.sections, &record.pricing_config, &mut warnings)?;
        Ok(Quotation {
            id: record.id,
            title: record.title,
            customer: record.customer,
            status: record.status,
            revision: record.revision,
            sections: record.sections,
            pricing_config: record.pricing_config,
            cost_entries: record.cost_entries,
            pricing,
            warnings,
        })
    }

    pub fn to_record(&self) -> QuotationRecord {
        QuotationRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            customer: self.customer.clone(),
            status: self.status,
            revision: self.revision,
            sections: self.sections.clone(),
            pricing_config: self.pricing_config.clone(),
            cost_entries: self.cost_entries.clone(),
        }
    }

    pub fn with_customer(&self, customer: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.customer = Some(customer.into());
        next
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn customer(&self) -> Option<&str> {
        self.customer.as_deref()
    }

    pub fn status(&self) -> QuotationStatus {
        self.status
    }

    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn pricing_config(&self) -> &PricingConfig {
        &self.pricing_config
    }

    pub fn cost_entries(&self) -> &CostLedger {
        &self.cost_entries
    }

    pub fn pricing(&self) -> &PricingCalculation {
        &self.pricing
    }

    /// Warnings from the latest pricing run.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    // -----------------------------------------------------------------------
    // Reducer
    // -----------------------------------------------------------------------

    /// Apply one edit and return the resulting snapshot.
    pub fn apply(&self, action: QuotationAction) -> PricingResult<Quotation> {
        if action.edits_pricing() && self.status.is_pricing_frozen() {
            return Err(PricingError::QuotationFrozen {
                status: self.status.to_string(),
            });
        }

        tracing::debug!(quotation = %self.id, action = action.name(), "applying quotation action");

        let edits_pricing = action.edits_pricing();
        let mut next = self.clone();

        match action {
            QuotationAction::AddSection { section } => {
                if next.sections.iter().any(|s| s.id == section.id) {
                    return Err(PricingError::Duplicate {
                        kind: "section".into(),
                        id: section.id,
                    });
                }
                next.sections.push(section);
            }
            QuotationAction::RemoveSection { section_id } => {
                let before = next.sections.len();
                next.sections.retain(|s| s.id != section_id);
                if next.sections.len() == before {
                    return Err(not_found("section", &section_id));
                }
            }
            QuotationAction::UpsertLineItem { section_id, item } => {
                item.validate()?;
                let section = next.section_mut(&section_id)?;
                upsert_item(section, item);
            }
            QuotationAction::RemoveLineItem {
                section_id,
                item_id,
            } => {
                let section = next.section_mut(&section_id)?;
                let before = section.items.len();
                section.items.retain(|i| i.id() != item_id);
                if section.items.len() == before {
                    return Err(not_found("line item", &item_id));
                }
            }
            QuotationAction::SetCategoryMarkup { category, percent } => {
                next.pricing_config.category_markups = next
                    .pricing_config
                    .category_markups
                    .with_markup(category, percent)?;
            }
            QuotationAction::SetCommission { percent } => {
                next.pricing_config.commission_percentage = percent;
            }
            QuotationAction::SetVatMode { vat_mode } => {
                next.pricing_config.vat_mode = vat_mode;
            }
            QuotationAction::Transition { to } => {
                next.status = self.status.transition(to)?;
                if to == QuotationStatus::Draft && self.status != QuotationStatus::AwaitingApproval
                {
                    next.revision = next_revision(next.revision)?;
                }
            }
            QuotationAction::AddCostEntry { entry } => {
                next.cost_entries = next.cost_entries.with_entry(entry)?;
            }
            QuotationAction::RemoveCostEntry { entry_id } => {
                next.cost_entries = next.cost_entries.without_entry(&entry_id)?;
            }
        }

        if edits_pricing {
            let mut warnings = Vec::new();
            next.pricing = derive_pricing(&next.sections, &next.pricing_config, &mut warnings)?;
            next.warnings = warnings;
            next.revision = next_revision(next.revision)?;
        }

        Ok(next)
    }

    /// Apply a sequence of edits; stops at the first failure.
    pub fn apply_all(
        &self,
        actions: impl IntoIterator<Item = QuotationAction>,
    ) -> PricingResult<Quotation> {
        actions
            .into_iter()
            .try_fold(self.clone(), |quotation, action| quotation.apply(action))
    }

    /// Post-calculation of this quotation's recorded costs against its own
    /// pricing.
    pub fn reconcile(
        &self,
        at_risk_threshold: Option<Percent>,
    ) -> PricingResult<ComputationOutput<ReconciliationOutput>> {
        let mut input =
            ReconciliationInput::from_pricing(&self.pricing, self.cost_entries.entries().to_vec());
        input.at_risk_threshold = at_risk_threshold;
        reconcile(&input)
    }

    fn section_mut(&mut self, section_id: &str) -> PricingResult<&mut Section> {
        self.sections
            .iter_mut()
            .find(|s| s.id == section_id)
            .ok_or_else(|| not_found("section", section_id))
    }
}

fn derive_pricing(
    sections: &[Section],
    config: &PricingConfig,
    warnings: &mut Vec<String>,
) -> PricingResult<PricingCalculation> {
    let costs = CostBreakdown::from_sections(sections)?;
    price_breakdown(&costs, config, warnings)
}

fn next_revision(revision: u32) -> PricingResult<u32> {
    revision
        .checked_add(1)
        .ok_or_else(|| PricingError::invalid("revision", "revision counter exhausted"))
}

fn upsert_item(section: &mut Section, item: LineItem) {
    match section.items.iter_mut().find(|i| i.id() == item.id()) {
        Some(existing) => *existing = item,
        None => section.items.push(item),
    }
}

fn ensure_unique_section_ids(sections: &[Section]) -> PricingResult<()> {
    for (idx, section) in sections.iter().enumerate() {
        if sections[..idx].iter().any(|s| s.id == section.id) {
            return Err(PricingError::Duplicate {
                kind: "section".into(),
                id: section.id.clone(),
            });
        }
    }
    Ok(())
}

fn not_found(kind: &str, id: &str) -> PricingError {
    PricingError::NotFound {
        kind: kind.into(),
        id: id.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CostCategory;
    use crate::pricing::markup::MarkupConfig;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn draft() -> Quotation {
        let config = PricingConfig {
            category_markups: MarkupConfig::uniform(dec!(25)).unwrap(),
            ..PricingConfig::default()
        };
        Quotation::new("q-1", "Detached house 120 m2", config).unwrap()
    }

    #[test]
    fn test_new_quotation_prices_to_zero() {
        let q = draft();
        assert_eq!(q.pricing().total_with_vat, dec!(0));
        assert_eq!(q.revision(), 0);
    }

    #[test]
    fn test_upsert_replaces_existing_item() {
        let q = draft()
            .apply(QuotationAction::AddSection {
                section: Section::new("walls", "Walls"),
            })
            .unwrap()
            .apply(QuotationAction::UpsertLineItem {
                section_id: "walls".into(),
                item: LineItem::element("e1", dec!(1), dec!(100)),
            })
            .unwrap()
            .apply(QuotationAction::UpsertLineItem {
                section_id: "walls".into(),
                item: LineItem::element("e1", dec!(3), dec!(100)),
            })
            .unwrap();
        assert_eq!(q.sections()[0].items.len(), 1);
        assert_eq!(q.pricing().material_cost_total, dec!(300));
        assert_eq!(q.revision(), 3);
    }

    #[test]
    fn test_unknown_section() {
        let err = draft()
            .apply(QuotationAction::UpsertLineItem {
                section_id: "nope".into(),
                item: LineItem::element("e1", dec!(1), dec!(1)),
            })
            .unwrap_err();
        assert!(matches!(err, PricingError::NotFound { .. }));
    }

    #[test]
    fn test_markup_change_reprices() {
        let q = draft()
            .apply(QuotationAction::AddSection {
                section: Section::new("walls", "Walls")
                    .with_item(LineItem::element("e1", dec!(10), dec!(100))),
            })
            .unwrap();
        let repriced = q
            .apply(QuotationAction::SetCategoryMarkup {
                category: CostCategory::Elements,
                percent: dec!(50),
            })
            .unwrap();
        assert_eq!(q.pricing().selling_price_ex_vat, dec!(1250));
        assert_eq!(repriced.pricing().selling_price_ex_vat, dec!(1500));
    }

    #[test]
    fn test_reopen_bumps_revision() {
        let sent = draft()
            .apply(QuotationAction::Transition {
                to: QuotationStatus::Sent,
            })
            .unwrap();
        assert_eq!(sent.revision(), 0);
        let reopened = sent
            .apply(QuotationAction::Transition {
                to: QuotationStatus::Draft,
            })
            .unwrap();
        assert_eq!(reopened.revision(), 1);
        assert_eq!(reopened.status(), QuotationStatus::Draft);
    }

    #[test]
    fn test_record_round_trip_recomputes_pricing() {
        let q = draft()
            .apply(QuotationAction::AddSection {
                section: Section::new("walls", "Walls")
                    .with_item(LineItem::element("e1", dec!(2), dec!(500))),
            })
            .unwrap();
        let json = serde_json::to_string(&q).unwrap();
        let restored: Quotation = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, q);
    }

    #[test]
    fn test_exhausted_revision_is_an_error() {
        let q: Quotation =
            serde_json::from_str(r#"{"id": "q-9", "revision": 4294967295}"#).unwrap();
        assert_eq!(q.revision(), u32::MAX);
        let err = q
            .apply(QuotationAction::SetCommission { percent: dec!(3) })
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidInput { .. }));
        // the loaded snapshot is untouched
        assert_eq!(q.pricing_config().commission_percentage, Decimal::ZERO);
    }
}
