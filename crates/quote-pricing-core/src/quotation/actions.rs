use serde::{Deserialize, Serialize};

use crate::category::CostCategory;
use crate::post_calculation::cost_entry::CostEntry;
use crate::pricing::line_items::{LineItem, Section};
use crate::pricing::vat::VatMode;
use crate::quotation::status::QuotationStatus;
use crate::types::Percent;

/// An edit to a quotation. Applied through [`crate::quotation::Quotation::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum QuotationAction {
    AddSection { section: Section },
    RemoveSection { section_id: String },
    UpsertLineItem { section_id: String, item: LineItem },
    RemoveLineItem { section_id: String, item_id: String },
    SetCategoryMarkup { category: CostCategory, percent: Percent },
    SetCommission { percent: Percent },
    SetVatMode { vat_mode: VatMode },
    Transition { to: QuotationStatus },
    AddCostEntry { entry: CostEntry },
    RemoveCostEntry { entry_id: String },
}

impl QuotationAction {
    /// Whether the action changes line items or pricing configuration.
    pub fn edits_pricing(&self) -> bool {
        match self {
            QuotationAction::AddSection { .. }
            | QuotationAction::RemoveSection { .. }
            | QuotationAction::UpsertLineItem { .. }
            | QuotationAction::RemoveLineItem { .. }
            | QuotationAction::SetCategoryMarkup { .. }
            | QuotationAction::SetCommission { .. }
            | QuotationAction::SetVatMode { .. } => true,
            QuotationAction::Transition { .. }
            | QuotationAction::AddCostEntry { .. }
            | QuotationAction::RemoveCostEntry { .. } => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            QuotationAction::AddSection { .. } => "add_section",
            QuotationAction::RemoveSection { .. } => "remove_section",
            QuotationAction::UpsertLineItem { .. } => "upsert_line_item",
            QuotationAction::RemoveLineItem { .. } => "remove_line_item",
            QuotationAction::SetCategoryMarkup { .. } => "set_category_markup",
            QuotationAction::SetCommission { .. } => "set_commission",
            QuotationAction::SetVatMode { .. } => "set_vat_mode",
            QuotationAction::Transition { .. } => "transition",
            QuotationAction::AddCostEntry { .. } => "add_cost_entry",
            QuotationAction::RemoveCostEntry { .. } => "remove_cost_entry",
        }
    }
}
