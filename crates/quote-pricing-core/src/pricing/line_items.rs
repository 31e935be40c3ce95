use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::category::CostCategory;
use crate::types::{checked_mul, checked_sum, ensure_non_negative, Money};
use crate::PricingResult;

// ---------------------------------------------------------------------------
// Line items
// ---------------------------------------------------------------------------

/// Fields shared by every kind of line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemBase {
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub quantity: Decimal,
    /// Unit of measure, e.g. "pcs", "m2", "h"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub unit_price: Money,
    /// Explicit category override; wins over the section category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CostCategory>,
}

/// Wall, floor or roof element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementItem {
    #[serde(flatten)]
    pub base: ItemBase,
    /// e.g. "exterior_wall", "partition", "floor"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_mm: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_mm: Option<Decimal>,
}

/// Roof truss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrussItem {
    #[serde(flatten)]
    pub base: ItemBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_mm: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch_degrees: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    WindowsDoors,
    WorksiteDelivery,
    #[default]
    Other,
}

/// Purchased product: windows, doors, worksite deliveries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductItem {
    #[serde(flatten)]
    pub base: ItemBase,
    #[serde(default)]
    pub product_kind: ProductKind,
}

/// A priced quotation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LineItem {
    Element(ElementItem),
    Truss(TrussItem),
    Product(ProductItem),
}

impl LineItem {
    pub fn base(&self) -> &ItemBase {
        match self {
            LineItem::Element(item) => &item.base,
            LineItem::Truss(item) => &item.base,
            LineItem::Product(item) => &item.base,
        }
    }

    pub fn id(&self) -> &str {
        &self.base().id
    }

    /// quantity * unit_price
    pub fn total_price(&self) -> PricingResult<Money> {
        let base = self.base();
        checked_mul(
            &format!("items[{}].total_price", base.id),
            base.quantity,
            base.unit_price,
        )
    }

    /// Category this item lands in when no override applies.
    pub fn default_category(&self) -> CostCategory {
        match self {
            LineItem::Element(_) => CostCategory::Elements,
            LineItem::Truss(_) => CostCategory::Trusses,
            LineItem::Product(_) => CostCategory::Products,
        }
    }

    /// Item override, then section category, then the kind default.
    pub fn resolve_category(&self, section_category: Option<CostCategory>) -> CostCategory {
        self.base()
            .category
            .or(section_category)
            .unwrap_or_else(|| self.default_category())
    }

    pub fn validate(&self) -> PricingResult<()> {
        let base = self.base();
        ensure_non_negative(&format!("items[{}].quantity", base.id), base.quantity)?;
        ensure_non_negative(&format!("items[{}].unit_price", base.id), base.unit_price)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Ordered, named grouping of line items inside a quotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub name: String,
    /// Category applied to items without their own override, e.g. an
    /// "Installation" section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CostCategory>,
    #[serde(default)]
    pub items: Vec<LineItem>,
}

impl Section {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Section {
            id: id.into(),
            name: name.into(),
            category: None,
            items: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: CostCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_item(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn total(&self) -> PricingResult<Money> {
        let prices = self
            .items
            .iter()
            .map(LineItem::total_price)
            .collect::<PricingResult<Vec<_>>>()?;
        checked_sum(&format!("sections[{}].total", self.id), prices)
    }

    /// Items paired with the category each one resolves to.
    pub fn categorized_items(&self) -> impl Iterator<Item = (CostCategory, &LineItem)> {
        self.items
            .iter()
            .map(move |item| (item.resolve_category(self.category), item))
    }
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

impl ItemBase {
    pub fn new(id: impl Into<String>, quantity: Decimal, unit_price: Money) -> Self {
        ItemBase {
            id: id.into(),
            description: String::new(),
            quantity,
            unit: None,
            unit_price,
            category: None,
        }
    }
}

impl LineItem {
    pub fn element(id: impl Into<String>, quantity: Decimal, unit_price: Money) -> Self {
        LineItem::Element(ElementItem {
            base: ItemBase::new(id, quantity, unit_price),
            element_type: None,
            width_mm: None,
            height_mm: None,
        })
    }

    pub fn truss(id: impl Into<String>, quantity: Decimal, unit_price: Money) -> Self {
        LineItem::Truss(TrussItem {
            base: ItemBase::new(id, quantity, unit_price),
            span_mm: None,
            pitch_degrees: None,
        })
    }

    pub fn product(
        id: impl Into<String>,
        kind: ProductKind,
        quantity: Decimal,
        unit_price: Money,
    ) -> Self {
        LineItem::Product(ProductItem {
            base: ItemBase::new(id, quantity, unit_price),
            product_kind: kind,
        })
    }

    /// Override the category of this item.
    pub fn in_category(mut self, category: CostCategory) -> Self {
        match &mut self {
            LineItem::Element(item) => item.base.category = Some(category),
            LineItem::Truss(item) => item.base.category = Some(category),
            LineItem::Product(item) => item.base.category = Some(category),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_total_price() {
        let item = LineItem::element("e1", dec!(12), dec!(450.50));
        assert_eq!(item.total_price().unwrap(), dec!(5406));
    }

    #[test]
    fn test_total_price_overflow_is_an_error() {
        let huge = dec!(100000000000000000);
        let item = LineItem::element("e1", huge, huge);
        let err = item.total_price().unwrap_err();
        assert!(err.to_string().contains("items[e1].total_price"));
    }

    #[test]
    fn test_category_resolution_order() {
        let plain = LineItem::product("p1", ProductKind::WindowsDoors, dec!(1), dec!(100));
        assert_eq!(plain.resolve_category(None), CostCategory::Products);
        assert_eq!(
            plain.resolve_category(Some(CostCategory::Installation)),
            CostCategory::Installation
        );

        let overridden = plain.in_category(CostCategory::Transportation);
        assert_eq!(
            overridden.resolve_category(Some(CostCategory::Installation)),
            CostCategory::Transportation
        );
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let item = LineItem::truss("t1", dec!(-2), dec!(300));
        assert!(item.validate().is_err());
    }

    #[test]
    fn test_deserialize_tagged_item() {
        let json = r#"{
            "type": "truss",
            "id": "t1",
            "description": "W-truss 10m",
            "quantity": "14",
            "unit_price": "285.00",
            "span_mm": "10000",
            "pitch_degrees": "27"
        }"#;
        let item: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.default_category(), CostCategory::Trusses);
        assert_eq!(item.total_price().unwrap(), dec!(3990));
    }

    #[test]
    fn test_section_total() {
        let section = Section::new("s1", "Walls")
            .with_item(LineItem::element("e1", dec!(2), dec!(100)))
            .with_item(LineItem::element("e2", dec!(3), dec!(50)));
        assert_eq!(section.total().unwrap(), dec!(350));
    }
}
