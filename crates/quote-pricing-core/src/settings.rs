use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::CostCategory;
use crate::pricing::aggregator::PricingConfig;
use crate::pricing::markup::MarkupConfig;
use crate::pricing::vat::VatMode;
use crate::types::{Percent, DEFAULT_AT_RISK_THRESHOLD};
use crate::PricingResult;

/// Organisation-wide pricing defaults, loaded by front-ends from a settings
/// file. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    pub default_markups: MarkupConfig,
    pub commission_percentage: Percent,
    pub vat_mode: VatMode,
    pub at_risk_threshold: Percent,
}

impl Default for PricingSettings {
    fn default() -> Self {
        let markups: BTreeMap<CostCategory, Percent> = [
            (CostCategory::Elements, dec!(25)),
            (CostCategory::Trusses, dec!(25)),
            (CostCategory::Products, dec!(20)),
            (CostCategory::Installation, dec!(15)),
            (CostCategory::Transportation, dec!(10)),
            (CostCategory::Design, dec!(15)),
            (CostCategory::Other, Decimal::ZERO),
        ]
        .into_iter()
        .collect();

        PricingSettings {
            default_markups: MarkupConfig::try_from(markups).unwrap_or_default(),
            commission_percentage: Decimal::ZERO,
            vat_mode: VatMode::Standard,
            at_risk_threshold: DEFAULT_AT_RISK_THRESHOLD,
        }
    }
}

impl PricingSettings {
    /// Pricing configuration for a new quotation.
    pub fn pricing_config(&self) -> PricingResult<PricingConfig> {
        let config = PricingConfig {
            category_markups: self.default_markups.clone(),
            commission_percentage: self.commission_percentage,
            vat_mode: self.vat_mode.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}
