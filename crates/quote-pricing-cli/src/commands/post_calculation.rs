use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use quote_pricing_core::post_calculation::reconciler::{self, ReconciliationInput};
use quote_pricing_core::settings::PricingSettings;

use crate::input;

/// Arguments for post-calculation
#[derive(Args)]
pub struct ReconcileArgs {
    /// Path to JSON input file (budget, selling_price_ex_vat, budgeted_profit_percent,
    /// cost_entries)
    #[arg(long)]
    pub input: Option<String>,

    /// Margin shortfall in percentage points that flags the project at risk
    #[arg(long)]
    pub threshold: Option<Decimal>,
}

pub fn run_reconcile(
    args: ReconcileArgs,
    settings: &PricingSettings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut recon_input: ReconciliationInput =
        input::read_input(args.input.as_deref(), "post-calculation")?;
    recon_input.at_risk_threshold = args
        .threshold
        .or(recon_input.at_risk_threshold)
        .or(Some(settings.at_risk_threshold));
    let result = reconciler::reconcile(&recon_input)?;
    Ok(serde_json::to_value(result)?)
}
