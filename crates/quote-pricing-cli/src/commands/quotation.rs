use clap::Args;
use serde_json::Value;

use quote_pricing_core::quotation::{Quotation, QuotationAction};
use quote_pricing_core::settings::PricingSettings;

use crate::input;

/// Arguments for quotation edits
#[derive(Args)]
pub struct QuotationArgs {
    /// Path to the quotation snapshot JSON
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a JSON array of actions to apply in order
    #[arg(long)]
    pub actions: Option<String>,

    /// Output the post-calculation of the resulting quotation instead of the snapshot
    #[arg(long)]
    pub reconcile: bool,
}

pub fn run_quotation(
    args: QuotationArgs,
    settings: &PricingSettings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut raw = input::read_input_value(args.input.as_deref(), "quotation")?;
    if let Value::Object(obj) = &mut raw {
        if !obj.contains_key("pricing_config") {
            obj.insert(
                "pricing_config".into(),
                serde_json::to_value(settings.pricing_config()?)?,
            );
        }
    }
    let quotation: Quotation = serde_json::from_value(raw)?;

    let actions: Vec<QuotationAction> = match args.actions.as_deref() {
        Some(path) => serde_json::from_value(input::file::read_json_value(path)?)?,
        None => Vec::new(),
    };
    tracing::info!(quotation = quotation.id(), actions = actions.len(), "applying actions");
    let updated = quotation.apply_all(actions)?;

    if args.reconcile {
        let result = updated.reconcile(Some(settings.at_risk_threshold))?;
        return Ok(serde_json::to_value(result)?);
    }
    Ok(serde_json::json!({
        "result": updated,
        "warnings": updated.warnings(),
    }))
}
