use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;

use quote_pricing_core::pricing::aggregator::{self, PricingInput};
use quote_pricing_core::pricing::vat::{self, VatMode};
use quote_pricing_core::settings::PricingSettings;
use quote_pricing_core::types::with_metadata;

use crate::input;

/// Arguments for quotation pricing
#[derive(Args)]
pub struct PricingArgs {
    /// Path to JSON input file (sections, category_markups, commission_percentage, vat_mode)
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VatModeArg {
    Standard,
    ConstructionService,
}

impl From<VatModeArg> for VatMode {
    fn from(arg: VatModeArg) -> Self {
        match arg {
            VatModeArg::Standard => VatMode::Standard,
            VatModeArg::ConstructionService => VatMode::ConstructionService,
        }
    }
}

/// Arguments for VAT calculation
#[derive(Args)]
pub struct VatArgs {
    /// Amount excluding VAT (or including VAT with --reverse)
    #[arg(long)]
    pub amount: Decimal,

    /// VAT treatment
    #[arg(long, value_enum, default_value = "standard")]
    pub mode: VatModeArg,

    /// Treat --amount as VAT-inclusive and recover the subtotal
    #[arg(long)]
    pub reverse: bool,
}

pub fn run_pricing(
    args: PricingArgs,
    settings: &PricingSettings,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut raw = input::read_input_value(args.input.as_deref(), "pricing")?;
    input::settings::apply_pricing_defaults(&mut raw, settings)?;
    let pricing_input: PricingInput = serde_json::from_value(raw)?;
    let result = aggregator::calculate_pricing(&pricing_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_vat(args: VatArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let mode = VatMode::from(args.mode);
    let subtotal = if args.reverse {
        vat::remove_vat(args.amount, &mode)?
    } else {
        args.amount
    };
    let breakdown = vat::calculate_vat(subtotal, &mode)?;
    let output = with_metadata(
        "VAT by mode: standard 25.5%, construction service 0% (reverse charge)",
        &serde_json::json!({ "amount": args.amount, "reverse": args.reverse }),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        breakdown,
    );
    Ok(serde_json::to_value(output)?)
}
