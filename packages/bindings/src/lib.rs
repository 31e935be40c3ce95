use napi::Result as NapiResult;
use napi_derive::napi;

use quote_pricing_core::calculators::{trusses, walls};
use quote_pricing_core::post_calculation::reconciler;
use quote_pricing_core::pricing::{aggregator, vat};
use quote_pricing_core::quotation::{Quotation, QuotationAction};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_pricing(input_json: String) -> NapiResult<String> {
    let input: aggregator::PricingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = aggregator::calculate_pricing(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// `mode` is "standard" or "construction_service"; amounts are decimal strings.
#[napi]
pub fn calculate_vat(subtotal: String, mode: String) -> NapiResult<String> {
    let subtotal: rust_decimal::Decimal = subtotal.parse().map_err(to_napi_error)?;
    let mode = vat::VatMode::from(mode);
    let breakdown = vat::calculate_vat(subtotal, &mode).map_err(to_napi_error)?;
    let mut breakdown = serde_json::to_value(breakdown).map_err(to_napi_error)?;
    if let (Some(warning), Some(obj)) = (mode.warning(), breakdown.as_object_mut()) {
        obj.insert("warning".into(), serde_json::Value::String(warning));
    }
    serde_json::to_string(&breakdown).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Post-calculation
// ---------------------------------------------------------------------------

#[napi]
pub fn reconcile_costs(input_json: String) -> NapiResult<String> {
    let input: reconciler::ReconciliationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = reconciler::reconcile(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Quotation
// ---------------------------------------------------------------------------

/// Apply a JSON array of actions to a quotation snapshot and return the new
/// snapshot with recomputed pricing.
#[napi]
pub fn apply_quotation_actions(quotation_json: String, actions_json: String) -> NapiResult<String> {
    let quotation: Quotation = serde_json::from_str(&quotation_json).map_err(to_napi_error)?;
    let actions: Vec<QuotationAction> =
        serde_json::from_str(&actions_json).map_err(to_napi_error)?;
    let updated = quotation.apply_all(actions).map_err(to_napi_error)?;
    serde_json::to_string(&updated).map_err(to_napi_error)
}

#[napi]
pub fn reconcile_quotation(quotation_json: String) -> NapiResult<String> {
    let quotation: Quotation = serde_json::from_str(&quotation_json).map_err(to_napi_error)?;
    let output = quotation.reconcile(None).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Quantity calculators
// ---------------------------------------------------------------------------

#[napi]
pub fn wall_elements(input_json: String) -> NapiResult<String> {
    let input: walls::WallElementInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = walls::calculate_wall_elements(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn truss_quantities(input_json: String) -> NapiResult<String> {
    let input: trusses::TrussInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = trusses::calculate_trusses(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
