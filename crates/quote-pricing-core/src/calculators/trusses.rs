use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PricingError;
use crate::types::{checked_add, checked_div, checked_mul, with_metadata, ComputationOutput};
use crate::PricingResult;

const MAX_PITCH_DEGREES: Decimal = dec!(60);

/// Symmetric gable roof for a truss take-off. Dimensions in metres.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrussInput {
    pub span_m: Decimal,
    pub pitch_degrees: Decimal,
    pub building_length_m: Decimal,
    /// Centre-to-centre truss spacing
    pub spacing_m: Decimal,
    /// Eaves overhang measured horizontally
    #[serde(default)]
    pub overhang_m: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrussOutput {
    /// span / 2 * tan(pitch)
    pub rise_m: Decimal,
    /// (span / 2 + overhang) / cos(pitch)
    pub top_chord_length_m: Decimal,
    /// floor(building length / spacing) + 1
    pub truss_count: u32,
    /// Both roof slopes, excluding gable overhangs
    pub roof_area_m2: Decimal,
}

/// Gable-roof truss quantities.
pub fn calculate_trusses(input: &TrussInput) -> PricingResult<ComputationOutput<TrussOutput>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    for (field, value) in [
        ("span_m", input.span_m),
        ("pitch_degrees", input.pitch_degrees),
        ("building_length_m", input.building_length_m),
        ("spacing_m", input.spacing_m),
    ] {
        if value <= Decimal::ZERO {
            return Err(PricingError::invalid(field, "must be positive"));
        }
    }
    if input.pitch_degrees >= MAX_PITCH_DEGREES {
        return Err(PricingError::invalid(
            "pitch_degrees",
            format!("Pitch must be below {MAX_PITCH_DEGREES} degrees"),
        ));
    }
    if input.overhang_m < Decimal::ZERO {
        return Err(PricingError::invalid("overhang_m", "must not be negative"));
    }

    let radians = input.pitch_degrees * Decimal::PI / dec!(180);
    let half_span = input.span_m / Decimal::TWO;
    let rise_m = checked_mul("rise_m", half_span, radians.tan())?;
    let eaves_run = checked_add("top_chord_length_m", half_span, input.overhang_m)?;
    let top_chord_length_m = checked_div("top_chord_length_m", eaves_run, radians.cos())?;

    let bays = checked_div("spacing_m", input.building_length_m, input.spacing_m)?.floor();
    let truss_count = checked_add("spacing_m", bays, Decimal::ONE)?
        .to_u32()
        .ok_or_else(|| PricingError::invalid("spacing_m", "truss count out of range"))?;

    if input.spacing_m > dec!(1.2) {
        warnings.push(format!(
            "Truss spacing {} m exceeds the usual 1.2 m maximum",
            input.spacing_m
        ));
    }

    let both_slopes = checked_mul("roof_area_m2", Decimal::TWO, top_chord_length_m)?;
    let output = TrussOutput {
        rise_m,
        top_chord_length_m,
        truss_count,
        roof_area_m2: checked_mul("roof_area_m2", both_slopes, input.building_length_m)?,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Symmetric gable truss take-off",
        input,
        warnings,
        elapsed,
        output,
    ))
}
