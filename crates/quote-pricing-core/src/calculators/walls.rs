use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PricingError;
use crate::types::{checked_add, checked_div, checked_mul, with_metadata, ComputationOutput};
use crate::PricingResult;

/// Rectangular footprint for a wall element take-off. Dimensions in metres.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallElementInput {
    pub length_m: Decimal,
    pub width_m: Decimal,
    pub wall_height_m: Decimal,
    /// Windows and doors, subtracted from the gross wall area
    #[serde(default)]
    pub openings_area_m2: Decimal,
    /// Nominal width of one prefabricated element
    pub element_width_m: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallElementOutput {
    pub perimeter_m: Decimal,
    pub floor_area_m2: Decimal,
    /// perimeter * wall height
    pub gross_wall_area_m2: Decimal,
    /// gross - openings
    pub net_wall_area_m2: Decimal,
    /// ceil(perimeter / element width)
    pub element_count: u32,
}

/// Exterior wall quantities for a rectangular building.
pub fn calculate_wall_elements(
    input: &WallElementInput,
) -> PricingResult<ComputationOutput<WallElementOutput>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    for (field, value) in [
        ("length_m", input.length_m),
        ("width_m", input.width_m),
        ("wall_height_m", input.wall_height_m),
        ("element_width_m", input.element_width_m),
    ] {
        if value <= Decimal::ZERO {
            return Err(PricingError::invalid(field, "must be positive"));
        }
    }
    if input.openings_area_m2 < Decimal::ZERO {
        return Err(PricingError::invalid("openings_area_m2", "must not be negative"));
    }

    let half_perimeter = checked_add("perimeter_m", input.length_m, input.width_m)?;
    let perimeter_m = checked_mul("perimeter_m", Decimal::TWO, half_perimeter)?;
    let gross_wall_area_m2 =
        checked_mul("gross_wall_area_m2", perimeter_m, input.wall_height_m)?;
    if input.openings_area_m2 > gross_wall_area_m2 {
        return Err(PricingError::invalid(
            "openings_area_m2",
            format!(
                "Openings ({}) exceed gross wall area ({gross_wall_area_m2})",
                input.openings_area_m2
            ),
        ));
    }
    let net_wall_area_m2 = gross_wall_area_m2 - input.openings_area_m2;

    let raw_count =
        checked_div("element_width_m", perimeter_m, input.element_width_m)?.ceil();
    let element_count = raw_count
        .to_u32()
        .ok_or_else(|| PricingError::invalid("element_width_m", "element count out of range"))?;

    if input.wall_height_m > Decimal::from(4) {
        warnings.push(format!(
            "Wall height {} m exceeds a single-storey element",
            input.wall_height_m
        ));
    }

    let output = WallElementOutput {
        perimeter_m,
        floor_area_m2: checked_mul("floor_area_m2", input.length_m, input.width_m)?,
        gross_wall_area_m2,
        net_wall_area_m2,
        element_count,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rectangular footprint wall take-off",
        input,
        warnings,
        elapsed,
        output,
    ))
}
