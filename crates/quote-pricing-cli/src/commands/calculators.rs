use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use quote_pricing_core::calculators::trusses::{self, TrussInput};
use quote_pricing_core::calculators::walls::{self, WallElementInput};

use crate::input;

/// Arguments for the wall element take-off
#[derive(Args)]
pub struct WallElementArgs {
    /// Building length (m)
    #[arg(long)]
    pub length: Option<Decimal>,

    /// Building width (m)
    #[arg(long)]
    pub width: Option<Decimal>,

    /// Wall height (m)
    #[arg(long)]
    pub height: Option<Decimal>,

    /// Total window and door area (m2)
    #[arg(long, default_value = "0")]
    pub openings: Decimal,

    /// Element width (m)
    #[arg(long, default_value = "1.2")]
    pub element_width: Decimal,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the truss take-off
#[derive(Args)]
pub struct TrussArgs {
    /// Truss span (m)
    #[arg(long)]
    pub span: Option<Decimal>,

    /// Roof pitch (degrees)
    #[arg(long)]
    pub pitch: Option<Decimal>,

    /// Building length (m)
    #[arg(long)]
    pub length: Option<Decimal>,

    /// Truss spacing (m)
    #[arg(long, default_value = "0.9")]
    pub spacing: Decimal,

    /// Eaves overhang (m)
    #[arg(long, default_value = "0")]
    pub overhang: Decimal,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_wall_elements(args: WallElementArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let wall_input = if let Some(ref path) = args.input {
        serde_json::from_value(input::file::read_json_value(path)?)?
    } else {
        WallElementInput {
            length_m: args.length.ok_or("--length is required")?,
            width_m: args.width.ok_or("--width is required")?,
            wall_height_m: args.height.ok_or("--height is required")?,
            openings_area_m2: args.openings,
            element_width_m: args.element_width,
        }
    };
    let result = walls::calculate_wall_elements(&wall_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_trusses(args: TrussArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let truss_input = if let Some(ref path) = args.input {
        serde_json::from_value(input::file::read_json_value(path)?)?
    } else {
        TrussInput {
            span_m: args.span.ok_or("--span is required")?,
            pitch_degrees: args.pitch.ok_or("--pitch is required")?,
            building_length_m: args.length.ok_or("--length is required")?,
            spacing_m: args.spacing,
            overhang_m: args.overhang,
        }
    };
    let result = trusses::calculate_trusses(&truss_input)?;
    Ok(serde_json::to_value(result)?)
}
