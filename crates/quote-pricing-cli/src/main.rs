mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::calculators::{TrussArgs, WallElementArgs};
use commands::post_calculation::ReconcileArgs;
use commands::pricing::{PricingArgs, VatArgs};
use commands::quotation::QuotationArgs;

/// Quotation pricing and post-calculation
#[derive(Parser)]
#[command(
    name = "qp",
    version,
    about = "Quotation pricing and post-calculation for prefabricated buildings",
    long_about = "Prices quotations (cost roll-up, per-category markup, commission, VAT), \
                  reconciles realized project costs against the budget, applies edits to \
                  quotation snapshots and computes element and truss quantities."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Pricing settings file (YAML or JSON) with default markups, commission and VAT mode
    #[arg(long, global = true)]
    config: Option<String>,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a quotation from its sections and pricing configuration
    Pricing(PricingArgs),
    /// Apply or remove VAT for an amount
    Vat(VatArgs),
    /// Compare realized cost entries against the budget
    Reconcile(ReconcileArgs),
    /// Apply a list of edits to a quotation snapshot
    Quotation(QuotationArgs),
    /// Wall element quantities for a rectangular footprint
    WallElements(WallElementArgs),
    /// Roof truss quantities for a gable roof
    Trusses(TrussArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let settings = match input::settings::load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Pricing(args) => commands::pricing::run_pricing(args, &settings),
        Commands::Vat(args) => commands::pricing::run_vat(args),
        Commands::Reconcile(args) => commands::post_calculation::run_reconcile(args, &settings),
        Commands::Quotation(args) => commands::quotation::run_quotation(args, &settings),
        Commands::WallElements(args) => commands::calculators::run_wall_elements(args),
        Commands::Trusses(args) => commands::calculators::run_trusses(args),
        Commands::Version => {
            println!("qp {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
