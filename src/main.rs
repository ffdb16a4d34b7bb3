//! courier-rates CLI
//!
//! Commands:
//!   quote      - Price a shipment
//!   countries  - List destinations in the tariff
//!   check      - Report accepted and rejected tariff rows
//!   totals     - Invoice totals for a shipment plus charges
//!   invoice-no - Format an invoice number
//!   schema     - Print JSON schema for an output type

mod cli;

use courier_rates::*;
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    let (config, config_error) = match load_config() {
        Ok(config) => (config, None),
        Err(e) => (RatesConfig::default(), Some(e)),
    };
    init_logging(&config);
    if let Some(e) = config_error {
        error!("Failed to load config: {}. Using defaults.", e);
    }

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let rest = &args[2..];
    let result = match args[1].as_str() {
        "quote" => cli::cmd_quote(rest, &config),
        "countries" => cli::cmd_countries(rest, &config),
        "check" => cli::cmd_check(rest, &config),
        "totals" => cli::cmd_totals(rest, &config),
        "invoice-no" => cli::cmd_invoice_no(rest, &config),
        "schema" => cli::cmd_schema(rest),
        "version" | "--version" | "-v" => {
            println!("courier-rates {}", VERSION);
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Err("Unknown command".into())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

/// `courier-rates.yaml` from the working directory, or defaults
fn load_config() -> Result<RatesConfig> {
    let cwd = std::env::current_dir().map_err(Error::Io)?;
    Ok(RatesConfig::load_from_dir(&cwd)?.unwrap_or_default())
}

fn init_logging(config: &RatesConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage() {
    println!(
        r#"
courier-rates - Courier tariff and shipping rate engine

USAGE:
    courier-rates <COMMAND> [OPTIONS]

COMMANDS:
    quote <country> [service] <actual-kg> [volumetric-kg]
                                     Price a shipment
    countries                        List destinations in the tariff
    check                            Report accepted and rejected tariff rows
    totals <country> [service] <actual-kg> [volumetric-kg] [--charges <file.json>]
                                     Invoice totals for a shipment plus charges
    invoice-no <branch> <YYYY-MM-DD> <sequence>
                                     Format an invoice number
    schema [name]                    Print JSON schema (rate-result, rate-query,
                                     tariff-index, load-report, charges, config)
    version                          Print version

OPTIONS:
    --tariff <file>                  Tariff table (default: config tariff_path)
    --json                           JSON output (quote, countries, check, totals)

CONFIG:
    courier-rates.yaml in the working directory; RUST_LOG overrides log_level

EXAMPLES:
    courier-rates quote "United Kingdom" EXPRESS 3.2
    courier-rates quote France ECONOMY 4 6.5 --json
    courier-rates check --tariff rates/tariff.csv
    courier-rates invoice-no Negombo 2026-01-14 7
"#
    );
}
