mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::compare::CompareArgs;
use commands::evaluate::EvaluateArgs;
use commands::ledger::LedgerArgs;
use commands::sensitivity::SensitivityArgs;
use commands::tariff::TariffArgs;

/// Solar investment projections
#[derive(Parser)]
#[command(
    name = "solar-invest",
    version,
    about = "Solar investment projections and scenario comparison",
    long_about = "Projects the cash flows of a solar installation year by year and \
                  reports NPV, IRR, payback and plain-language findings. Compares up \
                  to three scenarios (A, B, C) under shared toggles."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine diagnostics to stderr (RUST_LOG still wins when set)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate one scenario: ledger, metrics and findings
    Evaluate(EvaluateArgs),
    /// Evaluate scenarios A/B/C side by side
    Compare(CompareArgs),
    /// Print only the annual ledger of one scenario
    Ledger(LedgerArgs),
    /// NPV swing from flipping each global toggle
    Sensitivity(SensitivityArgs),
    /// Print the projected tariff path
    Tariff(TariffArgs),
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

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Evaluate(args) => commands::evaluate::run_evaluate(args),
        Commands::Compare(args) => commands::compare::run_compare(args),
        Commands::Ledger(args) => commands::ledger::run_ledger(args),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args),
        Commands::Tariff(args) => commands::tariff::run_tariff(args),
        Commands::Version => {
            println!("solar-invest {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
