mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::affordability::AffordArgs;
use commands::amortization::{BalanceArgs, LoanTermsArgs, ScheduleArgs};
use commands::consolidation::ConsolidateArgs;
use commands::offers::{BreakEvenArgs, CompareArgs};
use commands::payoff::PayoffArgs;

/// Amortised-loan and debt-analysis calculations
#[derive(Parser)]
#[command(
    name = "loancalc",
    version,
    about = "Amortised-loan and debt-analysis calculations",
    long_about = "A CLI for loan and debt calculations with decimal precision. \
                  Supports amortisation schedules, APR, debt payoff simulation, \
                  mortgage affordability, offer comparison, refinance break-even \
                  and debt consolidation."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Emit debug diagnostics on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Month-by-month amortisation schedule with yearly totals
    Schedule(ScheduleArgs),
    /// Level monthly payment for a loan
    Payment(LoanTermsArgs),
    /// Fee-inclusive annual percentage rate
    Apr(LoanTermsArgs),
    /// Outstanding balance after a number of payments
    Balance(BalanceArgs),
    /// Months to pay off a pool of debts at a fixed monthly payment
    Payoff(PayoffArgs),
    /// Payoff with and without an extra monthly payment
    ExtraPayment(PayoffArgs),
    /// Maximum affordable loan from income ratios
    Afford(AffordArgs),
    /// Rank loan offers by total cost
    Compare(CompareArgs),
    /// Months for refinance savings to repay closing costs
    BreakEven(BreakEvenArgs),
    /// Compare current debts against a consolidation loan
    Consolidate(ConsolidateArgs),
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
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::amortization::run_schedule(args),
        Commands::Payment(args) => commands::amortization::run_payment(args),
        Commands::Apr(args) => commands::amortization::run_apr(args),
        Commands::Balance(args) => commands::amortization::run_balance(args),
        Commands::Payoff(args) => commands::payoff::run_payoff(args),
        Commands::ExtraPayment(args) => commands::payoff::run_extra_payment(args),
        Commands::Afford(args) => commands::affordability::run_afford(args),
        Commands::Compare(args) => commands::offers::run_compare(args),
        Commands::BreakEven(args) => commands::offers::run_break_even(args),
        Commands::Consolidate(args) => commands::consolidation::run_consolidate(args),
        Commands::Version => {
            println!("loancalc {}", env!("CARGO_PKG_VERSION"));
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
