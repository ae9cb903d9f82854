use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_engine_core::amortization::LoanTerms;
use loan_engine_core::offers::{self, BreakEvenInput, OfferComparisonInput};

use crate::input;

/// Arguments for ranking a set of loan offers
#[derive(Args)]
pub struct CompareArgs {
    /// Path to JSON input file with `current`, `candidates` and optional `credit_score`
    #[arg(long)]
    pub input: Option<String>,

    /// Borrower credit score (overrides the value in the input file)
    #[arg(long)]
    pub credit_score: Option<u32>,
}

/// Arguments for refinance break-even
#[derive(Args)]
pub struct BreakEvenArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Remaining balance on the current loan
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// Current annual rate as a percentage
    #[arg(long)]
    pub current_rate: Option<Decimal>,

    /// Months left on the current loan
    #[arg(long)]
    pub remaining_months: Option<u32>,

    /// Proposed annual rate as a percentage
    #[arg(long)]
    pub new_rate: Option<Decimal>,

    /// Proposed term in months (defaults to the remaining months)
    #[arg(long)]
    pub new_term: Option<u32>,

    /// Origination fee on the new loan, as a percentage, financed into principal
    #[arg(long)]
    pub fee: Option<Decimal>,

    /// Closing costs paid out of pocket
    #[arg(long)]
    pub upfront_cost: Option<Decimal>,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut compare_input: OfferComparisonInput =
        input::require(args.input.as_deref(), "offer comparison")?;
    if args.credit_score.is_some() {
        compare_input.credit_score = args.credit_score;
    }
    let result = offers::compare_offers(&compare_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_break_even(args: BreakEvenArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let break_even_input: BreakEvenInput = if let Some(data) = input::load(args.input.as_deref())? {
        data
    } else {
        let balance = args
            .balance
            .ok_or("--balance is required (or provide --input)")?;
        let remaining = args
            .remaining_months
            .ok_or("--remaining-months is required (or provide --input)")?;
        let mut proposed = LoanTerms::new(
            balance,
            args.new_rate.ok_or("--new-rate is required (or provide --input)")?,
            args.new_term.unwrap_or(remaining),
        );
        proposed.fee_percent = args.fee.unwrap_or(Decimal::ZERO);
        BreakEvenInput {
            current: LoanTerms::new(
                balance,
                args.current_rate
                    .ok_or("--current-rate is required (or provide --input)")?,
                remaining,
            ),
            proposed,
            upfront_cost: args.upfront_cost.unwrap_or(Decimal::ZERO),
        }
    };

    let result = offers::break_even(&break_even_input)?;
    Ok(serde_json::to_value(result)?)
}
