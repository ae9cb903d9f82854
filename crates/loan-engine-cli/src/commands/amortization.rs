use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use loan_engine_core::amortization::{self, LoanTerms};

use crate::input;

/// Loan terms shared by the amortisation commands
#[derive(Args)]
pub struct LoanTermsArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate as a percentage (6.5 = 6.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long)]
    pub term: Option<u32>,

    /// Origination fee as a percentage of principal
    #[arg(long)]
    pub fee: Option<Decimal>,
}

impl LoanTermsArgs {
    fn resolve(&self) -> Result<LoanTerms, Box<dyn std::error::Error>> {
        if let Some(terms) = input::load(self.input.as_deref())? {
            return Ok(terms);
        }
        Ok(LoanTerms {
            principal: self
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_percent: self.rate.ok_or("--rate is required (or provide --input)")?,
            term_months: self.term.ok_or("--term is required (or provide --input)")?,
            fee_percent: self.fee.unwrap_or(Decimal::ZERO),
        })
    }
}

/// Arguments for the full amortisation schedule
#[derive(Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub terms: LoanTermsArgs,

    /// Print yearly totals only, without the month-by-month rows
    #[arg(long)]
    pub yearly: bool,
}

/// Arguments for the remaining-balance lookup
#[derive(Args)]
pub struct BalanceArgs {
    #[command(flatten)]
    pub terms: LoanTermsArgs,

    /// Number of payments already made
    #[arg(long)]
    pub payments_made: u32,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = args.terms.resolve()?;
    let result = amortization::compute_schedule(&terms)?;
    let mut value = serde_json::to_value(result)?;
    if args.yearly {
        if let Some(result) = value.get_mut("result").and_then(Value::as_object_mut) {
            result.remove("schedule");
        }
    }
    Ok(value)
}

pub fn run_payment(args: LoanTermsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = args.resolve()?;
    let payment =
        amortization::compute_fixed_payment(terms.principal, terms.annual_rate_percent, terms.term_months)?;
    Ok(json!({ "periodic_payment": payment.to_string() }))
}

pub fn run_apr(args: LoanTermsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = args.resolve()?;
    let result = amortization::annual_percentage_rate(&terms)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_balance(args: BalanceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = args.terms.resolve()?;
    let balance = amortization::remaining_balance(&terms, args.payments_made)?;
    Ok(json!({
        "payments_made": args.payments_made,
        "remaining_balance": balance.to_string(),
    }))
}
