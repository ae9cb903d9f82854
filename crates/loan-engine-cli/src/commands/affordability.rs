use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use loan_engine_core::affordability::{
    self, AffordabilityConstraint, AffordabilityInput, RecurringCosts,
};

use crate::input;

/// Arguments for the maximum affordable loan
#[derive(Args)]
pub struct AffordArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Gross monthly income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Existing monthly debt payments
    #[arg(long)]
    pub obligations: Option<Decimal>,

    /// Annual mortgage rate as a percentage
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in months
    #[arg(long, default_value_t = 360)]
    pub term: u32,

    /// Cash put down on the purchase
    #[arg(long)]
    pub down_payment: Option<Decimal>,

    /// Housing cost / income cap, as a decimal
    #[arg(long, default_value_t = dec!(0.28))]
    pub front_end_cap: Decimal,

    /// (Housing + obligations) / income cap, as a decimal
    #[arg(long, default_value_t = dec!(0.36))]
    pub back_end_cap: Decimal,

    /// Annual property tax as a percentage of price
    #[arg(long)]
    pub property_tax: Option<Decimal>,

    /// Annual homeowner's insurance
    #[arg(long)]
    pub insurance: Option<Decimal>,

    /// Monthly HOA dues
    #[arg(long)]
    pub hoa: Option<Decimal>,

    /// Annual PMI as a percentage of the loan
    #[arg(long)]
    pub pmi: Option<Decimal>,
}

pub fn run_afford(args: AffordArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let afford_input: AffordabilityInput = if let Some(data) = input::load(args.input.as_deref())? {
        data
    } else {
        AffordabilityInput {
            constraint: AffordabilityConstraint {
                monthly_income: args
                    .income
                    .ok_or("--income is required (or provide --input)")?,
                monthly_obligations: args.obligations.unwrap_or(Decimal::ZERO),
                front_end_cap: args.front_end_cap,
                back_end_cap: args.back_end_cap,
            },
            annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            term_months: args.term,
            down_payment: args.down_payment.unwrap_or(Decimal::ZERO),
            recurring_costs: RecurringCosts {
                property_tax_rate_percent: args.property_tax.unwrap_or(Decimal::ZERO),
                annual_insurance: args.insurance.unwrap_or(Decimal::ZERO),
                monthly_hoa: args.hoa.unwrap_or(Decimal::ZERO),
            },
            pmi_rate_percent: args.pmi,
        }
    };

    let result = affordability::max_loan_amount(&afford_input)?;
    Ok(serde_json::to_value(result)?)
}
