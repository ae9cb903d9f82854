use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use loan_engine_core::payoff::{self, Debt, PayoffInput};

use crate::input;

/// Arguments for the pooled payoff simulation
#[derive(Args)]
pub struct PayoffArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Debt as id:balance:rate[:min_payment]; repeat for each debt
    #[arg(long = "debt", value_parser = parse_debt)]
    pub debts: Vec<Debt>,

    /// Total paid per month (defaults to the sum of minimum payments)
    #[arg(long)]
    pub capacity: Option<Decimal>,

    /// Extra amount paid each month on top of the capacity
    #[arg(long)]
    pub extra: Option<Decimal>,
}

impl PayoffArgs {
    fn resolve(self) -> Result<PayoffInput, Box<dyn std::error::Error>> {
        if let Some(data) = input::load(self.input.as_deref())? {
            return Ok(data);
        }
        if self.debts.is_empty() {
            return Err("at least one --debt is required (or provide --input)".into());
        }
        let capacity = self
            .capacity
            .unwrap_or_else(|| payoff::minimum_payment_total(&self.debts));
        Ok(PayoffInput {
            debts: self.debts,
            total_monthly_capacity: capacity,
            extra_payment: self.extra.unwrap_or(Decimal::ZERO),
        })
    }
}

pub fn run_payoff(args: PayoffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payoff_input = args.resolve()?;
    let result = payoff::simulate_payoff(&payoff_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_extra_payment(args: PayoffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payoff_input = args.resolve()?;
    let result = payoff::compare_extra_payment(&payoff_input)?;
    Ok(serde_json::to_value(result)?)
}

pub(crate) fn parse_debt(raw: &str) -> Result<Debt, String> {
    let parts: Vec<&str> = raw.split(':').collect();
    if !(3..=4).contains(&parts.len()) {
        return Err(format!("expected id:balance:rate[:min_payment], got '{raw}'"));
    }
    let number = |field: &str, s: &str| {
        Decimal::from_str(s.trim()).map_err(|e| format!("invalid {field} '{s}': {e}"))
    };
    Ok(Debt {
        id: parts[0].to_string(),
        balance: number("balance", parts[1])?,
        annual_rate_percent: number("rate", parts[2])?,
        min_payment: match parts.get(3) {
            Some(s) => number("min_payment", *s)?,
            None => Decimal::ZERO,
        },
    })
}
