//! Minimum-payment payoff simulation across several debts.
//!
//! Debts are pooled into a single balance accruing at the balance-weighted
//! average rate and paid down by a fixed monthly amount. The loop is bounded
//! at [`MAX_PAYOFF_MONTHS`] so pathological inputs always terminate.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::LoanEngineError;
use crate::time_value::monthly_rate;
use crate::types::*;
use crate::LoanEngineResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Hard ceiling on simulated months (50 years).
pub const MAX_PAYOFF_MONTHS: u32 = 600;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: String,
    pub balance: Money,
    pub annual_rate_percent: Percent,
    #[serde(default)]
    pub min_payment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffInput {
    pub debts: Vec<Debt>,
    /// Amount paid against the pooled balance every month.
    pub total_monthly_capacity: Money,
    /// Paid on top of `total_monthly_capacity`.
    #[serde(default)]
    pub extra_payment: Money,
}

/// How a payoff simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoffStatus {
    PaidOff,
    /// The monthly payment does not exceed the interest accruing that month.
    InterestExceedsPayment,
    /// The balance was still positive after [`MAX_PAYOFF_MONTHS`].
    IterationCapReached,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffPeriod {
    pub month: u32,
    pub interest: Money,
    pub principal: Money,
    pub remaining_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffResult {
    pub status: PayoffStatus,
    pub never_pays_off: bool,
    /// Only set when the balance reaches zero.
    pub months_to_zero: Option<u32>,
    pub total_interest_paid: Money,
    pub total_paid: Money,
    pub total_balance: Money,
    pub remaining_balance: Money,
    pub weighted_rate_percent: Percent,
    pub monthly_payment: Money,
    pub balance_trace: Vec<PayoffPeriod>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraPaymentComparison {
    pub baseline: PayoffResult,
    pub accelerated: PayoffResult,
    pub months_saved: Option<u32>,
    pub interest_saved: Option<Money>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Simulate paying the pooled debts down at capacity plus any extra payment.
pub fn simulate_payoff(input: &PayoffInput) -> LoanEngineResult<ComputationOutput<PayoffResult>> {
    let start = Instant::now();
    validate_input(input)?;

    let mut warnings = debt_warnings(input);
    let result = run_simulation(&input.debts, input.total_monthly_capacity + input.extra_payment);
    push_outcome_warning(&result, &mut warnings);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Pooled Balance Payoff (weighted-average rate)",
        &serde_json::json!({
            "debts": input.debts.len(),
            "monthly_payment": result.monthly_payment.to_string(),
            "max_months": MAX_PAYOFF_MONTHS,
        }),
        warnings,
        elapsed,
        result,
    ))
}

/// Run the simulation with and without the extra payment and report the difference.
pub fn compare_extra_payment(
    input: &PayoffInput,
) -> LoanEngineResult<ComputationOutput<ExtraPaymentComparison>> {
    let start = Instant::now();
    validate_input(input)?;

    let mut warnings = debt_warnings(input);
    if input.extra_payment.is_zero() {
        warnings.push("Extra payment is zero; both runs are identical".into());
    }

    let baseline = run_simulation(&input.debts, input.total_monthly_capacity);
    let accelerated =
        run_simulation(&input.debts, input.total_monthly_capacity + input.extra_payment);
    push_outcome_warning(&baseline, &mut warnings);

    let months_saved = match (baseline.months_to_zero, accelerated.months_to_zero) {
        (Some(base), Some(accel)) => Some(base.saturating_sub(accel)),
        _ => None,
    };
    let interest_saved = if baseline.never_pays_off || accelerated.never_pays_off {
        None
    } else {
        Some(baseline.total_interest_paid - accelerated.total_interest_paid)
    };

    let output = ExtraPaymentComparison {
        baseline,
        accelerated,
        months_saved,
        interest_saved,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Extra Payment Comparison (pooled balance)",
        &serde_json::json!({
            "capacity": input.total_monthly_capacity.to_string(),
            "extra_payment": input.extra_payment.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Balance-weighted average annual rate, as a percentage.
pub fn weighted_average_rate(debts: &[Debt]) -> LoanEngineResult<Percent> {
    validate_debts(debts)?;
    Ok(pooled_rate(debts))
}

/// Sum of the debts' minimum payments, saturating at `Decimal::MAX`.
pub fn minimum_payment_total(debts: &[Debt]) -> Money {
    debts
        .iter()
        .fold(Decimal::ZERO, |acc, d| acc.saturating_add(d.min_payment))
}

fn pooled_rate(debts: &[Debt]) -> Percent {
    let total: Money = debts.iter().map(|d| d.balance).sum();
    if total.is_zero() {
        return Decimal::ZERO;
    }
    debts
        .iter()
        .map(|d| d.balance * d.annual_rate_percent)
        .sum::<Decimal>()
        / total
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

pub(crate) fn validate_debts(debts: &[Debt]) -> LoanEngineResult<()> {
    if debts.is_empty() {
        return Err(LoanEngineError::InvalidInput {
            field: "debts".into(),
            reason: "At least one debt is required".into(),
        });
    }
    for debt in debts {
        if debt.balance <= Decimal::ZERO {
            return Err(LoanEngineError::InvalidInput {
                field: format!("debts[{}].balance", debt.id),
                reason: "Balance must be positive".into(),
            });
        }
        if debt.balance > MAX_MONEY || debt.min_payment > MAX_MONEY {
            return Err(LoanEngineError::InvalidInput {
                field: format!("debts[{}]", debt.id),
                reason: format!("Amounts must not exceed {MAX_MONEY}"),
            });
        }
        if debt.annual_rate_percent < Decimal::ZERO || debt.annual_rate_percent >= dec!(100) {
            return Err(LoanEngineError::InvalidInput {
                field: format!("debts[{}].annual_rate_percent", debt.id),
                reason: "Rate must be between 0% and 100%".into(),
            });
        }
        if debt.min_payment < Decimal::ZERO {
            return Err(LoanEngineError::InvalidInput {
                field: format!("debts[{}].min_payment", debt.id),
                reason: "Minimum payment cannot be negative".into(),
            });
        }
    }
    Ok(())
}

fn validate_input(input: &PayoffInput) -> LoanEngineResult<()> {
    validate_debts(&input.debts)?;
    if input.total_monthly_capacity <= Decimal::ZERO {
        return Err(LoanEngineError::InvalidInput {
            field: "total_monthly_capacity".into(),
            reason: "Monthly payment capacity must be positive".into(),
        });
    }
    if input.total_monthly_capacity > MAX_MONEY || input.extra_payment > MAX_MONEY {
        return Err(LoanEngineError::InvalidInput {
            field: "total_monthly_capacity".into(),
            reason: format!("Payments must not exceed {MAX_MONEY}"),
        });
    }
    if input.extra_payment < Decimal::ZERO {
        return Err(LoanEngineError::InvalidInput {
            field: "extra_payment".into(),
            reason: "Extra payment cannot be negative".into(),
        });
    }
    Ok(())
}

fn debt_warnings(input: &PayoffInput) -> Vec<String> {
    let mut warnings = Vec::new();
    for debt in &input.debts {
        let interest = debt.balance * monthly_rate(debt.annual_rate_percent);
        if debt.min_payment > Decimal::ZERO && debt.min_payment <= interest {
            warnings.push(format!(
                "Debt '{}': minimum payment {} does not cover monthly interest {}",
                debt.id,
                debt.min_payment,
                round_money(interest)
            ));
        }
    }
    let minimums = minimum_payment_total(&input.debts);
    if input.total_monthly_capacity < minimums {
        warnings.push(format!(
            "Monthly capacity {} is below combined minimum payments {}",
            input.total_monthly_capacity, minimums
        ));
    }
    warnings
}

fn push_outcome_warning(result: &PayoffResult, warnings: &mut Vec<String>) {
    match result.status {
        PayoffStatus::PaidOff => {}
        PayoffStatus::InterestExceedsPayment => warnings.push(format!(
            "Payment {} does not cover accruing interest; balance never reaches zero",
            result.monthly_payment
        )),
        PayoffStatus::IterationCapReached => warnings.push(format!(
            "Balance not repaid within {MAX_PAYOFF_MONTHS} months"
        )),
    }
}

/// Core loop. Inputs must already be validated.
///
/// Interest is carried at full precision so the payment-versus-interest test
/// is exact; reported amounts are rounded to cents.
pub(crate) fn run_simulation(debts: &[Debt], monthly_payment: Money) -> PayoffResult {
    let total_balance: Money = debts.iter().map(|d| d.balance).sum();
    let weighted = pooled_rate(debts);
    let rate = monthly_rate(weighted);

    let mut balance = total_balance;
    let mut total_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut trace = Vec::new();
    let mut status = PayoffStatus::IterationCapReached;
    let mut months_to_zero = None;

    for month in 1..=MAX_PAYOFF_MONTHS {
        let interest = balance * rate;
        let principal = monthly_payment - interest;
        if principal <= Decimal::ZERO {
            status = PayoffStatus::InterestExceedsPayment;
            break;
        }
        let principal = principal.min(balance);

        balance -= principal;
        total_interest += interest;
        total_paid += principal + interest;

        trace.push(PayoffPeriod {
            month,
            interest: round_money(interest),
            principal: round_money(principal),
            remaining_balance: round_money(balance),
        });

        if balance <= Decimal::ZERO {
            status = PayoffStatus::PaidOff;
            months_to_zero = Some(month);
            break;
        }
    }

    debug!(?status, ?months_to_zero, %weighted, "payoff simulation finished");

    PayoffResult {
        status,
        never_pays_off: status != PayoffStatus::PaidOff,
        months_to_zero,
        total_interest_paid: round_money(total_interest),
        total_paid: round_money(total_paid),
        total_balance,
        remaining_balance: round_money(balance.max(Decimal::ZERO)),
        weighted_rate_percent: weighted.round_dp(4),
        monthly_payment,
        balance_trace: trace,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
