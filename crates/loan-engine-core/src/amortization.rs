//! Fixed-rate loan amortisation: level payment, period-by-period schedule,
//! yearly roll-up, remaining balance and fee-inclusive APR.
//!
//! All monetary amounts are carried in `rust_decimal::Decimal` and rounded to
//! cents per period, so the schedule conserves principal exactly: the final
//! scheduled period absorbs whatever rounding residue is left.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::error::LoanEngineError;
use crate::time_value::{annuity_payment, annuity_pv_and_derivative, monthly_rate};
use crate::types::*;
use crate::LoanEngineResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Longest supported term (50 years).
pub const MAX_TERM_MONTHS: u32 = 600;

/// Annual rates at or above this percentage are rejected.
const MAX_RATE_PERCENT: Decimal = dec!(100);

const APR_CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const MAX_APR_ITERATIONS: u32 = 100;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Parameters of a fixed-rate, fully amortising loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// Annual rate as a whole-number percentage (7.5 = 7.5%).
    pub annual_rate_percent: Percent,
    pub term_months: u32,
    /// Origination fee as a percentage of principal.
    #[serde(default)]
    pub fee_percent: Percent,
}

impl LoanTerms {
    pub fn new(principal: Money, annual_rate_percent: Percent, term_months: u32) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_months,
            fee_percent: Decimal::ZERO,
        }
    }

    /// Dollar amount of the origination fee.
    pub fn fee_amount(&self) -> Money {
        round_money(self.principal * self.fee_percent / dec!(100))
    }

    /// Terms with the origination fee rolled into the principal.
    pub fn financed(&self) -> LoanTerms {
        LoanTerms {
            principal: round_money(self.principal) + self.fee_amount(),
            fee_percent: Decimal::ZERO,
            ..self.clone()
        }
    }
}

/// A single period in the amortisation schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    pub period: u32,
    pub payment: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub ending_balance: Money,
}

/// Twelve-period roll-up of the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlySummary {
    pub year: u32,
    pub total_payment: Money,
    pub total_principal: Money,
    pub total_interest: Money,
    pub ending_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub periodic_payment: Money,
    pub schedule: Vec<AmortizationEntry>,
    pub yearly_summary: Vec<YearlySummary>,
    pub total_interest: Money,
    pub total_payment: Money,
}

/// Fee-inclusive annual percentage rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AprResult {
    pub apr_percent: Percent,
    pub nominal_rate_percent: Percent,
    pub fee_amount: Money,
    /// Cash actually received: principal less the origination fee.
    pub net_proceeds: Money,
    pub periodic_payment: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Level monthly payment for a loan, rounded to cents.
pub fn compute_fixed_payment(
    principal: Money,
    annual_rate_percent: Percent,
    term_months: u32,
) -> LoanEngineResult<Money> {
    validate_terms(&LoanTerms::new(principal, annual_rate_percent, term_months))?;
    let payment = annuity_payment(principal, monthly_rate(annual_rate_percent), term_months)?;
    Ok(round_money(payment))
}

/// Build the full amortisation schedule for a loan.
///
/// `fee_percent` is not applied here; callers that finance the fee roll it
/// into `principal` first.
pub fn compute_schedule(
    terms: &LoanTerms,
) -> LoanEngineResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let output = build_schedule(terms)?;

    if terms.annual_rate_percent.is_zero() {
        warnings.push("Zero interest rate: payments are principal-only".into());
    }
    if output.schedule.len() < terms.term_months as usize {
        warnings.push(format!(
            "Loan retires after {} of {} scheduled periods due to payment rounding",
            output.schedule.len(),
            terms.term_months
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Payment Amortisation",
        &serde_json::json!({
            "principal": terms.principal.to_string(),
            "annual_rate_percent": terms.annual_rate_percent.to_string(),
            "term_months": terms.term_months,
            "rounding": "cents, final period absorbs residue",
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Outstanding balance after `payments_made` scheduled payments.
pub fn remaining_balance(terms: &LoanTerms, payments_made: u32) -> LoanEngineResult<Money> {
    if payments_made == 0 {
        validate_terms(terms)?;
        return Ok(round_money(terms.principal));
    }
    let schedule = build_schedule(terms)?;
    Ok(schedule
        .schedule
        .iter()
        .take(payments_made as usize)
        .last()
        .map(|e| e.ending_balance)
        .unwrap_or(Decimal::ZERO))
}

/// Annual percentage rate when the origination fee is deducted from proceeds.
///
/// Solves for the monthly rate at which the present value of the scheduled
/// payments equals the net proceeds, using Newton-Raphson.
pub fn annual_percentage_rate(terms: &LoanTerms) -> LoanEngineResult<ComputationOutput<AprResult>> {
    let start = Instant::now();
    validate_terms(terms)?;

    let fee_amount = terms.fee_amount();
    let net_proceeds = round_money(terms.principal) - fee_amount;
    let nominal = monthly_rate(terms.annual_rate_percent);
    let payment = round_money(annuity_payment(terms.principal, nominal, terms.term_months)?);

    let monthly_apr = if fee_amount.is_zero() {
        nominal
    } else {
        solve_periodic_rate(payment, net_proceeds, terms.term_months, nominal)?
    };

    let output = AprResult {
        apr_percent: (monthly_apr * dec!(1200)).round_dp(4),
        nominal_rate_percent: terms.annual_rate_percent,
        fee_amount,
        net_proceeds,
        periodic_payment: payment,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "APR (fee deducted from proceeds, Newton-Raphson)",
        terms,
        Vec::new(),
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

pub(crate) fn validate_terms(terms: &LoanTerms) -> LoanEngineResult<()> {
    if round_money(terms.principal) <= Decimal::ZERO {
        return Err(LoanEngineError::InvalidLoanTerms {
            field: "principal".into(),
            reason: "Principal must be at least one cent".into(),
        });
    }
    if terms.principal > MAX_MONEY {
        return Err(LoanEngineError::InvalidLoanTerms {
            field: "principal".into(),
            reason: format!("Principal must not exceed {MAX_MONEY}"),
        });
    }
    if terms.term_months == 0 {
        return Err(LoanEngineError::InvalidLoanTerms {
            field: "term_months".into(),
            reason: "Term must be at least 1 month".into(),
        });
    }
    if terms.term_months > MAX_TERM_MONTHS {
        return Err(LoanEngineError::InvalidLoanTerms {
            field: "term_months".into(),
            reason: format!("Term must not exceed {MAX_TERM_MONTHS} months"),
        });
    }
    if terms.annual_rate_percent < Decimal::ZERO {
        return Err(LoanEngineError::InvalidLoanTerms {
            field: "annual_rate_percent".into(),
            reason: "Rate cannot be negative".into(),
        });
    }
    if terms.annual_rate_percent >= MAX_RATE_PERCENT {
        return Err(LoanEngineError::InvalidLoanTerms {
            field: "annual_rate_percent".into(),
            reason: "Rate must be below 100%".into(),
        });
    }
    if terms.fee_percent < Decimal::ZERO || terms.fee_percent >= MAX_RATE_PERCENT {
        return Err(LoanEngineError::InvalidLoanTerms {
            field: "fee_percent".into(),
            reason: "Fee must be between 0% and 100%".into(),
        });
    }
    Ok(())
}

/// Schedule without the metadata envelope, for callers that run many loans.
pub(crate) fn build_schedule(terms: &LoanTerms) -> LoanEngineResult<AmortizationSchedule> {
    validate_terms(terms)?;

    let rate = monthly_rate(terms.annual_rate_percent);
    let principal = round_money(terms.principal);
    let periodic_payment = round_money(annuity_payment(principal, rate, terms.term_months)?);

    let mut schedule = Vec::with_capacity(terms.term_months as usize);
    let mut balance = principal;
    let mut total_interest = Decimal::ZERO;
    let mut total_payment = Decimal::ZERO;

    for period in 1..=terms.term_months {
        if balance <= Decimal::ZERO {
            break;
        }

        let interest = round_money(balance * rate);
        let principal_portion = if period == terms.term_months {
            balance
        } else {
            (periodic_payment - interest).min(balance)
        };
        let payment = principal_portion + interest;
        balance -= principal_portion;

        total_interest += interest;
        total_payment += payment;

        schedule.push(AmortizationEntry {
            period,
            payment,
            principal_portion,
            interest_portion: interest,
            ending_balance: balance,
        });
    }

    debug!(
        periods = schedule.len(),
        %periodic_payment,
        %total_interest,
        "amortisation schedule built"
    );

    let yearly_summary = summarise_by_year(&schedule);

    Ok(AmortizationSchedule {
        periodic_payment,
        schedule,
        yearly_summary,
        total_interest,
        total_payment,
    })
}

fn summarise_by_year(schedule: &[AmortizationEntry]) -> Vec<YearlySummary> {
    schedule
        .chunks(12)
        .enumerate()
        .map(|(idx, chunk)| YearlySummary {
            year: idx as u32 + 1,
            total_payment: chunk.iter().map(|e| e.payment).sum(),
            total_principal: chunk.iter().map(|e| e.principal_portion).sum(),
            total_interest: chunk.iter().map(|e| e.interest_portion).sum(),
            ending_balance: chunk.last().map(|e| e.ending_balance).unwrap_or_default(),
        })
        .collect()
}

fn solve_periodic_rate(
    payment: Money,
    target_pv: Money,
    nper: u32,
    guess: Rate,
) -> LoanEngineResult<Rate> {
    let mut rate = if guess.is_zero() { dec!(0.001) } else { guess };

    for i in 0..MAX_APR_ITERATIONS {
        let (pv, dpv) = annuity_pv_and_derivative(payment, rate, nper);
        let delta = pv - target_pv;

        if delta.abs() < APR_CONVERGENCE_THRESHOLD {
            return Ok(rate);
        }

        if dpv.is_zero() {
            return Err(LoanEngineError::ConvergenceFailure {
                function: "APR".into(),
                iterations: i,
                last_delta: delta,
            });
        }

        rate -= delta / dpv;

        // Guard against divergence
        if rate < Decimal::ZERO {
            rate = Decimal::ZERO;
        } else if rate > Decimal::ONE {
            rate = Decimal::ONE;
        }
    }

    let (pv, _) = annuity_pv_and_derivative(payment, rate, nper);
    Err(LoanEngineError::ConvergenceFailure {
        function: "APR".into(),
        iterations: MAX_APR_ITERATIONS,
        last_delta: pv - target_pv,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
