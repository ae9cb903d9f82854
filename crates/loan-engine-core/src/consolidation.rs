//! Debt consolidation: keep paying the current debts, or roll them into one loan.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{build_schedule, validate_terms, LoanTerms};
use crate::error::LoanEngineError;
use crate::payoff::{minimum_payment_total, run_simulation, validate_debts, Debt, PayoffResult};
use crate::types::*;
use crate::LoanEngineResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationLoan {
    pub annual_rate_percent: Percent,
    pub term_months: u32,
    #[serde(default)]
    pub fee_percent: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationInput {
    pub debts: Vec<Debt>,
    /// Monthly amount paid on the current debts; defaults to the sum of minimums.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_payment: Option<Money>,
    pub loan: ConsolidationLoan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationLoanSummary {
    pub principal: Money,
    pub fees: Money,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_payment: Money,
    pub term_months: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationResult {
    pub current_plan: PayoffResult,
    pub consolidated: ConsolidationLoanSummary,
    /// Consolidated payment minus current payment (negative = lower payment).
    pub monthly_payment_change: Money,
    /// Current-plan interest minus consolidation interest and fees.
    /// `None` when the current plan never pays off.
    pub interest_savings: Option<Money>,
    pub months_saved: Option<i64>,
    pub recommended: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn analyze_consolidation(
    input: &ConsolidationInput,
) -> LoanEngineResult<ComputationOutput<ConsolidationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate_debts(&input.debts)?;

    let current_payment = input
        .monthly_payment
        .unwrap_or_else(|| minimum_payment_total(&input.debts));
    if current_payment <= Decimal::ZERO {
        return Err(LoanEngineError::InvalidInput {
            field: "monthly_payment".into(),
            reason: "Provide a monthly payment or positive minimum payments".into(),
        });
    }
    if current_payment > MAX_MONEY {
        return Err(LoanEngineError::InvalidInput {
            field: "monthly_payment".into(),
            reason: format!("Monthly payment must not exceed {MAX_MONEY}"),
        });
    }

    let current_plan = run_simulation(&input.debts, current_payment);

    let total_balance: Money = input.debts.iter().map(|d| d.balance).sum();
    let quoted = LoanTerms {
        principal: total_balance,
        annual_rate_percent: input.loan.annual_rate_percent,
        term_months: input.loan.term_months,
        fee_percent: input.loan.fee_percent,
    };
    validate_terms(&quoted)?;
    let loan_terms = quoted.financed();
    let schedule = build_schedule(&loan_terms)?;
    let fees = loan_terms.principal - round_money(total_balance);

    let consolidated = ConsolidationLoanSummary {
        principal: loan_terms.principal,
        fees,
        monthly_payment: schedule.periodic_payment,
        total_interest: schedule.total_interest,
        total_payment: schedule.total_payment,
        term_months: schedule.schedule.len() as u32,
    };

    let interest_savings = if current_plan.never_pays_off {
        warnings.push("Current payments never retire the debts".into());
        None
    } else {
        Some(current_plan.total_interest_paid - consolidated.total_interest - fees)
    };
    let months_saved = current_plan
        .months_to_zero
        .map(|m| i64::from(m) - i64::from(consolidated.term_months));

    let recommended = match interest_savings {
        Some(savings) => savings > Decimal::ZERO,
        None => true,
    };

    let monthly_payment_change = consolidated.monthly_payment - current_payment;
    if monthly_payment_change > Decimal::ZERO {
        warnings.push(format!(
            "Consolidation raises the monthly payment by {monthly_payment_change}"
        ));
    }

    let output = ConsolidationResult {
        current_plan,
        consolidated,
        monthly_payment_change,
        interest_savings,
        months_saved,
        recommended,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Debt Consolidation (pooled payoff vs amortised loan)",
        &serde_json::json!({
            "debts": input.debts.len(),
            "current_monthly_payment": current_payment.to_string(),
            "fee_treatment": "rolled into principal",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
