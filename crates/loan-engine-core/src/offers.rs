//! Loan offer comparison and refinance break-even analysis.
//!
//! Each candidate's origination fee is financed into its principal (see
//! [`LoanTerms::financed`]) before it is amortised. Break-even is a tagged
//! outcome: when the new loan does not lower the monthly payment the answer
//! is [`BreakEvenMonths::Never`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{build_schedule, validate_terms, AmortizationSchedule, LoanTerms};
use crate::error::LoanEngineError;
use crate::types::*;
use crate::LoanEngineResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferCandidate {
    pub label: String,
    pub terms: LoanTerms,
    #[serde(default)]
    pub min_credit_score: u32,
    /// Out-of-pocket closing costs not financed into the loan.
    #[serde(default)]
    pub upfront_cost: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferComparisonInput {
    /// The loan being replaced: remaining balance, rate and remaining months.
    pub current: LoanTerms,
    pub candidates: Vec<OfferCandidate>,
    /// Borrower's score; when absent every candidate is treated as eligible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakEvenInput {
    pub current: LoanTerms,
    pub proposed: LoanTerms,
    #[serde(default)]
    pub upfront_cost: Money,
}

/// Months until cumulative savings repay the upfront cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakEvenMonths {
    Months(Decimal),
    /// The new loan does not lower the monthly payment.
    Never,
}

impl BreakEvenMonths {
    pub fn months(&self) -> Option<Decimal> {
        match self {
            BreakEvenMonths::Months(m) => Some(*m),
            BreakEvenMonths::Never => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakEvenResult {
    pub current_monthly_payment: Money,
    pub proposed_monthly_payment: Money,
    pub monthly_savings: Money,
    pub break_even_months: BreakEvenMonths,
    pub lifetime_savings: Money,
    pub worth_it: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSummary {
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_payment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub label: String,
    /// 1 = cheapest eligible offer; `None` for ineligible offers.
    pub rank: Option<u32>,
    pub eligible: bool,
    pub effective_principal: Money,
    pub fees: Money,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_payment: Money,
    pub break_even: BreakEvenResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferComparison {
    pub current: LoanSummary,
    pub rows: Vec<ComparisonRow>,
    pub best_offer: Option<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Amortise every candidate and rank them against each other and the current loan.
pub fn compare_offers(
    input: &OfferComparisonInput,
) -> LoanEngineResult<ComputationOutput<OfferComparison>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.candidates.is_empty() {
        return Err(LoanEngineError::InvalidInput {
            field: "candidates".into(),
            reason: "At least one offer is required".into(),
        });
    }

    let current = build_schedule(&input.current)?;

    let mut eligible_rows = Vec::new();
    let mut ineligible_rows = Vec::new();

    for candidate in &input.candidates {
        validate_upfront_cost(candidate.upfront_cost)?;
        validate_terms(&candidate.terms)?;
        let financed = candidate.terms.financed();
        let schedule = build_schedule(&financed)?;
        let eligible = input
            .credit_score
            .map_or(true, |score| score >= candidate.min_credit_score);

        let row = ComparisonRow {
            label: candidate.label.clone(),
            rank: None,
            eligible,
            effective_principal: financed.principal,
            fees: financed.principal - round_money(candidate.terms.principal),
            monthly_payment: schedule.periodic_payment,
            total_interest: schedule.total_interest,
            total_payment: schedule.total_payment,
            break_even: evaluate_break_even(
                &current,
                &schedule,
                candidate.upfront_cost,
                input.current.term_months,
            ),
        };

        if eligible {
            eligible_rows.push(row);
        } else {
            warnings.push(format!(
                "Offer '{}' requires a credit score of {}",
                candidate.label, candidate.min_credit_score
            ));
            ineligible_rows.push(row);
        }
    }

    eligible_rows.sort_by(|a, b| {
        a.total_payment
            .cmp(&b.total_payment)
            .then(a.monthly_payment.cmp(&b.monthly_payment))
    });
    for (idx, row) in eligible_rows.iter_mut().enumerate() {
        row.rank = Some(idx as u32 + 1);
    }

    if eligible_rows.is_empty() {
        warnings.push("No offer is available at the supplied credit score".into());
    }

    let best_offer = eligible_rows.first().map(|r| r.label.clone());
    let mut rows = eligible_rows;
    rows.extend(ineligible_rows);

    let output = OfferComparison {
        current: LoanSummary {
            monthly_payment: current.periodic_payment,
            total_interest: current.total_interest,
            total_payment: current.total_payment,
        },
        rows,
        best_offer,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Offer Comparison (fees financed, ranked by total cost)",
        &serde_json::json!({
            "candidates": input.candidates.len(),
            "credit_score": input.credit_score,
            "fee_treatment": "rolled into principal",
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Months for the monthly saving of `proposed` over `current` to repay `upfront_cost`.
pub fn break_even(input: &BreakEvenInput) -> LoanEngineResult<ComputationOutput<BreakEvenResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate_upfront_cost(input.upfront_cost)?;

    let current = build_schedule(&input.current)?;
    validate_terms(&input.proposed)?;
    let proposed = build_schedule(&input.proposed.financed())?;

    let result = evaluate_break_even(
        &current,
        &proposed,
        input.upfront_cost,
        input.current.term_months,
    );

    if result.break_even_months == BreakEvenMonths::Never {
        warnings.push("Proposed loan does not lower the monthly payment".into());
    } else if !result.worth_it {
        warnings.push(format!(
            "Break-even falls after the {} months remaining on the current loan",
            input.current.term_months
        ));
    }
    if result.lifetime_savings < Decimal::ZERO {
        warnings.push("Proposed loan costs more over its life than the current loan".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Refinance Break-Even",
        &serde_json::json!({
            "upfront_cost": input.upfront_cost.to_string(),
            "remaining_months": input.current.term_months,
        }),
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_upfront_cost(upfront_cost: Money) -> LoanEngineResult<()> {
    if upfront_cost < Decimal::ZERO {
        return Err(LoanEngineError::InvalidInput {
            field: "upfront_cost".into(),
            reason: "Upfront cost cannot be negative".into(),
        });
    }
    if upfront_cost > MAX_MONEY {
        return Err(LoanEngineError::InvalidInput {
            field: "upfront_cost".into(),
            reason: format!("Upfront cost must not exceed {MAX_MONEY}"),
        });
    }
    Ok(())
}

fn evaluate_break_even(
    current: &AmortizationSchedule,
    proposed: &AmortizationSchedule,
    upfront_cost: Money,
    remaining_months: u32,
) -> BreakEvenResult {
    let monthly_savings = current.periodic_payment - proposed.periodic_payment;

    let break_even_months = if monthly_savings > Decimal::ZERO {
        BreakEvenMonths::Months((upfront_cost / monthly_savings).round_dp(2))
    } else {
        BreakEvenMonths::Never
    };

    let worth_it = match break_even_months {
        BreakEvenMonths::Months(m) => m < Decimal::from(remaining_months),
        BreakEvenMonths::Never => false,
    };

    BreakEvenResult {
        current_monthly_payment: current.periodic_payment,
        proposed_monthly_payment: proposed.periodic_payment,
        monthly_savings,
        break_even_months,
        lifetime_savings: (current.total_payment - proposed.total_payment) - upfront_cost,
        worth_it,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
