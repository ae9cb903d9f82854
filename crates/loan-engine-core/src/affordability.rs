//! Maximum affordable loan from front-end / back-end income ratios.
//!
//! Property tax and PMI depend on the unknown purchase price, so the solve
//! alternates between pricing recurring costs and inverting the amortisation
//! formula until the price settles.

use rust_decimal::RoundingStrategy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::amortization::MAX_TERM_MONTHS;
use crate::error::LoanEngineError;
use crate::time_value::{annuity_payment, annuity_principal, monthly_rate};
use crate::types::*;
use crate::LoanEngineResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Passes always run, even if the first estimate already looks stable.
const MIN_SOLVER_PASSES: u32 = 2;
const MAX_SOLVER_PASSES: u32 = 20;
/// Price change (in currency units) below which the solve is considered settled.
const PRICE_TOLERANCE: Money = dec!(1);
/// PMI applies once the loan exceeds this share of the price.
const PMI_LTV_THRESHOLD: Rate = dec!(0.80);

fn default_front_end_cap() -> Rate {
    dec!(0.28)
}

fn default_back_end_cap() -> Rate {
    dec!(0.36)
}

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityConstraint {
    /// Gross monthly income.
    pub monthly_income: Money,
    /// Non-housing debt payments (car, student loans, cards).
    #[serde(default)]
    pub monthly_obligations: Money,
    /// Housing cost / income ceiling, as a decimal.
    #[serde(default = "default_front_end_cap")]
    pub front_end_cap: Rate,
    /// (Housing + obligations) / income ceiling, as a decimal.
    #[serde(default = "default_back_end_cap")]
    pub back_end_cap: Rate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecurringCosts {
    /// Annual property tax as a percentage of the purchase price.
    #[serde(default)]
    pub property_tax_rate_percent: Percent,
    #[serde(default)]
    pub annual_insurance: Money,
    #[serde(default)]
    pub monthly_hoa: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityInput {
    pub constraint: AffordabilityConstraint,
    pub annual_rate_percent: Percent,
    pub term_months: u32,
    #[serde(default)]
    pub down_payment: Money,
    #[serde(default)]
    pub recurring_costs: RecurringCosts,
    /// Annual PMI as a percentage of the loan, charged above 80% loan-to-value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmi_rate_percent: Option<Percent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingConstraint {
    FrontEnd,
    BackEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffordabilityStatus {
    Affordable,
    /// Recurring costs or existing obligations consume the whole budget.
    CannotAfford,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityResult {
    pub status: AffordabilityStatus,
    pub max_principal: Money,
    pub max_home_price: Money,
    pub max_monthly_payment: Money,
    pub binding_constraint: BindingConstraint,
    pub monthly_principal_and_interest: Money,
    pub monthly_property_tax: Money,
    pub monthly_insurance: Money,
    pub monthly_hoa: Money,
    pub monthly_pmi: Money,
    pub total_monthly_housing_cost: Money,
    /// Housing cost / income, as a percentage.
    pub front_end_ratio: Percent,
    /// (Housing + obligations) / income, as a percentage.
    pub back_end_ratio: Percent,
    pub passes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PmiTreatment {
    Excluded,
    Charged,
}

struct PriceSolve {
    principal: Money,
    passes: u32,
    converged: bool,
    affordable: bool,
}

struct MonthlyCosts {
    property_tax: Money,
    insurance: Money,
    hoa: Money,
    pmi: Money,
}

impl MonthlyCosts {
    fn total(&self) -> Money {
        self.property_tax + self.insurance + self.hoa + self.pmi
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Largest principal whose total housing cost satisfies both income ratios.
pub fn max_loan_amount(
    input: &AffordabilityInput,
) -> LoanEngineResult<ComputationOutput<AffordabilityResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate_input(input)?;

    let c = &input.constraint;
    let max_front = c.monthly_income * c.front_end_cap;
    let max_back = c.monthly_income * c.back_end_cap - c.monthly_obligations;
    let (max_payment, binding) = if max_front <= max_back {
        (max_front, BindingConstraint::FrontEnd)
    } else {
        (max_back, BindingConstraint::BackEnd)
    };

    let rate = monthly_rate(input.annual_rate_percent);
    let n = input.term_months;

    let mut solve = solve_price(input, max_payment, rate, n, PmiTreatment::Excluded);
    if input.pmi_rate_percent.is_some()
        && solve.affordable
        && pmi_applies(input.down_payment, solve.principal)
    {
        let with_pmi = solve_price(input, max_payment, rate, n, PmiTreatment::Charged);
        let passes = solve.passes + with_pmi.passes;
        if with_pmi.affordable && pmi_applies(input.down_payment, with_pmi.principal) {
            solve = PriceSolve { passes, ..with_pmi };
        } else {
            // Charging PMI drops the loan to or below the threshold, where no PMI
            // is owed; the largest PMI-free loan fits the PMI-free budget.
            let ceiling = pmi_free_ceiling(input.down_payment).min(solve.principal);
            debug!(%ceiling, "loan held at the PMI loan-to-value threshold");
            warnings.push(format!(
                "Loan held at {}% loan-to-value; a larger loan would owe PMI it cannot afford",
                (PMI_LTV_THRESHOLD * dec!(100)).normalize()
            ));
            solve = PriceSolve {
                principal: ceiling,
                passes,
                converged: true,
                affordable: ceiling > Decimal::ZERO,
            };
        }
    }

    if solve.affordable && !solve.converged {
        warn!(passes = solve.passes, "affordability solve stopped before settling");
        warnings.push(format!(
            "Price did not settle within {MAX_SOLVER_PASSES} passes; recurring costs are approximate"
        ));
    }

    let affordable = solve.affordable;
    let passes = solve.passes;
    let max_principal = if affordable {
        solve
            .principal
            .round_dp_with_strategy(MONEY_DP, RoundingStrategy::ToZero)
    } else {
        warnings.push(
            "Recurring costs and existing obligations leave nothing for principal and interest"
                .into(),
        );
        Decimal::ZERO
    };
    let max_home_price = max_principal + input.down_payment;

    let treatment = if pmi_applies(input.down_payment, max_principal) {
        PmiTreatment::Charged
    } else {
        PmiTreatment::Excluded
    };
    let costs = monthly_costs(input, max_home_price, max_principal, treatment);
    let pi = if max_principal.is_zero() {
        Decimal::ZERO
    } else {
        round_money(annuity_payment(max_principal, rate, n)?)
    };
    let housing = pi + round_money(costs.total());

    let output = AffordabilityResult {
        status: if affordable {
            AffordabilityStatus::Affordable
        } else {
            AffordabilityStatus::CannotAfford
        },
        max_principal,
        max_home_price,
        max_monthly_payment: round_money(max_payment),
        binding_constraint: binding,
        monthly_principal_and_interest: pi,
        monthly_property_tax: round_money(costs.property_tax),
        monthly_insurance: round_money(costs.insurance),
        monthly_hoa: round_money(costs.hoa),
        monthly_pmi: round_money(costs.pmi),
        total_monthly_housing_cost: housing,
        front_end_ratio: (housing / c.monthly_income * dec!(100)).round_dp(2),
        back_end_ratio: ((housing + c.monthly_obligations) / c.monthly_income * dec!(100))
            .round_dp(2),
        passes,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Affordability (front-end / back-end ratio, iterative price solve)",
        &serde_json::json!({
            "front_end_cap": c.front_end_cap.to_string(),
            "back_end_cap": c.back_end_cap.to_string(),
            "price_tolerance": PRICE_TOLERANCE.to_string(),
            "pmi_ltv_threshold": PMI_LTV_THRESHOLD.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Alternate between pricing recurring costs and inverting the payment formula.
///
/// Each pass maps a price estimate to the principal its costs leave room for.
/// That map is decreasing, so successive estimates bracket the settled value
/// and the smaller of the last two never exceeds the budget.
fn solve_price(
    input: &AffordabilityInput,
    max_payment: Money,
    rate: Rate,
    n: u32,
    pmi: PmiTreatment,
) -> PriceSolve {
    let mut solve = PriceSolve {
        principal: Decimal::ZERO,
        passes: 0,
        converged: false,
        affordable: max_payment > Decimal::ZERO,
    };
    if !solve.affordable {
        return solve;
    }

    let mut principal = annuity_principal(max_payment, rate, n);
    let mut previous = principal;
    let mut price = principal + input.down_payment;

    while solve.passes < MAX_SOLVER_PASSES {
        solve.passes += 1;
        let costs = monthly_costs(input, price, principal, pmi);
        let available_for_pi = max_payment - costs.total();

        if available_for_pi <= Decimal::ZERO {
            solve.affordable = false;
            return solve;
        }

        previous = principal;
        principal = annuity_principal(available_for_pi, rate, n);
        let new_price = principal + input.down_payment;
        let delta = (new_price - price).abs();
        price = new_price;

        debug!(passes = solve.passes, ?pmi, %available_for_pi, %price, %delta, "affordability pass");

        if solve.passes >= MIN_SOLVER_PASSES && delta < PRICE_TOLERANCE {
            solve.converged = true;
            break;
        }
    }

    solve.principal = principal.min(previous);
    solve
}

/// PMI is owed once the loan exceeds the threshold share of the price.
fn pmi_applies(down_payment: Money, principal: Money) -> bool {
    let price = principal + down_payment;
    price > Decimal::ZERO && principal / price > PMI_LTV_THRESHOLD
}

/// Largest loan whose loan-to-value sits exactly at the PMI threshold.
fn pmi_free_ceiling(down_payment: Money) -> Money {
    down_payment * PMI_LTV_THRESHOLD / (Decimal::ONE - PMI_LTV_THRESHOLD)
}

fn monthly_costs(
    input: &AffordabilityInput,
    price: Money,
    principal: Money,
    pmi: PmiTreatment,
) -> MonthlyCosts {
    let rc = &input.recurring_costs;
    let pmi = match (pmi, input.pmi_rate_percent) {
        (PmiTreatment::Charged, Some(pmi_rate)) => principal * pmi_rate / dec!(100) / dec!(12),
        _ => Decimal::ZERO,
    };
    MonthlyCosts {
        property_tax: price * rc.property_tax_rate_percent / dec!(100) / dec!(12),
        insurance: rc.annual_insurance / dec!(12),
        hoa: rc.monthly_hoa,
        pmi,
    }
}

fn validate_input(input: &AffordabilityInput) -> LoanEngineResult<()> {
    let c = &input.constraint;
    if c.monthly_income <= Decimal::ZERO {
        return Err(LoanEngineError::InvalidIncome(
            "Monthly income must be positive".into(),
        ));
    }
    if c.monthly_obligations < Decimal::ZERO {
        return Err(LoanEngineError::InvalidInput {
            field: "monthly_obligations".into(),
            reason: "Obligations cannot be negative".into(),
        });
    }
    for (field, cap) in [("front_end_cap", c.front_end_cap), ("back_end_cap", c.back_end_cap)] {
        if cap <= Decimal::ZERO || cap > Decimal::ONE {
            return Err(LoanEngineError::InvalidInput {
                field: field.into(),
                reason: "Ratio cap must be a decimal in (0, 1]".into(),
            });
        }
    }
    if input.annual_rate_percent < Decimal::ZERO || input.annual_rate_percent >= dec!(100) {
        return Err(LoanEngineError::InvalidLoanTerms {
            field: "annual_rate_percent".into(),
            reason: "Rate must be between 0% and 100%".into(),
        });
    }
    if input.term_months == 0 || input.term_months > MAX_TERM_MONTHS {
        return Err(LoanEngineError::InvalidLoanTerms {
            field: "term_months".into(),
            reason: format!("Term must be between 1 and {MAX_TERM_MONTHS} months"),
        });
    }
    let rc = &input.recurring_costs;
    let negatives = [
        ("down_payment", input.down_payment),
        ("property_tax_rate_percent", rc.property_tax_rate_percent),
        ("annual_insurance", rc.annual_insurance),
        ("monthly_hoa", rc.monthly_hoa),
        ("pmi_rate_percent", input.pmi_rate_percent.unwrap_or(Decimal::ZERO)),
    ];
    for (field, value) in negatives {
        if value < Decimal::ZERO {
            return Err(LoanEngineError::InvalidInput {
                field: field.into(),
                reason: "Value cannot be negative".into(),
            });
        }
    }
    let amounts = [
        ("monthly_income", c.monthly_income),
        ("monthly_obligations", c.monthly_obligations),
        ("down_payment", input.down_payment),
        ("annual_insurance", rc.annual_insurance),
        ("monthly_hoa", rc.monthly_hoa),
    ];
    for (field, value) in amounts {
        if value > MAX_MONEY {
            return Err(LoanEngineError::InvalidInput {
                field: field.into(),
                reason: format!("Amount must not exceed {MAX_MONEY}"),
            });
        }
    }
    let rates = [
        ("property_tax_rate_percent", rc.property_tax_rate_percent),
        ("pmi_rate_percent", input.pmi_rate_percent.unwrap_or(Decimal::ZERO)),
    ];
    for (field, value) in rates {
        if value >= dec!(100) {
            return Err(LoanEngineError::InvalidInput {
                field: field.into(),
                reason: "Rate must be below 100%".into(),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
