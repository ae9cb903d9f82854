//! Property tests for the affordability solve.

use proptest::prelude::*;
use rust_decimal::Decimal;

use loan_engine_core::affordability::{
    max_loan_amount, AffordabilityConstraint, AffordabilityInput, AffordabilityStatus,
    RecurringCosts,
};
use loan_engine_core::amortization::compute_fixed_payment;

fn household() -> impl Strategy<Value = AffordabilityInput> {
    (
        3_000i64..=30_000,
        0i64..=1_500,
        200i64..=1_200,
        prop_oneof![Just(180u32), Just(240u32), Just(360u32)],
        0i64..=100_000,
        0i64..=200,
        0i64..=3_000,
        prop_oneof![Just(None), (30i64..=150).prop_map(Some)],
    )
        .prop_map(|(income, obligations, rate_bp, term, down, tax_bp, insurance, pmi_bp)| {
            AffordabilityInput {
                constraint: AffordabilityConstraint {
                    monthly_income: Decimal::from(income),
                    monthly_obligations: Decimal::from(obligations),
                    front_end_cap: Decimal::new(28, 2),
                    back_end_cap: Decimal::new(36, 2),
                },
                annual_rate_percent: Decimal::new(rate_bp, 2),
                term_months: term,
                down_payment: Decimal::from(down),
                recurring_costs: RecurringCosts {
                    property_tax_rate_percent: Decimal::new(tax_bp, 2),
                    annual_insurance: Decimal::from(insurance),
                    monthly_hoa: Decimal::ZERO,
                },
                pmi_rate_percent: pmi_bp.map(|bp| Decimal::new(bp, 2)),
            }
        })
}

/// Buyers whose down payment sits near 20% of what they can borrow, where
/// PMI switches on and off between solver passes.
fn buyer_near_pmi_threshold() -> impl Strategy<Value = AffordabilityInput> {
    (
        6_000i64..=20_000,
        300i64..=900,
        30i64..=150,
        15i64..=30,
    )
        .prop_map(|(income, rate_bp, pmi_bp, down_pct)| {
            // Loan a PMI-free budget supports, used only to place the down payment
            let rough_loan = income * 28 / 100 * 150;
            AffordabilityInput {
                constraint: AffordabilityConstraint {
                    monthly_income: Decimal::from(income),
                    monthly_obligations: Decimal::ZERO,
                    front_end_cap: Decimal::new(28, 2),
                    back_end_cap: Decimal::new(36, 2),
                },
                annual_rate_percent: Decimal::new(rate_bp, 2),
                term_months: 360,
                down_payment: Decimal::from(rough_loan * down_pct / 80),
                recurring_costs: RecurringCosts::default(),
                pmi_rate_percent: Some(Decimal::new(pmi_bp, 2)),
            }
        })
}

fn assert_within_budget(input: &AffordabilityInput) -> Result<(), TestCaseError> {
    let r = max_loan_amount(input).unwrap().result;
    if r.status != AffordabilityStatus::Affordable || r.max_principal.is_zero() {
        return Ok(());
    }
    let pi = compute_fixed_payment(r.max_principal, input.annual_rate_percent, input.term_months)
        .unwrap();
    let recurring = r.monthly_property_tax + r.monthly_insurance + r.monthly_hoa + r.monthly_pmi;
    prop_assert!(
        pi + recurring <= r.max_monthly_payment + Decimal::new(2, 2),
        "P&I {pi} + recurring {recurring} over budget {}",
        r.max_monthly_payment
    );
    prop_assert!(r.total_monthly_housing_cost <= r.max_monthly_payment + Decimal::new(2, 2));
    prop_assert!(r.front_end_ratio <= input.constraint.front_end_cap * Decimal::from(100) + Decimal::new(1, 2));
    prop_assert_eq!(r.max_home_price, r.max_principal + input.down_payment);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: re-amortising the reported principal stays inside the payment budget.
    #[test]
    fn property_max_principal_fits_budget(input in household()) {
        assert_within_budget(&input)?;
    }

    /// PROPERTY: the budget holds when PMI toggles around 80% loan-to-value.
    #[test]
    fn property_budget_holds_near_pmi_threshold(input in buyer_near_pmi_threshold()) {
        assert_within_budget(&input)?;
    }
}
