//! Property tests for the pooled payoff simulation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use loan_engine_core::payoff::{
    simulate_payoff, weighted_average_rate, Debt, PayoffInput, PayoffStatus,
};
use loan_engine_core::time_value::monthly_rate;

fn debt_pool() -> impl Strategy<Value = Vec<Debt>> {
    let debt = (100_00i64..=50_000_00, 100i64..=3_000).prop_map(|(cents, bp)| Debt {
        id: String::new(),
        balance: Decimal::new(cents, 2),
        annual_rate_percent: Decimal::new(bp, 2),
        min_payment: Decimal::ZERO,
    });
    proptest::collection::vec(debt, 1..=5).prop_map(|mut debts| {
        for (idx, d) in debts.iter_mut().enumerate() {
            d.id = format!("debt-{idx}");
        }
        debts
    })
}

fn pool_interest(debts: &[Debt]) -> (Decimal, Decimal) {
    let total: Decimal = debts.iter().map(|d| d.balance).sum();
    let interest = total * monthly_rate(weighted_average_rate(debts).unwrap());
    (total, interest)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: paying interest plus 1% of the balance retires the pool within 100 months.
    #[test]
    fn property_payment_above_interest_terminates(debts in debt_pool()) {
        let (total, interest) = pool_interest(&debts);
        let capacity = interest + total / Decimal::ONE_HUNDRED;

        let r = simulate_payoff(&PayoffInput {
            debts,
            total_monthly_capacity: capacity,
            extra_payment: Decimal::ZERO,
        })
        .unwrap()
        .result;

        prop_assert_eq!(r.status, PayoffStatus::PaidOff);
        prop_assert!(!r.never_pays_off);
        let months = r.months_to_zero.unwrap();
        prop_assert!(months <= 100, "took {months} months");
        prop_assert_eq!(r.remaining_balance, Decimal::ZERO);
    }

    /// PROPERTY: a payment at or below the first month's interest never pays off.
    #[test]
    fn property_payment_at_or_below_interest_never_terminates(
        debts in debt_pool(),
        share in 10i64..=100,
    ) {
        let (total, interest) = pool_interest(&debts);
        let capacity = interest * Decimal::new(share, 2);

        let r = simulate_payoff(&PayoffInput {
            debts,
            total_monthly_capacity: capacity,
            extra_payment: Decimal::ZERO,
        })
        .unwrap()
        .result;

        prop_assert_eq!(r.status, PayoffStatus::InterestExceedsPayment);
        prop_assert!(r.never_pays_off);
        prop_assert_eq!(r.months_to_zero, None);
        prop_assert!(r.remaining_balance > Decimal::ZERO);
        prop_assert_eq!(r.total_balance, total);
    }
}
