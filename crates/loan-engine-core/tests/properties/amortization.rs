//! Property tests for schedule construction.

use proptest::prelude::*;
use rust_decimal::Decimal;

use loan_engine_core::amortization::{compute_fixed_payment, compute_schedule, LoanTerms};

fn principal() -> impl Strategy<Value = Decimal> {
    (1_000_00i64..=2_000_000_00).prop_map(|cents| Decimal::new(cents, 2))
}

/// Annual rate between 0% and 30%, in basis-point steps.
fn rate_percent() -> impl Strategy<Value = Decimal> {
    (0i64..=3_000).prop_map(|bp| Decimal::new(bp, 2))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: principal portions sum to the principal and the balance closes at zero.
    #[test]
    fn property_schedule_conserves_principal(
        p in principal(),
        rate in rate_percent(),
        term in 1u32..=600,
    ) {
        let sched = compute_schedule(&LoanTerms::new(p, rate, term)).unwrap().result;

        let repaid: Decimal = sched.schedule.iter().map(|e| e.principal_portion).sum();
        prop_assert_eq!(repaid, p);
        prop_assert_eq!(sched.total_payment, p + sched.total_interest);

        let last = sched.schedule.last().unwrap();
        prop_assert_eq!(last.ending_balance, Decimal::ZERO);
        prop_assert!(sched.schedule.len() as u32 <= term);
        for entry in &sched.schedule {
            prop_assert!(entry.ending_balance >= Decimal::ZERO);
            prop_assert_eq!(entry.payment, entry.principal_portion + entry.interest_portion);
        }
    }

    /// PROPERTY: at 0% every payment is principal and all but the last are level.
    #[test]
    fn property_zero_rate_is_straight_line(
        p in principal(),
        term in 1u32..=600,
    ) {
        let sched = compute_schedule(&LoanTerms::new(p, Decimal::ZERO, term)).unwrap().result;
        prop_assert_eq!(sched.total_interest, Decimal::ZERO);

        let (last, rest) = sched.schedule.split_last().unwrap();
        for entry in rest {
            prop_assert_eq!(entry.interest_portion, Decimal::ZERO);
            prop_assert_eq!(entry.principal_portion, sched.periodic_payment);
        }
        prop_assert_eq!(last.interest_portion, Decimal::ZERO);
    }

    /// PROPERTY: a higher rate strictly raises the payment and the total interest.
    #[test]
    fn property_payment_monotonic_in_rate(
        p in principal(),
        rate in rate_percent(),
        bump in 25i64..=500,
        term in 12u32..=360,
    ) {
        let higher = rate + Decimal::new(bump, 2);
        let low = compute_schedule(&LoanTerms::new(p, rate, term)).unwrap().result;
        let high = compute_schedule(&LoanTerms::new(p, higher, term)).unwrap().result;
        prop_assert!(high.periodic_payment > low.periodic_payment);
        prop_assert!(
            high.total_interest > low.total_interest,
            "{higher}% interest {} not above {rate}% interest {}",
            high.total_interest,
            low.total_interest
        );
    }

    /// PROPERTY: a longer term strictly lowers the payment.
    ///
    /// At $10,000 or more and ten years or less, one extra month moves the
    /// payment by well over a cent, so rounding cannot produce a tie.
    #[test]
    fn property_payment_monotonic_in_term(
        p in (10_000_00i64..=2_000_000_00).prop_map(|cents| Decimal::new(cents, 2)),
        rate in rate_percent(),
        term in 1u32..=120,
        extra in 1u32..=60,
    ) {
        let short = compute_fixed_payment(p, rate, term).unwrap();
        let long = compute_fixed_payment(p, rate, term + extra).unwrap();
        prop_assert!(long < short, "{} months pays {long}, {term} months pays {short}", term + extra);
    }
}
