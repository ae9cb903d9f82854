use loan_engine_core::payoff::{self, Debt, PayoffInput, PayoffStatus, MAX_PAYOFF_MONTHS};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn debt(id: &str, balance: Decimal, rate: Decimal, min_payment: Decimal) -> Debt {
    Debt {
        id: id.into(),
        balance,
        annual_rate_percent: rate,
        min_payment,
    }
}

fn two_cards() -> Vec<Debt> {
    vec![
        debt("card-1", dec!(5_000), dec!(18.99), dec!(150)),
        debt("card-2", dec!(3_000), dec!(22.99), dec!(90)),
    ]
}

// ===========================================================================
// Payoff scenarios
// ===========================================================================

#[test]
fn test_two_cards_at_combined_minimum() {
    let debts = two_cards();
    let capacity = payoff::minimum_payment_total(&debts);
    assert_eq!(capacity, dec!(240));

    let out = payoff::simulate_payoff(&PayoffInput {
        debts,
        total_monthly_capacity: capacity,
        extra_payment: Decimal::ZERO,
    })
    .unwrap();
    let r = &out.result;

    assert_eq!(r.weighted_rate_percent, dec!(20.49));
    assert_eq!(r.status, PayoffStatus::PaidOff);
    assert!(!r.never_pays_off);
    // n = -ln(1 - P*r/A) / ln(1 + r) ≈ 49.7 months
    assert_eq!(r.months_to_zero, Some(50));
    assert!(out.warnings.is_empty());
}

#[test]
fn test_interest_accumulates_each_month() {
    let r = payoff::simulate_payoff(&PayoffInput {
        debts: two_cards(),
        total_monthly_capacity: dec!(240),
        extra_payment: Decimal::ZERO,
    })
    .unwrap()
    .result;

    let traced: Decimal = r.balance_trace.iter().map(|p| p.interest).sum();
    // Trace rows are rounded individually; the running total is not
    assert!((traced - r.total_interest_paid).abs() < dec!(0.5));

    // Balance strictly declines
    for pair in r.balance_trace.windows(2) {
        assert!(pair[1].remaining_balance < pair[0].remaining_balance);
    }
}

#[test]
fn test_structurally_insufficient_payment() {
    let debts = vec![debt("loan", dec!(20_000), dec!(24), Decimal::ZERO)];
    // Monthly interest is exactly 400
    let r = payoff::simulate_payoff(&PayoffInput {
        debts,
        total_monthly_capacity: dec!(400),
        extra_payment: Decimal::ZERO,
    })
    .unwrap()
    .result;
    assert_eq!(r.status, PayoffStatus::InterestExceedsPayment);
    assert!(r.never_pays_off);
    assert!(r.balance_trace.is_empty());
    assert_eq!(r.total_interest_paid, Decimal::ZERO);
    assert_eq!(r.remaining_balance, dec!(20_000));
}

#[test]
fn test_slow_payment_hits_cap() {
    // One cent over the 200 monthly interest needs roughly 1,000 months
    let debts = vec![debt("loan", dec!(20_000), dec!(12), Decimal::ZERO)];
    let r = payoff::simulate_payoff(&PayoffInput {
        debts,
        total_monthly_capacity: dec!(200.01),
        extra_payment: Decimal::ZERO,
    })
    .unwrap()
    .result;
    assert_eq!(r.status, PayoffStatus::IterationCapReached);
    assert!(r.never_pays_off);
    assert_eq!(r.months_to_zero, None);
    assert_eq!(r.balance_trace.len() as u32, MAX_PAYOFF_MONTHS);
}

#[test]
fn test_extra_payment_comparison() {
    let out = payoff::compare_extra_payment(&PayoffInput {
        debts: two_cards(),
        total_monthly_capacity: dec!(240),
        extra_payment: dec!(60),
    })
    .unwrap();
    let cmp = &out.result;
    let base = cmp.baseline.months_to_zero.unwrap();
    let accel = cmp.accelerated.months_to_zero.unwrap();
    assert_eq!(cmp.months_saved, Some(base - accel));
    assert_eq!(
        cmp.interest_saved,
        Some(cmp.baseline.total_interest_paid - cmp.accelerated.total_interest_paid)
    );
    assert!(accel < base);
}

#[test]
fn test_zero_extra_payment_warns() {
    let out = payoff::compare_extra_payment(&PayoffInput {
        debts: two_cards(),
        total_monthly_capacity: dec!(240),
        extra_payment: Decimal::ZERO,
    })
    .unwrap();
    assert_eq!(out.result.months_saved, Some(0));
    assert_eq!(out.result.interest_saved, Some(Decimal::ZERO));
    assert!(out.warnings.iter().any(|w| w.contains("identical")));
}

#[test]
fn test_capacity_below_minimums_warns() {
    let out = payoff::simulate_payoff(&PayoffInput {
        debts: two_cards(),
        total_monthly_capacity: dec!(200),
        extra_payment: Decimal::ZERO,
    })
    .unwrap();
    assert!(out.warnings.iter().any(|w| w.contains("below combined minimum")));
}

#[test]
fn test_payoff_input_from_json() {
    let input: PayoffInput = serde_json::from_str(
        r#"{
            "debts": [
                { "id": "a", "balance": "5000", "annual_rate_percent": "18.99", "min_payment": "150" },
                { "id": "b", "balance": "3000", "annual_rate_percent": "22.99" }
            ],
            "total_monthly_capacity": "240"
        }"#,
    )
    .unwrap();
    assert_eq!(input.extra_payment, Decimal::ZERO);
    assert_eq!(input.debts[1].min_payment, Decimal::ZERO);
    let out = payoff::simulate_payoff(&input).unwrap();
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["result"]["status"], "paid_off");
    assert_eq!(json["result"]["never_pays_off"], false);
}
