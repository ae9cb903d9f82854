use loan_engine_core::amortization::{self, LoanTerms};
use loan_engine_core::time_value;
use loan_engine_core::LoanEngineError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Known-answer scenarios
// ===========================================================================

#[test]
fn test_personal_loan_matches_formula() {
    let terms = LoanTerms::new(dec!(15_000), dec!(9.5), 36);
    let out = amortization::compute_schedule(&terms).unwrap();
    let sched = &out.result;

    // Independent evaluation of P * r * (1+r)^n / ((1+r)^n - 1)
    let r = dec!(9.5) / dec!(1200);
    let factor = time_value::compound(r, 36);
    let expected = dec!(15_000) * r * factor / (factor - Decimal::ONE);

    assert!((sched.periodic_payment - expected).abs() <= dec!(0.005));
    assert!((sched.periodic_payment - dec!(480.52)).abs() < dec!(0.05));
    assert!((sched.total_interest - dec!(2_298.72)).abs() < dec!(1.5));
    assert_eq!(sched.total_payment, dec!(15_000) + sched.total_interest);
    assert_eq!(out.methodology, "Fixed-Payment Amortisation");
}

#[test]
fn test_thirty_year_mortgage() {
    let terms = LoanTerms::new(dec!(300_000), dec!(6), 360);
    let sched = amortization::compute_schedule(&terms).unwrap().result;

    // Standard table value: $1,798.65 per month
    assert_eq!(sched.periodic_payment, dec!(1798.65));
    assert_eq!(sched.schedule.len(), 360);
    assert_eq!(sched.yearly_summary.len(), 30);

    // First month: interest = 300,000 * 0.005 = 1,500
    let first = &sched.schedule[0];
    assert_eq!(first.interest_portion, dec!(1500));
    assert_eq!(first.principal_portion, dec!(298.65));
    assert_eq!(first.ending_balance, dec!(299_701.35));
}

#[test]
fn test_last_period_closes_balance() {
    let terms = LoanTerms::new(dec!(27_345.67), dec!(11.25), 60);
    let sched = amortization::compute_schedule(&terms).unwrap().result;
    let last = sched.schedule.last().unwrap();
    assert_eq!(last.ending_balance, Decimal::ZERO);
    // Final payment differs from the level payment by at most rounding drift
    assert!((last.payment - sched.periodic_payment).abs() < dec!(1));
}

#[test]
fn test_zero_rate_equal_principal() {
    let terms = LoanTerms::new(dec!(10_000), Decimal::ZERO, 7);
    let sched = amortization::compute_schedule(&terms).unwrap().result;
    let first = sched.schedule[0].principal_portion;
    for entry in &sched.schedule {
        assert_eq!(entry.interest_portion, Decimal::ZERO);
        assert!((entry.principal_portion - first).abs() <= dec!(0.01));
    }
    let total: Decimal = sched.schedule.iter().map(|e| e.principal_portion).sum();
    assert_eq!(total, dec!(10_000));
}

// ===========================================================================
// Monotonicity
// ===========================================================================

#[test]
fn test_higher_rate_more_interest() {
    let mut previous = Decimal::ZERO;
    for rate in [dec!(3), dec!(4.5), dec!(6), dec!(9.99), dec!(18)] {
        let sched = amortization::compute_schedule(&LoanTerms::new(dec!(50_000), rate, 120))
            .unwrap()
            .result;
        assert!(sched.total_interest > previous, "rate {rate}");
        previous = sched.total_interest;
    }
}

#[test]
fn test_longer_term_lower_payment() {
    let mut previous = Decimal::MAX;
    for term in [12, 24, 36, 60, 120, 240, 360] {
        let payment = amortization::compute_fixed_payment(dec!(50_000), dec!(7), term).unwrap();
        assert!(payment < previous, "term {term}");
        previous = payment;
    }
}

// ===========================================================================
// Validation
// ===========================================================================

#[test]
fn test_invalid_terms_are_errors_not_clamped() {
    let cases = [
        LoanTerms::new(dec!(-1), dec!(5), 12),
        LoanTerms::new(dec!(1000), dec!(-0.01), 12),
        LoanTerms::new(dec!(1000), dec!(5), 0),
        LoanTerms::new(dec!(1000), dec!(5), 601),
    ];
    for terms in cases {
        match amortization::compute_schedule(&terms) {
            Err(LoanEngineError::InvalidLoanTerms { .. }) => {}
            other => panic!("expected InvalidLoanTerms, got {other:?}"),
        }
    }
}

#[test]
fn test_negative_fee_rejected_for_apr() {
    let mut terms = LoanTerms::new(dec!(1000), dec!(5), 12);
    terms.fee_percent = dec!(-2);
    assert!(amortization::annual_percentage_rate(&terms).is_err());
}

#[test]
fn test_loan_terms_from_json_defaults_fee() {
    let terms: LoanTerms = serde_json::from_str(
        r#"{ "principal": "15000", "annual_rate_percent": "9.5", "term_months": 36 }"#,
    )
    .unwrap();
    assert_eq!(terms, LoanTerms::new(dec!(15000), dec!(9.5), 36));
}
