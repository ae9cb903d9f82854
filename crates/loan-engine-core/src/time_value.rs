use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::LoanEngineError;
use crate::types::{Money, Percent, Rate};
use crate::LoanEngineResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const HUNDRED: Decimal = dec!(100);

/// Convert an annual percentage (7.5) into a monthly decimal rate (0.00625).
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / HUNDRED / MONTHS_PER_YEAR
}

/// Compute (1 + r)^n via iterative multiplication (avoids Decimal::powd drift).
///
/// Callers bound `n` and `r` so the product stays inside Decimal's range.
pub fn compound(rate: Rate, n: u32) -> Decimal {
    let mut result = Decimal::ONE;
    let factor = Decimal::ONE + rate;
    for _ in 0..n {
        result *= factor;
    }
    result
}

/// Level payment that retires `principal` over `nper` periods at `rate` per period.
///
/// PMT = P * r * (1+r)^n / ((1+r)^n - 1), or P / n when r = 0.
/// The result is unrounded; callers round to cents where they report it.
pub fn annuity_payment(principal: Money, rate: Rate, nper: u32) -> LoanEngineResult<Money> {
    if nper == 0 {
        return Err(LoanEngineError::InvalidInput {
            field: "nper".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    // Written against the discount factor 1/(1+r)^n so large terms stay in range.
    let discount = Decimal::ONE / compound(rate, nper);
    let denom = Decimal::ONE - discount;
    if denom.is_zero() {
        return Err(LoanEngineError::InvalidInput {
            field: "rate".into(),
            reason: "Periodic rate too small to amortise".into(),
        });
    }

    Ok(principal * rate / denom)
}

/// Principal that a level payment supports over `nper` periods at `rate`.
///
/// Inverse of [`annuity_payment`]: P = A * ((1+r)^n - 1) / (r * (1+r)^n), or A * n when r = 0.
pub fn annuity_principal(payment: Money, rate: Rate, nper: u32) -> Money {
    if rate.is_zero() {
        return payment * Decimal::from(nper);
    }
    let discount = Decimal::ONE / compound(rate, nper);
    payment * (Decimal::ONE - discount) / rate
}

/// Present value of a level payment stream, plus its derivative with respect to the rate.
///
/// Used by the APR Newton-Raphson solve.
pub(crate) fn annuity_pv_and_derivative(payment: Money, rate: Rate, nper: u32) -> (Money, Decimal) {
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;
    let mut pv = Decimal::ZERO;
    let mut dpv = Decimal::ZERO;

    for t in 1..=nper {
        // Past the representable range the remaining terms are negligible.
        let (next, next_deriv) = match discount
            .checked_mul(one_plus_r)
            .and_then(|d| d.checked_mul(one_plus_r).map(|dd| (d, dd)))
        {
            Some(pair) => pair,
            None => break,
        };
        discount = next;
        if discount.is_zero() {
            break;
        }
        let t_dec = Decimal::from(t);
        pv += payment / discount;
        dpv -= t_dec * payment / next_deriv;
    }

    (pv, dpv)
}
