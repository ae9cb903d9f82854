use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

use loan_engine_core::amortization::{self, LoanTerms};
use loan_engine_core::LoanEngineResult;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse the JSON argument, run the engine call and serialise its output.
fn call_json<I, O>(input_json: &str, f: impl FnOnce(&I) -> LoanEngineResult<O>) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = f(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortisation
// ---------------------------------------------------------------------------

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    call_json(&input_json, amortization::compute_schedule)
}

#[napi]
pub fn fixed_payment(input_json: String) -> NapiResult<String> {
    call_json(&input_json, |terms: &LoanTerms| {
        let payment = amortization::compute_fixed_payment(
            terms.principal,
            terms.annual_rate_percent,
            terms.term_months,
        )?;
        Ok(serde_json::json!({ "periodic_payment": payment.to_string() }))
    })
}

#[napi]
pub fn annual_percentage_rate(input_json: String) -> NapiResult<String> {
    call_json(&input_json, amortization::annual_percentage_rate)
}

// ---------------------------------------------------------------------------
// Payoff
// ---------------------------------------------------------------------------

#[napi]
pub fn simulate_payoff(input_json: String) -> NapiResult<String> {
    call_json(&input_json, loan_engine_core::payoff::simulate_payoff)
}

#[napi]
pub fn extra_payment_comparison(input_json: String) -> NapiResult<String> {
    call_json(&input_json, loan_engine_core::payoff::compare_extra_payment)
}

// ---------------------------------------------------------------------------
// Affordability
// ---------------------------------------------------------------------------

#[napi]
pub fn max_loan_amount(input_json: String) -> NapiResult<String> {
    call_json(&input_json, loan_engine_core::affordability::max_loan_amount)
}

// ---------------------------------------------------------------------------
// Offers
// ---------------------------------------------------------------------------

#[napi]
pub fn compare_offers(input_json: String) -> NapiResult<String> {
    call_json(&input_json, loan_engine_core::offers::compare_offers)
}

#[napi]
pub fn break_even(input_json: String) -> NapiResult<String> {
    call_json(&input_json, loan_engine_core::offers::break_even)
}

// ---------------------------------------------------------------------------
// Consolidation
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_consolidation(input_json: String) -> NapiResult<String> {
    call_json(
        &input_json,
        loan_engine_core::consolidation::analyze_consolidation,
    )
}
