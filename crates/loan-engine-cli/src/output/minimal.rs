use serde_json::Value;

use super::{format_scalar, result_of};

/// Headline field per command, in priority order. Null entries (a payoff that
/// never finishes, savings that cannot be computed) fall through to the next.
const HEADLINE_KEYS: [&str; 11] = [
    "periodic_payment",
    "apr_percent",
    "remaining_balance",
    "max_principal",
    "months_to_zero",
    "months_saved",
    "best_offer",
    "break_even_months",
    "interest_savings",
    "status",
    "recommended",
];

/// Print just the headline answer of a result.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);

    if let Value::Object(map) = result {
        let headline = HEADLINE_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find(|val| !val.is_null());
        if let Some(val) = headline {
            println!("{}", format_headline(val));
            return;
        }
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_headline(val));
            return;
        }
    }

    println!("{}", format_headline(result));
}

/// `{"months": "14.5"}` prints as `14.5`; other values print as scalars.
fn format_headline(value: &Value) -> String {
    match value {
        Value::Object(map) if map.len() == 1 => map
            .values()
            .next()
            .map(format_scalar)
            .unwrap_or_default(),
        Value::Null => "null".to_string(),
        other => format_scalar(other),
    }
}
