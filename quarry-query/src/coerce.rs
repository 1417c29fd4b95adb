//! Per-type coercion of decoded option values

use quarry_core::{OptionKind, OptionSpec, OptionValue};

/// Boolean literal for `true`.
pub const YES: &str = "yes";
/// Boolean literal for `false`.
pub const NO: &str = "no";

/// Convert a decoded value into a typed value for `spec`, or `None` when the
/// value is rejected. Values are taken as-is: no trimming, no case folding.
pub fn coerce(raw: &str, spec: &OptionSpec) -> Option<OptionValue> {
    match &spec.kind {
        OptionKind::Boolean => match raw {
            YES => Some(OptionValue::Boolean(true)),
            NO => Some(OptionValue::Boolean(false)),
            _ => None,
        },
        OptionKind::String { .. } => Some(OptionValue::String(raw.to_string())),
        OptionKind::Number { .. } => parse_number(raw).map(OptionValue::Number),
        OptionKind::Enum { choices } => choices
            .iter()
            .any(|choice| choice == raw)
            .then(|| OptionValue::Enum(raw.to_string())),
    }
}

/// Whole-string decimal parse. `inf`, `NaN` and overflowing literals are rejected.
fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}
