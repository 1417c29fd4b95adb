//! Pretty printer for search results
//!
//! Renders a [`SearchResult`] back into query text that parses to the same
//! result: free-text terms first, then options in name order, with each value
//! of a multi-valued option written as its own `name:value` pair.

use quarry_core::{OptionValue, SearchResult};
use std::fmt::Write;

/// Render a result as query text.
pub fn pretty_print(result: &SearchResult) -> String {
    let mut out = String::new();

    for term in &result.free_text {
        separate(&mut out);
        write_term(&mut out, term);
    }

    for (name, stored) in &result.options {
        for value in stored.values() {
            separate(&mut out);
            out.push_str(name);
            out.push(':');
            write_value(&mut out, value);
        }
    }

    out
}

fn separate(out: &mut String) {
    if !out.is_empty() {
        out.push(' ');
    }
}

fn write_value(out: &mut String, value: &OptionValue) {
    match value {
        OptionValue::String(s) | OptionValue::Enum(s) => write_term(out, s),
        // `Display` renders yes/no and plain decimal numbers.
        other => {
            let _ = write!(out, "{}", other);
        }
    }
}

fn needs_quotes(term: &str) -> bool {
    term.is_empty()
        || term
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\\' | ':'))
}

/// Write a term bare when it can be typed as-is, quoted and escaped otherwise.
fn write_term(out: &mut String, term: &str) {
    if !needs_quotes(term) {
        out.push_str(term);
        return;
    }

    out.push('"');
    for c in term.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::lexer::parse;
    use proptest::prelude::*;
    use quarry_test_utils::fixtures::media_schema;
    use quarry_test_utils::generators::arb_search_result;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Printing then parsing yields the same result.
        #[test]
        fn prop_round_trip_preserves_result(result in arb_search_result()) {
            let printed = pretty_print(&result);
            let output = parse(&printed, &media_schema());

            prop_assert!(output.is_ok(), "reparse failed: {:?}\nPrinted: {}", output.error, printed);
            prop_assert_eq!(output.result, result);
        }
    }
}
