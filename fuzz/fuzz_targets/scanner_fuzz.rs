//! Fuzz test for the QUARRY query scanner
//!
//! Feeds arbitrary UTF-8 input through the scanner and checks that the token
//! stream always covers the input exactly.
//!
//! Run with: cargo +nightly fuzz run scanner_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use quarry_core::{OptionSpec, Schema};
use quarry_query::parse;

fn schema() -> Schema {
    Schema::new(vec![
        OptionSpec::string("tag").multiple(),
        OptionSpec::string("title"),
        OptionSpec::number("year"),
        OptionSpec::enumeration("sort", ["newest", "oldest"]),
        OptionSpec::boolean("archived"),
    ])
    .expect("fuzz schema is valid")
}

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let output = parse(input, &schema());

        // 1. Raw token text reproduces the input
        let joined: String = output.tokens.iter().map(|t| t.raw.as_str()).collect();
        assert_eq!(joined, input, "Tokens must reproduce the input");

        // 2. Spans are contiguous and on char boundaries
        let mut offset = 0;
        for token in &output.tokens {
            assert_eq!(token.span.start, offset, "Spans must be contiguous");
            assert!(input.is_char_boundary(token.span.end));
            offset = token.span.end;
        }

        // 3. Errors point inside the input
        if let Some(err) = &output.error {
            assert!(err.position <= input.len(), "Error position out of bounds");
        }
    }
});
