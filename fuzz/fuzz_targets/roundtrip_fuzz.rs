//! Fuzz test for the QUARRY pretty printer
//!
//! Whatever result the scanner assembles, printing it and parsing the text
//! again must give the same result without errors.
//!
//! Run with: cargo +nightly fuzz run roundtrip_fuzz -- -max_total_time=60

#![no_main]

use libfuzzer_sys::fuzz_target;
use quarry_core::{OptionSpec, Schema};
use quarry_query::{parse, pretty_print};

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
        let schema = schema();
        let first = parse(input, &schema);
        let printed = pretty_print(&first.result);
        let second = parse(&printed, &schema);

        assert!(second.is_ok(), "Printed query {:?} failed: {:?}", printed, second.error);
        assert_eq!(first.result, second.result, "Round-trip changed the result");
    }
});
