//! QUARRY Test Utilities
//!
//! Shared test infrastructure for the QUARRY workspace:
//! - Proptest generators for query inputs and search results
//! - Mock suggestion sources
//! - A fixture schema covering every option type
//! - Assertions over parsed results and candidate lists

pub use quarry_core::{
    Candidate, OptionKind, OptionSpec, OptionValue, Schema, SearchResult, StoredValue,
    SuggestionError, SuggestionSource,
};

use async_trait::async_trait;
use std::sync::Mutex;

// ============================================================================
// MOCK SUGGESTION SOURCES
// ============================================================================

/// Suggestion source returning a fixed list and recording every prefix it
/// was asked about.
///
/// The list is returned unfiltered so tests can tell the resolver does not
/// filter source results itself.
#[derive(Debug, Default)]
pub struct MockSuggestionSource {
    candidates: Vec<Candidate>,
    prefixes: Mutex<Vec<String>>,
}

impl MockSuggestionSource {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            prefixes: Mutex::new(Vec::new()),
        }
    }

    /// Prefixes received so far, in call order.
    pub fn prefixes(&self) -> Vec<String> {
        self.prefixes
            .lock()
            .map(|prefixes| prefixes.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prefixes().len()
    }
}

#[async_trait]
impl SuggestionSource for MockSuggestionSource {
    async fn suggest(&self, prefix: &str) -> Result<Vec<Candidate>, SuggestionError> {
        if let Ok(mut prefixes) = self.prefixes.lock() {
            prefixes.push(prefix.to_string());
        }
        Ok(self.candidates.clone())
    }
}

/// Suggestion source that always fails.
#[derive(Debug, Clone)]
pub struct FailingSuggestionSource {
    reason: String,
}

impl FailingSuggestionSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for FailingSuggestionSource {
    fn default() -> Self {
        Self::new("backend offline")
    }
}

#[async_trait]
impl SuggestionSource for FailingSuggestionSource {
    async fn suggest(&self, _prefix: &str) -> Result<Vec<Candidate>, SuggestionError> {
        Err(SuggestionError::Unavailable {
            reason: self.reason.clone(),
        })
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for query inputs and search results.

    use super::*;
    use proptest::prelude::*;

    /// Choices of the fixture `sort` option.
    pub const SORT_CHOICES: [&str; 3] = ["newest", "oldest", "name"];

    /// Whitespace-separated words with no quotes, backslashes or colons.
    pub fn arb_plain_input() -> impl Strategy<Value = String> {
        (
            "[ \t]{0,2}",
            prop::collection::vec(("[a-zA-Z0-9_.,!?éü-]{1,8}", "[ \t\n]{1,3}"), 0..8),
            "[ \t]{0,2}",
        )
            .prop_map(|(lead, words, trail)| {
                let mut input = lead;
                for (word, gap) in words {
                    input.push_str(&word);
                    input.push_str(&gap);
                }
                input.push_str(&trail);
                input
            })
    }

    /// One fragment of a query: syntax characters, fixture option names,
    /// plausible values or arbitrary text.
    fn arb_fragment() -> impl Strategy<Value = String> {
        prop_oneof![
            3 => prop::sample::select(vec![" ", "  ", "\t", ":", "\"", "\\", "\\n", "\\\"", "\\x"])
                .prop_map(str::to_string),
            3 => prop::sample::select(vec![
                "tag:", "title:", "author:", "year:", "sort:", "archived:", "unknown:",
            ])
            .prop_map(str::to_string),
            2 => prop::sample::select(vec!["yes", "no", "newest", "name", "2024", "-1.5", "inf"])
                .prop_map(str::to_string),
            4 => "[a-zé ü]{1,6}",
        ]
    }

    /// Query-like input mixing valid and malformed syntax.
    pub fn arb_query_input() -> impl Strategy<Value = String> {
        prop::collection::vec(arb_fragment(), 0..12).prop_map(|parts| parts.concat())
    }

    /// A non-empty term that may need quoting or escaping to be typed.
    pub fn arb_term() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 é:\"\\\\\n\t-]{1,10}"
    }

    /// A finite number in a range the printer renders without exponent.
    pub fn arb_number() -> impl Strategy<Value = f64> {
        prop_oneof![(-100_000i64..100_000).prop_map(|n| n as f64), -1.0e6f64..1.0e6f64,]
    }

    /// A search result the fixture schema can produce.
    pub fn arb_search_result() -> impl Strategy<Value = SearchResult> {
        (
            prop::collection::vec(arb_term(), 0..4),
            prop::collection::vec(arb_term(), 0..3),
            proptest::option::of(arb_term()),
            proptest::option::of(arb_number()),
            proptest::option::of(prop::sample::select(SORT_CHOICES.to_vec())),
            proptest::option::of(any::<bool>()),
        )
            .prop_map(|(free_text, tags, title, year, sort, archived)| {
                let mut result = SearchResult::new();
                result.free_text = free_text;
                if !tags.is_empty() {
                    let tags = tags.into_iter().map(OptionValue::String).collect();
                    result.options.insert("tag".to_string(), StoredValue::Multi(tags));
                }
                let singles = [
                    ("title", title.map(OptionValue::String)),
                    ("year", year.map(OptionValue::Number)),
                    ("sort", sort.map(|s| OptionValue::Enum(s.to_string()))),
                    ("archived", archived.map(OptionValue::Boolean)),
                ];
                for (name, value) in singles {
                    if let Some(value) = value {
                        result
                            .options
                            .insert(name.to_string(), StoredValue::Single(value));
                    }
                }
                result
            })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built schemas for common testing scenarios.

    use super::generators::SORT_CHOICES;
    use super::*;
    use quarry_core::StaticSuggestions;

    /// Media-library schema with one option of every type.
    ///
    /// `tag` is the only multi-valued option.
    pub fn media_schema() -> Schema {
        let options = vec![
            OptionSpec::string("tag").titled("Tag").multiple(),
            OptionSpec::string("title").titled("Title"),
            OptionSpec::string("author").titled("Author"),
            OptionSpec::number("year").titled("Year"),
            OptionSpec::enumeration("sort", SORT_CHOICES).titled("Sort order"),
            OptionSpec::boolean("archived").titled("Archived"),
        ];
        match Schema::new(options) {
            Ok(schema) => schema,
            Err(err) => panic!("fixture schema is invalid: {}", err),
        }
    }

    /// Tags offered by [`media_schema_with_sources`].
    pub fn tag_candidates() -> Vec<Candidate> {
        vec![
            Candidate::with_description("rust", "Rust language"),
            Candidate::new("ruby"),
            Candidate::new("python"),
            Candidate::new("go"),
        ]
    }

    /// [`media_schema`] with a static source attached to `tag`.
    pub fn media_schema_with_sources() -> Schema {
        let mut schema = media_schema();
        if let Err(err) = schema.attach_source(
            "tag",
            std::sync::Arc::new(StaticSuggestions::new(tag_candidates())),
        ) {
            panic!("fixture source rejected: {}", err);
        }
        schema
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over parsed results and candidate lists.

    use super::*;

    /// Assert the free-text terms of a result.
    #[track_caller]
    pub fn assert_free_text(result: &SearchResult, expected: &[&str]) {
        let actual: Vec<&str> = result.free_text.iter().map(String::as_str).collect();
        assert_eq!(actual, expected, "free text mismatch");
    }

    /// Assert that a singleton option holds `expected`.
    #[track_caller]
    pub fn assert_single(result: &SearchResult, name: &str, expected: OptionValue) {
        match result.get(name) {
            Some(StoredValue::Single(value)) => {
                assert_eq!(value, &expected, "wrong value for option {}", name)
            }
            other => panic!("Expected single value for {}, got: {:?}", name, other),
        }
    }

    /// Assert that a multi-valued option holds `expected`, in order.
    #[track_caller]
    pub fn assert_multi(result: &SearchResult, name: &str, expected: &[OptionValue]) {
        match result.get(name) {
            Some(StoredValue::Multi(values)) => {
                assert_eq!(values.as_slice(), expected, "wrong values for option {}", name)
            }
            other => panic!("Expected multiple values for {}, got: {:?}", name, other),
        }
    }

    /// Assert that an option is absent from a result.
    #[track_caller]
    pub fn assert_unset(result: &SearchResult, name: &str) {
        assert!(
            !result.contains(name),
            "Expected {} to be unset, got: {:?}",
            name,
            result.get(name)
        );
    }

    /// Assert candidate names, in order.
    #[track_caller]
    pub fn assert_candidate_names(candidates: &[Candidate], expected: &[&str]) {
        let actual: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(actual, expected, "candidate mismatch");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_media_schema_covers_every_type() {
        let schema = fixtures::media_schema();
        let kinds: Vec<&str> = schema.iter().map(|spec| spec.kind.as_str()).collect();
        for kind in ["string", "number", "enum", "boolean"] {
            assert!(kinds.contains(&kind), "missing {} option", kind);
        }
        assert!(schema.get("tag").is_some_and(|spec| spec.multiple));
    }

    #[test]
    fn test_media_schema_with_sources() {
        let schema = fixtures::media_schema_with_sources();
        let tag = schema.get("tag").unwrap();
        assert!(tag.kind.suggestion_source().is_some());
    }

    #[tokio::test]
    async fn test_mock_source_records_prefixes() {
        let source = MockSuggestionSource::new(vec![Candidate::new("a")]);
        source.suggest("x").await.unwrap();
        source.suggest("xy").await.unwrap();
        assert_eq!(source.prefixes(), vec!["x".to_string(), "xy".to_string()]);
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failing_source() {
        let source = FailingSuggestionSource::default();
        assert!(matches!(
            source.suggest("x").await,
            Err(SuggestionError::Unavailable { .. })
        ));
    }

    #[test]
    fn test_assert_multi() {
        let mut result = SearchResult::new();
        result.options.insert(
            "tag".to_string(),
            StoredValue::Multi(vec![OptionValue::String("a".to_string())]),
        );
        assertions::assert_multi(&result, "tag", &[OptionValue::String("a".to_string())]);
        assertions::assert_unset(&result, "year");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_plain_input_has_no_syntax(input in generators::arb_plain_input()) {
            prop_assert!(!input.contains(&[':', '"', '\\'][..]));
        }

        #[test]
        fn prop_generated_result_matches_fixture(result in generators::arb_search_result()) {
            let schema = fixtures::media_schema();
            for (name, stored) in &result.options {
                let spec = schema.get(name);
                prop_assert!(spec.is_some());
                let multiple = spec.map(|s| s.multiple).unwrap_or_default();
                prop_assert_eq!(multiple, matches!(stored, StoredValue::Multi(_)));
            }
            prop_assert!(result.free_text.iter().all(|term| !term.is_empty()));
        }
    }
}
