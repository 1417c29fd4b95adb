//! Suggestion resolver: autocomplete candidates for the token under the caret

use crate::coerce::{NO, YES};
use crate::lexer::{SuggestHint, Token, TokenKind};
use quarry_core::{Candidate, OptionKind, OptionSpec, Schema};

/// Caret or selection as byte offsets into the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width selection.
    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Token a collapsed caret rests on; ranged selections have none.
///
/// A caret belongs to the token it ends or sits inside. The empty value
/// placeholder emitted right after `name:` takes precedence over the name it
/// follows. A caret at the very start of a token only selects it if nothing
/// precedes.
pub fn token_at(tokens: &[Token], selection: Selection) -> Option<&Token> {
    if !selection.is_collapsed() {
        return None;
    }
    let caret = selection.start;

    tokens
        .iter()
        .rev()
        .find(|token| {
            let span = token.span;
            (span.start < caret && caret <= span.end)
                || (span.is_empty()
                    && span.start == caret
                    && token.kind == TokenKind::MissingOptionValue)
        })
        .or_else(|| tokens.iter().find(|token| token.span.start == caret))
}

/// Candidates for a token, resolved from its suggestion hint.
///
/// Only number and string options with a source actually suspend. A source
/// failure is logged and yields no candidates.
pub async fn suggest(token: &Token, schema: &Schema) -> Vec<Candidate> {
    match &token.hint {
        SuggestHint::None => Vec::new(),
        SuggestHint::Options => option_names(&token.text, schema),
        SuggestHint::Spec(spec) => option_values(&token.text, spec).await,
    }
}

/// Resolve candidates for the caret position in one step.
pub async fn suggest_at(tokens: &[Token], selection: Selection, schema: &Schema) -> Vec<Candidate> {
    match token_at(tokens, selection) {
        Some(token) => suggest(token, schema).await,
        None => Vec::new(),
    }
}

/// `name:` candidates for every option whose name or title starts with `prefix`.
pub fn option_names(prefix: &str, schema: &Schema) -> Vec<Candidate> {
    schema
        .iter()
        .filter(|spec| {
            spec.name.starts_with(prefix)
                || spec
                    .title
                    .as_deref()
                    .is_some_and(|title| title.starts_with(prefix))
        })
        .map(|spec| Candidate {
            name: format!("{}:", spec.name),
            description: spec.title.clone(),
        })
        .collect()
}

async fn option_values(prefix: &str, spec: &OptionSpec) -> Vec<Candidate> {
    match &spec.kind {
        OptionKind::Boolean => vec![Candidate::new(YES), Candidate::new(NO)],
        OptionKind::Enum { choices } => choices
            .iter()
            .filter(|choice| choice.starts_with(prefix))
            .map(Candidate::new)
            .collect(),
        OptionKind::Number { suggestions } | OptionKind::String { suggestions } => {
            let Some(source) = suggestions else {
                return Vec::new();
            };
            match source.suggest(prefix).await {
                Ok(candidates) => {
                    tracing::debug!(
                        option = %spec.name,
                        prefix,
                        count = candidates.len(),
                        "Resolved value suggestions"
                    );
                    candidates
                }
                Err(err) => {
                    tracing::warn!(
                        option = %spec.name,
                        prefix,
                        error = %err,
                        "Suggestion source failed"
                    );
                    Vec::new()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::parse;
    use quarry_core::{StaticSuggestions, SuggestionError, SuggestionSource};
    use quarry_test_utils::{FailingSuggestionSource, MockSuggestionSource};
    use std::sync::Arc;

    fn names(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.name.as_str()).collect()
    }

    fn schema() -> Schema {
        Schema::new(vec![
            OptionSpec::string("tag").titled("Tag").multiple(),
            OptionSpec::string("title").titled("Document title"),
            OptionSpec::boolean("archived").titled("Archived"),
            OptionSpec::enumeration("sort", ["newest", "oldest", "name"]).titled("Sort order"),
            OptionSpec::number("year").titled("Year"),
        ])
        .unwrap()
    }

    async fn at(input: &str, caret: usize, schema: &Schema) -> Vec<Candidate> {
        let output = parse(input, schema);
        suggest_at(&output.tokens, Selection::caret(caret), schema).await
    }

    // ========================================================================
    // Caret lookup
    // ========================================================================

    #[test]
    fn test_token_at_prefers_token_ending_at_caret() {
        let schema = schema();
        let output = parse("ta b", &schema);

        let token = token_at(&output.tokens, Selection::caret(2)).unwrap();
        assert_eq!(token.raw, "ta");

        let token = token_at(&output.tokens, Selection::caret(3)).unwrap();
        assert_eq!(token.raw, " ");

        let token = token_at(&output.tokens, Selection::caret(0)).unwrap();
        assert_eq!(token.raw, "ta");
    }

    #[test]
    fn test_token_at_picks_value_placeholder_after_colon() {
        let schema = schema();
        let output = parse("archived:", &schema);

        let token = token_at(&output.tokens, Selection::caret(9)).unwrap();
        assert_eq!(token.kind, TokenKind::MissingOptionValue);
    }

    #[test]
    fn test_token_at_ignores_ranged_selection() {
        let schema = schema();
        let output = parse("tag:rust", &schema);

        assert!(token_at(&output.tokens, Selection::new(4, 6)).is_none());
        assert!(token_at(&output.tokens, Selection::new(2, 6)).is_none());
    }

    #[test]
    fn test_token_at_empty_input() {
        assert!(token_at(&[], Selection::caret(0)).is_none());
    }

    // ========================================================================
    // Candidates
    // ========================================================================

    #[tokio::test]
    async fn test_option_name_prefix() {
        let schema = schema();
        let found = at("t", 1, &schema).await;
        assert_eq!(names(&found), vec!["tag:", "title:"]);
        assert_eq!(found[0].description.as_deref(), Some("Tag"));
    }

    #[tokio::test]
    async fn test_option_name_matches_title() {
        let schema = schema();
        let found = at("Sort", 4, &schema).await;
        assert_eq!(names(&found), vec!["sort:"]);
    }

    #[tokio::test]
    async fn test_option_names_are_case_sensitive() {
        let schema = schema();
        assert!(at("TAG", 3, &schema).await.is_empty());
    }

    #[tokio::test]
    async fn test_space_suggests_every_option() {
        let schema = schema();
        let found = at("rust ", 5, &schema).await;
        assert_eq!(found.len(), schema.len());
    }

    #[tokio::test]
    async fn test_boolean_always_yes_then_no() {
        let schema = schema();
        for (input, caret) in [("archived:", 9), ("archived:n", 10), ("archived:zzz", 12)] {
            let found = at(input, caret, &schema).await;
            assert_eq!(names(&found), vec!["yes", "no"], "input {:?}", input);
        }
    }

    #[tokio::test]
    async fn test_enum_prefix_preserves_declared_order() {
        let schema = schema();
        assert_eq!(names(&at("sort:", 5, &schema).await), vec!["newest", "oldest", "name"]);
        assert_eq!(names(&at("sort:n", 6, &schema).await), vec!["newest", "name"]);
        assert!(at("sort:x", 6, &schema).await.is_empty());
    }

    #[tokio::test]
    async fn test_option_name_token_has_no_candidates() {
        let schema = schema();
        let output = parse("tag:x", &schema);
        assert!(suggest(&output.tokens[0], &schema).await.is_empty());
    }

    #[tokio::test]
    async fn test_number_without_source_has_no_candidates() {
        let schema = schema();
        assert!(at("year:19", 7, &schema).await.is_empty());
    }

    #[tokio::test]
    async fn test_source_receives_decoded_prefix_and_is_unfiltered() {
        let source = Arc::new(MockSuggestionSource::new(vec![
            Candidate::new("zeta"),
            Candidate::new("alpha"),
        ]));
        let mut schema = schema();
        schema.attach_source("title", source.clone()).unwrap();

        let found = at(r#"title:"a b"#, 10, &schema).await;

        assert_eq!(names(&found), vec!["zeta", "alpha"]);
        assert_eq!(source.prefixes(), vec!["a b".to_string()]);
    }

    #[tokio::test]
    async fn test_failing_source_yields_nothing() {
        let mut schema = schema();
        schema
            .attach_source("title", Arc::new(FailingSuggestionSource::default()))
            .unwrap();

        assert!(at("title:x", 7, &schema).await.is_empty());
    }

    #[tokio::test]
    async fn test_static_source_filters() {
        let schema = Schema::new(vec![OptionSpec::string("lang").with_suggestions(
            StaticSuggestions::new(vec![Candidate::new("rust"), Candidate::new("go")]),
        )])
        .unwrap();

        assert_eq!(names(&at("lang:r", 6, &schema).await), vec!["rust"]);
    }

    struct SlowSource;

    #[async_trait::async_trait]
    impl SuggestionSource for SlowSource {
        async fn suggest(&self, prefix: &str) -> Result<Vec<Candidate>, SuggestionError> {
            tokio::task::yield_now().await;
            Ok(vec![Candidate::new(format!("{}!", prefix))])
        }
    }

    #[tokio::test]
    async fn test_asynchronous_source_is_awaited() {
        let schema =
            Schema::new(vec![OptionSpec::number("year").with_suggestions(SlowSource)]).unwrap();
        assert_eq!(names(&at("year:20", 7, &schema).await), vec!["20!"]);
    }
}
