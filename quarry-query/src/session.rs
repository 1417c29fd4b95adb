//! Editing session: re-parse on every change and hand out suggestion requests
//!
//! A session owns the latest parse of the input and a revision counter.
//! Suggestion requests snapshot the token under the caret together with the
//! revision they were taken at, so a caller resolving them in the background
//! can drop candidate lists that arrive after the input moved on.

use crate::assemble::apply_defaults;
use crate::error::ParseError;
use crate::lexer::{parse, ParseOutput, Token};
use crate::suggest::{suggest, token_at, Selection};
use quarry_core::{Candidate, Schema, SearchResult};
use std::sync::Arc;

/// Receives the outcome of each parse. Exactly one method is called per update.
pub trait QueryListener: Send + Sync {
    fn on_change(&self, result: &SearchResult);
    fn on_error(&self, error: &ParseError);
}

/// Live parse state for one input field.
pub struct SearchSession {
    schema: Arc<Schema>,
    listener: Option<Arc<dyn QueryListener>>,
    apply_defaults: bool,
    output: ParseOutput,
    revision: u64,
}

impl SearchSession {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            listener: None,
            apply_defaults: false,
            output: ParseOutput::default(),
            revision: 0,
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn QueryListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Fill unset options from schema defaults before results are reported.
    pub fn with_defaults(mut self) -> Self {
        self.apply_defaults = true;
        self
    }

    /// Re-parse the whole input and notify the listener.
    pub fn update(&mut self, input: &str) -> &ParseOutput {
        let mut output = parse(input, &self.schema);
        if self.apply_defaults {
            apply_defaults(&mut output.result, &self.schema);
        }
        self.revision += 1;
        self.output = output;

        tracing::debug!(
            revision = self.revision,
            tokens = self.output.tokens.len(),
            ok = self.output.is_ok(),
            "Session updated"
        );

        if let Some(listener) = &self.listener {
            match &self.output.error {
                Some(err) => listener.on_error(err),
                None => listener.on_change(&self.output.result),
            }
        }
        &self.output
    }

    pub fn output(&self) -> &ParseOutput {
        &self.output
    }

    pub fn tokens(&self) -> &[Token] {
        &self.output.tokens
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Number of updates so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_current(&self, revision: u64) -> bool {
        self.revision == revision
    }

    /// Snapshot the token under a collapsed caret for later resolution.
    pub fn suggestion_request(&self, selection: Selection) -> Option<SuggestionRequest> {
        let token = token_at(&self.output.tokens, selection)?;
        Some(SuggestionRequest {
            revision: self.revision,
            token: token.clone(),
            schema: Arc::clone(&self.schema),
        })
    }
}

/// Owned suggestion lookup, detached from the session that created it.
#[derive(Debug, Clone)]
pub struct SuggestionRequest {
    pub revision: u64,
    pub token: Token,
    schema: Arc<Schema>,
}

impl SuggestionRequest {
    pub async fn resolve(self) -> Suggestions {
        let candidates = suggest(&self.token, &self.schema).await;
        tracing::debug!(
            revision = self.revision,
            token = %self.token.kind,
            count = candidates.len(),
            "Resolved suggestions"
        );
        Suggestions {
            revision: self.revision,
            candidates,
        }
    }
}

/// Candidates tagged with the revision they were computed for.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestions {
    pub revision: u64,
    pub candidates: Vec<Candidate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyntaxError;
    use quarry_core::{OptionSpec, OptionValue};
    use quarry_test_utils::fixtures::media_schema;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingListener {
        changes: Mutex<Vec<SearchResult>>,
        errors: Mutex<Vec<ParseError>>,
    }

    impl RecordingListener {
        fn changes(&self) -> Vec<SearchResult> {
            self.changes.lock().unwrap().clone()
        }

        fn errors(&self) -> Vec<ParseError> {
            self.errors.lock().unwrap().clone()
        }
    }

    impl QueryListener for RecordingListener {
        fn on_change(&self, result: &SearchResult) {
            self.changes.lock().unwrap().push(result.clone());
        }

        fn on_error(&self, error: &ParseError) {
            self.errors.lock().unwrap().push(error.clone());
        }
    }

    fn session() -> (SearchSession, Arc<RecordingListener>) {
        let listener = Arc::new(RecordingListener::default());
        let session = SearchSession::new(Arc::new(media_schema())).with_listener(listener.clone());
        (session, listener)
    }

    #[test]
    fn test_update_notifies_exactly_one_callback() {
        let (mut session, listener) = session();

        session.update("rust year:2024");
        session.update("year:soon");
        session.update("rust");

        assert_eq!(listener.changes().len(), 2);
        assert_eq!(listener.errors().len(), 1);
        assert!(matches!(
            listener.errors()[0].kind,
            SyntaxError::InvalidValue { .. }
        ));
        assert_eq!(listener.changes()[1].free_text, vec!["rust".to_string()]);
    }

    #[test]
    fn test_revision_increases_per_update() {
        let (mut session, _) = session();
        assert_eq!(session.revision(), 0);

        session.update("a");
        session.update("a");
        assert_eq!(session.revision(), 2);
        assert!(session.is_current(2));
        assert!(!session.is_current(1));
    }

    #[test]
    fn test_update_replaces_previous_output() {
        let (mut session, _) = session();
        session.update("\"open");
        assert!(!session.output().is_ok());

        session.update("closed");
        assert!(session.output().is_ok());
        assert_eq!(session.tokens().len(), 1);
    }

    #[test]
    fn test_defaults_are_applied_when_enabled() {
        let schema = Schema::new(vec![
            OptionSpec::enumeration("sort", ["newest", "oldest"]).with_default("newest"),
        ])
        .unwrap();
        let mut session = SearchSession::new(Arc::new(schema.clone())).with_defaults();
        let output = session.update("rust");
        assert_eq!(
            output.result.single("sort"),
            Some(&OptionValue::Enum("newest".to_string()))
        );

        let mut plain = SearchSession::new(Arc::new(schema));
        assert!(!plain.update("rust").result.contains("sort"));
    }

    #[test]
    fn test_suggestion_request_requires_collapsed_caret() {
        let (mut session, _) = session();
        session.update("sort:n");

        assert!(session.suggestion_request(Selection::new(0, 6)).is_none());
        assert!(session.suggestion_request(Selection::caret(6)).is_some());
    }

    #[tokio::test]
    async fn test_request_resolves_detached_and_detects_staleness() {
        let (mut session, _) = session();
        session.update("sort:n");
        let request = session.suggestion_request(Selection::caret(6)).unwrap();

        session.update("sort:ne");
        let suggestions = request.resolve().await;

        let names: Vec<&str> = suggestions.candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["newest", "name"]);
        assert_eq!(suggestions.revision, 1);
        assert!(!session.is_current(suggestions.revision));
    }

    #[tokio::test]
    async fn test_request_can_run_on_spawned_task() {
        let (mut session, _) = session();
        session.update("archived:");
        let request = session.suggestion_request(Selection::caret(9)).unwrap();

        let suggestions = tokio::spawn(request.resolve()).await.unwrap();
        assert!(session.is_current(suggestions.revision));
        assert_eq!(suggestions.candidates.len(), 2);
    }
}
