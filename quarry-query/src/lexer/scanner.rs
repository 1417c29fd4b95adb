//! Scanner implementation
//!
//! One left-to-right pass over the input drives a small state machine. Every
//! input character lands in exactly one token, so the raw text of the token
//! stream always reproduces the input, and the pass never stops early: after
//! a syntax error the remaining input is still tokenized and assembled on a
//! best-effort basis. Only the first error is kept.

use super::token::*;
use crate::assemble::{push_free_text, store};
use crate::coerce::coerce;
use crate::error::{ParseError, SyntaxError};
use quarry_core::{OptionKind, OptionSpec, Schema, SearchResult};
use std::sync::Arc;

// ============================================================================
// PARSE OUTPUT
// ============================================================================

/// Tokens, result and first error of one parse.
///
/// `result` is populated even when `error` is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutput {
    pub tokens: Vec<Token>,
    pub result: SearchResult,
    pub error: Option<ParseError>,
}

impl ParseOutput {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Discard the tokens and treat any error as fatal.
    pub fn into_result(self) -> Result<SearchResult, ParseError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.result),
        }
    }
}

/// Parse a query against a schema.
pub fn parse(input: &str, schema: &Schema) -> ParseOutput {
    Scanner::new(input, schema).scan()
}

// ============================================================================
// SCAN STATES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quoting {
    Open,
    /// A backslash was just read inside the quotes.
    Escaping,
}

#[derive(Debug, Clone, Default)]
enum ScanState {
    #[default]
    Bare,
    QuotedText(Quoting),
    OptionValue(Arc<OptionSpec>),
    QuotedOptionValue(Arc<OptionSpec>, Quoting),
}

fn unescape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        '"' => Some('"'),
        '\\' => Some('\\'),
        _ => None,
    }
}

fn value_token_kind(spec: &OptionSpec) -> TokenKind {
    match spec.kind {
        OptionKind::Number { .. } => TokenKind::Number,
        OptionKind::Enum { .. } | OptionKind::Boolean => TokenKind::Enum,
        OptionKind::String { .. } => TokenKind::Text,
    }
}

// ============================================================================
// SCANNER
// ============================================================================

/// Scanner for QUARRY queries.
pub struct Scanner<'a> {
    source: &'a str,
    schema: &'a Schema,
    state: ScanState,
    /// Raw text of the token under construction.
    raw: String,
    /// Decoded value of the word or option value under construction.
    decoded: String,
    /// Byte offset where `raw` starts; everything before it is tokenized.
    cursor: usize,
    /// Byte offset of the option value being scanned, right after its `name:`.
    value_start: usize,
    tokens: Vec<Token>,
    result: SearchResult,
    error: Option<ParseError>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str, schema: &'a Schema) -> Self {
        Self {
            source,
            schema,
            state: ScanState::Bare,
            raw: String::new(),
            decoded: String::new(),
            cursor: 0,
            value_start: 0,
            tokens: Vec::new(),
            result: SearchResult::new(),
            error: None,
        }
    }

    /// Run the scan to completion.
    pub fn scan(mut self) -> ParseOutput {
        for c in self.source.chars() {
            match std::mem::take(&mut self.state) {
                ScanState::Bare => self.scan_bare(c),
                ScanState::QuotedText(quoting) => self.scan_quoted_text(quoting, c),
                ScanState::OptionValue(spec) => self.scan_option_value(spec, c),
                ScanState::QuotedOptionValue(spec, quoting) => {
                    self.scan_quoted_value(spec, quoting, c)
                }
            }
        }
        self.finish();

        tracing::trace!(
            input_len = self.source.len(),
            tokens = self.tokens.len(),
            error = ?self.error,
            "Scanned query"
        );

        ParseOutput {
            tokens: self.tokens,
            result: self.result,
            error: self.error,
        }
    }

    fn scan_bare(&mut self, c: char) {
        match c {
            c if c.is_whitespace() => {
                self.finish_word();
                self.emit_space(c);
            }
            '"' if self.raw.is_empty() && self.decoded.is_empty() => {
                self.raw.push(c);
                self.state = ScanState::QuotedText(Quoting::Open);
            }
            // The word keeps accumulating past a stray character; only its
            // raw text so far is closed off.
            '"' => {
                self.flush_fragment(SuggestHint::Options);
                self.stray(c, SyntaxError::UnexpectedQuote);
            }
            '\\' => {
                self.flush_fragment(SuggestHint::Options);
                self.stray(c, SyntaxError::UnexpectedEscape);
            }
            ':' if self.decoded.is_empty() => self.stray(c, SyntaxError::UnexpectedColon),
            ':' => self.option_name(),
            c => self.accumulate(c),
        }
    }

    fn scan_quoted_text(&mut self, quoting: Quoting, c: char) {
        if quoting == Quoting::Escaping {
            self.escape(c, SuggestHint::None);
            self.state = ScanState::QuotedText(Quoting::Open);
            return;
        }

        match c {
            '\\' => {
                self.flush_fragment(SuggestHint::Options);
                self.raw.push(c);
                self.state = ScanState::QuotedText(Quoting::Escaping);
            }
            '"' => {
                self.raw.push(c);
                self.finish_word();
            }
            c => {
                self.accumulate(c);
                self.state = ScanState::QuotedText(Quoting::Open);
            }
        }
    }

    fn scan_option_value(&mut self, spec: Arc<OptionSpec>, c: char) {
        match c {
            c if c.is_whitespace() => {
                self.complete_value(spec);
                self.emit_space(c);
            }
            '"' if self.raw.is_empty() => {
                self.raw.push(c);
                self.state = ScanState::QuotedOptionValue(spec, Quoting::Open);
            }
            '"' => {
                self.complete_value(spec);
                self.stray(c, SyntaxError::UnexpectedQuote);
            }
            ':' => {
                self.complete_value(spec);
                self.stray(c, SyntaxError::UnexpectedColon);
            }
            '\\' => {
                self.complete_value(spec);
                self.stray(c, SyntaxError::UnexpectedEscape);
            }
            c => {
                self.accumulate(c);
                self.state = ScanState::OptionValue(spec);
            }
        }
    }

    fn scan_quoted_value(&mut self, spec: Arc<OptionSpec>, quoting: Quoting, c: char) {
        if quoting == Quoting::Escaping {
            self.escape(c, SuggestHint::Spec(Arc::clone(&spec)));
            self.state = ScanState::QuotedOptionValue(spec, Quoting::Open);
            return;
        }

        match c {
            '\\' => {
                self.flush_fragment(SuggestHint::Spec(Arc::clone(&spec)));
                self.raw.push(c);
                self.state = ScanState::QuotedOptionValue(spec, Quoting::Escaping);
            }
            '"' => {
                self.raw.push(c);
                self.complete_value(spec);
            }
            c => {
                self.accumulate(c);
                self.state = ScanState::QuotedOptionValue(spec, Quoting::Open);
            }
        }
    }

    /// Close whatever is pending at end of input.
    fn finish(&mut self) {
        match std::mem::take(&mut self.state) {
            ScanState::Bare => self.finish_word(),
            ScanState::QuotedText(quoting) => {
                if quoting == Quoting::Escaping {
                    self.dangling_escape(SuggestHint::None);
                }
                self.finish_word();
                self.missing_quote();
            }
            ScanState::OptionValue(spec) => self.complete_value(spec),
            ScanState::QuotedOptionValue(spec, quoting) => {
                if quoting == Quoting::Escaping {
                    self.dangling_escape(SuggestHint::Spec(Arc::clone(&spec)));
                }
                self.complete_value(spec);
                self.missing_quote();
            }
        }
    }

    // ========================================================================
    // Words, names and values
    // ========================================================================

    fn accumulate(&mut self, c: char) {
        self.raw.push(c);
        self.decoded.push(c);
    }

    /// Close the current free-text word: its pending raw text becomes a Text
    /// token and its decoded value a free-text term.
    fn finish_word(&mut self) {
        let term = std::mem::take(&mut self.decoded);
        if !self.raw.is_empty() {
            let raw = std::mem::take(&mut self.raw);
            self.emit(TokenKind::Text, raw, term.clone(), SuggestHint::Options);
        }
        push_free_text(&mut self.result, term);
    }

    /// Emit the pending raw text as a Text token without closing the word.
    fn flush_fragment(&mut self, hint: SuggestHint) {
        if !self.raw.is_empty() {
            let raw = std::mem::take(&mut self.raw);
            let text = self.decoded.clone();
            self.emit(TokenKind::Text, raw, text, hint);
        }
    }

    fn option_name(&mut self) {
        let name = std::mem::take(&mut self.decoded);
        let mut raw = std::mem::take(&mut self.raw);
        raw.push(':');

        let schema = self.schema;
        match schema.get(&name) {
            Some(spec) if spec.multiple || !self.result.contains(&name) => {
                self.state = ScanState::OptionValue(Arc::clone(spec));
                self.emit(TokenKind::OptionName, raw, name, SuggestHint::None);
                self.value_start = self.cursor;
            }
            Some(_) => {
                self.report(SyntaxError::RepeatedOption { name: name.clone() });
                self.emit(TokenKind::InvalidOptionName, raw, name, SuggestHint::None);
            }
            None => {
                self.report(SyntaxError::UnknownOption { name: name.clone() });
                self.emit(TokenKind::InvalidOptionName, raw, name, SuggestHint::None);
            }
        }
    }

    /// Finalize an option value: coerce, store and emit its token. The
    /// scanner is back in bare text afterwards whatever the outcome.
    ///
    /// Value errors are reported at the start of the value, and every
    /// fragment of a rejected value is marked invalid.
    fn complete_value(&mut self, spec: Arc<OptionSpec>) {
        let raw = std::mem::take(&mut self.raw);
        let value = std::mem::take(&mut self.decoded);
        let start = self.value_start;

        if value.is_empty() {
            self.report_at(
                start,
                SyntaxError::MissingValue {
                    name: spec.name.clone(),
                },
            );
            self.reject_fragments(start);
            self.emit(
                TokenKind::MissingOptionValue,
                raw,
                value,
                SuggestHint::Spec(spec),
            );
            return;
        }

        let kind = match coerce(&value, &spec) {
            Some(accepted) => {
                store(&mut self.result, &spec, accepted);
                value_token_kind(&spec)
            }
            None => {
                self.report_at(
                    start,
                    SyntaxError::InvalidValue {
                        name: spec.name.clone(),
                        expected: spec.kind.as_str().to_string(),
                        value: value.clone(),
                    },
                );
                self.reject_fragments(start);
                TokenKind::Invalid
            }
        };

        if raw.is_empty() {
            // Unterminated quote ending in an escape: every character is
            // already in a fragment, so the last text fragment carries the value.
            self.retag_last_fragment(start, kind, value);
        } else {
            self.emit(kind, raw, value, SuggestHint::Spec(spec));
        }
    }

    /// Fragments of the value starting at `start`, latest first.
    fn value_fragments(&mut self, start: usize) -> impl Iterator<Item = &mut Token> {
        self.tokens
            .iter_mut()
            .rev()
            .take_while(move |token| token.span.start >= start)
    }

    fn reject_fragments(&mut self, start: usize) {
        for token in self.value_fragments(start) {
            if matches!(token.kind, TokenKind::Text | TokenKind::EscapeSequence) {
                token.kind = TokenKind::Invalid;
            }
        }
    }

    fn retag_last_fragment(&mut self, start: usize, kind: TokenKind, value: String) {
        let last = self
            .value_fragments(start)
            .find(|token| matches!(token.kind, TokenKind::Text | TokenKind::Invalid));
        if let Some(token) = last {
            token.kind = kind;
            token.text = value;
        }
    }

    // ========================================================================
    // Escapes and errors
    // ========================================================================

    /// Second character of an escape sequence; `raw` already holds the backslash.
    fn escape(&mut self, c: char, hint: SuggestHint) {
        self.raw.push(c);
        let raw = std::mem::take(&mut self.raw);

        match unescape(c) {
            Some(decoded) => {
                self.decoded.push(decoded);
                let text = self.decoded.clone();
                self.emit(TokenKind::EscapeSequence, raw, text, hint);
            }
            None => {
                self.report(SyntaxError::InvalidEscape);
                let text = self.decoded.clone();
                self.emit(TokenKind::InvalidEscapeSequence, raw, text, hint);
            }
        }
    }

    /// Backslash as the very last character inside quotes.
    fn dangling_escape(&mut self, hint: SuggestHint) {
        self.report(SyntaxError::InvalidEscape);
        let raw = std::mem::take(&mut self.raw);
        let text = self.decoded.clone();
        self.emit(TokenKind::InvalidEscapeSequence, raw, text, hint);
    }

    fn missing_quote(&mut self) {
        self.report(SyntaxError::MissingQuote);
        self.emit(
            TokenKind::MissingQuote,
            String::new(),
            String::new(),
            SuggestHint::None,
        );
    }

    fn stray(&mut self, c: char, kind: SyntaxError) {
        self.report(kind);
        self.emit(
            TokenKind::Invalid,
            c.to_string(),
            String::new(),
            SuggestHint::None,
        );
    }

    /// Record an error at the start of the pending token. First one wins.
    fn report(&mut self, kind: SyntaxError) {
        self.report_at(self.cursor, kind);
    }

    fn report_at(&mut self, position: usize, kind: SyntaxError) {
        if self.error.is_none() {
            self.error = Some(ParseError::new(position, kind));
        }
    }

    // ========================================================================
    // Token emission
    // ========================================================================

    fn emit(&mut self, kind: TokenKind, raw: String, text: String, hint: SuggestHint) {
        let start = self.cursor;
        self.cursor += raw.len();
        self.tokens.push(Token {
            kind,
            raw,
            text,
            span: Span::new(start, self.cursor),
            hint,
        });
    }

    /// Whitespace runs collapse into a single Space token.
    fn emit_space(&mut self, c: char) {
        if let Some(last) = self.tokens.last_mut() {
            if last.kind == TokenKind::Space && last.span.end == self.cursor {
                last.raw.push(c);
                last.span.end += c.len_utf8();
                self.cursor = last.span.end;
                return;
            }
        }
        self.emit(
            TokenKind::Space,
            c.to_string(),
            String::new(),
            SuggestHint::Options,
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;
    use quarry_test_utils::fixtures::media_schema;
    use quarry_test_utils::generators::{arb_plain_input, arb_query_input};

    proptest! {
        #[test]
        fn prop_tokens_reproduce_input(input in arb_query_input()) {
            let output = parse(&input, &media_schema());
            let joined: String = output.tokens.iter().map(|t| t.raw.as_str()).collect();
            prop_assert_eq!(joined, input);
        }

        #[test]
        fn prop_spans_are_contiguous(input in arb_query_input()) {
            let output = parse(&input, &media_schema());
            let mut offset = 0;
            for token in &output.tokens {
                prop_assert_eq!(token.span.start, offset);
                prop_assert_eq!(token.span.len(), token.raw.len());
                prop_assert_eq!(&input[token.span.start..token.span.end], token.raw.as_str());
                offset = token.span.end;
            }
            prop_assert_eq!(offset, input.len());
        }

        #[test]
        fn prop_error_position_in_bounds(input in arb_query_input()) {
            let output = parse(&input, &media_schema());
            if let Some(err) = output.error {
                prop_assert!(err.position <= input.len());
            }
        }

        #[test]
        fn prop_plain_input_splits_on_whitespace(input in arb_plain_input()) {
            let output = parse(&input, &media_schema());
            let expected: Vec<String> = input.split_whitespace().map(str::to_string).collect();
            prop_assert!(output.is_ok());
            prop_assert_eq!(output.result.free_text, expected);
            prop_assert!(output.result.options.is_empty());
        }

        #[test]
        fn prop_multiplicity_matches_schema(input in arb_query_input()) {
            let schema = media_schema();
            let output = parse(&input, &schema);
            for (name, stored) in &output.result.options {
                let spec = schema.get(name);
                prop_assert!(spec.is_some());
                let multiple = spec.map(|s| s.multiple).unwrap_or_default();
                prop_assert_eq!(multiple, matches!(stored, quarry_core::StoredValue::Multi(_)));
            }
        }
    }
}
