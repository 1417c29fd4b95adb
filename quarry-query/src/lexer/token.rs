//! Lexer token types

use quarry_core::OptionSpec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// TOKEN KINDS
// ============================================================================

/// Classification of a token, used for highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Space,
    Text,
    Number,
    Enum,
    OptionName,
    InvalidOptionName,
    EscapeSequence,
    InvalidEscapeSequence,
    MissingQuote,
    MissingOptionValue,
    Invalid,
}

impl TokenKind {
    /// Stable display class for renderers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Space => "space",
            Self::Text => "text",
            Self::Number => "number",
            Self::Enum => "enum",
            Self::OptionName => "option-name",
            Self::InvalidOptionName => "invalid-option-name",
            Self::EscapeSequence => "escape-sequence",
            Self::InvalidEscapeSequence => "invalid-escape-sequence",
            Self::MissingQuote => "missing-quote",
            Self::MissingOptionValue => "missing-option-value",
            Self::Invalid => "invalid",
        }
    }

    /// Kinds that mark a syntax or value error.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidOptionName
                | Self::InvalidEscapeSequence
                | Self::MissingQuote
                | Self::MissingOptionValue
                | Self::Invalid
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SPANS & HINTS
// ============================================================================

/// Byte range of a token in the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// What kind of completion applies when the caret rests on a token.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SuggestHint {
    #[default]
    None,
    /// Option-name completion.
    Options,
    /// Value completion for this option.
    Spec(Arc<OptionSpec>),
}

// ============================================================================
// TOKEN
// ============================================================================

/// A classified span of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact input text of the span, quotes and escapes included.
    pub raw: String,
    /// Decoded text of the word or value this token belongs to, as typed so far.
    pub text: String,
    pub span: Span,
    pub hint: SuggestHint,
}
