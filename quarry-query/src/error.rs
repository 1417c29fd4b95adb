//! Parse errors reported by the scanner

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What went wrong at a given input offset.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyntaxError {
    #[error("unexpected quotation mark")]
    UnexpectedQuote,

    #[error("unexpected escape character")]
    UnexpectedEscape,

    #[error("unexpected colon character")]
    UnexpectedColon,

    #[error("invalid escape sequence")]
    InvalidEscape,

    #[error("unknown option: {name}")]
    UnknownOption { name: String },

    #[error("illegally repeated option: {name}")]
    RepeatedOption { name: String },

    #[error("missing quotation mark")]
    MissingQuote,

    #[error("missing value for option: {name}")]
    MissingValue { name: String },

    #[error("invalid {expected} value for option {name}: {value}")]
    InvalidValue {
        name: String,
        expected: String,
        value: String,
    },
}

/// The first syntax error of a parse, with the byte offset it was found at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub position: usize,
    pub kind: SyntaxError,
}

impl ParseError {
    pub fn new(position: usize, kind: SyntaxError) -> Self {
        Self { position, kind }
    }

    /// Human-readable description without the position.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error at offset {}: {}", self.position, self.kind)
    }
}

impl std::error::Error for ParseError {}
