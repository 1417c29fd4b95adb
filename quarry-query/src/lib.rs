//! QUARRY Query - Search Query Scanner, Parser & Suggestion Resolver
//!
//! This crate turns free-form search input such as
//! `rust "async io" tag:net sort:newest` into a structured result: free-text
//! terms plus typed option values, validated against a [`Schema`]. The same
//! pass classifies every character into tokens for highlighting and records
//! what kind of completion applies at each position.
//!
//! Architecture:
//! ```text
//! Schema (builder API or YAML/TOML config)
//!     ↓
//! Scanner (character FSM: quoting, escapes, name:value)
//!     ↓
//! Coercion + Assembly (typed values, multiplicity)
//!     ↓
//! ParseOutput (tokens + SearchResult + first ParseError)
//!     ↓
//! Suggestion Resolver (token under caret → candidates)
//!     ↓
//! Pretty Printer (for round-trip testing)
//! ```
//!
//! [`Schema`]: quarry_core::Schema

pub mod assemble;
pub mod coerce;
pub mod config;
pub mod error;
pub mod lexer;
pub mod pretty_printer;
pub mod session;
pub mod suggest;

// Re-export key types for convenience
pub use error::*;
pub use lexer::{parse, ParseOutput, Scanner, Span, SuggestHint, Token, TokenKind};
pub use pretty_printer::pretty_print;
pub use session::{QueryListener, SearchSession, SuggestionRequest, Suggestions};
pub use suggest::{option_names, suggest, suggest_at, token_at, Selection};
