//! Error types for schema construction and suggestion lookup

use thiserror::Error;

/// Errors raised while assembling an option schema.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("duplicate option name: {name}")]
    DuplicateName { name: String },

    #[error("invalid option name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("enum option {name} declares no choices")]
    EmptyChoices { name: String },

    #[error("unknown option: {name}")]
    UnknownOption { name: String },

    #[error("option {name} does not accept a suggestion source")]
    SourceNotSupported { name: String },
}

/// Errors reported by a suggestion source.
///
/// The resolver never surfaces these to its caller; a failed lookup
/// degrades to an empty candidate list.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SuggestionError {
    #[error("suggestion source unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("suggestion lookup failed: {reason}")]
    Failed { reason: String },
}
