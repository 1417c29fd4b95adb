//! Schema config parser
//!
//! serde does the heavy lifting: documents deserialize into strict config
//! structs, which are then checked and converted into a validated [`Schema`].

use crate::coerce::coerce;
use quarry_core::{Candidate, OptionSpec, Schema, SchemaError, StaticSuggestions};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

/// Errors raised while loading a schema declaration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    YamlParse(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("unknown type {option_type:?} for option {name}")]
    UnknownType { name: String, option_type: String },

    #[error("default {default:?} is not a valid {expected} value for option {name}")]
    InvalidDefault {
        name: String,
        expected: &'static str,
        default: String,
    },

    #[error("option {name} declares choices but is not an enum")]
    ChoicesNotAllowed { name: String },

    #[error("option {name} declares suggestions but is not a number or string")]
    SuggestionsNotAllowed { name: String },

    #[error("unsupported schema file format: {path}")]
    UnsupportedFormat { path: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

// ============================================================================
// CONFIG STRUCTS
// ============================================================================

/// Top-level schema document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    #[serde(default)]
    pub options: Vec<OptionConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub option_type: String,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Enum members, in suggestion order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    /// Static value candidates for number and string options.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<SuggestionConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuggestionConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<SuggestionConfig> for Candidate {
    fn from(config: SuggestionConfig) -> Self {
        Candidate {
            name: config.name,
            description: config.description,
        }
    }
}

// ============================================================================
// PARSER FUNCTIONS
// ============================================================================

/// Parse a YAML schema document.
pub fn parse_schema_yaml(content: &str) -> Result<Schema, ConfigError> {
    let config: SchemaConfig =
        serde_yaml::from_str(content).map_err(|e| ConfigError::YamlParse(e.to_string()))?;
    build_schema(config)
}

/// Parse a TOML schema document (`[[options]]` tables).
pub fn parse_schema_toml(content: &str) -> Result<Schema, ConfigError> {
    let config: SchemaConfig =
        toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;
    build_schema(config)
}

/// Load a schema file, choosing the format from its extension.
pub fn load_schema(path: impl AsRef<Path>) -> Result<Schema, ConfigError> {
    let path = path.as_ref();
    let path_display = path.display().to_string();

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let parse: fn(&str) -> Result<Schema, ConfigError> = match extension.as_deref() {
        Some("yaml" | "yml") => parse_schema_yaml,
        Some("toml") => parse_schema_toml,
        _ => return Err(ConfigError::UnsupportedFormat { path: path_display }),
    };

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path_display.clone(),
        source,
    })?;
    let schema = parse(&content)?;

    tracing::debug!(path = %path_display, options = schema.len(), "Loaded schema");
    Ok(schema)
}

/// Convert a deserialized document into a validated schema.
pub fn build_schema(config: SchemaConfig) -> Result<Schema, ConfigError> {
    let options = config
        .options
        .into_iter()
        .map(build_option)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Schema::new(options)?)
}

fn build_option(config: OptionConfig) -> Result<OptionSpec, ConfigError> {
    let OptionConfig {
        name,
        title,
        option_type,
        multiple,
        default,
        choices,
        suggestions,
    } = config;

    let mut spec = match option_type.as_str() {
        "number" => OptionSpec::number(name.clone()),
        "string" => OptionSpec::string(name.clone()),
        "boolean" => OptionSpec::boolean(name.clone()),
        "enum" => OptionSpec::enumeration(name.clone(), choices.iter().cloned()),
        _ => return Err(ConfigError::UnknownType { name, option_type }),
    };

    if !choices.is_empty() && option_type != "enum" {
        return Err(ConfigError::ChoicesNotAllowed { name });
    }
    if !suggestions.is_empty() {
        if !matches!(option_type.as_str(), "number" | "string") {
            return Err(ConfigError::SuggestionsNotAllowed { name });
        }
        let candidates = suggestions.into_iter().map(Candidate::from).collect();
        spec = spec.with_suggestions(StaticSuggestions::new(candidates));
    }

    if let Some(title) = title {
        spec = spec.titled(title);
    }
    if multiple {
        spec = spec.multiple();
    }
    if let Some(default) = default {
        if coerce(&default, &spec).is_none() {
            return Err(ConfigError::InvalidDefault {
                name,
                expected: spec.kind.as_str(),
                default,
            });
        }
        spec = spec.with_default(default);
    }

    Ok(spec)
}

// ============================================================================
// TESTS
// ============================================================================
