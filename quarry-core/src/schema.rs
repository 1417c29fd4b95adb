//! Option schema: the set of `name:value` options a search input recognizes

use crate::{SchemaError, SharedSuggestionSource, SuggestionSource};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// OPTION KINDS
// ============================================================================

/// Value type of an option, carrying the payload only that type uses.
#[derive(Clone)]
pub enum OptionKind {
    Number {
        suggestions: Option<SharedSuggestionSource>,
    },
    String {
        suggestions: Option<SharedSuggestionSource>,
    },
    Enum {
        choices: Vec<String>,
    },
    Boolean,
}

impl OptionKind {
    /// Config/display name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Number { .. } => "number",
            Self::String { .. } => "string",
            Self::Enum { .. } => "enum",
            Self::Boolean => "boolean",
        }
    }

    /// Suggestion source, if this kind supports one and it is configured.
    pub fn suggestion_source(&self) -> Option<&SharedSuggestionSource> {
        match self {
            Self::Number { suggestions } | Self::String { suggestions } => suggestions.as_ref(),
            Self::Enum { .. } | Self::Boolean => None,
        }
    }
}

impl fmt::Debug for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number { suggestions } => f
                .debug_struct("Number")
                .field("suggestions", &suggestions.is_some())
                .finish(),
            Self::String { suggestions } => f
                .debug_struct("String")
                .field("suggestions", &suggestions.is_some())
                .finish(),
            Self::Enum { choices } => f.debug_struct("Enum").field("choices", choices).finish(),
            Self::Boolean => f.write_str("Boolean"),
        }
    }
}

// Sources are compared by identity; two specs are equal only if they share one.
impl PartialEq for OptionKind {
    fn eq(&self, other: &Self) -> bool {
        fn same_source(a: &Option<SharedSuggestionSource>, b: &Option<SharedSuggestionSource>) -> bool {
            match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                _ => false,
            }
        }

        match (self, other) {
            (Self::Number { suggestions: a }, Self::Number { suggestions: b }) => same_source(a, b),
            (Self::String { suggestions: a }, Self::String { suggestions: b }) => same_source(a, b),
            (Self::Enum { choices: a }, Self::Enum { choices: b }) => a == b,
            (Self::Boolean, Self::Boolean) => true,
            _ => false,
        }
    }
}

// ============================================================================
// OPTION SPEC
// ============================================================================

/// Declarative description of one recognized option.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    /// Key typed before the colon. Unique within a schema.
    pub name: String,
    /// Human-readable title, matched by option-name suggestions and shown as their description.
    pub title: Option<String>,
    /// Whether the option may be given more than once.
    pub multiple: bool,
    /// Raw default value, applied only when a caller asks for defaults.
    pub default: Option<String>,
    pub kind: OptionKind,
}

impl OptionSpec {
    fn with_kind(name: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            name: name.into(),
            title: None,
            multiple: false,
            default: None,
            kind,
        }
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::with_kind(name, OptionKind::Number { suggestions: None })
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::with_kind(name, OptionKind::String { suggestions: None })
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::with_kind(name, OptionKind::Boolean)
    }

    pub fn enumeration<I, S>(name: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(
            name,
            OptionKind::Enum {
                choices: choices.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Attach a suggestion source. Ignored for enum and boolean options,
    /// whose candidates are static.
    pub fn with_suggestions(mut self, source: impl SuggestionSource + 'static) -> Self {
        self.set_source(Arc::new(source));
        self
    }

    fn set_source(&mut self, source: SharedSuggestionSource) -> bool {
        match &mut self.kind {
            OptionKind::Number { suggestions } | OptionKind::String { suggestions } => {
                *suggestions = Some(source);
                true
            }
            OptionKind::Enum { .. } | OptionKind::Boolean => false,
        }
    }

    /// Enum choices, empty for every other kind.
    pub fn choices(&self) -> &[String] {
        match &self.kind {
            OptionKind::Enum { choices } => choices,
            _ => &[],
        }
    }

    fn validate(&self) -> Result<(), SchemaError> {
        let invalid = |reason| SchemaError::InvalidName {
            name: self.name.clone(),
            reason,
        };

        if self.name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if self.name.chars().any(char::is_whitespace) {
            return Err(invalid("contains whitespace"));
        }
        if self.name.contains(&[':', '"', '\\'][..]) {
            return Err(invalid("contains a reserved character"));
        }
        if let OptionKind::Enum { choices } = &self.kind {
            if choices.is_empty() {
                return Err(SchemaError::EmptyChoices {
                    name: self.name.clone(),
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Ordered, validated collection of option specs.
///
/// Declaration order is preserved; it drives the order of option-name
/// suggestions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    options: Vec<Arc<OptionSpec>>,
}

impl Schema {
    /// Validate and build a schema. Names must be unique and typeable, and
    /// enum options need at least one choice.
    pub fn new(options: Vec<OptionSpec>) -> Result<Self, SchemaError> {
        let mut validated: Vec<Arc<OptionSpec>> = Vec::with_capacity(options.len());

        for spec in options {
            spec.validate()?;
            if validated.iter().any(|existing| existing.name == spec.name) {
                return Err(SchemaError::DuplicateName { name: spec.name });
            }
            validated.push(Arc::new(spec));
        }

        Ok(Self { options: validated })
    }

    /// Schema with no options: every colon-terminated word is an unknown option.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<OptionSpec>> {
        self.options.iter().find(|spec| spec.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<OptionSpec>> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Attach a suggestion source to an already-built schema entry.
    pub fn attach_source(
        &mut self,
        name: &str,
        source: SharedSuggestionSource,
    ) -> Result<(), SchemaError> {
        let slot = self
            .options
            .iter_mut()
            .find(|spec| spec.name == name)
            .ok_or_else(|| SchemaError::UnknownOption {
                name: name.to_string(),
            })?;

        if Arc::make_mut(slot).set_source(source) {
            Ok(())
        } else {
            Err(SchemaError::SourceNotSupported {
                name: name.to_string(),
            })
        }
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a Arc<OptionSpec>;
    type IntoIter = std::slice::Iter<'a, Arc<OptionSpec>>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.iter()
    }
}
