//! Typed option values and the structured search result

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A coerced option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum OptionValue {
    Number(f64),
    String(String),
    Enum(String),
    Boolean(bool),
}

impl OptionValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Text of a string or enum value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }
}

/// Displays the value the way it would be typed, unquoted.
impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) | Self::Enum(s) => f.write_str(s),
            Self::Boolean(true) => f.write_str("yes"),
            Self::Boolean(false) => f.write_str("no"),
        }
    }
}

/// Stored value of one option: a singleton or, for multi-valued options,
/// the accepted values in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoredValue {
    Single(OptionValue),
    Multi(Vec<OptionValue>),
}

impl StoredValue {
    pub fn values(&self) -> &[OptionValue] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Multi(values) => values,
        }
    }
}

/// Structured outcome of a parse: free-text terms plus option values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub free_text: Vec<String>,
    pub options: BTreeMap<String, StoredValue>,
}

impl SearchResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.free_text.is_empty() && self.options.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&StoredValue> {
        self.options.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Value of a singleton option.
    pub fn single(&self, name: &str) -> Option<&OptionValue> {
        match self.options.get(name)? {
            StoredValue::Single(value) => Some(value),
            StoredValue::Multi(_) => None,
        }
    }

    /// All values of an option; empty when unset.
    pub fn values(&self, name: &str) -> &[OptionValue] {
        self.options
            .get(name)
            .map(StoredValue::values)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_value_display_matches_query_syntax() {
        assert_eq!(OptionValue::Number(2.5).to_string(), "2.5");
        assert_eq!(OptionValue::Number(2000.0).to_string(), "2000");
        assert_eq!(OptionValue::Boolean(true).to_string(), "yes");
        assert_eq!(OptionValue::Boolean(false).to_string(), "no");
        assert_eq!(OptionValue::Enum("desc".to_string()).to_string(), "desc");
    }

    #[test]
    fn test_search_result_accessors() {
        let mut result = SearchResult::new();
        assert!(result.is_empty());

        result.free_text.push("rust".to_string());
        result.options.insert(
            "year".to_string(),
            StoredValue::Single(OptionValue::Number(2024.0)),
        );
        result.options.insert(
            "tag".to_string(),
            StoredValue::Multi(vec![
                OptionValue::String("a".to_string()),
                OptionValue::String("b".to_string()),
            ]),
        );

        assert!(!result.is_empty());
        assert_eq!(result.single("year").and_then(OptionValue::as_number), Some(2024.0));
        assert_eq!(result.single("tag"), None);
        assert_eq!(result.values("tag").len(), 2);
        assert_eq!(result.values("year").len(), 1);
        assert!(result.values("missing").is_empty());
        assert!(result.contains("tag"));
    }

    #[test]
    fn test_search_result_json_shape() {
        let mut result = SearchResult::new();
        result.options.insert(
            "archived".to_string(),
            StoredValue::Single(OptionValue::Boolean(true)),
        );

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "free_text": [],
                "options": {
                    "archived": { "single": { "type": "boolean", "value": true } }
                }
            })
        );

        let back: SearchResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }
}
