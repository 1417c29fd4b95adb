//! Autocomplete candidates and the pluggable suggestion source

use crate::SuggestionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A single autocomplete candidate, used both for option names and values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Candidate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => write!(f, "{} ({})", self.name, description),
            None => f.write_str(&self.name),
        }
    }
}

/// Caller-supplied lookup of value candidates for number and string options.
///
/// Implementations receive the decoded text typed so far and are responsible
/// for their own filtering; the resolver emits whatever comes back verbatim.
#[async_trait::async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn suggest(&self, prefix: &str) -> Result<Vec<Candidate>, SuggestionError>;
}

/// Shared handle stored on an option spec.
pub type SharedSuggestionSource = Arc<dyn SuggestionSource>;

/// Fixed candidate list filtered by prefix.
///
/// This is what a schema config file produces for `suggestions:` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSuggestions {
    candidates: Vec<Candidate>,
}

impl StaticSuggestions {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }
}

#[async_trait::async_trait]
impl SuggestionSource for StaticSuggestions {
    async fn suggest(&self, prefix: &str) -> Result<Vec<Candidate>, SuggestionError> {
        Ok(self
            .candidates
            .iter()
            .filter(|candidate| candidate.name.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// Adapter turning a synchronous closure into a [`SuggestionSource`].
pub struct FnSuggestions<F> {
    lookup: F,
}

impl<F> FnSuggestions<F>
where
    F: Fn(&str) -> Vec<Candidate> + Send + Sync,
{
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }
}

impl<F> fmt::Debug for FnSuggestions<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSuggestions").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl<F> SuggestionSource for FnSuggestions<F>
where
    F: Fn(&str) -> Vec<Candidate> + Send + Sync,
{
    async fn suggest(&self, prefix: &str) -> Result<Vec<Candidate>, SuggestionError> {
        Ok((self.lookup)(prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_display() {
        assert_eq!(Candidate::new("rust").to_string(), "rust");
        assert_eq!(
            Candidate::with_description("tag:", "Tag").to_string(),
            "tag: (Tag)"
        );
    }

    #[test]
    fn test_candidate_serde_skips_missing_description() {
        let json = serde_json::to_string(&Candidate::new("rust")).unwrap();
        assert_eq!(json, r#"{"name":"rust"}"#);

        let parsed: Candidate = serde_json::from_str(r#"{"name":"go"}"#).unwrap();
        assert_eq!(parsed, Candidate::new("go"));
    }

    #[tokio::test]
    async fn test_static_suggestions_filter_by_prefix() {
        let source = StaticSuggestions::new(vec![
            Candidate::new("rust"),
            Candidate::new("ruby"),
            Candidate::new("go"),
        ]);

        let found = source.suggest("ru").await.unwrap();
        assert_eq!(found, vec![Candidate::new("rust"), Candidate::new("ruby")]);

        let all = source.suggest("").await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_fn_suggestions_are_unfiltered() {
        let source = FnSuggestions::new(|prefix: &str| {
            vec![Candidate::new(format!("{}1", prefix)), Candidate::new("other")]
        });

        let found = source.suggest("x").await.unwrap();
        assert_eq!(found, vec![Candidate::new("x1"), Candidate::new("other")]);
    }
}
