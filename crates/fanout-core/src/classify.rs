//! Capability classification
//!
//! Maps a todo's free-text description to capability tags and a best-fit
//! role. Classification is total: there is always a default tag, so the
//! planner never sees a classification failure.

use std::collections::HashSet;

use crate::config::HeuristicsConfig;

/// Classifier from task text to capability and role tags
///
/// Implementations must be pure and total. The planner calls these on every
/// todo in a cycle, so they should also be cheap.
pub trait CapabilityClassifier: Send + Sync {
    /// Single best capability tag for a description
    fn classify(&self, text: &str) -> String;

    /// Every capability tag matching a description (may be empty)
    fn classify_all(&self, text: &str) -> Vec<String>;

    /// Best-fit role tag for a description
    fn best_role(&self, text: &str) -> String;
}

/// Default keyword-table classifier driven by [`HeuristicsConfig`]
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    config: HeuristicsConfig,
}

impl KeywordClassifier {
    pub fn new(config: HeuristicsConfig) -> Self {
        Self { config }
    }
}

impl CapabilityClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> String {
        let words = text_words(text);
        self.config
            .capabilities
            .iter()
            .find(|rule| rule.keywords.iter().any(|kw| words.contains(kw.as_str())))
            .map(|rule| rule.capability.clone())
            .unwrap_or_else(|| self.config.default_capability.clone())
    }

    fn classify_all(&self, text: &str) -> Vec<String> {
        let words = text_words(text);
        self.config
            .capabilities
            .iter()
            .filter(|rule| rule.keywords.iter().any(|kw| words.contains(kw.as_str())))
            .map(|rule| rule.capability.clone())
            .collect()
    }

    fn best_role(&self, text: &str) -> String {
        let words = text_words(text);
        self.config
            .capabilities
            .iter()
            .find(|rule| rule.keywords.iter().any(|kw| words.contains(kw.as_str())))
            .map(|rule| rule.role.clone())
            .unwrap_or_else(|| self.config.default_role.clone())
    }
}

/// Lowercased word set of a description. Keyword matching is word-based so
/// that "test" does not hit "latest".
pub(crate) fn text_words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}
