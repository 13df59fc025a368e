use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Tunables for a clipping run. Every field has a default, so a settings file
/// only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub client_name: String,
    /// Title similarity above which two articles are duplicates
    pub duplicate_threshold: f64,
    /// Articles with a shorter body are dropped before deduplication
    pub min_article_length: usize,
    pub max_article_age_days: i64,
    pub max_articles_per_section: usize,
    pub editorial_max_sentences: usize,
    /// Upper bound on concurrent summarizer calls
    pub max_concurrency: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            client_name: "ACAFI".to_string(),
            duplicate_threshold: 0.85,
            min_article_length: 100,
            max_article_age_days: 2,
            max_articles_per_section: 10,
            editorial_max_sentences: 6,
            max_concurrency: 10,
        }
    }
}

impl Settings {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_keep_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"duplicate_threshold": 0.9}"#).unwrap();
        assert_eq!(settings.duplicate_threshold, 0.9);
        assert_eq!(settings.max_articles_per_section, 10);
        assert_eq!(settings.client_name, "ACAFI");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Settings::from_file("/nonexistent/settings.json").unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
