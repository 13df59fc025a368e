use std::fmt;

use async_trait::async_trait;
use nc_core::{Article, Result, Summarizer};

use crate::Config;

pub const DEFAULT_SUMMARY_WORDS: usize = 20;

/// Deterministic summarizer that only ever copies source text, so everything it
/// writes is grounded by construction. Used offline and in tests.
pub struct ExtractiveSummarizer {
    summary_words: usize,
    editorial_sentences: usize,
}

impl fmt::Debug for ExtractiveSummarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractiveSummarizer")
            .field("summary_words", &self.summary_words)
            .field("editorial_sentences", &self.editorial_sentences)
            .finish()
    }
}

impl Default for ExtractiveSummarizer {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ExtractiveSummarizer {
    pub fn from_config(config: &Config) -> Self {
        Self {
            summary_words: config.summary_words.max(1),
            editorial_sentences: config.editorial_max_sentences.max(1),
        }
    }
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    fn name(&self) -> &str {
        "extractive"
    }

    async fn summarize_article(&self, article: &Article) -> Result<String> {
        let words: Vec<&str> = article.body().split_whitespace().take(self.summary_words).collect();
        Ok(words.join(" "))
    }

    async fn write_editorial(&self, articles: &[Article]) -> Result<String> {
        let sentences: Vec<String> = articles
            .iter()
            .map(|a| a.title.trim().trim_end_matches(['.', '!', '?']).trim())
            .filter(|t| !t.is_empty())
            .take(self.editorial_sentences)
            .map(|t| format!("{}.", t))
            .collect();
        Ok(sentences.join(" "))
    }
}
