use std::sync::Arc;

use nc_core::{Error, Result, Summarizer};
use serde::{Deserialize, Serialize};

pub mod fact_checker;
pub mod models;
pub mod prompt;

pub use fact_checker::FactChecker;
pub use models::extractive::ExtractiveSummarizer;

/// Which text generator to build and how to tune it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model_name: Option<String>,
    pub summary_words: usize,
    pub editorial_max_sentences: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_name: None,
            summary_words: models::extractive::DEFAULT_SUMMARY_WORDS,
            editorial_max_sentences: 6,
        }
    }
}

/// Builds the summarizer named in `config`. Only the offline extractive model
/// ships with the workspace; LLM-backed generators plug in through [`Summarizer`].
pub fn create_summarizer(config: &Config) -> Result<Arc<dyn Summarizer>> {
    match config.model_name.as_deref().unwrap_or("extractive") {
        "extractive" => Ok(Arc::new(ExtractiveSummarizer::from_config(config))),
        other => Err(Error::Inference(format!("unknown summarizer model: {}", other))),
    }
}

pub mod prelude {
    pub use super::prompt::{enhance_prompt, verification_prompt};
    pub use super::{create_summarizer, Config, ExtractiveSummarizer, FactChecker};
    pub use nc_core::{Article, FactCheckResult, Result, Summarizer};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_summarizer() {
        let model = create_summarizer(&Config::default()).unwrap();
        assert_eq!(model.name(), "extractive");

        let config = Config {
            model_name: Some("gpt-9".into()),
            ..Config::default()
        };
        assert!(matches!(create_summarizer(&config), Err(Error::Inference(_))));
    }
}
