use async_trait::async_trait;
use crate::types::Article;
use crate::Result;

/// The external text generator. Whatever it writes is fed into the fact checker,
/// never trusted directly.
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    /// Summarize a single article
    async fn summarize_article(&self, article: &Article) -> Result<String>;

    /// Write the editorial paragraph for a set of articles
    async fn write_editorial(&self, articles: &[Article]) -> Result<String>;
}
