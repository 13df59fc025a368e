use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use nc_classifier::{prioritize, select_for_newsletter, ClassifiedArticle, Classifier};
use nc_core::{Article, ClassificationResult, Error, FactCheckResult, Result, Section, Settings, Summarizer};
use nc_dedup::{DuplicateDetector, DuplicateGroup, GroupingStrategy};
use nc_inference::FactChecker;
use nc_rules::RuleSet;
use serde::Serialize;
use tokio::sync::Semaphore;

use crate::logging::Logger;

pub const EDITORIAL_DISCLAIMER: &str =
    "⚠️ Nota: parte de este resumen no pudo verificarse contra los artículos fuente.";

/// One article as it goes out in the newsletter.
#[derive(Debug, Clone, Serialize)]
pub struct NewsletterItem {
    pub article: Article,
    pub classification: ClassificationResult,
    /// Fact check of `article.summary`, absent when no summary was produced
    pub summary_check: Option<FactCheckResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClippingReport {
    pub client_name: String,
    pub generated_at: DateTime<Utc>,
    pub received: usize,
    pub after_filters: usize,
    pub unique: usize,
    pub sections: BTreeMap<Section, Vec<NewsletterItem>>,
    pub editorial: String,
    pub editorial_check: FactCheckResult,
}

impl ClippingReport {
    pub fn items(&self) -> impl Iterator<Item = &NewsletterItem> {
        self.sections.values().flatten()
    }
}

/// Runs a batch of scraped articles through filtering, deduplication,
/// classification, selection, summarization and fact checking.
pub struct ClippingManager {
    rules: Arc<RuleSet>,
    classifier: Classifier,
    detector: DuplicateDetector,
    checker: FactChecker,
    summarizer: Arc<dyn Summarizer>,
    settings: Settings,
    semaphore: Arc<Semaphore>,
    reference_time: Option<DateTime<Utc>>,
    logger: Logger,
}

impl ClippingManager {
    pub fn new(rules: Arc<RuleSet>, summarizer: Arc<dyn Summarizer>, settings: Settings) -> Self {
        Self {
            classifier: Classifier::new(rules.clone()),
            detector: DuplicateDetector::new(settings.duplicate_threshold),
            checker: FactChecker::new(),
            semaphore: Arc::new(Semaphore::new(settings.max_concurrency.max(1))),
            rules,
            summarizer,
            settings,
            reference_time: None,
            logger: Logger::new().with_prefix("[clipping]"),
        }
    }

    pub fn with_grouping(mut self, strategy: GroupingStrategy) -> Self {
        self.detector = self.detector.with_strategy(strategy);
        self
    }

    /// Pins "now" for the age filter and the fact checker's relative dates.
    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self.checker = self.checker.with_reference_time(now);
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn fact_checker(&self) -> &FactChecker {
        &self.checker
    }

    fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }

    /// Drops articles with too little text or published too long ago.
    pub fn filter_articles(&self, articles: Vec<Article>) -> Vec<Article> {
        let oldest = self.now() - Duration::days(self.settings.max_article_age_days);
        let min_length = self.settings.min_article_length;
        let logger = self.logger.clone().with_prefix("[filter]");

        articles
            .into_iter()
            .filter(|a| {
                if a.body().chars().count() < min_length {
                    logger.debug(&format!("too short: '{}'", a.title));
                    return false;
                }
                if a.published_at < oldest {
                    logger.debug(&format!("too old: '{}' ({})", a.title, a.published_at));
                    return false;
                }
                true
            })
            .collect()
    }

    pub fn find_duplicates(&self, articles: Vec<Article>) -> Vec<DuplicateGroup> {
        self.detector.find_duplicates(articles)
    }

    /// Classifies every article and writes the outcome back onto it.
    pub fn classify(&self, articles: Vec<Article>) -> Vec<ClassifiedArticle> {
        articles
            .into_iter()
            .map(|mut article| {
                let result = self.classifier.classify(&article);
                article.apply_classification(&result);
                ClassifiedArticle::new(article, result)
            })
            .collect()
    }

    /// Summarizes and fact-checks one article. A failing summarizer leaves the
    /// article without summary and records why.
    async fn summarize_item(&self, item: ClassifiedArticle) -> Result<NewsletterItem> {
        let ClassifiedArticle { mut article, result } = item;
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| Error::External(e.into()))?;

        let summary_check = match self.summarizer.summarize_article(&article).await {
            Ok(summary) => {
                let check = self.checker.verify_article_summary(&summary, &article);
                if !check.is_valid {
                    self.logger.warn(&format!(
                        "summary of '{}' has {} unverified claims",
                        article.title,
                        check.issues.len()
                    ));
                }
                article.summary = Some(summary);
                Some(check)
            }
            Err(e) => {
                self.logger.error(&format!("summarizer failed on '{}': {}", article.title, e));
                Some(FactCheckResult::unverified(format!("No se pudo generar el resumen: {}", e)))
            }
        };

        Ok(NewsletterItem {
            article,
            classification: result,
            summary_check,
        })
    }

    async fn summarize_sections(
        &self,
        sections: BTreeMap<Section, Vec<ClassifiedArticle>>,
    ) -> Result<BTreeMap<Section, Vec<NewsletterItem>>> {
        let mut out = BTreeMap::new();
        for (section, items) in sections {
            let futures: Vec<_> = items.into_iter().map(|item| self.summarize_item(item)).collect();
            let items = join_all(futures).await.into_iter().collect::<Result<Vec<_>>>()?;
            out.insert(section, items);
        }
        Ok(out)
    }

    /// Writes and checks the editorial. A failing summarizer yields an empty,
    /// unverified editorial instead of aborting the run.
    async fn write_editorial(&self, sections: &BTreeMap<Section, Vec<NewsletterItem>>) -> (String, FactCheckResult) {
        let candidates: Vec<ClassifiedArticle> = sections
            .values()
            .flatten()
            .map(|item| ClassifiedArticle::new(item.article.clone(), item.classification.clone()))
            .collect();
        let sources: Vec<Article> = prioritize(candidates)
            .into_iter()
            .take(self.settings.editorial_max_sentences)
            .map(|c| c.article)
            .collect();

        match self.summarizer.write_editorial(&sources).await {
            Ok(editorial) => {
                let check = self.checker.verify_editorial_summary(&editorial, &sources);
                (editorial, check)
            }
            Err(e) => {
                self.logger.error(&format!("summarizer failed on the editorial: {}", e));
                (
                    String::new(),
                    FactCheckResult::unverified(format!("No se pudo generar la editorial: {}", e)),
                )
            }
        }
    }

    pub async fn run(&self, articles: Vec<Article>) -> Result<ClippingReport> {
        let received = articles.len();
        self.logger.info(&format!("📥 {} articles received for {}", received, self.settings.client_name));

        let articles = self.filter_articles(articles);
        let after_filters = articles.len();
        self.logger
            .clone()
            .with_prefix("[filter]")
            .info(&format!("{} articles kept", after_filters));

        let unique: Vec<Article> = self
            .find_duplicates(articles)
            .into_iter()
            .map(DuplicateGroup::into_canonical)
            .collect();
        let unique_count = unique.len();
        self.logger
            .clone()
            .with_prefix("[dedup]")
            .info(&format!("{} unique articles", unique_count));

        let classified = self.classify(unique);
        let selected = select_for_newsletter(classified, self.settings.max_articles_per_section);
        for (section, items) in &selected {
            self.logger
                .clone()
                .with_prefix("[classify]")
                .info(&format!("{}: {} articles", section.display_name(), items.len()));
        }

        let sections = self.summarize_sections(selected).await?;
        let (mut editorial, editorial_check) = self.write_editorial(&sections).await;

        let unverified_summaries = sections
            .values()
            .flatten()
            .filter(|item| item.summary_check.as_ref().is_some_and(|c| !c.is_valid))
            .count();
        if !editorial_check.is_valid || unverified_summaries > 0 {
            self.logger.warn(&format!(
                "editorial valid: {}, unverified summaries: {}",
                editorial_check.is_valid, unverified_summaries
            ));
            if !editorial.is_empty() {
                editorial.push_str("\n\n");
            }
            editorial.push_str(EDITORIAL_DISCLAIMER);
        }

        self.logger.info(&format!("✅ Newsletter ready with {} sections", sections.len()));

        Ok(ClippingReport {
            client_name: self.settings.client_name.clone(),
            generated_at: self.now(),
            received,
            after_filters,
            unique: unique_count,
            sections,
            editorial,
            editorial_check,
        })
    }
}
