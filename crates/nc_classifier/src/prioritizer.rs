use std::cmp::Ordering;
use std::collections::BTreeMap;

use nc_core::{Article, ClassificationResult, Section};
use serde::{Deserialize, Serialize};

/// An article together with its classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedArticle {
    pub article: Article,
    pub result: ClassificationResult,
}

impl ClassifiedArticle {
    pub fn new(article: Article, result: ClassificationResult) -> Self {
        Self { article, result }
    }

    pub fn section(&self) -> Section {
        self.result.section
    }
}

/// Descending order on (ACAFI mention, partner new fund, confidence, publication time).
fn by_priority(a: &ClassifiedArticle, b: &ClassifiedArticle) -> Ordering {
    b.result
        .mentions_acafi
        .cmp(&a.result.mentions_acafi)
        .then_with(|| b.result.is_partner_new_fund.cmp(&a.result.is_partner_new_fund))
        .then_with(|| b.result.confidence.total_cmp(&a.result.confidence))
        .then_with(|| b.article.published_at.cmp(&a.article.published_at))
}

/// Orders articles for presentation. The sort is stable, so articles with equal
/// keys keep their input order.
pub fn prioritize(mut articles: Vec<ClassifiedArticle>) -> Vec<ClassifiedArticle> {
    articles.sort_by(by_priority);
    articles
}

/// Buckets articles by section, preserving input order inside each bucket.
pub fn group_by_section(articles: Vec<ClassifiedArticle>) -> BTreeMap<Section, Vec<ClassifiedArticle>> {
    let mut sections: BTreeMap<Section, Vec<ClassifiedArticle>> = BTreeMap::new();
    for item in articles {
        sections.entry(item.section()).or_default().push(item);
    }
    sections
}

/// Prioritizes each section independently and keeps its first `max_per_section`.
pub fn select_for_newsletter(
    articles: Vec<ClassifiedArticle>,
    max_per_section: usize,
) -> BTreeMap<Section, Vec<ClassifiedArticle>> {
    group_by_section(articles)
        .into_iter()
        .map(|(section, items)| {
            let mut items = prioritize(items);
            items.truncate(max_per_section);
            (section, items)
        })
        .collect()
}
