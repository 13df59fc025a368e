use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The five editorial sections of the newsletter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Section {
    Indicadores,
    Acafi,
    Industria,
    Interes,
    Socios,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Indicadores,
        Section::Acafi,
        Section::Industria,
        Section::Interes,
        Section::Socios,
    ];

    /// Heading used in the newsletter
    pub fn display_name(&self) -> &'static str {
        match self {
            Section::Indicadores => "Indicadores Económicos",
            Section::Acafi => "ACAFI",
            Section::Industria => "Temas Industria",
            Section::Interes => "Noticias de Interés",
            Section::Socios => "Noticias de Socios",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Section::Indicadores => "INDICADORES",
            Section::Acafi => "ACAFI",
            Section::Industria => "INDUSTRIA",
            Section::Interes => "INTERES",
            Section::Socios => "SOCIOS",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub url: String,
    #[serde(default)]
    pub canonical_url: Option<String>,
    pub source: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub section_detected: Option<Section>,
    #[serde(default)]
    pub sector_tags: BTreeSet<String>,
    #[serde(default)]
    pub mentions_acafi: bool,
    #[serde(default)]
    pub is_partner_new_fund: bool,
    #[serde(default)]
    pub relevance_score: f64,
    /// Identity of the canonical article when this one was collapsed as a duplicate
    #[serde(default)]
    pub duplicate_of: Option<Uuid>,
}

impl Article {
    pub fn new(
        url: impl Into<String>,
        source: impl Into<String>,
        title: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            url: url.into(),
            canonical_url: None,
            source: source.into(),
            title: title.into(),
            subtitle: None,
            content: None,
            published_at,
            summary: None,
            section_detected: None,
            sector_tags: BTreeSet::new(),
            mentions_acafi: false,
            is_partner_new_fund: false,
            relevance_score: 0.0,
            duplicate_of: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_canonical_url(mut self, canonical_url: impl Into<String>) -> Self {
        self.canonical_url = Some(canonical_url.into());
        self
    }

    /// Title, subtitle and content joined by spaces, missing parts as empty strings.
    pub fn full_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title,
            self.subtitle.as_deref().unwrap_or(""),
            self.content.as_deref().unwrap_or("")
        )
    }

    /// Content when present and non-blank, otherwise the title.
    pub fn body(&self) -> &str {
        match self.content.as_deref() {
            Some(content) if !content.trim().is_empty() => content,
            _ => &self.title,
        }
    }

    /// Writes a classification back onto the article.
    pub fn apply_classification(&mut self, result: &ClassificationResult) {
        self.section_detected = Some(result.section);
        self.sector_tags = result.sector_tags.clone();
        self.mentions_acafi = result.mentions_acafi;
        self.is_partner_new_fund = result.is_partner_new_fund;
        self.relevance_score = result.confidence;
    }

    pub fn is_duplicate(&self) -> bool {
        self.duplicate_of.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub section: Section,
    /// Always within `[0, 1]`
    pub confidence: f64,
    pub matched_keywords: BTreeSet<String>,
    pub sector_tags: BTreeSet<String>,
    pub mentions_acafi: bool,
    pub is_partner_new_fund: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCheckResult {
    pub is_valid: bool,
    pub confidence: f64,
    pub issues: Vec<String>,
    pub evidence: BTreeMap<String, String>,
    pub suggestions: Vec<String>,
}

impl FactCheckResult {
    /// Result for text that could not be checked at all.
    pub fn unverified(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            confidence: 0.0,
            issues: vec![reason.into()],
            evidence: BTreeMap::new(),
            suggestions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> Article {
        Article::new("https://www.df.cl/a", "Diario Financiero", "Título", Utc::now())
    }

    #[test]
    fn test_full_text_handles_missing_fields() {
        let a = article();
        assert_eq!(a.full_text(), "Título  ");

        let a = article().with_subtitle("Bajada").with_content("Cuerpo");
        assert_eq!(a.full_text(), "Título Bajada Cuerpo");
    }

    #[test]
    fn test_body_falls_back_to_title() {
        assert_eq!(article().body(), "Título");
        assert_eq!(article().with_content("   ").body(), "Título");
        assert_eq!(article().with_content("Cuerpo").body(), "Cuerpo");
    }

    #[test]
    fn test_apply_classification() {
        let mut a = article();
        let result = ClassificationResult {
            section: Section::Socios,
            confidence: 0.9,
            matched_keywords: BTreeSet::new(),
            sector_tags: ["Inmobiliario".to_string()].into_iter().collect(),
            mentions_acafi: false,
            is_partner_new_fund: true,
        };
        a.apply_classification(&result);
        assert_eq!(a.section_detected, Some(Section::Socios));
        assert!(a.is_partner_new_fund);
        assert!(a.sector_tags.contains("Inmobiliario"));
        assert_eq!(a.relevance_score, 0.9);
    }

    #[test]
    fn test_article_deserializes_with_defaults() {
        let json = r#"{
            "url": "https://www.latercera.com/x",
            "source": "La Tercera",
            "title": "Algo",
            "published_at": "2024-05-01T10:00:00Z"
        }"#;
        let a: Article = serde_json::from_str(json).unwrap();
        assert!(a.content.is_none());
        assert!(a.duplicate_of.is_none());
        assert!(a.sector_tags.is_empty());
    }

    #[test]
    fn test_section_serializes_as_code() {
        let json = serde_json::to_string(&Section::Indicadores).unwrap();
        assert_eq!(json, "\"INDICADORES\"");
        assert_eq!(Section::Interes.display_name(), "Noticias de Interés");
    }
}
