use std::collections::BTreeSet;
use std::fmt;

use nc_core::text::normalize_media_name;
use nc_core::{Article, Error, Result};
use regex::{Regex, RegexBuilder};

const QUOTE_CHARS: &[char] = &['"', '\'', '“', '”'];

/// Splits a pipe-delimited cell into clean terms.
///
/// Surrounding quotes are stripped, tokens are trimmed, and empty or `nan`
/// tokens (spreadsheet artefacts) are dropped. Order is kept, repeats are not.
pub fn parse_terms(raw: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for part in raw.split('|') {
        let term = part.trim().trim_matches(QUOTE_CHARS).trim();
        if term.is_empty() || term.eq_ignore_ascii_case("nan") {
            continue;
        }
        if !terms.iter().any(|t| t == term) {
            terms.push(term.to_string());
        }
    }
    terms
}

/// Which outlets a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaWhitelist {
    All,
    /// Normalised outlet names
    Only(Vec<String>),
}

impl MediaWhitelist {
    /// An empty list, or one made only of "all"/"todos", means no filtering.
    pub fn from_terms(terms: &[String]) -> Self {
        let is_all = |t: &String| t.eq_ignore_ascii_case("all") || t.eq_ignore_ascii_case("todos");
        if terms.is_empty() || terms.iter().all(is_all) {
            return MediaWhitelist::All;
        }
        let names = terms
            .iter()
            .map(|t| normalize_media_name(t))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>();
        if names.is_empty() {
            MediaWhitelist::All
        } else {
            MediaWhitelist::Only(names)
        }
    }

    /// Fuzzy containment: either normalised name may contain the other.
    pub fn allows(&self, source: &str) -> bool {
        match self {
            MediaWhitelist::All => true,
            MediaWhitelist::Only(names) => {
                let source = normalize_media_name(source);
                names
                    .iter()
                    .any(|allowed| allowed.contains(&source) || source.contains(allowed.as_str()))
            }
        }
    }
}

/// One compiled row of the keyword table. Immutable after construction.
#[derive(Clone)]
pub struct KeywordRule {
    pub section: String,
    pub theme: String,
    pub include_terms: Vec<String>,
    pub exclude_terms: Vec<String>,
    pub media_whitelist: MediaWhitelist,
    include_pattern: Regex,
    exclude_pattern: Option<Regex>,
}

impl fmt::Debug for KeywordRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeywordRule")
            .field("section", &self.section)
            .field("theme", &self.theme)
            .field("include_terms", &self.include_terms)
            .field("exclude_terms", &self.exclude_terms)
            .field("media_whitelist", &self.media_whitelist)
            .finish()
    }
}

impl KeywordRule {
    pub fn new(
        section: impl Into<String>,
        theme: impl Into<String>,
        include_terms: Vec<String>,
        exclude_terms: Vec<String>,
        media_whitelist: MediaWhitelist,
    ) -> Result<Self> {
        let section = section.into();
        if include_terms.is_empty() {
            return Err(Error::Rules(format!("rule '{}' has no include terms", section)));
        }
        let include_pattern = alternation(&include_terms)?;
        let exclude_pattern = if exclude_terms.is_empty() {
            None
        } else {
            Some(alternation(&exclude_terms)?)
        };

        Ok(Self {
            section,
            theme: theme.into(),
            include_terms,
            exclude_terms,
            media_whitelist,
            include_pattern,
            exclude_pattern,
        })
    }

    /// Builds a rule straight from the raw table cells.
    pub fn from_cells(section: &str, theme: &str, include: &str, exclude: &str, media: &str) -> Result<Self> {
        Self::new(
            section.trim(),
            theme.trim(),
            parse_terms(include),
            parse_terms(exclude),
            MediaWhitelist::from_terms(&parse_terms(media)),
        )
    }

    pub fn matches(&self, text: &str) -> bool {
        self.include_pattern.is_match(text)
    }

    pub fn is_excluded(&self, text: &str) -> bool {
        self.exclude_pattern
            .as_ref()
            .map(|p| p.is_match(text))
            .unwrap_or(false)
    }

    /// The configured include terms that occur in `text`.
    pub fn matched_terms(&self, text: &str) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        for m in self.include_pattern.find_iter(text) {
            let hit = m.as_str().to_lowercase();
            if let Some(term) = self.include_terms.iter().find(|t| t.to_lowercase() == hit) {
                found.insert(term.clone());
            }
        }
        found
    }

    /// Exclusions and the outlet whitelist.
    pub fn passes_filters(&self, article: &Article) -> bool {
        if self.is_excluded(&article.full_text()) {
            tracing::debug!("⛔ '{}' excluded by rule {}/{}", article.title, self.section, self.theme);
            return false;
        }
        if !self.media_whitelist.allows(&article.source) {
            tracing::debug!("⛔ '{}' excluded by outlet '{}'", article.title, article.source);
            return false;
        }
        true
    }

    pub fn applies_to(&self, article: &Article, text: &str) -> bool {
        self.matches(text) && self.passes_filters(article)
    }
}

/// Case-insensitive, word-bounded alternation of escaped terms. Longer terms go
/// first so the most specific phrase wins at a given position.
fn alternation(terms: &[String]) -> Result<Regex> {
    let mut escaped: Vec<String> = terms.iter().map(|t| regex::escape(t)).collect();
    escaped.sort_by(|a, b| b.len().cmp(&a.len()));
    let pattern = format!(r"\b(?:{})\b", escaped.join("|"));
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::Rules(format!("invalid keyword pattern: {}", e)))
}

fn quote_term(term: &str) -> String {
    let term = term.trim();
    if term.contains(char::is_whitespace) && !(term.starts_with('"') && term.ends_with('"')) {
        format!("\"{}\"", term)
    } else {
        term.to_string()
    }
}

/// Search expression for portal-style search boxes:
/// `a OR "multi word" -excluded -"other phrase"`.
pub fn build_query(rule: &KeywordRule) -> String {
    let include = rule
        .include_terms
        .iter()
        .filter(|t| !t.trim().is_empty())
        .map(|t| quote_term(t))
        .collect::<Vec<_>>();
    let exclude = rule
        .exclude_terms
        .iter()
        .filter(|t| !t.trim().is_empty())
        .map(|t| format!("-{}", quote_term(t)))
        .collect::<Vec<_>>();

    let mut parts = Vec::new();
    if !include.is_empty() {
        parts.push(include.join(" OR "));
    }
    if !exclude.is_empty() {
        parts.push(exclude.join(" "));
    }
    parts.join(" ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rule(include: &str, exclude: &str, media: &str) -> KeywordRule {
        KeywordRule::from_cells("Temas Industria", "Fondos", include, exclude, media).unwrap()
    }

    #[test]
    fn test_parse_terms() {
        assert_eq!(
            parse_terms("\"venture capital\" | private equity|  | nan | 'AGF'"),
            vec!["venture capital", "private equity", "AGF"]
        );
        assert!(parse_terms("").is_empty());
        assert!(parse_terms("NaN").is_empty());
        assert_eq!(parse_terms("fondo|fondo"), vec!["fondo"]);
    }

    #[test]
    fn test_media_whitelist_all() {
        assert_eq!(MediaWhitelist::from_terms(&parse_terms("Todos")), MediaWhitelist::All);
        assert_eq!(MediaWhitelist::from_terms(&parse_terms("ALL")), MediaWhitelist::All);
        assert_eq!(MediaWhitelist::from_terms(&[]), MediaWhitelist::All);
        assert!(MediaWhitelist::All.allows("cualquier medio"));
    }

    #[test]
    fn test_media_whitelist_fuzzy_containment() {
        let whitelist = MediaWhitelist::from_terms(&parse_terms("Diario Financiero|El Mercurio"));
        assert!(whitelist.allows("diario-financiero"));
        assert!(whitelist.allows("El Mercurio Inversiones"));
        assert!(whitelist.allows("Mercurio"));
        assert!(!whitelist.allows("La Tercera"));
    }

    #[test]
    fn test_rule_matching_is_word_bounded_and_case_insensitive() {
        let r = rule("AGF|venture capital", "", "Todos");
        assert!(r.matches("Nueva agf en el mercado"));
        assert!(r.matches("El VENTURE CAPITAL crece"));
        assert!(!r.matches("AGFX anuncia resultados"));
    }

    #[test]
    fn test_matched_terms_reports_configured_spelling() {
        let r = rule("Venture Capital|private equity|AGF", "", "Todos");
        let found = r.matched_terms("El venture capital y el PRIVATE EQUITY");
        assert_eq!(
            found.into_iter().collect::<Vec<_>>(),
            vec!["Venture Capital".to_string(), "private equity".to_string()]
        );
    }

    #[test]
    fn test_passes_filters() {
        let r = rule("fondo", "fútbol|deportes", "Diario Financiero");
        let ok = Article::new("u1", "Diario Financiero", "Nuevo fondo", Utc::now());
        assert!(r.passes_filters(&ok));

        let excluded = Article::new("u2", "Diario Financiero", "Fondo para el fútbol", Utc::now());
        assert!(!r.passes_filters(&excluded));

        let wrong_outlet = Article::new("u3", "La Tercera", "Nuevo fondo", Utc::now());
        assert!(!r.passes_filters(&wrong_outlet));
    }

    #[test]
    fn test_rule_requires_include_terms() {
        assert!(KeywordRule::from_cells("ACAFI", "", "nan", "", "Todos").is_err());
    }

    #[test]
    fn test_build_query() {
        let r = rule("fondo de inversión|AGF", "fútbol|copa américa", "Todos");
        assert_eq!(build_query(&r), "\"fondo de inversión\" OR AGF -fútbol -\"copa américa\"");

        let r = rule("AGF", "", "Todos");
        assert_eq!(build_query(&r), "AGF");
    }
}
