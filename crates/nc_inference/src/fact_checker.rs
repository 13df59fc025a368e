use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use nc_core::text::similarity_ratio;
use nc_core::{Article, FactCheckResult};
use regex::Regex;
use tracing::debug;

const EDITORIAL_ISSUE_PENALTY: f64 = 0.15;
const SUMMARY_ISSUE_PENALTY: f64 = 0.2;
const MIN_SUMMARY_SIMILARITY: f64 = 0.30;
const UNRELATED_SUMMARY_CONFIDENCE: f64 = 0.25;
const LARGE_NUMBER: f64 = 100.0;

const STOPLIST: &[&str] = &[
    "El", "La", "Los", "Las", "Un", "Una", "En", "De", "Del", "Y", "Buenos", "Chile",
];

/// Names generated text may use without the sources spelling them out.
const KNOWN_ENTITIES: &[(&str, &str)] = &[
    ("ACAFI", "Asociación Chilena de Administradoras de Fondos de Inversión"),
    ("CMF", "Comisión para el Mercado Financiero"),
    ("AFP", "Administradoras de Fondos de Pensiones"),
    ("AGF", "Administradora General de Fondos"),
    ("Banco Central", "Banco Central de Chile"),
];

const EDITORIAL_SUGGESTIONS: &[&str] = &[
    "Revisar y corregir los hechos mencionados",
    "Basarse únicamente en el contenido de los artículos fuente",
    "Evitar afirmaciones absolutas sin evidencia",
];

const SUMMARY_SUGGESTION: &str = "Revisar que el resumen se base solo en el contenido del artículo";

lazy_static! {
    static ref SENTENCE_BREAK: Regex = Regex::new(r"[.!?]+").unwrap();
    static ref ENTITY: Regex = Regex::new(r"\b\p{Lu}\p{L}+(?:\s+\p{Lu}\p{L}+)*\b").unwrap();
    static ref NUMBER: Regex =
        Regex::new(r"\b\d+(?:[.,]\d+)*\s*(?:%|millones|millón|miles|mil)?").unwrap();
    static ref WORD: Regex = Regex::new(r"\w+").unwrap();
    static ref INVENTED_NEWS: Regex = Regex::new(
        r"\b(\p{Lu}\p{L}+(?:\s+\p{Lu}\p{L}+)*)\s+(anunció|lanzó|presentó|publicó|reportó)\b"
    )
    .unwrap();
    static ref SUSPICIOUS_PATTERNS: Vec<(&'static str, Regex)> = vec![
        (
            "anuncio con tiempo inmediato",
            Regex::new(r"(?i)\b(?:anunció|confirmó|declaró|reveló)\b.*\b(?:ayer|hoy|esta mañana|esta tarde)\b").unwrap(),
        ),
        (
            "cifra desproporcionada",
            Regex::new(r"(?i)\b\d{3,}\s*(?:millones|mil millones|billones)\b").unwrap(),
        ),
        (
            "afirmación absoluta",
            Regex::new(r"(?i)\b(?:todos|ninguno|siempre|nunca)\b|\b100%|\b0%").unwrap(),
        ),
    ];
    /// Relative time markers and how many days before "now" each points at.
    static ref TIME_MARKERS: Vec<(&'static str, Regex, i64)> = vec![
        ("ayer", Regex::new(r"(?i)\bayer\b").unwrap(), 1),
        ("hoy", Regex::new(r"(?i)\bhoy\b").unwrap(), 0),
        ("mañana", Regex::new(r"(?i)\bmañana\b").unwrap(), -1),
        ("esta semana", Regex::new(r"(?i)\besta semana\b").unwrap(), 7),
        ("este mes", Regex::new(r"(?i)\beste mes\b").unwrap(), 30),
    ];
}

/// Concatenated source text, in the raw form and with whitespace removed and
/// lower-cased for loose entity lookups.
struct SourceText {
    raw: String,
    compact: String,
}

impl SourceText {
    fn new(articles: &[Article]) -> Self {
        let raw = articles
            .iter()
            .map(Article::full_text)
            .collect::<Vec<_>>()
            .join(" ");
        let compact = compact(&raw);
        Self { raw, compact }
    }

    fn grounds_entity(&self, entity: &str) -> bool {
        self.raw.contains(entity) || self.compact.contains(&compact(entity))
    }

    fn grounds_number(&self, cleaned: &str) -> bool {
        number_variants(cleaned).iter().any(|v| self.raw.contains(v.as_str()))
    }
}

fn compact(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Checks generated text against the articles it claims to summarize.
///
/// Both checks are crude heuristics over capitalised words, numbers, relative
/// dates and word overlap. They never fail: anything that cannot be parsed
/// becomes an issue on the result. Callers decide what to do with an invalid
/// result.
#[derive(Debug, Clone, Default)]
pub struct FactChecker {
    reference_time: Option<DateTime<Utc>>,
}

impl FactChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins "now" for relative date checks.
    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }

    pub fn verify_editorial_summary(&self, editorial: &str, articles: &[Article]) -> FactCheckResult {
        let source = SourceText::new(articles);
        let sentences = split_sentences(editorial);
        let mut issues = Vec::new();

        for sentence in &sentences {
            check_entities(sentence, &source, &mut issues);
            self.check_dates(sentence, articles, &mut issues);
            check_numbers(sentence, &source, &mut issues);
            check_suspicious_patterns(sentence, &mut issues);
            check_invented_news(sentence, &source, &mut issues);
        }

        let coherence = coherence(editorial, articles);
        let confidence = (coherence - EDITORIAL_ISSUE_PENALTY * issues.len() as f64).clamp(0.0, 1.0);

        let mut evidence = BTreeMap::new();
        evidence.insert("coherence".to_string(), format!("{:.2}", coherence));
        evidence.insert("sentences".to_string(), sentences.len().to_string());
        evidence.insert("sources".to_string(), articles.len().to_string());

        let suggestions = if issues.is_empty() {
            Vec::new()
        } else {
            EDITORIAL_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
        };

        debug!(
            "🔎 Editorial check: {} sentences, {} issues, confidence {:.2}",
            sentences.len(),
            issues.len(),
            confidence
        );

        FactCheckResult {
            is_valid: issues.is_empty(),
            confidence,
            issues,
            evidence,
            suggestions,
        }
    }

    pub fn verify_article_summary(&self, summary: &str, article: &Article) -> FactCheckResult {
        let source = SourceText::new(std::slice::from_ref(article));
        let mut issues = Vec::new();

        let mut seen = HashSet::new();
        let entities: Vec<&str> = ENTITY
            .find_iter(summary)
            .map(|m| m.as_str())
            .filter(|e| !STOPLIST.contains(e) && !source.grounds_entity(e))
            .filter(|e| seen.insert(*e))
            .collect();
        if !entities.is_empty() {
            issues.push(format!(
                "Menciona entidades no presentes en el artículo: {}",
                entities.join(", ")
            ));
        }

        let mut seen = HashSet::new();
        let numbers: Vec<String> = NUMBER
            .find_iter(summary)
            .map(|m| clean_number(m.as_str()))
            .filter(|n| n.chars().count() > 1 && !source.grounds_number(n))
            .filter(|n| seen.insert(n.clone()))
            .collect();
        if !numbers.is_empty() {
            issues.push(format!(
                "Contiene números no mencionados en el artículo: {}",
                numbers.join(", ")
            ));
        }

        let similarity = similarity_ratio(summary, article.body());
        let mut confidence = (1.0 - SUMMARY_ISSUE_PENALTY * issues.len() as f64).max(0.0);

        let mut evidence = BTreeMap::new();
        evidence.insert("similarity".to_string(), format!("{:.0}%", similarity * 100.0));
        if similarity < MIN_SUMMARY_SIMILARITY {
            confidence = confidence.min(UNRELATED_SUMMARY_CONFIDENCE);
            evidence.insert(
                "warning".to_string(),
                "El resumen parece no estar relacionado con el artículo".to_string(),
            );
        }

        let suggestions = if issues.is_empty() {
            Vec::new()
        } else {
            vec![SUMMARY_SUGGESTION.to_string()]
        };

        debug!(
            "🔎 Summary check for '{}': {} issues, similarity {:.2}",
            article.title,
            issues.len(),
            similarity
        );

        FactCheckResult {
            is_valid: issues.is_empty(),
            confidence,
            issues,
            evidence,
            suggestions,
        }
    }

    fn check_dates(&self, sentence: &str, articles: &[Article], issues: &mut Vec<String>) {
        let now = self.now();
        for (marker, pattern, days_back) in TIME_MARKERS.iter() {
            if !pattern.is_match(sentence) {
                continue;
            }
            let expected = now - Duration::days(*days_back);
            let window = Duration::days(1);
            let covered = articles.iter().any(|a| {
                let gap = a.published_at - expected;
                gap <= window && gap >= -window
            });
            if !covered {
                issues.push(format!(
                    "Referencia temporal '{}' sin artículos correspondientes",
                    marker
                ));
            }
        }
    }
}

fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_BREAK
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn is_known_entity(entity: &str) -> bool {
    KNOWN_ENTITIES.iter().any(|(alias, _)| *alias == entity)
}

fn check_entities(sentence: &str, source: &SourceText, issues: &mut Vec<String>) {
    for entity in ENTITY.find_iter(sentence).map(|m| m.as_str()) {
        if STOPLIST.contains(&entity) || is_known_entity(entity) || source.grounds_entity(entity) {
            continue;
        }
        issues.push(format!("Entidad '{}' no encontrada en artículos fuente", entity));
    }
}

fn check_numbers(sentence: &str, source: &SourceText, issues: &mut Vec<String>) {
    for token in NUMBER.find_iter(sentence).map(|m| m.as_str().trim()) {
        let cleaned = clean_number(token);
        if cleaned.chars().count() <= 1 || source.grounds_number(&cleaned) {
            continue;
        }
        match parse_number(&cleaned) {
            Some(value) if value <= LARGE_NUMBER => {}
            Some(_) => issues.push(format!("Número '{}' no verificado en fuentes", token)),
            None => issues.push(format!("Número '{}' no se pudo interpretar", token)),
        }
    }
}

fn check_suspicious_patterns(sentence: &str, issues: &mut Vec<String>) {
    for (label, pattern) in SUSPICIOUS_PATTERNS.iter() {
        if pattern.is_match(sentence) {
            let excerpt: String = sentence.chars().take(50).collect();
            issues.push(format!("Patrón sospechoso ({}): '{}...'", label, excerpt));
        }
    }
}

fn check_invented_news(sentence: &str, source: &SourceText, issues: &mut Vec<String>) {
    for caps in INVENTED_NEWS.captures_iter(sentence) {
        let (Some(entity), Some(action)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if !source.raw.contains(entity.as_str()) {
            issues.push(format!(
                "Posible noticia inventada: '{} {}...'",
                entity.as_str(),
                action.as_str()
            ));
        }
    }
}

/// Share of editorial words that also occur in a source title, doubled and capped at 1.
fn coherence(editorial: &str, articles: &[Article]) -> f64 {
    let mut themes = HashSet::new();
    for article in articles {
        let title = article.title.to_lowercase();
        themes.extend(WORD.find_iter(&title).map(|m| m.as_str().to_string()));
    }

    let editorial = editorial.to_lowercase();
    let words: Vec<&str> = WORD.find_iter(&editorial).map(|m| m.as_str()).collect();
    if words.is_empty() {
        return 0.0;
    }
    let matching = words.iter().filter(|w| themes.contains(**w)).count();
    (matching as f64 / words.len() as f64 * 2.0).min(1.0)
}

fn clean_number(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect()
}

fn number_variants(cleaned: &str) -> [String; 5] {
    [
        cleaned.to_string(),
        cleaned.replace('.', ""),
        cleaned.replace(',', "."),
        cleaned.replace('.', ","),
        cleaned.replace(',', ""),
    ]
}

/// Reads a number written the Chilean way: `.` groups thousands and `,` marks
/// decimals. A lone `.` followed by anything but three digits is a decimal point.
fn parse_number(token: &str) -> Option<f64> {
    let is_group = |g: &str| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit());

    let commas = token.matches(',').count();
    if commas > 1 {
        let mut groups = token.split(',');
        let head = groups.next()?;
        return if !token.contains('.') && !head.is_empty() && groups.all(is_group) {
            token.replace(',', "").parse().ok()
        } else {
            None
        };
    }

    let (integer, fraction) = match token.split_once(',') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (token, None),
    };

    let groups: Vec<&str> = integer.split('.').collect();
    let integer = match groups.as_slice() {
        [single] => single.to_string(),
        [head, rest @ ..] if !head.is_empty() && head.len() <= 3 && rest.iter().copied().all(is_group) => {
            groups.concat()
        }
        [whole, decimals] if fraction.is_none() => format!("{}.{}", whole, decimals),
        _ => return None,
    };

    let text = match fraction {
        Some(_) if integer.contains('.') => return None,
        Some(fraction) => format!("{}.{}", integer, fraction),
        None => integer,
    };
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 12, 9, 0, 0).unwrap()
    }

    fn sources() -> Vec<Article> {
        vec![
            Article::new(
                "https://df.cl/test1",
                "Diario Financiero",
                "ACAFI presenta propuesta regulatoria a la CMF",
                now(),
            )
            .with_subtitle("Buscan mayor flexibilidad para inversiones")
            .with_content(
                "La Asociación Chilena de Administradoras de Fondos de Inversión (ACAFI) presentó una \
                 propuesta a la CMF para flexibilizar las inversiones alternativas. La medida \
                 beneficiaría a 45 AGF.",
            ),
            Article::new(
                "https://elmercurio.com/test2",
                "El Mercurio",
                "Banco Central mantiene tasa en 5,5%",
                now() - Duration::days(1),
            )
            .with_subtitle("Decisión unánime del consejo")
            .with_content(
                "El Banco Central de Chile mantuvo la tasa de política monetaria en 5,5%. El consejo \
                 votó de forma unánime citando presiones inflacionarias.",
            ),
        ]
    }

    fn checker() -> FactChecker {
        FactChecker::new().with_reference_time(now())
    }

    #[test]
    fn test_invented_summary_is_rejected() {
        let articles = sources();
        let result = checker().verify_article_summary(
            "ACAFI y el Ministerio de Hacienda firmaron un acuerdo por US$1000 millones para crear un fondo soberano.",
            &articles[0],
        );
        assert!(!result.is_valid);
        assert!(result.confidence < 1.0);
        assert_eq!(result.issues.len(), 2);
        assert!(result.issues[0].contains("Ministerio"));
        assert!(result.issues[0].contains("Hacienda"));
        assert!(result.issues[1].contains("1000"));
        assert_eq!(result.suggestions, vec![SUMMARY_SUGGESTION.to_string()]);
    }

    #[test]
    fn test_grounded_summary_is_valid() {
        let articles = sources();
        for summary in [
            "ACAFI presentó una propuesta a la CMF para flexibilizar las inversiones alternativas.",
            "La medida beneficiaría a 45 AGF.",
        ] {
            let result = checker().verify_article_summary(summary, &articles[0]);
            assert!(result.is_valid, "{}: {:?}", summary, result.issues);
            assert!(result.suggestions.is_empty());
            assert!(result.evidence.contains_key("similarity"));
        }
    }

    #[test]
    fn test_unrelated_summary_has_low_confidence() {
        let articles = sources();
        let result = checker().verify_article_summary("xyz qwk", &articles[0]);
        assert!(result.is_valid);
        assert!(result.confidence <= UNRELATED_SUMMARY_CONFIDENCE);
        assert!(result.evidence.contains_key("warning"));
    }

    #[test]
    fn test_hallucinated_editorial() {
        let editorial = "Buenos días, ACAFI anunció ayer un acuerdo histórico con el gobierno por US$500 millones.\n\
            Además, LarrainVial reportó ganancias récord de 200% en sus fondos de tecnología.\n\
            Las AFP alcanzaron rentabilidades del 15% en todos sus fondos durante el último mes.\n\
            Microsoft anunció la compra de una AGF chilena por US$2 billones.";
        let result = checker().verify_editorial_summary(editorial, &sources());

        assert!(!result.is_valid);
        assert!(result.confidence < 0.5);
        let has = |needle: &str| result.issues.iter().any(|i| i.contains(needle));
        assert!(has("Entidad 'LarrainVial'"));
        assert!(has("Entidad 'Microsoft'"));
        assert!(has("Posible noticia inventada: 'Microsoft anunció"));
        assert!(has("Posible noticia inventada: 'LarrainVial reportó"));
        assert!(has("Número '200%'"));
        assert!(has("anuncio con tiempo inmediato"));
        assert!(has("cifra desproporcionada"));
        assert!(has("afirmación absoluta"));
        assert_eq!(result.suggestions.len(), 3);
    }

    #[test]
    fn test_grounded_editorial() {
        let result = checker().verify_editorial_summary(
            "ACAFI presentó una propuesta a la CMF. El Banco Central mantuvo la tasa en 5,5% ayer.",
            &sources(),
        );
        assert!(result.is_valid, "{:?}", result.issues);
        assert!(result.confidence > 0.5);
        assert_eq!(result.evidence["sentences"], "2");
        assert_eq!(result.evidence["sources"], "2");
    }

    #[test]
    fn test_relative_date_without_sources() {
        let late = FactChecker::new().with_reference_time(now() + Duration::days(10));
        let result = late.verify_editorial_summary("la tasa se mantuvo ayer", &sources());
        assert_eq!(
            result.issues,
            vec!["Referencia temporal 'ayer' sin artículos correspondientes".to_string()]
        );
    }

    fn published(hours_from_now: i64) -> Vec<Article> {
        vec![Article::new(
            "https://df.cl/fecha",
            "Diario Financiero",
            "Fondo levanta capital",
            now() + Duration::hours(hours_from_now),
        )]
    }

    fn date_issues(sentence: &str, articles: &[Article]) -> Vec<String> {
        let mut issues = Vec::new();
        checker().check_dates(sentence, articles, &mut issues);
        issues
    }

    #[test]
    fn test_relative_date_window_is_one_day() {
        assert!(date_issues("el fondo cerró hoy", &published(-23)).is_empty());
        assert_eq!(date_issues("el fondo cerró hoy", &published(-25)).len(), 1);
        assert_eq!(date_issues("el fondo cerró hoy", &published(-47)).len(), 1);
        assert!(date_issues("el fondo cerró hoy", &published(-24)).is_empty());
    }

    #[test]
    fn test_relative_date_markers() {
        let cases = [
            ("cerró ayer", -24),
            ("cerrará mañana", 24),
            ("cerró esta semana", -24 * 7),
            ("cerró este mes", -24 * 30),
        ];
        for (sentence, offset) in cases {
            assert!(
                date_issues(sentence, &published(offset + 23)).is_empty(),
                "{} should be covered",
                sentence
            );
            assert_eq!(
                date_issues(sentence, &published(offset - 25)).len(),
                1,
                "{} should not be covered",
                sentence
            );
        }
    }

    #[test]
    fn test_small_numbers_are_tolerated() {
        let result = checker().verify_editorial_summary("la tasa subió 15% en el periodo", &sources());
        assert!(result.is_valid, "{:?}", result.issues);
    }

    #[test]
    fn test_malformed_number_is_an_issue() {
        let result = checker().verify_editorial_summary("el índice fue 1,2,3 puntos", &sources());
        assert!(!result.is_valid);
        assert!(result.issues[0].contains("no se pudo interpretar"));
    }

    #[test]
    fn test_known_entities_are_grounded() {
        let result = checker().verify_editorial_summary("la AFP y la AGF siguen", &[]);
        assert!(result.issues.is_empty());
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_empty_inputs_never_fail() {
        let result = checker().verify_editorial_summary("", &[]);
        assert!(result.is_valid);
        assert_eq!(result.confidence, 0.0);

        let blank = Article::new("", "", "", now());
        let result = checker().verify_article_summary("", &blank);
        assert!(result.is_valid);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_coherence() {
        let articles = sources();
        assert_eq!(coherence("", &articles), 0.0);
        assert_eq!(coherence("acafi propuesta", &articles), 1.0);
        assert!((coherence("acafi uno dos tres", &articles) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("1.000"), Some(1000.0));
        assert_eq!(parse_number("5,5"), Some(5.5));
        assert_eq!(parse_number("1.000,5"), Some(1000.5));
        assert_eq!(parse_number("3.5"), Some(3.5));
        assert_eq!(parse_number("1,000,000"), Some(1_000_000.0));
        assert_eq!(parse_number("200"), Some(200.0));
        assert_eq!(parse_number("1.2.3"), None);
        assert_eq!(parse_number("1,2,3"), None);
    }

    #[test]
    fn test_split_sentences() {
        assert_eq!(
            split_sentences("Uno. Dos!! ¿Tres?  ... "),
            vec!["Uno", "Dos", "¿Tres"]
        );
    }
}
