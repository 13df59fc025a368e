use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use nc_core::{Article, ClassificationResult, Section};
use nc_rules::{KeywordRule, RuleSet};
use tracing::debug;

use crate::patterns;

const ACAFI_MENTION_CONFIDENCE: f64 = 0.95;
const PARTNER_NEW_FUND_CONFIDENCE: f64 = 0.90;
const DEFAULT_CONFIDENCE: f64 = 0.50;

/// Section families a keyword table row can belong to, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum RuleFamily {
    Indicadores,
    Acafi,
    Industria,
    Interes,
}

impl RuleFamily {
    fn of(rule: &KeywordRule) -> Option<Self> {
        let lower = rule.section.to_lowercase();
        if lower.contains("indicadores") {
            Some(RuleFamily::Indicadores)
        } else if rule.section.to_uppercase().contains("ACAFI") {
            Some(RuleFamily::Acafi)
        } else if lower.contains("industria") {
            Some(RuleFamily::Industria)
        } else if lower.contains("interés") || lower.contains("interes") {
            Some(RuleFamily::Interes)
        } else {
            None
        }
    }

    fn section(&self) -> Section {
        match self {
            RuleFamily::Indicadores => Section::Indicadores,
            RuleFamily::Acafi => Section::Acafi,
            RuleFamily::Industria => Section::Industria,
            RuleFamily::Interes => Section::Interes,
        }
    }

    fn confidence(&self) -> f64 {
        match self {
            RuleFamily::Indicadores => 0.90,
            RuleFamily::Acafi => 0.90,
            RuleFamily::Industria => 0.85,
            RuleFamily::Interes => 0.80,
        }
    }
}

/// Routes articles to a newsletter section.
///
/// Pure: the same article and rule set always produce the same result, and the
/// article is never modified. Callers write the result back with
/// [`Article::apply_classification`].
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Arc<RuleSet>,
}

impl Classifier {
    pub fn new(rules: Arc<RuleSet>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn classify(&self, article: &Article) -> ClassificationResult {
        let text = article.full_text();

        let mentions_acafi = patterns::mentions_acafi(&text);
        let is_partner_new_fund = patterns::announces_new_fund(&text);

        let mut matched_keywords = BTreeSet::new();
        let mut sector_tags = BTreeSet::new();
        let mut families: BTreeMap<RuleFamily, f64> = BTreeMap::new();

        for rule in self.rules.iter() {
            if !rule.applies_to(article, &text) {
                continue;
            }
            matched_keywords.extend(rule.matched_terms(&text));

            let Some(family) = RuleFamily::of(rule) else {
                continue;
            };
            let best = families.entry(family).or_insert(0.0);
            *best = best.max(family.confidence());

            if family == RuleFamily::Industria && !rule.theme.is_empty() {
                sector_tags.insert(rule.theme.clone());
            }
        }

        // Fixed tiers: an ACAFI mention beats any rule, then families in declaration order.
        let (mut section, mut confidence) = if mentions_acafi {
            matched_keywords.insert("ACAFI".to_string());
            (Section::Acafi, ACAFI_MENTION_CONFIDENCE)
        } else if let Some((family, confidence)) = families.iter().next() {
            (family.section(), *confidence)
        } else {
            (Section::Interes, DEFAULT_CONFIDENCE)
        };

        if is_partner_new_fund && !mentions_acafi {
            section = Section::Socios;
            confidence = PARTNER_NEW_FUND_CONFIDENCE;
        }

        sector_tags.extend(patterns::sector_tags(&text).map(str::to_string));

        debug!(
            "🏷️ '{}' -> {} ({:.2}), {} keywords, {} tags",
            article.title,
            section,
            confidence,
            matched_keywords.len(),
            sector_tags.len()
        );

        ClassificationResult {
            section,
            confidence: confidence.clamp(0.0, 1.0),
            matched_keywords,
            sector_tags,
            mentions_acafi,
            is_partner_new_fund,
        }
    }

    pub fn classify_all(&self, articles: &[Article]) -> Vec<ClassificationResult> {
        articles.iter().map(|a| self.classify(a)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use nc_rules::{MediaWhitelist, RuleTable};

    fn classifier() -> Classifier {
        let headers = ["SECCION", "TEMA", "Palabras", "TÉRMINOS EXCLUIDOS", "MEDIOS CLAVES"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = vec![
            vec!["Noticias de Interés", "Economía", "crecimiento económico|PIB", "", "Todos"],
            vec!["Temas Industria", "Inmobiliario", "multifamily|renta residencial", "", "Todos"],
            vec!["Indicadores Económicos", "Inflación", "IPC|inflación", "", "Todos"],
            vec!["ACAFI", "Gremio", "gremio de fondos", "", "Todos"],
            vec!["Temas Industria", "Seguros", "aseguradora", "fútbol", "Diario Financiero"],
        ]
        .into_iter()
        .map(|r| r.into_iter().map(String::from).collect())
        .collect();
        let rules = RuleSet::compile(&RuleTable::new(headers, rows)).unwrap();
        Classifier::new(Arc::new(rules))
    }

    fn article(title: &str, content: &str) -> Article {
        Article::new("https://www.df.cl/nota", "Diario Financiero", title, Utc::now()).with_content(content)
    }

    #[test]
    fn test_acafi_mention_wins() {
        let result = classifier().classify(&article(
            "ACAFI presenta estudio",
            "El IPC y el multifamily según el gremio",
        ));
        assert_eq!(result.section, Section::Acafi);
        assert_eq!(result.confidence, 0.95);
        assert!(result.mentions_acafi);
        assert!(result.matched_keywords.contains("ACAFI"));
    }

    #[test]
    fn test_acafi_mention_blocks_partner_override() {
        let result = classifier().classify(&article(
            "Socio de ACAFI lanza nuevo fondo",
            "",
        ));
        assert_eq!(result.section, Section::Acafi);
        assert!(result.is_partner_new_fund);
        assert_eq!(result.confidence, 0.95);
    }

    #[test]
    fn test_indicadores_beats_later_families() {
        // Industria and Interés rules also match but Indicadores sits in a higher tier.
        let result = classifier().classify(&article(
            "El IPC de marzo sorprende",
            "El crecimiento económico y el multifamily",
        ));
        assert_eq!(result.section, Section::Indicadores);
        assert_eq!(result.confidence, 0.90);
        assert!(result.matched_keywords.contains("IPC"));
        assert!(result.matched_keywords.contains("multifamily"));
        assert!(result.matched_keywords.contains("crecimiento económico"));
        assert!(result.sector_tags.contains("Inmobiliario"));
        assert!(result.sector_tags.contains("Indicadores Macro"));
    }

    #[test]
    fn test_acafi_named_rule() {
        let result = classifier().classify(&article("Reunión del gremio de fondos", ""));
        assert_eq!(result.section, Section::Acafi);
        assert_eq!(result.confidence, 0.90);
        assert!(!result.mentions_acafi);
    }

    #[test]
    fn test_industria_accumulates_theme() {
        let result = classifier().classify(&article("Boom del multifamily en Santiago", ""));
        assert_eq!(result.section, Section::Industria);
        assert_eq!(result.confidence, 0.85);
        assert!(result.sector_tags.contains("Inmobiliario"));
    }

    #[test]
    fn test_interes_rule() {
        let result = classifier().classify(&article("El PIB crece", ""));
        assert_eq!(result.section, Section::Interes);
        assert_eq!(result.confidence, 0.80);
    }

    #[test]
    fn test_default_section() {
        let result = classifier().classify(&article("Nada que ver", "Un texto cualquiera"));
        assert_eq!(result.section, Section::Interes);
        assert_eq!(result.confidence, 0.50);
        assert!(result.matched_keywords.is_empty());
        assert!(result.sector_tags.is_empty());
    }

    #[test]
    fn test_empty_article_falls_to_default() {
        let a = Article::new("", "", "", Utc::now());
        let result = classifier().classify(&a);
        assert_eq!(result.section, Section::Interes);
        assert_eq!(result.confidence, 0.50);
    }

    #[test]
    fn test_partner_new_fund_override() {
        let result = classifier().classify(&article(
            "Gestora lanza nuevo fondo de inversión",
            "El IPC no afecta el multifamily",
        ));
        assert_eq!(result.section, Section::Socios);
        assert_eq!(result.confidence, 0.90);
        assert!(result.is_partner_new_fund);
        assert!(!result.mentions_acafi);
    }

    #[test]
    fn test_rule_filters_apply() {
        let c = classifier();
        let matched = c.classify(&article("La aseguradora crece", ""));
        assert_eq!(matched.section, Section::Industria);
        assert!(matched.sector_tags.contains("Seguros"));

        let excluded = c.classify(&article("La aseguradora auspicia el fútbol", ""));
        assert_eq!(excluded.section, Section::Interes);
        assert_eq!(excluded.confidence, 0.50);
        // The fixed sector pattern still tags it.
        assert!(excluded.sector_tags.contains("Seguros"));

        let other_outlet = Article::new("u", "La Tercera", "La aseguradora crece", Utc::now());
        assert_eq!(c.classify(&other_outlet).section, Section::Interes);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let c = classifier();
        let a = article("El IPC y la CMF", "Las AFP y los fondos mutuos");
        assert_eq!(c.classify(&a), c.classify(&a));
    }

    #[test]
    fn test_default_rules_classify() {
        let c = Classifier::new(Arc::new(RuleSet::defaults()));
        let result = c.classify(&article("Crece el private equity", ""));
        assert_eq!(result.section, Section::Industria);
        assert!(result.sector_tags.contains("Fondos"));
        assert!(result.sector_tags.contains("Fondos de Inversión"));
        assert_eq!(c.rules().rules()[0].media_whitelist, MediaWhitelist::All);
    }

    #[test]
    fn test_invariants_hold() {
        let c = classifier();
        for (title, content) in [
            ("", ""),
            ("ACAFI", "lanza nuevo fondo"),
            ("IPC", "inflación y desempleo"),
            ("Startup fintech levanta capital", "Corfo apoya"),
        ] {
            let result = c.classify(&article(title, content));
            assert!(Section::ALL.contains(&result.section));
            assert!((0.0..=1.0).contains(&result.confidence));
        }
    }
}
