//! Domain patterns that are part of the product, not of the keyword table.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref ACAFI_MENTION: Regex = Regex::new(
        r"(?i)\b(?:acafi|asociación\s+chilena\s+de\s+administradoras?\s+de\s+fondos\s+de\s+inversión)\b"
    ).unwrap();

    pub static ref NEW_FUND: Regex = Regex::new(
        r"(?i)\b(?:lanz(?:a|an|ar|ó|amiento)\s+(?:de\s+)?(?:un\s+)?nuevo\s+fondo|nuevo\s+fondo\s+de\s+inversión|cre(?:a|an|ar|ó|ación)\s+(?:de\s+)?(?:un\s+)?(?:nuevo\s+)?fondo|levant(?:a|an|ar|ó|amiento)\s+(?:de\s+)?capital)\b"
    ).unwrap();

    /// Sector tags, each checked independently of the section.
    pub static ref SECTOR_PATTERNS: Vec<(&'static str, Regex)> = vec![
        ("Fondos de Inversión", Regex::new(
            r"(?i)\b(?:fondos?\s+de\s+inversión|venture\s+capital|private\s+equity|deuda\s+privada|renta\s+fija|agf|administradoras?\s+general(?:es)?\s+de\s+fondos|gestoras?\s+de\s+fondos)\b"
        ).unwrap()),
        ("Inmobiliario", Regex::new(
            r"(?i)\b(?:industria\s+inmobiliaria|inmobiliari[oa]s?|multifamily|fondos?\s+inmobiliarios?)\b"
        ).unwrap()),
        ("AFP", Regex::new(
            r"(?i)\b(?:afps?|administradoras?\s+de\s+fondos\s+de\s+pensiones|reforma\s+de\s+pensiones)\b"
        ).unwrap()),
        ("Seguros", Regex::new(
            r"(?i)\b(?:compañías?\s+de\s+seguros|aseguradoras?)\b"
        ).unwrap()),
        ("Otros Instrumentos", Regex::new(
            r"(?i)\b(?:fondos\s+mutuos|bonos|bolsa\s+de\s+comercio|bolsa\s+electrónica|ipsa)\b"
        ).unwrap()),
        ("Innovación", Regex::new(
            r"(?i)\b(?:rondas?\s+de\s+inversi(?:ón|ones)|fintech|insurtech|startups?|corfo)\b"
        ).unwrap()),
        ("Energía/Minería", Regex::new(
            r"(?i)\b(?:energías?\s+(?:renovables?|favorables)|litio|hidrógeno\s+verde|royalty\s+minero|codelco)\b"
        ).unwrap()),
        ("Indicadores Macro", Regex::new(
            r"(?i)\b(?:ipc|índice\s+de\s+precios|desempleo|inflación)\b"
        ).unwrap()),
        ("Normativas", Regex::new(
            r"(?i)\b(?:reforma\s+tributaria|pacto\s+fiscal|cmf|comisión\s+para\s+el\s+mercado\s+financiero|permisología|permisos\s+sectoriales)\b"
        ).unwrap()),
    ];
}

pub fn mentions_acafi(text: &str) -> bool {
    ACAFI_MENTION.is_match(text)
}

pub fn announces_new_fund(text: &str) -> bool {
    NEW_FUND.is_match(text)
}

/// Labels of every sector pattern found in `text`.
pub fn sector_tags(text: &str) -> impl Iterator<Item = &'static str> + '_ {
    SECTOR_PATTERNS
        .iter()
        .filter(move |(_, pattern)| pattern.is_match(text))
        .map(|(label, _)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acafi_mention() {
        assert!(mentions_acafi("Según ACAFI, los activos crecieron"));
        assert!(mentions_acafi("la Asociación Chilena de Administradoras de Fondos de Inversión informó"));
        assert!(!mentions_acafi("acafitas no es una palabra"));
    }

    #[test]
    fn test_new_fund() {
        assert!(announces_new_fund("La gestora lanza nuevo fondo de deuda privada"));
        assert!(announces_new_fund("LarrainVial lanzó un nuevo fondo"));
        assert!(announces_new_fund("Compass levantó capital para su estrategia"));
        assert!(announces_new_fund("Anuncian la creación de fondo para startups"));
        assert!(!announces_new_fund("El fondo cerró el año con pérdidas"));
    }

    #[test]
    fn test_sector_tags() {
        let tags: Vec<_> = sector_tags("Las AFP y las aseguradoras miran el litio").collect();
        assert_eq!(tags, vec!["AFP", "Seguros", "Energía/Minería"]);

        let tags: Vec<_> = sector_tags("El IPC de marzo y la CMF").collect();
        assert_eq!(tags, vec!["Indicadores Macro", "Normativas"]);

        assert_eq!(sector_tags("nada relevante").count(), 0);
    }
}
