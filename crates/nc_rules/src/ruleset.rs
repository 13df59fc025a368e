use std::path::Path;

use nc_core::{ConfigError, Error, Result};
use tracing::{error, info, warn};

use crate::rule::{build_query, KeywordRule, MediaWhitelist};
use crate::table::RuleTable;

/// The compiled keyword configuration. Built once per run and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<KeywordRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    /// Compiles every usable row of the table.
    ///
    /// Missing required columns is the caller's problem and comes back as
    /// [`ConfigError::MissingColumns`]. Rows without a section or without include
    /// terms are skipped.
    pub fn compile(table: &RuleTable) -> Result<Self> {
        let columns = table.columns()?;
        let mut rules = Vec::new();

        for (line, row) in table.rows.iter().enumerate() {
            let section = RuleTable::cell(row, columns.section).trim();
            let include = RuleTable::cell(row, columns.include);
            if section.is_empty() || section.eq_ignore_ascii_case("nan") {
                continue;
            }

            let exclude = columns
                .exclude
                .map(|c| RuleTable::cell(row, c))
                .unwrap_or("");
            let media = match RuleTable::cell(row, columns.media).trim() {
                "" => "Todos",
                m => m,
            };

            match KeywordRule::from_cells(
                section,
                RuleTable::cell(row, columns.theme),
                include,
                exclude,
                media,
            ) {
                Ok(rule) => rules.push(rule),
                Err(e) => warn!("Skipping rule row {}: {}", line + 1, e),
            }
        }

        info!("🔑 Compiled {} keyword rules", rules.len());
        Ok(Self { rules })
    }

    /// Reads and compiles a CSV export of the keyword table.
    ///
    /// An unreadable or corrupt file degrades to [`RuleSet::defaults`] so that
    /// classification can still run; a readable table with missing columns is
    /// an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let table = match RuleTable::from_path(path) {
            Ok(table) => table,
            Err(e) => {
                error!("❌ Could not load keyword rules from {}: {}", path.display(), e);
                return Ok(Self::defaults());
            }
        };

        match Self::compile(&table) {
            Ok(set) => Ok(set),
            Err(Error::Config(e)) => Err(Error::Config(e)),
            Err(e) => {
                error!("❌ Could not compile keyword rules from {}: {}", path.display(), e);
                Ok(Self::defaults())
            }
        }
    }

    /// Minimal rule set used when the configured table cannot be read.
    pub fn defaults() -> Self {
        let specs: [(&str, &str, &[&str]); 2] = [
            (
                "ACAFI",
                "ACAFI",
                &["acafi", "asociación chilena de administradoras de fondos de inversión"],
            ),
            (
                "Temas Industria",
                "Fondos",
                &[
                    "fondo de inversión",
                    "fondos de inversión",
                    "venture capital",
                    "private equity",
                ],
            ),
        ];

        let rules = specs
            .iter()
            .filter_map(|(section, theme, terms)| {
                KeywordRule::new(
                    *section,
                    *theme,
                    terms.iter().map(|t| t.to_string()).collect(),
                    Vec::new(),
                    MediaWhitelist::All,
                )
                .map_err(|e| error!("Default rule {} failed to compile: {}", section, e))
                .ok()
            })
            .collect();

        warn!("⚠️ Using built-in default keyword rules");
        Self { rules }
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeywordRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// One search expression per rule. A search-driven collaborator cannot do
    /// anything without rules, so an empty set is an error here.
    pub fn search_queries(&self) -> Result<Vec<(&KeywordRule, String)>> {
        if self.rules.is_empty() {
            return Err(ConfigError::NoRules.into());
        }
        Ok(self.rules.iter().map(|r| (r, build_query(r))).collect())
    }
}
