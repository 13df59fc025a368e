use std::io::Read;
use std::path::Path;

use nc_core::{ConfigError, Error, Result};

/// Raw keyword table as read from the spreadsheet export: one header row and
/// ordered string rows.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Positions of the columns a rule needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ColumnMap {
    pub section: usize,
    pub theme: usize,
    pub include: usize,
    pub exclude: Option<usize>,
    pub media: usize,
}

impl RuleTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| Error::Rules(format!("unreadable header row: {}", e)))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| Error::Rules(format!("corrupt rule row: {}", e)))?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Cell at `column`, empty when the row is short.
    pub(crate) fn cell<'a>(row: &'a [String], column: usize) -> &'a str {
        row.get(column).map(|s| s.as_str()).unwrap_or("")
    }

    pub(crate) fn columns(&self) -> std::result::Result<ColumnMap, ConfigError> {
        let section = self.find(|h| h == "seccion" || h == "sección" || h == "section");
        let theme = self.find(|h| h == "tema" || h == "theme");
        let include = self.find(|h| h.contains("palabras") || h == "include_terms" || h == "keywords");
        let exclude = self.find(|h| h.contains("excluid") || h == "exclude_terms");
        let media = self.find(|h| h.contains("medios") || h == "media_whitelist" || h == "media");

        let mut missing = Vec::new();
        for (name, found) in [
            ("SECCION", section),
            ("TEMA", theme),
            ("PALABRAS", include),
            ("MEDIOS CLAVES", media),
        ] {
            if found.is_none() {
                missing.push(name.to_string());
            }
        }

        match (section, theme, include, media) {
            (Some(section), Some(theme), Some(include), Some(media)) => Ok(ColumnMap {
                section,
                theme,
                include,
                exclude,
                media,
            }),
            _ => Err(ConfigError::MissingColumns(missing)),
        }
    }

    fn find(&self, matches: impl Fn(&str) -> bool) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| matches(&h.trim().to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_csv_headers_and_rows() {
        let csv = "SECCION,TEMA,\"\"\"Palabras\"\" | (OR)\",TÉRMINOS EXCLUIDOS,MEDIOS CLAVES\n\
                   ACAFI,Gremio,acafi,,Todos\n";
        let table = RuleTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.headers.len(), 5);
        assert_eq!(table.rows.len(), 1);

        let columns = table.columns().unwrap();
        assert_eq!(columns.include, 2);
        assert_eq!(columns.exclude, Some(3));
        assert_eq!(columns.media, 4);
    }

    #[test]
    fn test_english_headers() {
        let table = RuleTable::new(
            vec!["section".into(), "theme".into(), "include_terms".into(), "media_whitelist".into()],
            vec![],
        );
        let columns = table.columns().unwrap();
        assert_eq!(columns.exclude, None);
    }

    #[test]
    fn test_missing_columns_are_reported() {
        let table = RuleTable::new(vec!["SECCION".into(), "TEMA".into()], vec![]);
        assert_eq!(
            table.columns().unwrap_err(),
            ConfigError::MissingColumns(vec!["PALABRAS".into(), "MEDIOS CLAVES".into()])
        );
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let row = vec!["ACAFI".to_string()];
        assert_eq!(RuleTable::cell(&row, 0), "ACAFI");
        assert_eq!(RuleTable::cell(&row, 3), "");
    }
}
