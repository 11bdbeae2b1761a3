//! Brand → price multiplier table for supplier A products.
//!
//! Loaded once per run from a tab-delimited side file:
//!
//! ```text
//! TRADEMARK	Markup %
//! Alerte	1,50
//! Autoart	1,60
//! ```

use std::collections::HashMap;
use std::path::Path;

use crate::error::SyncError;
use crate::journal::RunLog;
use crate::normalize::{clean_trademark, parse_numeric};

/// Immutable brand → markup mapping. Keys are normalized trademarks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkupTable {
    entries: HashMap<String, f64>,
}

impl MarkupTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse the side file contents.
    ///
    /// Rows with fewer than two fields are skipped; a row with more fields
    /// than the header fails the whole table.
    pub fn from_tsv(content: &str) -> Result<Self, SyncError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let width = reader
            .headers()
            .map_err(|e| SyncError::Markup(e.to_string()))?
            .len();
        if width < 2 {
            return Err(SyncError::Markup(format!(
                "expected 2 tab-separated columns, found {width}"
            )));
        }

        let mut entries = HashMap::new();
        for record in reader.records() {
            let record = record.map_err(|e| SyncError::Markup(e.to_string()))?;
            if record.len() > width {
                let line = record.position().map_or(0, |p| p.line());
                return Err(SyncError::Markup(format!(
                    "line {line}: found {} fields, expected {width}",
                    record.len()
                )));
            }
            if record.len() < 2 {
                log::warn!("markup row '{}' has no markup column, skipped", record.as_slice());
                continue;
            }
            let brand = clean_trademark(record.get(0).unwrap_or(""));
            let raw_markup = record.get(1).unwrap_or("").trim();
            if brand.is_empty() || raw_markup.is_empty() {
                continue;
            }
            match parse_numeric(raw_markup) {
                Ok(markup) if markup > 0.0 => {
                    entries.insert(brand, markup);
                }
                Ok(markup) => {
                    log::warn!("markup for '{brand}' is not positive ({markup}), ignored");
                }
                Err(e) => {
                    log::warn!("markup for '{brand}': {e}, ignored");
                }
            }
        }

        Ok(Self { entries })
    }

    /// Build a table directly from pairs. Brands are normalized.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let entries = pairs
            .into_iter()
            .map(|(brand, markup)| (clean_trademark(brand), markup))
            .filter(|(brand, markup)| !brand.is_empty() && *markup > 0.0)
            .collect();
        Self { entries }
    }

    /// Load the table from a side file on disk.
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let bytes = std::fs::read(path)
            .map_err(|e| SyncError::Io(format!("cannot read {}: {e}", path.display())))?;
        let content = match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => {
                // Spreadsheet tools on Windows export Windows-1252.
                let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
                decoded.into_owned()
            }
        };
        Self::from_tsv(&content)
    }

    /// [`MarkupTable::load`], but a failure is logged and yields an empty table.
    ///
    /// Supplier A prices are then left untouched and their brands reported as
    /// missing a markup.
    pub fn load_or_empty(path: &Path, log: &mut RunLog) -> Self {
        match Self::load(path) {
            Ok(table) => {
                log.info(format!(
                    "   Loaded {} brands from markup table {}",
                    table.len(),
                    path.display()
                ));
                table
            }
            Err(e) => {
                log.warn(format!("   WARNING: markup table not loaded: {e}"));
                Self::empty()
            }
        }
    }

    /// Markup for a brand. The lookup key is uppercased with spaces turned into hyphens.
    pub fn lookup(&self, brand: &str) -> Option<f64> {
        self.entries.get(&lookup_key(brand)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Brands in sorted order.
    pub fn brands(&self) -> Vec<&str> {
        let mut brands: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        brands.sort_unstable();
        brands
    }
}

/// `"mitica diecast"` → `"MITICA-DIECAST"`.
pub fn lookup_key(brand: &str) -> String {
    brand.to_uppercase().replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "TRADEMARK\tMarkup %\nAlerte\t1,50\nAutoart\t1,6\nSpark-Model\t1,85\n";

    #[test]
    fn parses_european_decimals() {
        let table = MarkupTable::from_tsv(SAMPLE).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup("ALERTE"), Some(1.5));
        assert_eq!(table.lookup("autoart"), Some(1.6));
        assert_eq!(table.lookup("SPARK MODEL"), Some(1.85));
        assert_eq!(table.lookup("KYOSHO"), None);
    }

    #[test]
    fn skips_blank_and_non_positive_rows() {
        let content = "TRADEMARK\tMarkup %\n\t1,5\nCMC\t\nNorev\t0\nSolido\tabc\nNZG\t2\n";
        let table = MarkupTable::from_tsv(content).unwrap();
        assert_eq!(table.brands(), vec!["NZG"]);
    }

    #[test]
    fn malformed_row_fails_table() {
        let content = "TRADEMARK\tMarkup %\nAlerte\t1,5\nBroken\t1,2\textra\n";
        assert!(matches!(
            MarkupTable::from_tsv(content),
            Err(SyncError::Markup(_))
        ));
    }

    #[test]
    fn short_row_is_skipped() {
        let content = "TRADEMARK\tMarkup %\nNorev\t1,50\nKyosho\n";
        let table = MarkupTable::from_tsv(content).unwrap();
        assert_eq!(table.brands(), vec!["NOREV"]);
        assert_eq!(table.lookup("NOREV"), Some(1.5));
    }

    #[test]
    fn single_column_file_rejected() {
        let content = "TRADEMARK\nAlerte\n";
        assert!(MarkupTable::from_tsv(content).is_err());
    }

    #[test]
    fn load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let table = MarkupTable::load(file.path()).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn load_windows_1252_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        // "Schüco" with 0xFC for ü
        file.write_all(b"TRADEMARK\tMarkup %\nSch\xfcco\t1,7\n").unwrap();
        let table = MarkupTable::load(file.path()).unwrap();
        assert_eq!(table.lookup("SCHÜCO"), Some(1.7));
    }

    #[test]
    fn missing_file_yields_empty_table_and_warning() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = RunLog::new();
        let table = MarkupTable::load_or_empty(&dir.path().join("nope.txt"), &mut log);
        assert!(table.is_empty());
        assert!(log.lines()[0].contains("markup table not loaded"));
    }

    #[test]
    fn failed_reload_leaves_existing_table_intact() {
        let first = MarkupTable::from_tsv(SAMPLE).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let mut log = RunLog::new();
        let second = MarkupTable::load_or_empty(&dir.path().join("gone.txt"), &mut log);
        assert!(second.is_empty());
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn from_pairs_normalizes() {
        let table = MarkupTable::from_pairs([(" kyosho ", 1.4), ("bad", -1.0)]);
        assert_eq!(table.lookup("KYOSHO"), Some(1.4));
        assert_eq!(table.len(), 1);
    }
}
