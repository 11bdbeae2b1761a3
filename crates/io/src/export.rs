//! Writers for the run outputs: the update table and the duplicate report.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use stocksync_recon::config::OutputConfig;
use stocksync_recon::{DuplicateEntry, SyncResult, Table};

use crate::error::TableError;

/// `INVENTORY_UPDATE_20240131_154500.csv`
pub fn timestamped_file_name(prefix: &str, now: NaiveDateTime) -> String {
    format!("{prefix}_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Write a table with its header row as comma-separated UTF-8.
pub fn write_table_csv(table: &Table, writer: impl Write) -> Result<(), String> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(&table.headers)
        .map_err(|e| format!("CSV write error: {e}"))?;
    for row in &table.rows {
        csv.write_record(row)
            .map_err(|e| format!("CSV write error: {e}"))?;
    }

    csv.flush().map_err(|e| format!("CSV flush error: {e}"))?;
    Ok(())
}

/// Write the duplicate report: `Code,Row_Index,Trademark,Is_Valid_Trademark`.
pub fn write_duplicates_csv(entries: &[DuplicateEntry], writer: impl Write) -> Result<(), String> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .has_headers(true)
        .from_writer(writer);

    for entry in entries {
        csv.serialize(entry)
            .map_err(|e| format!("CSV write error: {e}"))?;
    }

    csv.flush().map_err(|e| format!("CSV flush error: {e}"))?;
    Ok(())
}

/// Files produced by [`save_outputs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedOutputs {
    pub update: PathBuf,
    /// Only written when the run found duplicates.
    pub duplicates: Option<PathBuf>,
}

/// Save the update table under a timestamped name in `out_dir`, plus the
/// duplicate report when it is non-empty.
pub fn save_outputs(
    result: &SyncResult,
    output: &OutputConfig,
    out_dir: &Path,
    now: NaiveDateTime,
) -> Result<SavedOutputs, TableError> {
    std::fs::create_dir_all(out_dir).map_err(|e| TableError::io(out_dir, e))?;

    let update = out_dir.join(timestamped_file_name(&output.prefix, now));
    write_to_path(&update, |w| write_table_csv(&result.output, w))?;

    let duplicates = if result.duplicates.is_empty() {
        None
    } else {
        let path = out_dir.join(&output.duplicates_file);
        write_to_path(&path, |w| write_duplicates_csv(&result.duplicates, w))?;
        Some(path)
    };

    Ok(SavedOutputs { update, duplicates })
}

fn write_to_path(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> Result<(), String>,
) -> Result<(), TableError> {
    let file = File::create(path).map_err(|e| TableError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    write(&mut writer).map_err(|e| TableError::io(path, e))?;
    writer.flush().map_err(|e| TableError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stocksync_recon::model::{SyncMeta, SyncStats};
    use tempfile::tempdir;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn entry(code: &str, row_index: usize, trademark: &str, valid: bool) -> DuplicateEntry {
        DuplicateEntry {
            code: code.into(),
            row_index,
            trademark: trademark.into(),
            is_valid_trademark: valid,
        }
    }

    fn result(duplicates: Vec<DuplicateEntry>) -> SyncResult {
        SyncResult {
            meta: SyncMeta {
                engine_version: "test".into(),
                run_at: String::new(),
            },
            output: Table::from_rows(
                &["Variant SKU", "Variant Inventory Qty", "Change Log"],
                &[&["K-123", "1", "QTY: 0→1 (RIATTIVATO)"]],
            ),
            duplicates,
            log: Vec::new(),
            stats: SyncStats::default(),
        }
    }

    #[test]
    fn file_name_format() {
        assert_eq!(
            timestamped_file_name("INVENTORY_UPDATE", at(15, 45, 0)),
            "INVENTORY_UPDATE_20240131_154500.csv"
        );
        assert_eq!(timestamped_file_name("X", at(9, 5, 7)), "X_20240131_090507.csv");
    }

    #[test]
    fn table_csv_quotes_embedded_commas() {
        let table = Table::from_rows(
            &["Variant SKU", "Tags"],
            &[&["K-1", "brand_norev, 1/43"]],
        );
        let mut buf = Vec::new();
        write_table_csv(&table, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Variant SKU,Tags\nK-1,\"brand_norev, 1/43\"\n"
        );
    }

    #[test]
    fn duplicates_csv_header_and_rows() {
        let mut buf = Vec::new();
        write_duplicates_csv(
            &[entry("K001", 1, "FAKE-BRAND", false), entry("K001", 2, "KYOSHO", true)],
            &mut buf,
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Code,Row_Index,Trademark,Is_Valid_Trademark\n\
             K001,1,FAKE-BRAND,false\n\
             K001,2,KYOSHO,true\n"
        );
    }

    #[test]
    fn save_outputs_writes_update_and_duplicates() {
        let dir = tempdir().unwrap();
        let out_dir = dir.path().join("out");
        let saved = save_outputs(
            &result(vec![entry("A7", 3, "NOREV", true), entry("A7", 5, "SOLIDO", true)]),
            &OutputConfig::default(),
            &out_dir,
            at(8, 0, 0),
        )
        .unwrap();

        assert_eq!(saved.update, out_dir.join("INVENTORY_UPDATE_20240131_080000.csv"));
        let update = std::fs::read_to_string(&saved.update).unwrap();
        assert!(update.starts_with("Variant SKU,Variant Inventory Qty,Change Log\n"));
        assert!(update.contains("K-123,1,QTY: 0→1 (RIATTIVATO)"));

        let dup = saved.duplicates.unwrap();
        assert_eq!(dup, out_dir.join("duplicates_report.csv"));
        assert_eq!(std::fs::read_to_string(dup).unwrap().lines().count(), 3);
    }

    #[test]
    fn no_duplicate_report_without_duplicates() {
        let dir = tempdir().unwrap();
        let saved = save_outputs(&result(Vec::new()), &OutputConfig::default(), dir.path(), at(8, 0, 0))
            .unwrap();
        assert!(saved.duplicates.is_none());
        assert!(!dir.path().join("duplicates_report.csv").exists());
    }
}
