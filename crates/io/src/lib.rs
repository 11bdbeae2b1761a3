//! Table I/O for stocksync: CSV and spreadsheet readers, update and
//! duplicate report writers.

pub mod csv;
pub mod error;
pub mod export;
pub mod xlsx;

use std::path::Path;

use stocksync_recon::Table;

pub use error::TableError;
pub use export::{
    save_outputs, timestamped_file_name, write_duplicates_csv, write_table_csv, SavedOutputs,
};

/// Input format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Delimited,
    Spreadsheet,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" | "tsv" => Ok(Self::Delimited),
            "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => Ok(Self::Spreadsheet),
            _ => Err(TableError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: ext,
            }),
        }
    }
}

/// Read a table with a header row from a CSV-like or spreadsheet file.
pub fn read_table(path: &Path) -> Result<Table, TableError> {
    match TableFormat::from_path(path)? {
        TableFormat::Delimited => crate::csv::import(path),
        TableFormat::Spreadsheet => xlsx::import(path),
    }
}
