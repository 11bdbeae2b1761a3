//! `stocksync run | validate | trademarks`

use std::path::{Path, PathBuf};

use serde::Serialize;

use stocksync_io::{read_table, save_outputs, TableError};
use stocksync_recon::model::{SyncMeta, SyncStats};
use stocksync_recon::{MarkupTable, RunLog, SyncConfig, SyncError, SyncInput, Table};

use crate::exit_codes::{
    EXIT_INPUT_READ, EXIT_INVALID_CONFIG, EXIT_MISSING_COLUMN, EXIT_OUTPUT_WRITE,
};
use crate::CliError;

pub struct RunArgs {
    pub target: PathBuf,
    pub supplier_a: PathBuf,
    pub supplier_b: PathBuf,
    pub markup: PathBuf,
    pub config: Option<PathBuf>,
    pub out_dir: PathBuf,
    pub json: bool,
    pub quiet: bool,
}

/// `--json` output. Stable field names: scripts parse this.
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    meta: &'a SyncMeta,
    update_file: String,
    duplicates_file: Option<String>,
    rows_written: usize,
    stats: &'a SyncStats,
}

// ── Config ──────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<SyncConfig, CliError> {
    let Some(path) = path else {
        return Ok(SyncConfig::default());
    };
    let config_str = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(
            EXIT_INVALID_CONFIG,
            format!("cannot read config {}: {e}", path.display()),
        )
    })?;
    SyncConfig::from_toml(&config_str).map_err(|e| {
        CliError::new(EXIT_INVALID_CONFIG, format!("{}: {e}", path.display()))
    })
}

// ── Inputs ──────────────────────────────────────────────────────────

fn load_input(role: &str, path: &Path) -> Result<Table, CliError> {
    let table = read_table(path).map_err(|e| {
        let err = CliError::new(EXIT_INPUT_READ, format!("{role}: {e}"));
        match e {
            TableError::UnsupportedFormat { .. } => {
                err.with_hint("use .csv, .txt, .tsv, .xls, .xlsx or .ods")
            }
            TableError::Empty { .. } => err.with_hint("the first row must hold column names"),
            _ => err,
        }
    })?;
    tracing::debug!(role, path = %path.display(), rows = table.len(), "loaded table");
    Ok(table)
}

fn sync_err(e: SyncError) -> CliError {
    match e {
        SyncError::MissingColumn { ref column, .. } => {
            let hint = format!(
                "rename the column or set it under [target] in a --config file (looked for '{column}')"
            );
            CliError::new(EXIT_MISSING_COLUMN, e.to_string()).with_hint(hint)
        }
        SyncError::ConfigParse(_) | SyncError::ConfigValidation(_) => {
            CliError::new(EXIT_INVALID_CONFIG, e.to_string())
        }
        other => CliError::new(EXIT_INPUT_READ, other.to_string()),
    }
}

// ── run ─────────────────────────────────────────────────────────────

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    if args.out_dir.is_file() {
        return Err(CliError::args(format!(
            "--out-dir {} is a file",
            args.out_dir.display()
        )));
    }
    let config = load_config(args.config.as_deref())?;

    let input = SyncInput {
        target: load_input("target", &args.target)?,
        supplier_a: load_input("supplier A", &args.supplier_a)?,
        supplier_b: load_input("supplier B", &args.supplier_b)?,
    };

    let mut log = RunLog::new();
    let markup = MarkupTable::load_or_empty(&args.markup, &mut log);

    let result =
        stocksync_recon::run_with_log(&config, &input, &markup, &mut log).map_err(sync_err)?;

    if !args.quiet {
        for line in &result.log {
            eprintln!("{line}");
        }
    }

    let now = chrono::Local::now().naive_local();
    let saved = save_outputs(&result, &config.output, &args.out_dir, now)
        .map_err(|e| CliError::new(EXIT_OUTPUT_WRITE, format!("cannot write output: {e}")))?;

    if !args.quiet {
        eprintln!("wrote {} ({} rows)", saved.update.display(), result.output.len());
        if let Some(ref dup) = saved.duplicates {
            eprintln!(
                "wrote {} ({} duplicate occurrences)",
                dup.display(),
                result.duplicates.len()
            );
        }
    }

    if args.json {
        let summary = RunSummary {
            meta: &result.meta,
            update_file: saved.update.display().to_string(),
            duplicates_file: saved.duplicates.as_ref().map(|p| p.display().to_string()),
            rows_written: result.output.len(),
            stats: &result.stats,
        };
        let json_str = serde_json::to_string_pretty(&summary).map_err(|e| {
            CliError::new(EXIT_OUTPUT_WRITE, format!("JSON serialization error: {e}"))
        })?;
        println!("{json_str}");
    }

    Ok(())
}

// ── validate ────────────────────────────────────────────────────────

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(Some(&config_path))?;
    eprintln!(
        "valid: {} trademark(s), supplier B markup {}, output prefix '{}'",
        config.trademarks.valid.len(),
        config.pricing.supplier_b_markup,
        config.output.prefix,
    );
    Ok(())
}

// ── trademarks ──────────────────────────────────────────────────────

pub fn cmd_trademarks(config_path: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let config = load_config(config_path.as_deref())?;
    let valid = &config.trademarks.valid;

    if json {
        let json_str = serde_json::to_string_pretty(valid).map_err(|e| {
            CliError::new(EXIT_OUTPUT_WRITE, format!("JSON serialization error: {e}"))
        })?;
        println!("{json_str}");
    } else {
        for trademark in valid {
            println!("{trademark}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_maps_to_exit_code() {
        let err = sync_err(SyncError::MissingColumn {
            table: "target".into(),
            column: "Variant SKU".into(),
        });
        assert_eq!(err.code, EXIT_MISSING_COLUMN);
        assert!(err.hint.unwrap().contains("Variant SKU"));
    }

    #[test]
    fn no_config_path_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.output.prefix, "INVENTORY_UPDATE");
    }

    #[test]
    fn unreadable_config_is_invalid_config() {
        let err = load_config(Some(Path::new("/nonexistent/sync.toml"))).unwrap_err();
        assert_eq!(err.code, EXIT_INVALID_CONFIG);
    }
}
