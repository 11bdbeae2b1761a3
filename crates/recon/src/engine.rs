use crate::availability::{add_supplier_a, add_supplier_b, AvailabilitySet};
use crate::changelog::apply_change_log;
use crate::config::SyncConfig;
use crate::duplicates::find_duplicates;
use crate::error::SyncError;
use crate::inventory::reconcile_inventory;
use crate::journal::RunLog;
use crate::markup::MarkupTable;
use crate::model::{AvailabilityStats, SyncInput, SyncMeta, SyncResult, SyncStats, Table};
use crate::pricing::apply_costs_and_prices;

/// Run one reconciliation pass. A missing required target column is an error.
pub fn run(
    config: &SyncConfig,
    input: &SyncInput,
    markup: &MarkupTable,
) -> Result<SyncResult, SyncError> {
    let mut log = RunLog::new();
    run_with_log(config, input, markup, &mut log)
}

/// Like [`run`], but a missing required column yields an empty result whose
/// log explains the failure instead of an error.
pub fn run_lenient(config: &SyncConfig, input: &SyncInput, markup: &MarkupTable) -> SyncResult {
    let mut log = RunLog::new();
    match run_with_log(config, input, markup, &mut log) {
        Ok(result) => result,
        Err(e) => {
            log.error(format!("ERROR: {e}"));
            let mut headers = input.target.headers.clone();
            headers.push(config.output.change_log_column.clone());
            SyncResult {
                meta: meta(),
                output: Table::new(headers),
                duplicates: Vec::new(),
                log: log.into_lines(),
                stats: SyncStats::default(),
            }
        }
    }
}

/// Like [`run`], continuing `log`. Lines already in it, such as the markup
/// load status, lead the result's log.
pub fn run_with_log(
    config: &SyncConfig,
    input: &SyncInput,
    markup: &MarkupTable,
    log: &mut RunLog,
) -> Result<SyncResult, SyncError> {
    let mut stats = SyncStats {
        markup_brands: markup.len(),
        ..Default::default()
    };

    log.rule();
    log.info("INVENTORY SYNC - STOCK, COST AND PRICE");
    log.rule();
    log.info(format!("Valid trademarks: {} brands", config.trademarks.valid.len()));
    log.info(format!("Markup table: {} brands", markup.len()));

    // Supplier A: duplicate report + codes
    log.info("1. Processing supplier A (MCWS) stock list...");
    let mut duplicates = Vec::new();
    if input.supplier_a.has_column(&config.supplier_a.trademark) {
        log.info("   Checking duplicate codes...");
        let (_, report) = find_duplicates(
            &input.supplier_a,
            &config.supplier_a.primary_code,
            &config.supplier_a.trademark,
            &config.trademarks,
        );
        log.info(format!("   Found {} duplicate occurrences", report.len()));
        duplicates = report;
    }
    stats.duplicates = duplicates.len();

    let mut availability = AvailabilitySet::new();
    let from_a = add_supplier_a(
        &mut availability,
        &input.supplier_a,
        &config.supplier_a,
        &config.trademarks,
        log,
    );
    log.info(format!("   Loaded {from_a} unique codes from supplier A"));

    // Supplier B
    log.info("2. Processing supplier B (BBR) export...");
    let from_b = add_supplier_b(&mut availability, &input.supplier_b, &config.supplier_b, log);
    log.info(format!("   Loaded {from_b} new unique codes from supplier B"));
    log.info(format!("   MASTER AVAILABILITY: {} unique codes", availability.len()));
    stats.availability = AvailabilityStats {
        supplier_a_codes: from_a,
        supplier_b_codes: from_b,
        total: availability.len(),
    };

    // Target inventory
    log.info("3. Comparing target products (inventory)...");
    let reconciled = reconcile_inventory(
        &input.target,
        &availability,
        &config.target,
        &config.inventory,
    )?;
    stats.inventory = reconciled.stats;
    log.info(format!("   SKUs processed: {}", stats.inventory.processed));
    if stats.inventory.skipped_kk > 0 {
        log.info(format!("   SKUs skipped by KK prefix rule: {}", stats.inventory.skipped_kk));
    }
    log.info(format!(
        "   Inventory updates: to 1={}, to 0={}",
        stats.inventory.activations, stats.inventory.deactivations
    ));

    let mut working = reconciled.table;

    // Costs and prices
    if !working.is_empty() {
        log.info("4. Processing costs and prices...");
        stats.pricing = apply_costs_and_prices(&mut working, config, markup, log);
    }

    // Change log + filter
    log.info("5. Generating change log...");
    let (output, change_stats) = apply_change_log(working, &input.target, config, markup, log);
    stats.change_log = change_stats;

    summarize(&stats, log);

    Ok(SyncResult {
        meta: meta(),
        output,
        duplicates,
        log: log.lines().to_vec(),
        stats,
    })
}

/// Parse delimited text with a header row into a [`Table`].
///
/// All cells stay strings. Short rows are padded to the header width, long
/// rows truncated. A header-less (empty) input is an error.
pub fn load_csv_table(csv_data: &str, delimiter: u8) -> Result<Table, SyncError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.trim_start_matches('\u{feff}').as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| SyncError::Io(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(SyncError::Io("input has no header row".into()));
    }

    let mut table = Table::new(headers);
    for record in reader.records() {
        let record = record.map_err(|e| SyncError::Io(e.to_string()))?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        table.push_row(record.iter().map(|f| f.to_string()).collect());
    }

    Ok(table)
}

fn summarize(stats: &SyncStats, log: &mut RunLog) {
    log.rule();
    log.info("SUMMARY");
    log.rule();
    log.info(format!("Target rows: {}", stats.inventory.total));
    log.info(format!("Inventory updates (0→1): {}", stats.inventory.activations));
    log.info(format!("Inventory updates (1→0): {}", stats.inventory.deactivations));

    let p = &stats.pricing;
    log.info(format!("BBR products processed: {}", p.total_bbr));
    log.info(format!("  - BBR costs updated: {}", p.cost_updates_bbr));
    log.info(format!("  - BBR prices updated: {}", p.price_updates_bbr));
    log.info(format!("MCWS products processed: {}", p.total_mcws));
    log.info(format!("  - MCWS costs updated: {}", p.cost_updates_mcws));
    log.info(format!("  - MCWS prices updated: {}", p.price_updates_mcws));
    if !p.missing_markup_brands.is_empty() {
        log.info(format!("Brands without markup: {}", p.missing_markup_brands.len()));
    }
    log.info(format!("Rows in update file: {}", stats.change_log.changed_rows));
}

fn meta() -> SyncMeta {
    SyncMeta {
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        run_at: chrono::Utc::now().to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> SyncInput {
        SyncInput {
            target: Table::from_rows(
                &["Variant SKU", "Variant Inventory Qty", "Variant Cost", "Variant Price", "Tags"],
                &[
                    &["K-123", "0", "", "", ""],
                    &["AB99", "1", "", "", ""],
                    &["ZZ1", "1", "", "", ""],
                ],
            ),
            supplier_a: Table::from_rows(
                &["Our Code", "Code", "Trademark"],
                &[&["k123", "", "Kyosho"], &["k001", "", "FAKE-BRAND"], &["K-001", "", "Norev"]],
            ),
            supplier_b: Table::from_rows(
                &["DescrizioneVariante", "QtaResidua"],
                &[&["ZZ1", "4"]],
            ),
        }
    }

    #[test]
    fn end_to_end_small() {
        let result = run(&SyncConfig::default(), &input(), &MarkupTable::empty()).unwrap();

        assert_eq!(result.stats.inventory.activations, 1);
        assert_eq!(result.stats.inventory.deactivations, 1);
        assert_eq!(result.output.len(), 2);
        assert_eq!(result.output.rows[0][0], "K-123");
        assert_eq!(result.output.rows[0][1], "1");
        assert_eq!(result.output.rows[0][5], "QTY: 0→1 (RIATTIVATO)");
        assert_eq!(result.output.rows[1][0], "AB99");
        assert_eq!(result.output.rows[1][1], "0");

        assert_eq!(result.duplicates.len(), 2);
        assert_eq!(result.stats.availability.total, 3);
        assert!(result.log.iter().any(|l| l == "SUMMARY"));
    }

    #[test]
    fn load_csv_basic() {
        let csv = "\
Variant SKU,Variant Inventory Qty,Tags
K-1,0,\"brand_norev, 1/43\"
K-2
,,
";
        let table = load_csv_table(csv, b',').unwrap();
        assert_eq!(table.headers, vec!["Variant SKU", "Variant Inventory Qty", "Tags"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][2], "brand_norev, 1/43");
        assert_eq!(table.rows[1], vec!["K-2", "", ""]);
    }

    #[test]
    fn load_csv_semicolon_and_bom() {
        let csv = "\u{feff}Our Code;Trademark\nk001;Kyosho\n";
        let table = load_csv_table(csv, b';').unwrap();
        assert_eq!(table.column("Our Code"), Some(0));
        assert_eq!(table.cell(0, Some(1)), "Kyosho");
    }

    #[test]
    fn load_csv_empty_input_fails() {
        assert!(load_csv_table("", b',').is_err());
    }

    #[test]
    fn missing_sku_column_errors() {
        let mut inp = input();
        inp.target.headers[0] = "SKU".into();
        let err = run(&SyncConfig::default(), &inp, &MarkupTable::empty()).unwrap_err();
        assert!(matches!(err, SyncError::MissingColumn { .. }));
    }

    #[test]
    fn lenient_run_reports_missing_column_in_log() {
        let mut inp = input();
        inp.target.headers[0] = "SKU".into();
        let result = run_lenient(&SyncConfig::default(), &inp, &MarkupTable::empty());
        assert!(result.output.is_empty());
        assert_eq!(result.output.headers.last().map(String::as_str), Some("Change Log"));
        let last = result.log.last().unwrap();
        assert!(last.starts_with("ERROR:") && last.contains("Variant SKU"), "{last}");
    }
}
