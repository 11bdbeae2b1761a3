//! Per-row diff against the original export, and the final keep/drop filter.
//!
//! Only quantity and cost deltas keep a row. Price deltas follow mechanically
//! from cost, so they are described but never sufficient on their own.

use std::collections::HashMap;

use crate::config::SyncConfig;
use crate::journal::RunLog;
use crate::markup::MarkupTable;
use crate::model::{field, ChangeLogStats, ProductSource, Table};
use crate::normalize::{clean_code, clean_numeric, round2};
use crate::pricing::{extract_brand, identify_source, supplier_cost, PriceColumns};

pub const NEW_PRODUCT: &str = "NEW PRODUCT";

/// Description of one row's deltas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowChanges {
    /// Quantity and cost segments; these decide whether the row is kept.
    pub material: Vec<String>,
    /// Price segments, informational only.
    pub price: Vec<String>,
}

impl RowChanges {
    pub fn is_material(&self) -> bool {
        !self.material.is_empty()
    }

    /// All segments joined for the change log column.
    pub fn render(&self) -> String {
        self.material
            .iter()
            .chain(self.price.iter())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

fn describe_qty(original: f64, new: f64) -> String {
    let (from, to) = (original as i64, new as i64);
    if new == 1.0 {
        format!("QTY: {from}→{to} (RIATTIVATO)")
    } else if new == 0.0 {
        format!("QTY: {from}→{to} (DISATTIVATO)")
    } else {
        format!("QTY: {from}→{to}")
    }
}

/// Compare a working row against its original.
pub fn describe_changes(
    row: &[String],
    original: &[String],
    table: &Table,
    config: &SyncConfig,
    markup: &MarkupTable,
) -> RowChanges {
    let cols = PriceColumns::resolve(table, &config.target);
    let qty_idx = table.column(&config.target.qty);
    let mut changes = RowChanges::default();

    let original_qty = clean_numeric(field(original, qty_idx), 0.0);
    let new_qty = clean_numeric(field(row, qty_idx), 0.0);
    if original_qty != new_qty {
        changes.material.push(describe_qty(original_qty, new_qty));
    }

    let original_cost = clean_numeric(field(original, cols.cost), 0.0);
    let new_cost = clean_numeric(field(row, cols.cost), 0.0);
    let source = identify_source(row, &cols, &config.pricing, &config.trademarks);

    if let Some(supplier) = supplier_cost(row, &cols, source) {
        if new_cost != original_cost {
            let column = match source {
                ProductSource::Bbr => &config.target.supplier_b_cost,
                _ => &config.target.supplier_a_net_price,
            };
            changes.material.push(format!(
                "COST {source}: {original_cost:.2}→{new_cost:.2} (from {column}={supplier:.2})"
            ));
        }
    }

    let original_price = clean_numeric(field(original, cols.price), 0.0);
    let new_price = clean_numeric(field(row, cols.price), 0.0);
    let expected_at = |multiplier: f64| {
        if new_cost > 0.0 {
            round2(new_cost * multiplier)
        } else {
            0.0
        }
    };
    match source {
        ProductSource::Bbr => {
            let multiplier = config.pricing.supplier_b_markup;
            let expected = expected_at(multiplier);
            if original_price != expected && new_price == expected {
                changes.price.push(format!(
                    "PRICE BBR: {original_price:.2}→{new_price:.2} (markup={multiplier})"
                ));
            }
        }
        ProductSource::Mcws => {
            let brand = extract_brand(field(row, cols.tags), &config.trademarks);
            if let Some(multiplier) = markup.lookup(&brand) {
                let expected = expected_at(multiplier);
                if original_price != expected && new_price == expected {
                    changes.price.push(format!(
                        "PRICE MCWS: {original_price:.2}→{new_price:.2} (markup={multiplier}, brand={brand})"
                    ));
                }
            }
        }
        ProductSource::Unknown => {}
    }

    changes
}

/// Append the change log column and keep only rows with a quantity or cost change.
///
/// Originals are matched by normalized SKU (first occurrence). A working row
/// with no original is logged as a new product and always kept.
pub fn apply_change_log(
    working: Table,
    original: &Table,
    config: &SyncConfig,
    markup: &MarkupTable,
    log: &mut RunLog,
) -> (Table, ChangeLogStats) {
    let mut headers = working.headers.clone();
    headers.push(config.output.change_log_column.clone());
    let mut output = Table::new(headers);
    let mut stats = ChangeLogStats::default();

    if working.is_empty() {
        log.info("   [CHANGE LOG] Empty table, nothing to compare");
        return (output, stats);
    }
    log.info("   [CHANGE LOG] Analysing changes...");

    let original_sku = original.column(&config.target.sku);
    let mut original_by_sku: HashMap<String, usize> = HashMap::new();
    for row in 0..original.len() {
        let sku = clean_code(original.cell(row, original_sku));
        if !sku.is_empty() {
            original_by_sku.entry(sku).or_insert(row);
        }
    }

    let working_sku = working.column(&config.target.sku);
    for row in &working.rows {
        let sku = clean_code(field(row, working_sku));
        let entry = match original_by_sku.get(&sku) {
            None => NEW_PRODUCT.to_string(),
            Some(&idx) => {
                let changes = describe_changes(row, &original.rows[idx], &working, config, markup);
                if !changes.is_material() {
                    if !changes.price.is_empty() {
                        stats.price_only_rows += 1;
                    }
                    continue;
                }
                changes.render()
            }
        };

        stats.changed_rows += 1;
        let mut out = row.clone();
        out.resize(working.headers.len(), String::new());
        out.push(entry);
        output.push_row(out);
    }

    log.info(format!(
        "   [CHANGE LOG] Found {} rows with changes (QTY or COST)",
        stats.changed_rows
    ));
    if stats.price_only_rows > 0 {
        log.info(format!(
            "   [CHANGE LOG] {} rows with price-only changes dropped",
            stats.price_only_rows
        ));
    }
    log.info(format!("   [CHANGE LOG] Filtered output: {} rows", output.len()));

    (output, stats)
}
