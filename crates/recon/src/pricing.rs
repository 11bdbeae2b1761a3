//! Cost overwrite and markup-based price recomputation.
//!
//! Each working row is attributed to a supplier. Supplier B rows take their
//! cost from the per-row supplier B cost and a fixed markup; supplier A rows
//! take their cost from the net price and a per-brand markup.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{PricingConfig, SyncConfig, TargetColumns, TrademarkConfig};
use crate::journal::RunLog;
use crate::markup::MarkupTable;
use crate::model::{field, PricingStats, ProductSource, Table};
use crate::normalize::{clean_numeric, format_number, round2};

static BRAND_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"brand_([a-z0-9\-]+)").expect("brand tag pattern"));

// ---------------------------------------------------------------------------
// Column resolution
// ---------------------------------------------------------------------------

/// Target column indices used by cost/price logic. Any of them may be absent.
#[derive(Debug, Clone, Copy)]
pub struct PriceColumns {
    pub cost: Option<usize>,
    pub price: Option<usize>,
    pub tags: Option<usize>,
    pub supplier_b_cost: Option<usize>,
    pub supplier_a_net_price: Option<usize>,
}

impl PriceColumns {
    pub fn resolve(table: &Table, columns: &TargetColumns) -> Self {
        Self {
            cost: table.column(&columns.cost),
            price: table.column(&columns.price),
            tags: table.column(&columns.tags),
            supplier_b_cost: table.column(&columns.supplier_b_cost),
            supplier_a_net_price: table.column(&columns.supplier_a_net_price),
        }
    }
}

// ---------------------------------------------------------------------------
// Brand + source
// ---------------------------------------------------------------------------

/// Brand named in a product's tags.
///
/// A `brand_<name>` tag wins (`brand_mitica-diecast` → `"MITICA DIECAST"`);
/// otherwise the first valid trademark whose name occurs in the tags is
/// returned as configured. Empty when neither is found.
pub fn extract_brand(tags: &str, trademarks: &TrademarkConfig) -> String {
    if tags.trim().is_empty() {
        return String::new();
    }
    let lower = tags.to_lowercase();

    if let Some(caps) = BRAND_TAG.captures(&lower) {
        return caps[1].to_uppercase().replace('-', " ");
    }

    trademarks
        .valid
        .iter()
        .find(|t| lower.contains(&t.to_lowercase().replace('-', " ")))
        .cloned()
        .unwrap_or_default()
}

/// Decide which supplier a row belongs to.
///
/// Precedence: positive supplier B cost, then positive supplier A net price,
/// then (for rows with a positive current cost) a supplier B keyword in the
/// tagged brand. Anything else is unknown.
pub fn identify_source(
    row: &[String],
    cols: &PriceColumns,
    pricing: &PricingConfig,
    trademarks: &TrademarkConfig,
) -> ProductSource {
    if clean_numeric(field(row, cols.supplier_b_cost), 0.0) > 0.0 {
        return ProductSource::Bbr;
    }
    if clean_numeric(field(row, cols.supplier_a_net_price), 0.0) > 0.0 {
        return ProductSource::Mcws;
    }
    if clean_numeric(field(row, cols.cost), 0.0) <= 0.0 {
        return ProductSource::Unknown;
    }

    let brand = extract_brand(field(row, cols.tags), trademarks);
    if pricing.supplier_b_keywords.iter().any(|k| brand.contains(k.as_str())) {
        ProductSource::Bbr
    } else {
        ProductSource::Mcws
    }
}

/// Per-row cost reported by the row's supplier, if positive.
pub fn supplier_cost(row: &[String], cols: &PriceColumns, source: ProductSource) -> Option<f64> {
    let col = match source {
        ProductSource::Bbr => cols.supplier_b_cost,
        ProductSource::Mcws => cols.supplier_a_net_price,
        ProductSource::Unknown => return None,
    };
    let cost = clean_numeric(field(row, col), 0.0);
    (cost > 0.0).then_some(cost)
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Overwrite costs and recompute prices on every working row in place.
pub fn apply_costs_and_prices(
    table: &mut Table,
    config: &SyncConfig,
    markup: &MarkupTable,
    log: &mut RunLog,
) -> PricingStats {
    let mut stats = PricingStats::default();
    if table.is_empty() {
        log.info("   [COST/PRICE] Empty table, nothing to do");
        return stats;
    }

    let cols = PriceColumns::resolve(table, &config.target);
    let (Some(cost_idx), Some(price_idx)) = (cols.cost, cols.price) else {
        log.warn(format!(
            "   [COST/PRICE] WARNING: columns '{}' / '{}' not found, cost and price left untouched",
            config.target.cost, config.target.price
        ));
        return stats;
    };
    if cols.supplier_b_cost.is_none() {
        log.warn(format!(
            "   [COST/PRICE] Column '{}' not found, supplier B costs unavailable",
            config.target.supplier_b_cost
        ));
    }
    if cols.supplier_a_net_price.is_none() {
        log.warn(format!(
            "   [COST/PRICE] Column '{}' not found, supplier A costs unavailable",
            config.target.supplier_a_net_price
        ));
    }

    log.info("   [COST/PRICE] Processing costs and prices...");

    for row in table.rows.iter_mut() {
        let source = identify_source(row, &cols, &config.pricing, &config.trademarks);
        match source {
            ProductSource::Bbr => stats.total_bbr += 1,
            ProductSource::Mcws => stats.total_mcws += 1,
            ProductSource::Unknown => {
                stats.total_unknown += 1;
                continue;
            }
        }

        let current_cost = clean_numeric(field(row, Some(cost_idx)), 0.0);
        let current_price = clean_numeric(field(row, Some(price_idx)), 0.0);

        let mut cost = current_cost;
        if let Some(supplier) = supplier_cost(row, &cols, source) {
            if supplier != current_cost {
                cost = supplier;
                row[cost_idx] = format_number(cost);
                match source {
                    ProductSource::Bbr => stats.cost_updates_bbr += 1,
                    _ => stats.cost_updates_mcws += 1,
                }
            }
        }

        let multiplier = match source {
            ProductSource::Bbr => Some(config.pricing.supplier_b_markup),
            _ => {
                let brand = extract_brand(field(row, cols.tags), &config.trademarks);
                let found = markup.lookup(&brand);
                if found.is_none() && !brand.is_empty() {
                    stats.missing_markup_brands.insert(brand);
                }
                found
            }
        };

        if let Some(multiplier) = multiplier {
            let expected = round2(cost * multiplier);
            if current_price != expected {
                row[price_idx] = format_number(expected);
                match source {
                    ProductSource::Bbr => stats.price_updates_bbr += 1,
                    _ => stats.price_updates_mcws += 1,
                }
            }
        }
    }

    log.info(format!(
        "   [COST/PRICE] BBR products: {} (costs updated: {}, prices updated: {})",
        stats.total_bbr, stats.cost_updates_bbr, stats.price_updates_bbr
    ));
    log.info(format!(
        "   [COST/PRICE] MCWS products: {} (costs updated: {}, prices updated: {})",
        stats.total_mcws, stats.cost_updates_mcws, stats.price_updates_mcws
    ));
    if stats.total_unknown > 0 {
        log.info(format!(
            "   [COST/PRICE] Unattributed products: {}",
            stats.total_unknown
        ));
    }
    if !stats.missing_markup_brands.is_empty() {
        let brands: Vec<&str> = stats.missing_markup_brands.iter().map(String::as_str).collect();
        log.warn(format!(
            "   [COST/PRICE] Brands without markup: {}",
            brands.join(", ")
        ));
    }

    stats
}
