use std::collections::HashSet;

use crate::availability::AvailabilitySet;
use crate::config::{InventoryConfig, TargetColumns};
use crate::error::SyncError;
use crate::model::{field, InventoryStats, Table};
use crate::normalize::{clean_code, clean_numeric};

/// What to do with a row's quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QtyAction {
    /// Out of stock locally, available at a supplier: set qty to 1.
    Activate,
    /// In stock locally, no supplier has it: set qty to 0.
    Deactivate,
    Keep,
}

/// Decision table over (current stock flag, supplier availability).
pub fn decide(in_stock: bool, available: bool) -> QtyAction {
    match (in_stock, available) {
        (false, true) => QtyAction::Activate,
        (true, false) => QtyAction::Deactivate,
        (false, false) | (true, true) => QtyAction::Keep,
    }
}

/// Working table produced by the reconciler.
#[derive(Debug, Clone)]
pub struct Reconciled {
    /// One row per distinct SKU, first occurrence, in target order.
    pub table: Table,
    pub stats: InventoryStats,
}

/// Compare every target row's stock flag against supplier availability.
///
/// Rows with an empty normalized SKU are skipped, and only the first row of
/// each SKU is considered. Every considered row is carried into the working
/// table, changed or not, so cost and price logic can run over all of them.
pub fn reconcile_inventory(
    target: &Table,
    availability: &AvailabilitySet,
    columns: &TargetColumns,
    inventory: &InventoryConfig,
) -> Result<Reconciled, SyncError> {
    let sku_idx = required_column(target, &columns.sku)?;
    let qty_idx = required_column(target, &columns.qty)?;

    let mut stats = InventoryStats::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut table = Table::new(target.headers.clone());

    for row in &target.rows {
        stats.total += 1;

        let sku = clean_code(field(row, Some(sku_idx)));
        if sku.is_empty() {
            continue;
        }
        if inventory.skip_kk_prefix && sku.starts_with("KK") {
            stats.skipped_kk += 1;
            continue;
        }
        if !seen.insert(sku.clone()) {
            continue;
        }

        let in_stock = clean_numeric(field(row, Some(qty_idx)), 0.0) > 0.0;
        let mut out = row.clone();
        out.resize(target.headers.len(), String::new());
        match decide(in_stock, availability.contains(&sku)) {
            QtyAction::Activate => {
                out[qty_idx] = "1".into();
                stats.activations += 1;
            }
            QtyAction::Deactivate => {
                out[qty_idx] = "0".into();
                stats.deactivations += 1;
            }
            QtyAction::Keep => {}
        }
        table.push_row(out);
    }

    stats.processed = seen.len();
    Ok(Reconciled { table, stats })
}

fn required_column(table: &Table, name: &str) -> Result<usize, SyncError> {
    table.column(name).ok_or_else(|| SyncError::MissingColumn {
        table: "target".into(),
        column: name.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn target(rows: &[&[&str]]) -> Table {
        Table::from_rows(&["Variant SKU", "Variant Inventory Qty", "Tags"], rows)
    }

    fn run(target: &Table, available: &[&str]) -> Reconciled {
        let set: AvailabilitySet = available.iter().copied().collect();
        reconcile_inventory(target, &set, &TargetColumns::default(), &InventoryConfig::default())
            .unwrap()
    }

    #[test]
    fn decision_table() {
        assert_eq!(decide(false, true), QtyAction::Activate);
        assert_eq!(decide(true, false), QtyAction::Deactivate);
        assert_eq!(decide(false, false), QtyAction::Keep);
        assert_eq!(decide(true, true), QtyAction::Keep);
    }

    #[test]
    fn activates_normalized_match() {
        let out = run(&target(&[&["K-123", "0", ""]]), &["K123"]);
        assert_eq!(out.table.rows[0][1], "1");
        assert_eq!(out.stats.activations, 1);
    }

    #[test]
    fn deactivates_missing_sku() {
        let out = run(&target(&[&["AB99", "1", ""]]), &["K123"]);
        assert_eq!(out.table.rows[0][1], "0");
        assert_eq!(out.stats.deactivations, 1);
    }

    #[test]
    fn unchanged_rows_are_still_carried() {
        let out = run(&target(&[&["A1", "5", ""], &["A2", "0", ""]]), &["A1"]);
        assert_eq!(out.table.len(), 2);
        assert_eq!(out.table.rows[0][1], "5");
        assert_eq!(out.table.rows[1][1], "0");
        assert_eq!(out.stats.activations + out.stats.deactivations, 0);
    }

    #[test]
    fn unparsable_qty_counts_as_zero() {
        let out = run(&target(&[&["A1", "lots", ""], &["A2", "", ""]]), &["A1", "A2"]);
        assert_eq!(out.stats.activations, 2);
        assert_eq!(out.table.rows[0][1], "1");
    }

    #[test]
    fn european_qty_parsed() {
        let out = run(&target(&[&["A1", "0,5", ""]]), &[]);
        assert_eq!(out.stats.deactivations, 1);
    }

    #[test]
    fn first_occurrence_wins_and_blanks_are_skipped() {
        let out = run(
            &target(&[&["k-1", "0", "first"], &["", "1", ""], &["K1", "1", "second"], &["--", "1", ""]]),
            &["K1"],
        );
        assert_eq!(out.stats.total, 4);
        assert_eq!(out.stats.processed, 1);
        assert_eq!(out.table.len(), 1);
        assert_eq!(out.table.rows[0][2], "first");
        assert_eq!(out.stats.activations, 1);
    }

    #[test]
    fn kk_prefix_skipped_only_when_enabled() {
        let t = target(&[&["KK-SCALE-1", "1", ""]]);
        let set = AvailabilitySet::new();

        let default_run =
            reconcile_inventory(&t, &set, &TargetColumns::default(), &InventoryConfig::default())
                .unwrap();
        assert_eq!(default_run.stats.deactivations, 1);

        let legacy = reconcile_inventory(
            &t,
            &set,
            &TargetColumns::default(),
            &InventoryConfig { skip_kk_prefix: true },
        )
        .unwrap();
        assert_eq!(legacy.stats.skipped_kk, 1);
        assert!(legacy.table.is_empty());
    }

    #[test]
    fn missing_sku_column_is_fatal() {
        let t = Table::from_rows(&["SKU", "Variant Inventory Qty"], &[&["A", "1"]]);
        let err = reconcile_inventory(
            &t,
            &AvailabilitySet::new(),
            &TargetColumns::default(),
            &InventoryConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SyncError::MissingColumn { ref column, .. } if column == "Variant SKU"));
    }

    proptest! {
        #[test]
        fn second_pass_changes_nothing(
            rows in proptest::collection::vec(("[a-c]{1}[0-2]{1}", "(0|1|2|x)?"), 0..20),
            available in proptest::collection::vec("[a-c]{1}[0-2]{1}", 0..6),
        ) {
            let refs: Vec<Vec<&str>> = rows.iter().map(|(s, q)| vec![s.as_str(), q.as_str(), ""]).collect();
            let slices: Vec<&[&str]> = refs.iter().map(|r| r.as_slice()).collect();
            let t = target(&slices);
            let avail: Vec<&str> = available.iter().map(String::as_str).collect();

            let first = run(&t, &avail);
            let second = run(&first.table, &avail);
            prop_assert_eq!(second.stats.activations, 0);
            prop_assert_eq!(second.stats.deactivations, 0);
            prop_assert_eq!(second.table, first.table);
        }
    }
}
