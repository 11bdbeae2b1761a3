//! Master availability set: every normalized code obtainable from either supplier.

use std::collections::HashSet;

use crate::config::{SupplierAColumns, SupplierBColumns, TrademarkConfig};
use crate::journal::RunLog;
use crate::model::Table;
use crate::normalize::{clean_code, clean_trademark, parse_numeric};

/// Normalized codes currently purchasable from some supplier. Only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilitySet {
    codes: HashSet<String>,
}

impl AvailabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Membership test. `raw` is normalized first, so formatting differences don't matter.
    pub fn contains(&self, raw: &str) -> bool {
        let code = clean_code(raw);
        !code.is_empty() && self.codes.contains(&code)
    }

    /// Insert an already-normalized code. Returns true when it was new.
    fn insert(&mut self, code: String) -> bool {
        self.codes.insert(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for AvailabilitySet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        for raw in iter {
            let code = clean_code(raw);
            if !code.is_empty() {
                set.insert(code);
            }
        }
        set
    }
}

/// Add supplier A codes from both code columns.
///
/// With a trademark column, a row contributes only when its trademark is
/// valid; the same filter applies to both code columns. Without one, every
/// non-empty code is accepted and a warning is logged once. Returns the
/// number of codes newly added.
pub fn add_supplier_a(
    set: &mut AvailabilitySet,
    table: &Table,
    columns: &SupplierAColumns,
    trademarks: &TrademarkConfig,
    log: &mut RunLog,
) -> usize {
    let trademark_idx = table.column(&columns.trademark);
    if trademark_idx.is_some() {
        log.info("   Trademark column found, applying valid-brand filter");
    } else {
        log.warn(format!(
            "   WARNING: column '{}' not found in supplier A list",
            columns.trademark
        ));
        log.warn("   All supplier A codes will be accepted without trademark filter");
    }

    let mut added = 0;
    for column in [&columns.primary_code, &columns.secondary_code] {
        let Some(code_idx) = table.column(column) else {
            log.warn(format!("   WARNING: code column '{column}' not found in supplier A list"));
            continue;
        };
        for row in 0..table.len() {
            let code = clean_code(table.cell(row, Some(code_idx)));
            if code.is_empty() {
                continue;
            }
            if trademark_idx.is_some() {
                let trademark = clean_trademark(table.cell(row, trademark_idx));
                if !trademarks.is_valid(&trademark) {
                    continue;
                }
            }
            if set.insert(code) {
                added += 1;
            }
        }
    }

    added
}

/// Add supplier B codes whose residual quantity is positive.
///
/// A quantity that cannot be parsed (including an empty cell) counts as
/// available. Without a quantity column every code is accepted. Returns the
/// number of codes newly added.
pub fn add_supplier_b(
    set: &mut AvailabilitySet,
    table: &Table,
    columns: &SupplierBColumns,
    log: &mut RunLog,
) -> usize {
    let Some(code_idx) = table.column(&columns.code) else {
        log.warn(format!(
            "   WARNING: code column '{}' not found in supplier B list, no codes loaded",
            columns.code
        ));
        return 0;
    };
    let qty_idx = table.column(&columns.qty);
    if qty_idx.is_none() {
        log.warn(format!(
            "   WARNING: quantity column '{}' not found in supplier B list, all codes treated as available",
            columns.qty
        ));
    }

    let mut added = 0;
    for row in 0..table.len() {
        if qty_idx.is_some() {
            if let Ok(qty) = parse_numeric(table.cell(row, qty_idx)) {
                if qty <= 0.0 {
                    continue;
                }
            }
        }
        let code = clean_code(table.cell(row, Some(code_idx)));
        if code.is_empty() {
            continue;
        }
        if set.insert(code) {
            added += 1;
        }
    }

    added
}
