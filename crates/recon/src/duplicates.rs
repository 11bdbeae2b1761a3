use std::collections::HashMap;

use crate::config::TrademarkConfig;
use crate::model::{DuplicateEntry, Table};
use crate::normalize::{clean_code, clean_trademark};

/// Find supplier codes that occur on more than one row.
///
/// Returns the 0-based indices of duplicated rows carrying a valid trademark,
/// and one report entry per (duplicated code, occurrence). Groups are
/// reported in order of first appearance, members in row order. A missing
/// code column yields no duplicates; a missing trademark column marks every
/// occurrence invalid.
pub fn find_duplicates(
    table: &Table,
    code_column: &str,
    trademark_column: &str,
    trademarks: &TrademarkConfig,
) -> (Vec<usize>, Vec<DuplicateEntry>) {
    let Some(code_idx) = table.column(code_column) else {
        return (Vec::new(), Vec::new());
    };
    let trademark_idx = table.column(trademark_column);

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for row in 0..table.len() {
        let code = clean_code(table.cell(row, Some(code_idx)));
        if code.is_empty() {
            continue;
        }
        groups
            .entry(code.clone())
            .or_insert_with(|| {
                order.push(code);
                Vec::new()
            })
            .push(row);
    }

    let mut valid_rows = Vec::new();
    let mut report = Vec::new();
    for code in order {
        let rows = &groups[&code];
        if rows.len() < 2 {
            continue;
        }
        for &row in rows {
            let trademark = clean_trademark(table.cell(row, trademark_idx));
            let is_valid_trademark = trademarks.is_valid(&trademark);
            if is_valid_trademark {
                valid_rows.push(row);
            }
            report.push(DuplicateEntry {
                code: code.clone(),
                row_index: row + 1,
                trademark,
                is_valid_trademark,
            });
        }
    }

    (valid_rows, report)
}
