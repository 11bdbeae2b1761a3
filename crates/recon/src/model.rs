use std::collections::BTreeSet;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// An in-memory table of string cells with a header row.
///
/// Rows are padded or truncated to the header width on insertion, so every
/// cell lookup by column index is in bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    /// Build a table from string literals. Mostly useful in tests.
    pub fn from_rows(headers: &[&str], rows: &[&[&str]]) -> Self {
        let mut table = Self::new(headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|c| c.to_string()).collect());
        }
        table
    }

    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Index of the first header equal to `name` (surrounding whitespace ignored).
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (`row`, `col`), or `""` when either index is absent.
    pub fn cell(&self, row: usize, col: Option<usize>) -> &str {
        match col {
            Some(c) => self
                .rows
                .get(row)
                .and_then(|r| r.get(c))
                .map(String::as_str)
                .unwrap_or(""),
            None => "",
        }
    }
}

/// Read a cell from a single row by optional column index.
pub fn field(row: &[String], col: Option<usize>) -> &str {
    col.and_then(|c| row.get(c)).map(String::as_str).unwrap_or("")
}

/// The three raw tables of one run.
#[derive(Debug, Clone, Default)]
pub struct SyncInput {
    /// Retail-platform product export whose fields are being corrected.
    pub target: Table,
    /// Supplier A stock list (trademark + two code columns).
    pub supplier_a: Table,
    /// Supplier B stock list (code + residual quantity).
    pub supplier_b: Table,
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// One occurrence of a supplier code that appears on more than one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateEntry {
    #[serde(rename = "Code")]
    pub code: String,
    /// 1-based data row index in the supplier table.
    #[serde(rename = "Row_Index")]
    pub row_index: usize,
    #[serde(rename = "Trademark")]
    pub trademark: String,
    #[serde(rename = "Is_Valid_Trademark")]
    pub is_valid_trademark: bool,
}

/// Which supplier a target row's cost and price derive from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ProductSource {
    /// Supplier B, fixed markup.
    #[serde(rename = "BBR")]
    Bbr,
    /// Supplier A, per-brand markup.
    #[serde(rename = "MCWS")]
    Mcws,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl std::fmt::Display for ProductSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bbr => write!(f, "BBR"),
            Self::Mcws => write!(f, "MCWS"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AvailabilityStats {
    pub supplier_a_codes: usize,
    pub supplier_b_codes: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventoryStats {
    /// Every target row seen, including blank and duplicate SKUs.
    pub total: usize,
    /// Distinct non-empty SKUs carried into the working table.
    pub processed: usize,
    /// 0 → 1 transitions.
    pub activations: usize,
    /// 1 → 0 transitions.
    pub deactivations: usize,
    /// Rows dropped by the legacy `KK` prefix rule (zero unless enabled).
    pub skipped_kk: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PricingStats {
    pub total_bbr: usize,
    pub total_mcws: usize,
    pub total_unknown: usize,
    pub cost_updates_bbr: usize,
    pub cost_updates_mcws: usize,
    pub price_updates_bbr: usize,
    pub price_updates_mcws: usize,
    pub missing_markup_brands: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeLogStats {
    /// Rows with a qty or cost change (plus new products).
    pub changed_rows: usize,
    /// Rows whose only delta was a price recomputation.
    pub price_only_rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub availability: AvailabilityStats,
    pub inventory: InventoryStats,
    pub pricing: PricingStats,
    pub change_log: ChangeLogStats,
    pub duplicates: usize,
    pub markup_brands: usize,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct SyncMeta {
    pub engine_version: String,
    pub run_at: String,
}

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct SyncResult {
    pub meta: SyncMeta,
    /// Changed target rows only, with the change log appended as last column.
    pub output: Table,
    pub duplicates: Vec<DuplicateEntry>,
    pub log: Vec<String>,
    pub stats: SyncStats,
}
