use serde::Deserialize;

use crate::error::SyncError;
use crate::normalize::clean_trademark;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Column names, trademark filter and pricing constants for a run.
///
/// Every section is optional in TOML; omitted fields take the defaults of the
/// standard product export and supplier list layouts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    pub target: TargetColumns,
    pub supplier_a: SupplierAColumns,
    pub supplier_b: SupplierBColumns,
    pub trademarks: TrademarkConfig,
    pub pricing: PricingConfig,
    pub inventory: InventoryConfig,
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetColumns {
    pub sku: String,
    pub qty: String,
    pub cost: String,
    pub price: String,
    pub tags: String,
    /// Per-row supplier B cost carried in the export.
    pub supplier_b_cost: String,
    /// Per-row supplier A net price carried in the export.
    pub supplier_a_net_price: String,
}

impl Default for TargetColumns {
    fn default() -> Self {
        Self {
            sku: "Variant SKU".into(),
            qty: "Variant Inventory Qty".into(),
            cost: "Variant Cost".into(),
            price: "Variant Price".into(),
            tags: "Tags".into(),
            supplier_b_cost: "CostoBBRModels".into(),
            supplier_a_net_price: "Net Price".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SupplierAColumns {
    pub primary_code: String,
    pub secondary_code: String,
    pub trademark: String,
}

impl Default for SupplierAColumns {
    fn default() -> Self {
        Self {
            primary_code: "Our Code".into(),
            secondary_code: "Code".into(),
            trademark: "Trademark".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SupplierBColumns {
    pub code: String,
    pub qty: String,
}

impl Default for SupplierBColumns {
    fn default() -> Self {
        Self {
            code: "DescrizioneVariante".into(),
            qty: "QtaResidua".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Trademarks
// ---------------------------------------------------------------------------

pub const DEFAULT_VALID_TRADEMARKS: &[&str] = &[
    "ACME-MODELS", "ALERTE", "AUTOART", "AVENUE43", "BBR-MODELS", "BURAGO",
    "CMC", "CMR", "ELIGOR", "ESVAL MODEL", "GP-REPLICAS", "GT-SPIRIT",
    "IXO-MODELS", "KK-SCALE", "KYOSHO", "LCD-MODEL", "LOOKSMART", "MAXIMA",
    "MINI HELMET", "MINICHAMPS", "MITICA", "MITICA-DIECAST", "MITICA-R",
    "MOTORHELIX", "MR-MODELS", "NOREV", "NZG", "OTTO-MOBILE", "RIO-MODELS",
    "SCHUCO", "SOLIDO", "SPARK-MODEL", "STAMP-MODELS", "TECNOMODEL",
    "TOPMARQUES", "TROFEU", "TRUESCALE", "WERK83", "DM-MODELS",
    "UNIVERSAL HOBBIES", "LS-COLLECTIBLES", "MCG", "SUN-STAR",
];

/// Brands accepted from supplier A. Stored normalized (see [`clean_trademark`]).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrademarkConfig {
    pub valid: Vec<String>,
}

impl Default for TrademarkConfig {
    fn default() -> Self {
        Self {
            valid: DEFAULT_VALID_TRADEMARKS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl TrademarkConfig {
    /// `trademark` must already be normalized.
    pub fn is_valid(&self, trademark: &str) -> bool {
        self.valid.iter().any(|t| t == trademark)
    }
}

// ---------------------------------------------------------------------------
// Pricing + Inventory + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PricingConfig {
    /// Fixed cost multiplier for supplier B products.
    pub supplier_b_markup: f64,
    /// Brand substrings that attribute a tagged product to supplier B.
    pub supplier_b_keywords: Vec<String>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            supplier_b_markup: 1.75,
            supplier_b_keywords: vec!["BBR".into()],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InventoryConfig {
    /// Skip target SKUs starting with `KK` entirely (legacy behavior, off by default).
    pub skip_kk_prefix: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub prefix: String,
    pub change_log_column: String,
    pub duplicates_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix: "INVENTORY_UPDATE".into(),
            change_log_column: "Change Log".into(),
            duplicates_file: "duplicates_report.csv".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl SyncConfig {
    pub fn from_toml(input: &str) -> Result<Self, SyncError> {
        let mut config: SyncConfig =
            toml::from_str(input).map_err(|e| SyncError::ConfigParse(e.to_string()))?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Normalize trademark lists and keywords so lookups compare like with like.
    pub fn normalize(&mut self) {
        self.trademarks.valid = self
            .trademarks
            .valid
            .iter()
            .map(|t| clean_trademark(t))
            .filter(|t| !t.is_empty())
            .collect();
        self.pricing.supplier_b_keywords = self
            .pricing
            .supplier_b_keywords
            .iter()
            .map(|k| clean_trademark(k))
            .filter(|k| !k.is_empty())
            .collect();
    }

    pub fn validate(&self) -> Result<(), SyncError> {
        let columns = [
            ("target.sku", &self.target.sku),
            ("target.qty", &self.target.qty),
            ("target.cost", &self.target.cost),
            ("target.price", &self.target.price),
            ("target.tags", &self.target.tags),
            ("target.supplier_b_cost", &self.target.supplier_b_cost),
            ("target.supplier_a_net_price", &self.target.supplier_a_net_price),
            ("supplier_a.primary_code", &self.supplier_a.primary_code),
            ("supplier_a.secondary_code", &self.supplier_a.secondary_code),
            ("supplier_a.trademark", &self.supplier_a.trademark),
            ("supplier_b.code", &self.supplier_b.code),
            ("supplier_b.qty", &self.supplier_b.qty),
            ("output.change_log_column", &self.output.change_log_column),
        ];
        for (key, value) in columns {
            if value.trim().is_empty() {
                return Err(SyncError::ConfigValidation(format!("{key} must not be empty")));
            }
        }

        if !(self.pricing.supplier_b_markup.is_finite() && self.pricing.supplier_b_markup > 0.0) {
            return Err(SyncError::ConfigValidation(format!(
                "pricing.supplier_b_markup must be positive, got {}",
                self.pricing.supplier_b_markup
            )));
        }

        if self.trademarks.valid.is_empty() {
            return Err(SyncError::ConfigValidation(
                "trademarks.valid must list at least one brand".into(),
            ));
        }

        if self.output.prefix.trim().is_empty() {
            return Err(SyncError::ConfigValidation("output.prefix must not be empty".into()));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
