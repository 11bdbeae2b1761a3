//! `stocksync-recon`: inventory, cost and price reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded tables and a markup table, returns
//! the filtered update table, the duplicate report and the run log. Only the
//! markup side file is read from disk here.

pub mod availability;
pub mod changelog;
pub mod config;
pub mod duplicates;
pub mod engine;
pub mod error;
pub mod inventory;
pub mod journal;
pub mod markup;
pub mod model;
pub mod normalize;
pub mod pricing;

pub use availability::AvailabilitySet;
pub use config::SyncConfig;
pub use engine::{load_csv_table, run, run_lenient, run_with_log};
pub use error::{ParseError, SyncError};
pub use journal::RunLog;
pub use markup::MarkupTable;
pub use model::{DuplicateEntry, SyncInput, SyncResult, Table};
