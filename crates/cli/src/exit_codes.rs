//! CLI Exit Code Registry
//!
//! Single source of truth for `stocksync` exit codes. Scripts that schedule
//! the sync rely on them.
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Success                                          |
//! | 2    | Usage error (bad arguments)                      |
//! | 3    | Configuration file unreadable or invalid         |
//! | 4    | Input table could not be read                    |
//! | 5    | Target table lacks a required column             |
//! | 6    | Output file could not be written                 |
//!
//! A run that changes nothing still exits 0.

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Config file missing, not TOML, or rejected by validation.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Target or supplier table unreadable (missing file, unknown format, no header).
pub const EXIT_INPUT_READ: u8 = 4;

/// SKU or quantity column absent from the target table.
pub const EXIT_MISSING_COLUMN: u8 = 5;

/// Update table or duplicate report could not be written.
pub const EXIT_OUTPUT_WRITE: u8 = 6;
