//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Code | Domain    | Description                                   |
//! |------|-----------|-----------------------------------------------|
//! | 0    | Universal | Success                                       |
//! | 1    | Universal | General error (unspecified)                   |
//! | 2    | Universal | CLI usage error (bad args)                    |
//! | 3    | io        | File could not be read or written             |
//! | 4    | parse     | Field or file header could not be parsed      |
//! | 5    | store     | No product with the requested id              |
//! | 6    | import    | Import finished but some rows were rejected   |
//! | 7    | store     | Store backend failure                         |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use stocktake_core::StoreError;
use stocktake_io::IoError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Catalog (3-9)
// =============================================================================

/// Import/backup file could not be opened, read or written.
pub const EXIT_IO: u8 = 3;

/// A manual field was malformed, or an import file lacks a required column.
pub const EXIT_PARSE: u8 = 4;

/// `view` asked for an id the store never issued.
pub const EXIT_NOT_FOUND: u8 = 5;

/// Import ran to completion but rejected one or more rows.
/// Valid rows were still applied.
pub const EXIT_IMPORT_ROW_FAILURES: u8 = 6;

/// SQLite failure (cannot open, corrupt row, newer schema).
pub const EXIT_STORE: u8 = 7;

// =============================================================================
// Error mapping
// =============================================================================

/// Map a StoreError to its exit code.
pub fn store_exit_code(err: &StoreError) -> u8 {
    match err {
        StoreError::NotFound { .. } => EXIT_NOT_FOUND,
        StoreError::Backend(_) => EXIT_STORE,
        // Reconciliation never inserts blindly, so this is a bug if it happens.
        StoreError::Conflict { .. } => EXIT_ERROR,
    }
}

/// Map an IoError to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Io { .. } => EXIT_IO,
        IoError::Csv(_) => EXIT_IO,
        IoError::MissingColumn { .. } => EXIT_PARSE,
        IoError::Store(e) => store_exit_code(e),
    }
}
