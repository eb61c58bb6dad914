//! `stocktake-recon`: last-write-wins reconciliation engine.
//!
//! Pure engine crate: receives normalized candidates or raw rows plus a
//! [`Store`](stocktake_core::Store) handle, returns tagged outcomes.
//! No CLI or file dependencies.

pub mod backup;
pub mod import;
pub mod reconcile;

pub use backup::{snapshot, BackupRow};
pub use import::{import_rows, ImportSummary, RowFailure};
pub use reconcile::{reconcile, Outcome};
