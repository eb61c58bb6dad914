// File I/O operations

pub mod csv;
pub mod native;

pub use native::SqliteStore;

use stocktake_core::StoreError;

/// Native store schema version, kept in the `meta` table.
/// Increment when the schema changes in a way that old versions can't read.
pub const NATIVE_SCHEMA_VERSION: u32 = 1;

/// File-level failures. Row-level problems never surface here; they are
/// collected in the import summary instead.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("missing column '{column}' in header row")]
    MissingColumn { column: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}
