// Delimited import/export

use std::io::{Read, Write};
use std::path::Path;

use stocktake_core::{Field, RawRow, Store};
use stocktake_recon::backup::BACKUP_COLUMNS;
use stocktake_recon::{import_rows, snapshot, BackupRow, ImportSummary};

use crate::IoError;

const REQUIRED: [Field; 4] = [Field::Name, Field::Price, Field::Quantity, Field::Date];

/// Import a delimited file into the store, reconciling row by row.
///
/// File-level problems (unreadable file, missing header column) fail before
/// any row is applied. Row-level problems end up in the summary.
pub fn import<S: Store + ?Sized>(store: &mut S, path: &Path, delimiter: u8) -> Result<ImportSummary, IoError> {
    let content = read_file_as_utf8(path)?;
    let rows = read_rows(&content, delimiter)?;
    log::info!("importing {} rows from {}", rows.len(), path.display());
    Ok(import_rows(store, rows))
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let io_err = |source| IoError::Io {
        path: path.display().to_string(),
        source,
    };
    let mut file = std::fs::File::open(path).map_err(io_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(io_err)?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Split delimited text into raw rows keyed by header name.
///
/// The header row is required and must name all four product columns; extra
/// columns are ignored and column order does not matter. Short rows are kept
/// so the normalizer can report the missing field for that row alone.
pub fn read_rows(content: &str, delimiter: u8) -> Result<Vec<RawRow>, IoError> {
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(content.trim_start_matches('\u{feff}').as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    for field in REQUIRED {
        if !headers.iter().any(|h| h == field.column()) {
            return Err(IoError::MissingColumn {
                column: field.column().into(),
            });
        }
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1; fall back to that when the reader has no position.
        let line = record.position().map(|p| p.line() as usize).unwrap_or(idx + 2);

        let mut row = RawRow::new(line);
        for (header, value) in headers.iter().zip(record.iter()) {
            row.fields.insert(header.clone(), value.to_string());
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Write a backup of the whole store to `path`. Returns the number of products.
pub fn export<S: Store + ?Sized>(store: &S, path: &Path, delimiter: u8) -> Result<usize, IoError> {
    let file = std::fs::File::create(path).map_err(|source| IoError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let rows = snapshot(store)?;
    write_backup(&rows, file, delimiter)?;
    log::info!("backed up {} products to {}", rows.len(), path.display());
    Ok(rows.len())
}

/// Write the header row then every backup row, in order.
pub fn write_backup<W: Write>(rows: &[BackupRow], out: W, delimiter: u8) -> Result<(), IoError> {
    let mut writer = ::csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(out);

    writer.write_record(BACKUP_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|source| IoError::Io {
        path: "<backup>".into(),
        source,
    })?;
    Ok(())
}
