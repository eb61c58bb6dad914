use serde::{Serialize, Serializer};

use stocktake_core::normalize::{normalize_row, parse_name};
use stocktake_core::{EngineError, Field, RawRow, Store};

use crate::reconcile::{reconcile, Outcome};

/// A row that was rejected. The store was not touched for it.
#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    pub line: usize,
    /// Cleaned identity key, when the name column itself was readable.
    pub name: Option<String>,
    #[serde(serialize_with = "as_display")]
    pub error: EngineError,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub rows: usize,
    pub created: usize,
    pub updated: usize,
    pub ignored: usize,
    pub failed: usize,
    pub failures: Vec<RowFailure>,
}

impl ImportSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Created { .. } => self.created += 1,
            Outcome::Updated { .. } => self.updated += 1,
            Outcome::Ignored { .. } => self.ignored += 1,
        }
    }

    fn fail(&mut self, row: &RawRow, error: EngineError) {
        let name = row.get(Field::Name.column()).and_then(|raw| parse_name(raw).ok());
        log::warn!("line {}: {error}", row.line);
        self.failed += 1;
        self.failures.push(RowFailure {
            line: row.line,
            name,
            error,
        });
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Normalize and reconcile each row in order, continuing past failures.
///
/// Rows are consumed once, front to back. A row either applies completely
/// (normalization succeeded and the store accepted the outcome) or not at all.
pub fn import_rows<S, I>(store: &mut S, rows: I) -> ImportSummary
where
    S: Store + ?Sized,
    I: IntoIterator<Item = RawRow>,
{
    let mut summary = ImportSummary::default();

    for row in rows {
        summary.rows += 1;

        let candidate = match normalize_row(&row) {
            Ok(c) => c,
            Err(e) => {
                summary.fail(&row, e.into());
                continue;
            }
        };

        match reconcile(store, &candidate) {
            Ok(outcome) => summary.record(&outcome),
            Err(e) => summary.fail(&row, e.into()),
        }
    }

    log::info!(
        "import: {} rows, {} created, {} updated, {} ignored, {} failed",
        summary.rows,
        summary.created,
        summary.updated,
        summary.ignored,
        summary.failed
    );
    summary
}

fn as_display<T: std::fmt::Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
