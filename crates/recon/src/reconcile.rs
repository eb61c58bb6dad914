use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use stocktake_core::{Candidate, ProductId, Store, StoreError};

/// What reconciliation did with a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// First time this name was seen; a new product was inserted.
    Created { id: ProductId },
    /// The candidate was at least as new as the stored value and replaced it.
    Updated { id: ProductId },
    /// The stored value is newer; the candidate was dropped.
    Ignored { id: ProductId, kept: NaiveDate },
}

impl Outcome {
    pub fn id(&self) -> ProductId {
        match self {
            Self::Created { id } | Self::Updated { id } | Self::Ignored { id, .. } => *id,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { id } => write!(f, "created product {id}"),
            Self::Updated { id } => write!(f, "updated product {id}"),
            Self::Ignored { id, kept } => {
                write!(f, "kept product {id} (stored value from {kept} is newer)")
            }
        }
    }
}

/// Merge one candidate into the store under last-write-wins.
///
/// The provenance date decides, not arrival order. Ties go to the candidate,
/// so re-applying the same candidate is an `Updated` no-op. A stale candidate
/// is a normal outcome; only store failures are errors.
pub fn reconcile<S: Store + ?Sized>(store: &mut S, candidate: &Candidate) -> Result<Outcome, StoreError> {
    let Some(mut existing) = store.find_by_name(&candidate.name)? else {
        let id = store.insert(candidate)?;
        log::debug!("'{}': created as {id}", candidate.name);
        return Ok(Outcome::Created { id });
    };

    if candidate.updated_at >= existing.updated_at {
        existing.absorb(candidate);
        store.update(&existing)?;
        log::debug!("'{}': updated {} to {}", candidate.name, existing.id, candidate.updated_at);
        Ok(Outcome::Updated { id: existing.id })
    } else {
        log::debug!(
            "'{}': ignored candidate from {} (stored {})",
            candidate.name,
            candidate.updated_at,
            existing.updated_at
        );
        Ok(Outcome::Ignored {
            id: existing.id,
            kept: existing.updated_at,
        })
    }
}
