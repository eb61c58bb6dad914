use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Store-assigned handle. Assigned once on creation, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A stored catalog record. `name` is the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price_cents: i64,
    pub updated_at: NaiveDate,
}

impl Product {
    /// Build the stored form of a candidate once the store has picked its id.
    pub fn from_candidate(id: ProductId, candidate: &Candidate) -> Self {
        Self {
            id,
            name: candidate.name.clone(),
            quantity: candidate.quantity,
            price_cents: candidate.price_cents,
            updated_at: candidate.updated_at,
        }
    }

    /// Overwrite the value fields with a winning candidate. `id` and `name` stay.
    pub fn absorb(&mut self, candidate: &Candidate) {
        self.quantity = candidate.quantity;
        self.price_cents = candidate.price_cents;
        self.updated_at = candidate.updated_at;
    }
}

/// A normalized incoming record, not yet reconciled against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub quantity: u32,
    pub price_cents: i64,
    pub updated_at: NaiveDate,
}

// ---------------------------------------------------------------------------
// Raw input
// ---------------------------------------------------------------------------

/// One raw input row: column name → raw text, plus where it came from.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    /// 1-based line number in the source file (0 for manual entry).
    pub line: usize,
    pub fields: HashMap<String, String>,
}

impl RawRow {
    pub fn new(line: usize) -> Self {
        Self {
            line,
            fields: HashMap::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with(mut self, column: &str, value: &str) -> Self {
        self.fields.insert(column.to_string(), value.to_string());
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}
