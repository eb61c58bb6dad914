use std::fmt;

use thiserror::Error;

use crate::model::ProductId;

/// Which raw field a [`ParseError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Price,
    Quantity,
    Date,
}

impl Field {
    /// Column header used for this field in import and backup files.
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Name => "product_name",
            Self::Price => "product_price",
            Self::Quantity => "product_quantity",
            Self::Date => "date_updated",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Price => write!(f, "price"),
            Self::Quantity => write!(f, "quantity"),
            Self::Date => write!(f, "date"),
        }
    }
}

/// A raw field could not be converted to its typed form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse {field} '{value}': {reason}")]
pub struct ParseError {
    pub field: Field,
    pub value: String,
    pub reason: String,
}

impl ParseError {
    pub fn new(field: Field, value: &str, reason: impl Into<String>) -> Self {
        Self {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// `insert` was called for a name that is already stored.
    #[error("a product named '{name}' already exists")]
    Conflict { name: String },
    /// No product carries this handle.
    #[error("no product with id {id}")]
    NotFound { id: ProductId },
    /// The backing storage failed (SQLite I/O, corrupt row, ...).
    #[error("store error: {0}")]
    Backend(String),
}

/// Reason a single input row or manual entry was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
