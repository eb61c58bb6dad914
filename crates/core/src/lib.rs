//! `stocktake-core`: product model, field normalizer and the store contract.
//!
//! Everything here is synchronous and free of file or terminal I/O.

pub mod error;
pub mod model;
pub mod normalize;
pub mod store;

pub use error::{EngineError, Field, ParseError, StoreError};
pub use model::{Candidate, Product, ProductId, RawRow};
pub use store::{MemoryStore, Store};
