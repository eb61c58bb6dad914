//! Store contract plus an in-memory implementation.
//!
//! The SQLite-backed store lives in `stocktake-io`; both are driven through
//! [`Store`] so the reconciler never knows which one it holds.

use std::collections::{BTreeMap, HashMap};

use crate::error::StoreError;
use crate::model::{Candidate, Product, ProductId};

/// Keyed collection of current products.
///
/// Reads take `&self`, mutations `&mut self`. Implementations are expected to
/// be driven by a single actor; callers sharing one across threads must lock
/// around the lookup-then-update sequence used by reconciliation.
pub trait Store {
    /// Persist a new product and return its freshly assigned handle.
    /// Fails with [`StoreError::Conflict`] if the name is already stored.
    fn insert(&mut self, candidate: &Candidate) -> Result<ProductId, StoreError>;

    /// Fetch by handle. Fails with [`StoreError::NotFound`].
    fn get(&self, id: ProductId) -> Result<Product, StoreError>;

    /// Fetch by identity key. Absence is `Ok(None)`.
    fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError>;

    /// Overwrite the product sharing `product.id`. The product must exist.
    fn update(&mut self, product: &Product) -> Result<(), StoreError>;

    /// All products in ascending id order.
    fn list_all(&self) -> Result<Vec<Product>, StoreError>;

    fn count(&self) -> Result<usize, StoreError>;
}

/// Volatile store used by tests and dry runs.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    products: BTreeMap<ProductId, Product>,
    by_name: HashMap<String, ProductId>,
    next_id: i64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            products: BTreeMap::new(),
            by_name: HashMap::new(),
            next_id: 1,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn insert(&mut self, candidate: &Candidate) -> Result<ProductId, StoreError> {
        if self.by_name.contains_key(&candidate.name) {
            return Err(StoreError::Conflict {
                name: candidate.name.clone(),
            });
        }
        let id = ProductId(self.next_id);
        self.next_id += 1;
        self.by_name.insert(candidate.name.clone(), id);
        self.products.insert(id, Product::from_candidate(id, candidate));
        Ok(id)
    }

    fn get(&self, id: ProductId) -> Result<Product, StoreError> {
        self.products
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        Ok(self
            .by_name
            .get(name)
            .and_then(|id| self.products.get(id))
            .cloned())
    }

    fn update(&mut self, product: &Product) -> Result<(), StoreError> {
        let slot = self
            .products
            .get_mut(&product.id)
            .ok_or(StoreError::NotFound { id: product.id })?;
        // The identity key never changes through update.
        debug_assert_eq!(slot.name, product.name);
        *slot = product.clone();
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.products.values().cloned().collect())
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self.products.len())
    }
}
