// Native product store using SQLite

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};

use stocktake_core::{Candidate, Product, ProductId, Store, StoreError};

use crate::NATIVE_SCHEMA_VERSION;

// AUTOINCREMENT keeps ids monotonic even if rows are ever removed by hand.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    product_id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_name TEXT NOT NULL UNIQUE,
    product_quantity INTEGER NOT NULL DEFAULT 0,
    product_price INTEGER NOT NULL,   -- cents
    date_updated TEXT NOT NULL        -- YYYY-MM-DD
);

CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

const COLUMNS: &str = "product_id, product_name, product_quantity, product_price, date_updated";

// Stored date layout; sorts the same as the dates themselves.
const STORED_DATE: &str = "%Y-%m-%d";

/// SQLite-backed [`Store`]. Owns its connection for the life of the process.
pub struct SqliteStore {
    conn: Connection,
}

fn backend(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

impl SqliteStore {
    /// Open (creating if needed) the store at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(backend)?;
        let store = Self::init(conn)?;
        log::info!("opened store {} ({} products)", path.display(), store.count()?);
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory().map_err(backend)?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA).map_err(backend)?;

        let version: Option<String> = conn
            .query_row("SELECT value FROM meta WHERE key = 'schema_version'", [], |row| row.get(0))
            .optional()
            .map_err(backend)?;
        match version {
            None => {
                conn.execute(
                    "INSERT INTO meta (key, value) VALUES ('schema_version', ?1)",
                    params![NATIVE_SCHEMA_VERSION.to_string()],
                )
                .map_err(backend)?;
            }
            Some(v) if v.parse::<u32>().map_or(true, |v| v > NATIVE_SCHEMA_VERSION) => {
                return Err(StoreError::Backend(format!(
                    "store schema version {v} is newer than supported version {NATIVE_SCHEMA_VERSION}"
                )));
            }
            Some(_) => {}
        }

        Ok(Self { conn })
    }

    fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
        let date: String = row.get(4)?;
        let updated_at = NaiveDate::parse_from_str(&date, STORED_DATE)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;
        Ok(Product {
            id: ProductId(row.get(0)?),
            name: row.get(1)?,
            quantity: row.get(2)?,
            price_cents: row.get(3)?,
            updated_at,
        })
    }
}

impl Store for SqliteStore {
    fn insert(&mut self, candidate: &Candidate) -> Result<ProductId, StoreError> {
        let result = self.conn.execute(
            "INSERT INTO products (product_name, product_quantity, product_price, date_updated) VALUES (?1, ?2, ?3, ?4)",
            params![
                candidate.name,
                candidate.quantity,
                candidate.price_cents,
                candidate.updated_at.format(STORED_DATE).to_string(),
            ],
        );

        match result {
            Ok(_) => Ok(ProductId(self.conn.last_insert_rowid())),
            Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::Conflict {
                    name: candidate.name.clone(),
                })
            }
            Err(e) => Err(backend(e)),
        }
    }

    fn get(&self, id: ProductId) -> Result<Product, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM products WHERE product_id = ?1"),
                params![id.0],
                Self::product_from_row,
            )
            .optional()
            .map_err(backend)?
            .ok_or(StoreError::NotFound { id })
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Product>, StoreError> {
        self.conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM products WHERE product_name = ?1"),
                params![name],
                Self::product_from_row,
            )
            .optional()
            .map_err(backend)
    }

    fn update(&mut self, product: &Product) -> Result<(), StoreError> {
        let changed = self
            .conn
            .execute(
                "UPDATE products SET product_quantity = ?1, product_price = ?2, date_updated = ?3 WHERE product_id = ?4",
                params![
                    product.quantity,
                    product.price_cents,
                    product.updated_at.format(STORED_DATE).to_string(),
                    product.id.0,
                ],
            )
            .map_err(backend)?;

        if changed == 0 {
            return Err(StoreError::NotFound { id: product.id });
        }
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {COLUMNS} FROM products ORDER BY product_id"))
            .map_err(backend)?;
        let products = stmt
            .query_map([], Self::product_from_row)
            .map_err(backend)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(backend)?;
        Ok(products)
    }

    fn count(&self) -> Result<usize, StoreError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))
            .map_err(backend)?;
        Ok(n as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn candidate(name: &str, cents: i64, day: u32) -> Candidate {
        Candidate {
            name: name.into(),
            quantity: 4,
            price_cents: cents,
            updated_at: NaiveDate::from_ymd_opt(2020, 1, day).unwrap(),
        }
    }

    #[test]
    fn insert_get_and_find() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let id = store.insert(&candidate("Widget - Economy", 1250, 2)).unwrap();
        assert_eq!(id, ProductId(1));

        let p = store.get(id).unwrap();
        assert_eq!(p.name, "Widget - Economy");
        assert_eq!(p.price_cents, 1250);
        assert_eq!(p.quantity, 4);
        assert_eq!(p.updated_at, NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());

        assert_eq!(store.find_by_name("Widget - Economy").unwrap(), Some(p));
        assert_eq!(store.find_by_name("Gizmo").unwrap(), None);
    }

    #[test]
    fn duplicate_name_is_conflict() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.insert(&candidate("a", 1, 1)).unwrap();
        assert_eq!(
            store.insert(&candidate("a", 2, 2)).unwrap_err(),
            StoreError::Conflict { name: "a".into() }
        );
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn missing_handle_is_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(
            store.get(ProductId(3)).unwrap_err(),
            StoreError::NotFound { id: ProductId(3) }
        );
    }

    #[test]
    fn update_overwrites_values() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let id = store.insert(&candidate("a", 1, 1)).unwrap();
        let mut p = store.get(id).unwrap();
        p.absorb(&candidate("a", 900, 9));
        store.update(&p).unwrap();
        assert_eq!(store.get(id).unwrap(), p);
    }

    #[test]
    fn update_of_unknown_id_is_not_found() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let ghost = Product::from_candidate(ProductId(7), &candidate("ghost", 1, 1));
        assert_eq!(
            store.update(&ghost).unwrap_err(),
            StoreError::NotFound { id: ProductId(7) }
        );
    }

    #[test]
    fn list_all_in_id_order() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        for name in ["zeta", "alpha", "mid"] {
            store.insert(&candidate(name, 1, 1)).unwrap();
        }
        let names: Vec<_> = store.list_all().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn persists_across_reopen_without_reusing_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inventory.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.insert(&candidate("a", 1, 1)).unwrap();
            store.insert(&candidate("b", 2, 1)).unwrap();
            // Simulate an out-of-band delete of the newest row.
            store.conn.execute("DELETE FROM products WHERE product_id = 2", []).unwrap();
        }

        let mut store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get(ProductId(1)).unwrap().name, "a");
        assert_eq!(store.insert(&candidate("c", 3, 1)).unwrap(), ProductId(3));
    }

    #[test]
    fn rejects_newer_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("future.db");
        {
            SqliteStore::open(&path).unwrap();
            let conn = Connection::open(&path).unwrap();
            conn.execute("UPDATE meta SET value = '99' WHERE key = 'schema_version'", []).unwrap();
        }
        assert!(matches!(SqliteStore::open(&path), Err(StoreError::Backend(_))));
    }
}
