use serde::Serialize;

use stocktake_core::normalize::{format_date, format_price};
use stocktake_core::{Field, Product, RawRow, Store, StoreError};

/// One flat backup record. Field order is the file's column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupRow {
    #[serde(rename = "product_name")]
    pub name: String,
    #[serde(rename = "product_price")]
    pub price: String,
    #[serde(rename = "product_quantity")]
    pub quantity: String,
    #[serde(rename = "date_updated")]
    pub updated_at: String,
}

/// Header row written before any [`BackupRow`].
pub const BACKUP_COLUMNS: [&str; 4] = [
    Field::Name.column(),
    Field::Price.column(),
    Field::Quantity.column(),
    Field::Date.column(),
];

impl From<&Product> for BackupRow {
    fn from(p: &Product) -> Self {
        Self {
            name: p.name.clone(),
            price: format_price(p.price_cents),
            quantity: p.quantity.to_string(),
            updated_at: format_date(p.updated_at),
        }
    }
}

impl BackupRow {
    /// The same record as an import row, for in-process re-import.
    pub fn to_raw_row(&self, line: usize) -> RawRow {
        RawRow::new(line)
            .with(Field::Name.column(), &self.name)
            .with(Field::Price.column(), &self.price)
            .with(Field::Quantity.column(), &self.quantity)
            .with(Field::Date.column(), &self.updated_at)
    }
}

/// Snapshot every stored product, in id order, as backup rows. Read-only.
pub fn snapshot<S: Store + ?Sized>(store: &S) -> Result<Vec<BackupRow>, StoreError> {
    let rows: Vec<BackupRow> = store.list_all()?.iter().map(BackupRow::from).collect();
    log::info!("backup snapshot: {} products", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::import_rows;
    use chrono::NaiveDate;
    use stocktake_core::{Candidate, MemoryStore};

    fn seeded() -> MemoryStore {
        let mut store = MemoryStore::new();
        for (name, cents, qty, day) in [("Widget - Economy", 1250, 3, 2), ("Gizmo", 5, 0, 9)] {
            store
                .insert(&Candidate {
                    name: name.into(),
                    quantity: qty,
                    price_cents: cents,
                    updated_at: NaiveDate::from_ymd_opt(2020, 1, day).unwrap(),
                })
                .unwrap();
        }
        store
    }

    #[test]
    fn rows_follow_id_order_and_text_formats() {
        let rows = snapshot(&seeded()).unwrap();
        assert_eq!(
            rows[0],
            BackupRow {
                name: "Widget - Economy".into(),
                price: "$12.50".into(),
                quantity: "3".into(),
                updated_at: "01/02/2020".into(),
            }
        );
        assert_eq!(rows[1].price, "$0.05");
    }

    #[test]
    fn snapshot_does_not_mutate() {
        let store = seeded();
        let before = store.list_all().unwrap();
        snapshot(&store).unwrap();
        snapshot(&store).unwrap();
        assert_eq!(store.list_all().unwrap(), before);
    }

    #[test]
    fn reimport_reproduces_store() {
        let original = seeded();
        let rows = snapshot(&original).unwrap();

        let mut restored = MemoryStore::new();
        let summary = import_rows(&mut restored, rows.iter().enumerate().map(|(i, r)| r.to_raw_row(i + 2)));
        assert!(summary.is_clean());
        assert_eq!(restored.list_all().unwrap(), original.list_all().unwrap());
    }
}
