use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::r#trait::{Row, TableRef, TableStore, TableStoreError};

/// In-memory append-only table store.
///
/// Intended for tests/dev. Sheets are created on first append. The
/// reachability switch makes every call fail with `Unavailable`, which is how
/// tests simulate a store outage.
#[derive(Debug)]
pub struct InMemoryTableStore {
    sheets: RwLock<HashMap<TableRef, Vec<Row>>>,
    reachable: AtomicBool,
}

impl Default for InMemoryTableStore {
    fn default() -> Self {
        Self {
            sheets: RwLock::new(HashMap::new()),
            reachable: AtomicBool::new(true),
        }
    }
}

impl InMemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a sheet with rows (replacing any existing content).
    pub fn with_sheet(self, table: TableRef, rows: Vec<Row>) -> Self {
        if let Ok(mut sheets) = self.sheets.write() {
            sheets.insert(table, rows);
        }
        self
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn row_count(&self, table: &TableRef) -> usize {
        self.sheets
            .read()
            .ok()
            .and_then(|sheets| sheets.get(table).map(Vec::len))
            .unwrap_or(0)
    }

    fn ensure_reachable(&self) -> Result<(), TableStoreError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(TableStoreError::Unavailable("store is unreachable".to_string()))
        }
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn append_batch(&self, table: &TableRef, rows: Vec<Row>) -> Result<(), TableStoreError> {
        self.ensure_reachable()?;
        if rows.is_empty() {
            return Ok(());
        }
        if let Some(idx) = rows.iter().position(Vec::is_empty) {
            return Err(TableStoreError::InvalidAppend(format!(
                "batch contains an empty row (index {idx})"
            )));
        }

        let mut sheets = self
            .sheets
            .write()
            .map_err(|_| TableStoreError::Unavailable("lock poisoned".to_string()))?;
        sheets.entry(table.clone()).or_default().extend(rows);
        Ok(())
    }

    async fn read_all(&self, table: &TableRef) -> Result<Vec<Row>, TableStoreError> {
        self.ensure_reachable()?;
        let sheets = self
            .sheets
            .read()
            .map_err(|_| TableStoreError::Unavailable("lock poisoned".to_string()))?;
        sheets
            .get(table)
            .cloned()
            .ok_or_else(|| TableStoreError::UnknownSheet(table.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table_store::Cell;

    fn sheet() -> TableRef {
        TableRef::new("Finance_DB", "data")
    }

    #[tokio::test]
    async fn rows_come_back_in_append_order() {
        let store = InMemoryTableStore::new();
        store.append(&sheet(), vec![Cell::from("a")]).await.unwrap();
        store
            .append_batch(&sheet(), vec![vec![Cell::from("b")], vec![Cell::from(3)]])
            .await
            .unwrap();

        let rows = store.read_all(&sheet()).await.unwrap();
        assert_eq!(
            rows,
            vec![vec![Cell::from("a")], vec![Cell::from("b")], vec![Cell::Int(3)]]
        );
    }

    #[tokio::test]
    async fn unreachable_store_applies_nothing() {
        let store = InMemoryTableStore::new();
        store.set_reachable(false);
        let err = store
            .append_batch(&sheet(), vec![vec![Cell::from("x")], vec![Cell::from("y")]])
            .await
            .unwrap_err();
        assert!(matches!(err, TableStoreError::Unavailable(_)));

        store.set_reachable(true);
        assert_eq!(store.row_count(&sheet()), 0);
    }

    #[tokio::test]
    async fn invalid_batch_is_rejected_whole() {
        let store = InMemoryTableStore::new();
        let err = store
            .append_batch(&sheet(), vec![vec![Cell::from("x")], vec![]])
            .await
            .unwrap_err();
        assert!(matches!(err, TableStoreError::InvalidAppend(_)));
        assert_eq!(store.row_count(&sheet()), 0);
    }

    #[tokio::test]
    async fn missing_sheet_is_reported() {
        let store = InMemoryTableStore::new();
        let err = store.read_all(&TableRef::new("Finance_DB", "report")).await.unwrap_err();
        assert!(matches!(err, TableStoreError::UnknownSheet(_)));
    }
}
