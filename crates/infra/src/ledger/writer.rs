use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, instrument, warn};

use holdbook_accounting::{LedgerEntry, SimpleEntry, Transfer, post_simple, post_transfer};
use holdbook_core::DomainError;

use super::cache::LedgerCache;
use super::rows::{encode, header_row};
use crate::table_store::{Row, TableRef, TableStore, TableStoreError};

#[derive(Debug, Error)]
pub enum LedgerWriteError {
    /// Input rejected before anything was written.
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// The store refused or could not be reached; nothing was applied.
    #[error("ledger store unavailable: {0}")]
    StoreUnavailable(#[from] TableStoreError),
}

/// Appends ledger rows to the ledger sheet.
///
/// Validation happens in `holdbook-accounting` before any store call; each
/// record operation is a single atomic batch, so a failure never leaves a
/// partial transfer behind.
pub struct LedgerWriter<S> {
    store: S,
    sheet: TableRef,
    cache: Arc<LedgerCache>,
    header_ready: AtomicBool,
}

impl<S: TableStore> LedgerWriter<S> {
    pub fn new(store: S, sheet: TableRef, cache: Arc<LedgerCache>) -> Self {
        Self {
            store,
            sheet,
            cache,
            header_ready: AtomicBool::new(false),
        }
    }

    #[instrument(
        skip(self, entry),
        fields(
            account = %entry.account,
            category = %entry.category,
            amount = %entry.amount,
            direction = ?entry.direction
        ),
        err
    )]
    pub async fn record_simple(
        &self,
        entry: &SimpleEntry,
        today: NaiveDate,
    ) -> Result<LedgerEntry, LedgerWriteError> {
        let posted = post_simple(entry, today)?;
        self.append(vec![encode(&posted)]).await?;
        info!(date = %posted.date, "ledger entry recorded");
        Ok(posted)
    }

    #[instrument(
        skip(self, transfer),
        fields(
            source = %transfer.source,
            target = %transfer.target,
            amount = %transfer.amount
        ),
        err
    )]
    pub async fn record_transfer(
        &self,
        transfer: &Transfer,
        today: NaiveDate,
    ) -> Result<[LedgerEntry; 2], LedgerWriteError> {
        let posted = post_transfer(transfer, today)?;
        self.append(posted.iter().map(encode).collect()).await?;
        info!(date = %posted[0].date, "transfer recorded");
        Ok(posted)
    }

    async fn append(&self, rows: Vec<Row>) -> Result<(), TableStoreError> {
        let rows = self.with_header(rows).await?;
        let result = self.store.append_batch(&self.sheet, rows).await;
        match &result {
            Ok(()) => {
                self.header_ready.store(true, Ordering::Release);
                self.cache.invalidate();
            }
            Err(err) => warn!(sheet = %self.sheet, error = %err, "ledger append failed"),
        }
        result
    }

    /// Prefix the header when the sheet is still empty. Checked once per
    /// writer; a duplicated header from a concurrent first write is skipped
    /// by the reader.
    async fn with_header(&self, mut rows: Vec<Row>) -> Result<Vec<Row>, TableStoreError> {
        if self.header_ready.load(Ordering::Acquire) {
            return Ok(rows);
        }
        let empty = match self.store.read_all(&self.sheet).await {
            Ok(existing) => existing.is_empty(),
            Err(TableStoreError::UnknownSheet(_)) => true,
            Err(err) => {
                warn!(sheet = %self.sheet, error = %err, "ledger append failed");
                return Err(err);
            }
        };
        if empty {
            rows.insert(0, header_row());
        } else {
            self.header_ready.store(true, Ordering::Release);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table_store::{Cell, InMemoryTableStore};
    use holdbook_accounting::{Account, Amount, Category, Direction};

    fn sheet() -> TableRef {
        TableRef::new("Finance_DB", "data")
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn writer() -> (Arc<InMemoryTableStore>, LedgerWriter<Arc<InMemoryTableStore>>) {
        let store = Arc::new(InMemoryTableStore::new());
        let writer = LedgerWriter::new(store.clone(), sheet(), Arc::new(LedgerCache::new()));
        (store, writer)
    }

    fn revenue(amount: i64) -> SimpleEntry {
        SimpleEntry {
            date: None,
            account: Account::Pp,
            category: Category::Revenue,
            amount: Amount::new(amount).unwrap(),
            direction: Direction::Income,
            project: String::new(),
            comment: String::new(),
        }
    }

    fn transfer(source: Account, target: Account) -> Transfer {
        Transfer {
            date: None,
            source,
            target,
            amount: Amount::new(250).unwrap(),
            comment: "float".to_string(),
        }
    }

    #[tokio::test]
    async fn first_write_adds_header_then_row() {
        let (store, writer) = writer();
        writer.record_simple(&revenue(5000), today()).await.unwrap();
        writer.record_simple(&revenue(10), today()).await.unwrap();

        let rows = store.read_all(&sheet()).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], header_row());
        assert_eq!(
            rows[1],
            vec![
                Cell::from("2024-06-15"),
                Cell::from("PP"),
                Cell::from("revenue"),
                Cell::from(""),
                Cell::Int(5000),
                Cell::Int(0),
                Cell::from(""),
            ]
        );
    }

    #[tokio::test]
    async fn existing_sheet_gets_no_second_header() {
        let store = Arc::new(InMemoryTableStore::new().with_sheet(sheet(), vec![header_row()]));
        let writer = LedgerWriter::new(store.clone(), sheet(), Arc::new(LedgerCache::new()));
        writer.record_simple(&revenue(1), today()).await.unwrap();
        assert_eq!(store.row_count(&sheet()), 2);
    }

    #[tokio::test]
    async fn transfer_appends_exactly_two_rows() {
        let (store, writer) = writer();
        writer
            .record_transfer(&transfer(Account::Pp, Account::Cash), today())
            .await
            .unwrap();

        let rows = store.read_all(&sheet()).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][1], Cell::from("PP"));
        assert_eq!(rows[1][5], Cell::Int(250));
        assert_eq!(rows[1][6], Cell::from("to Cash: float"));
        assert_eq!(rows[2][1], Cell::from("Cash"));
        assert_eq!(rows[2][4], Cell::Int(250));
        assert_eq!(rows[2][6], Cell::from("from PP: float"));
    }

    #[tokio::test]
    async fn same_account_transfer_writes_nothing() {
        let (store, writer) = writer();
        let err = writer
            .record_transfer(&transfer(Account::IpD, Account::IpD), today())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerWriteError::Validation(_)));
        assert_eq!(err.to_string(), "validation failed: accounts must differ");
        assert_eq!(store.row_count(&sheet()), 0);
    }

    #[tokio::test]
    async fn unreachable_store_surfaces_store_unavailable() {
        let (store, writer) = writer();
        store.set_reachable(false);
        let err = writer
            .record_transfer(&transfer(Account::Pp, Account::IpSh), today())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerWriteError::StoreUnavailable(_)));

        store.set_reachable(true);
        assert_eq!(store.row_count(&sheet()), 0);
    }
}
