use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use holdbook_accounting::{LedgerEntry, LedgerSummary, summarize};

use super::cache::{LedgerCache, LedgerSnapshot};
use super::rows::{decode, is_header};
use crate::table_store::{TableRef, TableStore, TableStoreError};

/// Default number of rows shown as recent activity.
pub const DEFAULT_RECENT: usize = 15;

#[derive(Debug, Error)]
pub enum LedgerReadError {
    #[error("ledger store unavailable: {0}")]
    StoreUnavailable(#[from] TableStoreError),
}

/// Read side of the ledger sheet, served through [`LedgerCache`].
pub struct LedgerReader<S> {
    store: S,
    sheet: TableRef,
    cache: Arc<LedgerCache>,
}

impl<S: TableStore> LedgerReader<S> {
    pub fn new(store: S, sheet: TableRef, cache: Arc<LedgerCache>) -> Self {
        Self {
            store,
            sheet,
            cache,
        }
    }

    /// All parseable rows in append order. A sheet that does not exist yet
    /// reads as an empty ledger.
    pub async fn entries(&self) -> Result<Arc<LedgerSnapshot>, LedgerReadError> {
        if let Some(snapshot) = self.cache.get() {
            return Ok(snapshot);
        }

        let generation = self.cache.generation();
        let rows = match self.store.read_all(&self.sheet).await {
            Ok(rows) => rows,
            Err(TableStoreError::UnknownSheet(_)) => Vec::new(),
            Err(err) => {
                warn!(sheet = %self.sheet, error = %err, "ledger read failed");
                return Err(err.into());
            }
        };

        let mut snapshot = LedgerSnapshot::default();
        for (idx, row) in rows.iter().enumerate() {
            if is_header(row) {
                continue;
            }
            match decode(row) {
                Ok(entry) => snapshot.entries.push(entry),
                Err(err) => {
                    warn!(sheet = %self.sheet, row = idx + 1, error = %err, "skipping unparseable ledger row");
                    snapshot.skipped += 1;
                }
            }
        }
        debug!(
            sheet = %self.sheet,
            entries = snapshot.entries.len(),
            skipped = snapshot.skipped,
            "ledger loaded"
        );

        let snapshot = Arc::new(snapshot);
        self.cache.fill(generation, snapshot.clone());
        Ok(snapshot)
    }

    /// The last `limit` entries, oldest first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<LedgerEntry>, LedgerReadError> {
        let snapshot = self.entries().await?;
        Ok(snapshot.recent(limit).to_vec())
    }

    pub async fn summary(&self) -> Result<LedgerSummary, LedgerReadError> {
        let snapshot = self.entries().await?;
        Ok(summarize(&snapshot.entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{LedgerWriter, rows::encode};
    use crate::table_store::{Cell, InMemoryTableStore};
    use chrono::NaiveDate;
    use holdbook_accounting::{Account, Amount, Category, Direction, SimpleEntry, Transfer};

    fn sheet() -> TableRef {
        TableRef::new("Finance_DB", "data")
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    struct Fixture {
        store: Arc<InMemoryTableStore>,
        writer: LedgerWriter<Arc<InMemoryTableStore>>,
        reader: LedgerReader<Arc<InMemoryTableStore>>,
    }

    fn fixture(store: InMemoryTableStore) -> Fixture {
        let store = Arc::new(store);
        let cache = Arc::new(LedgerCache::new());
        Fixture {
            writer: LedgerWriter::new(store.clone(), sheet(), cache.clone()),
            reader: LedgerReader::new(store.clone(), sheet(), cache),
            store,
        }
    }

    fn entry(amount: i64, direction: Direction, category: Category) -> SimpleEntry {
        SimpleEntry {
            date: None,
            account: Account::Pp,
            category,
            amount: Amount::new(amount).unwrap(),
            direction,
            project: String::new(),
            comment: String::new(),
        }
    }

    #[tokio::test]
    async fn missing_sheet_reads_as_empty_ledger() {
        let f = fixture(InMemoryTableStore::new());
        let snapshot = f.reader.entries().await.unwrap();
        assert!(snapshot.entries.is_empty());
        assert_eq!(f.reader.summary().await.unwrap(), LedgerSummary::default());
    }

    #[tokio::test]
    async fn repeated_reads_without_writes_are_identical() {
        let f = fixture(InMemoryTableStore::new());
        f.writer
            .record_simple(&entry(5000, Direction::Income, Category::Revenue), today())
            .await
            .unwrap();

        let first = f.reader.entries().await.unwrap();
        let second = f.reader.entries().await.unwrap();
        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn writes_invalidate_the_cache() {
        let f = fixture(InMemoryTableStore::new());
        f.writer
            .record_simple(&entry(5000, Direction::Income, Category::Revenue), today())
            .await
            .unwrap();
        assert_eq!(f.reader.summary().await.unwrap().net_profit, 5000);

        f.writer
            .record_simple(&entry(1200, Direction::Expense, Category::Payroll), today())
            .await
            .unwrap();
        let summary = f.reader.summary().await.unwrap();
        assert_eq!(summary.net_profit, 3800);
        assert_eq!(summary.cash_on_hand, 3800);
    }

    #[tokio::test]
    async fn transfers_move_cash_between_accounts_without_touching_profit() {
        let f = fixture(InMemoryTableStore::new());
        f.writer
            .record_simple(&entry(1000, Direction::Income, Category::Revenue), today())
            .await
            .unwrap();
        f.writer
            .record_transfer(
                &Transfer {
                    date: None,
                    source: Account::Pp,
                    target: Account::Cash,
                    amount: Amount::new(400).unwrap(),
                    comment: String::new(),
                },
                today(),
            )
            .await
            .unwrap();

        let summary = f.reader.summary().await.unwrap();
        assert_eq!(summary.net_profit, 1000);
        assert_eq!(summary.gross_revenue, 1000);
        assert_eq!(summary.cash_on_hand, 1000);
        assert_eq!(summary.by_account[&Account::Pp], 600);
        assert_eq!(summary.by_account[&Account::Cash], 400);
    }

    #[tokio::test]
    async fn unparseable_rows_are_skipped_and_counted() {
        let good = encode(&LedgerEntry {
            date: today(),
            account: Account::IpSh,
            category: Category::Taxes,
            project: String::new(),
            income: Amount::ZERO,
            expense: Amount::new(90).unwrap(),
            comment: String::new(),
        });
        let bad = vec![Cell::from("yesterday"), Cell::from("PP")];
        let f = fixture(InMemoryTableStore::new().with_sheet(sheet(), vec![good, bad]));

        let snapshot = f.reader.entries().await.unwrap();
        assert_eq!(snapshot.entries.len(), 1);
        assert_eq!(snapshot.skipped, 1);
    }

    #[tokio::test]
    async fn recent_returns_the_tail_in_append_order() {
        let f = fixture(InMemoryTableStore::new());
        for amount in 1..=20 {
            f.writer
                .record_simple(&entry(amount, Direction::Income, Category::Revenue), today())
                .await
                .unwrap();
        }

        let recent = f.reader.recent(DEFAULT_RECENT).await.unwrap();
        assert_eq!(recent.len(), 15);
        assert_eq!(recent.first().unwrap().income.value(), 6);
        assert_eq!(recent.last().unwrap().income.value(), 20);
        assert_eq!(f.reader.recent(100).await.unwrap().len(), 20);
    }

    #[tokio::test]
    async fn store_outage_is_reported_not_cached() {
        let f = fixture(InMemoryTableStore::new());
        f.store.set_reachable(false);
        assert!(matches!(
            f.reader.entries().await,
            Err(LedgerReadError::StoreUnavailable(_))
        ));
        f.store.set_reachable(true);
        assert!(f.reader.entries().await.is_ok());
    }
}
