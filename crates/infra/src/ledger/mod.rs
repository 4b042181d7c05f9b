//! Ledger persistence on top of a [`TableStore`](crate::table_store::TableStore).

pub mod cache;
pub mod reader;
pub mod rows;
pub mod writer;

use std::sync::Arc;

pub use cache::{LedgerCache, LedgerSnapshot};
pub use reader::{DEFAULT_RECENT, LedgerReadError, LedgerReader};
pub use rows::RowDecodeError;
pub use writer::{LedgerWriteError, LedgerWriter};

use crate::table_store::{TableRef, TableStore};

/// Writer and reader over the same sheet, sharing one read cache.
pub fn open<S>(store: S, sheet: TableRef) -> (LedgerWriter<S>, LedgerReader<S>)
where
    S: TableStore + Clone,
{
    let cache = Arc::new(LedgerCache::new());
    (
        LedgerWriter::new(store.clone(), sheet.clone(), cache.clone()),
        LedgerReader::new(store, sheet, cache),
    )
}
