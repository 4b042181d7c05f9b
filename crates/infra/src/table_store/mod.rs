//! Append-only tabular store boundary.
//!
//! Rows are addressed by table + sheet, mirroring a spreadsheet workbook. The
//! ledger and the report snapshot both live behind this trait.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryTableStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresTableStore;
pub use r#trait::{Cell, Row, TableRef, TableStore, TableStoreError};
