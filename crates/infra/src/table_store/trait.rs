use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Address of one sheet inside a named table (spreadsheet).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub table: String,
    pub sheet: String,
}

impl TableRef {
    pub fn new(table: impl Into<String>, sheet: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            sheet: sheet.into(),
        }
    }
}

impl core::fmt::Display for TableRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.table, self.sheet)
    }
}

/// A single cell value.
///
/// Numbers stay numbers so that sums computed by the store (or by a human
/// looking at the sheet) see numeric cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Int(i64),
    Text(String),
}

impl Cell {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            Cell::Int(_) => None,
        }
    }

    /// Integer value of the cell; numeric text is accepted.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Cell::Int(n) => Some(*n),
            Cell::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Text(s) if s.trim().is_empty())
    }
}

impl core::fmt::Display for Cell {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Cell::Int(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

pub type Row = Vec<Cell>;

/// Tabular store operation error.
///
/// These are infrastructure errors; validation happens before anything reaches
/// the store.
#[derive(Debug, Error)]
pub enum TableStoreError {
    #[error("table store unavailable: {0}")]
    Unavailable(String),

    #[error("unknown sheet: {0}")]
    UnknownSheet(TableRef),

    #[error("invalid append: {0}")]
    InvalidAppend(String),
}

/// Append-only tabular store addressed by table + sheet.
///
/// Implementations must:
/// - apply a batch entirely or not at all
/// - return rows of a sheet in append order
/// - never rewrite or delete an appended row
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Append a batch of rows atomically.
    async fn append_batch(&self, table: &TableRef, rows: Vec<Row>) -> Result<(), TableStoreError>;

    /// Read every row of a sheet, in append order.
    async fn read_all(&self, table: &TableRef) -> Result<Vec<Row>, TableStoreError>;

    async fn append(&self, table: &TableRef, row: Row) -> Result<(), TableStoreError> {
        self.append_batch(table, vec![row]).await
    }
}

#[async_trait]
impl<S> TableStore for Arc<S>
where
    S: TableStore + ?Sized,
{
    async fn append_batch(&self, table: &TableRef, rows: Vec<Row>) -> Result<(), TableStoreError> {
        (**self).append_batch(table, rows).await
    }

    async fn read_all(&self, table: &TableRef) -> Result<Vec<Row>, TableStoreError> {
        (**self).read_all(table).await
    }

    async fn append(&self, table: &TableRef, row: Row) -> Result<(), TableStoreError> {
        (**self).append(table, row).await
    }
}
