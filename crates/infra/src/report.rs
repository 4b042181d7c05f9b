//! Read-only access to the externally maintained report sheet.
//!
//! The sheet is computed by formulas outside this system; values are passed
//! through verbatim (formatting included) rather than recomputed.

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::table_store::{Row, TableRef, TableStore, TableStoreError};

/// Zero-based `(row, column)` coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Where the three metrics are found in the report sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLayout {
    /// Fixed coordinates.
    Positional {
        revenue: CellPos,
        profit: CellPos,
        cash: CellPos,
    },
    /// Metric label in the first column, period label in the first row.
    Labeled {
        revenue: String,
        profit: String,
        cash: String,
        period: String,
    },
}

impl Default for ReportLayout {
    fn default() -> Self {
        ReportLayout::Positional {
            revenue: CellPos::new(1, 4),
            profit: CellPos::new(6, 4),
            cash: CellPos::new(7, 1),
        }
    }
}

impl ReportLayout {
    /// Labeled layout with the conventional metric labels.
    pub fn labeled(period: impl Into<String>) -> Self {
        ReportLayout::Labeled {
            revenue: "revenue".to_string(),
            profit: "net profit".to_string(),
            cash: "cash".to_string(),
            period: period.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportMetrics {
    pub revenue: String,
    pub profit: String,
    pub cash: String,
}

#[derive(Debug, Error)]
pub enum ReportShapeError {
    #[error("report sheet {0} does not exist")]
    MissingSheet(TableRef),

    #[error("report cell for {metric} at row {row}, column {col} does not exist")]
    MissingCell {
        metric: &'static str,
        row: usize,
        col: usize,
    },

    #[error("report has no row labeled '{0}'")]
    MissingLabel(String),

    #[error("report has no period column '{0}'")]
    MissingPeriod(String),

    #[error("report store unavailable: {0}")]
    StoreUnavailable(TableStoreError),
}

impl From<TableStoreError> for ReportShapeError {
    fn from(err: TableStoreError) -> Self {
        match err {
            TableStoreError::UnknownSheet(table) => ReportShapeError::MissingSheet(table),
            other => ReportShapeError::StoreUnavailable(other),
        }
    }
}

pub struct ReportReader<S> {
    store: S,
    sheet: TableRef,
    layout: ReportLayout,
}

impl<S: TableStore> ReportReader<S> {
    pub fn new(store: S, sheet: TableRef, layout: ReportLayout) -> Self {
        Self {
            store,
            sheet,
            layout,
        }
    }

    pub async fn metrics(&self) -> Result<ReportMetrics, ReportShapeError> {
        let result = match self.store.read_all(&self.sheet).await {
            Ok(rows) => resolve(&rows, &self.layout),
            Err(err) => Err(err.into()),
        };
        if let Err(err) = &result {
            warn!(sheet = %self.sheet, error = %err, "report snapshot unavailable");
        }
        result
    }
}

fn resolve(rows: &[Row], layout: &ReportLayout) -> Result<ReportMetrics, ReportShapeError> {
    match layout {
        ReportLayout::Positional {
            revenue,
            profit,
            cash,
        } => Ok(ReportMetrics {
            revenue: at(rows, *revenue, "revenue")?,
            profit: at(rows, *profit, "profit")?,
            cash: at(rows, *cash, "cash")?,
        }),
        ReportLayout::Labeled {
            revenue,
            profit,
            cash,
            period,
        } => {
            let col = rows
                .first()
                .and_then(|header| header.iter().position(|c| label_eq(&c.to_string(), period)))
                .ok_or_else(|| ReportShapeError::MissingPeriod(period.clone()))?;
            Ok(ReportMetrics {
                revenue: labeled(rows, revenue, col, "revenue")?,
                profit: labeled(rows, profit, col, "profit")?,
                cash: labeled(rows, cash, col, "cash")?,
            })
        }
    }
}

fn at(rows: &[Row], pos: CellPos, metric: &'static str) -> Result<String, ReportShapeError> {
    rows.get(pos.row)
        .and_then(|row| row.get(pos.col))
        .map(ToString::to_string)
        .ok_or(ReportShapeError::MissingCell {
            metric,
            row: pos.row,
            col: pos.col,
        })
}

fn labeled(
    rows: &[Row],
    label: &str,
    col: usize,
    metric: &'static str,
) -> Result<String, ReportShapeError> {
    let row = rows
        .iter()
        .skip(1)
        .position(|row| row.first().is_some_and(|c| label_eq(&c.to_string(), label)))
        .map(|idx| idx + 1)
        .ok_or_else(|| ReportShapeError::MissingLabel(label.to_string()))?;
    at(rows, CellPos::new(row, col), metric)
}

fn label_eq(cell: &str, label: &str) -> bool {
    cell.trim().eq_ignore_ascii_case(label.trim())
}
