//! Ledger row codec: `LedgerEntry` <-> sheet row.
//!
//! Column order is fixed: date, account, category, project, income, expense,
//! comment. Dates are `YYYY-MM-DD` text; amounts are numeric cells.

use chrono::NaiveDate;
use thiserror::Error;

use holdbook_accounting::{Amount, LedgerEntry};

use crate::table_store::{Cell, Row};

pub const HEADER: [&str; 7] = [
    "date", "account", "category", "project", "income", "expense", "comment",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("column '{column}': {reason}")]
pub struct RowDecodeError {
    pub column: &'static str,
    pub reason: String,
}

impl RowDecodeError {
    fn new(column: &'static str, reason: impl Into<String>) -> Self {
        Self {
            column,
            reason: reason.into(),
        }
    }
}

pub fn header_row() -> Row {
    HEADER.iter().map(|h| Cell::from(*h)).collect()
}

/// Whether a row is the header (first cell reads `date`, any case).
pub fn is_header(row: &Row) -> bool {
    row.first()
        .and_then(Cell::as_text)
        .is_some_and(|s| s.trim().eq_ignore_ascii_case(HEADER[0]))
}

pub fn encode(entry: &LedgerEntry) -> Row {
    vec![
        Cell::Text(entry.date.format(DATE_FORMAT).to_string()),
        Cell::from(entry.account.label()),
        Cell::from(entry.category.label()),
        Cell::Text(entry.project.clone()),
        Cell::Int(entry.income.value()),
        Cell::Int(entry.expense.value()),
        Cell::Text(entry.comment.clone()),
    ]
}

/// Parse a sheet row. Missing trailing cells read as blank; extra cells are
/// ignored.
pub fn decode(row: &Row) -> Result<LedgerEntry, RowDecodeError> {
    let blank = Cell::Text(String::new());
    let cell = |idx: usize| row.get(idx).unwrap_or(&blank);

    let date_text = cell(0).to_string();
    let date = NaiveDate::parse_from_str(date_text.trim(), DATE_FORMAT)
        .map_err(|e| RowDecodeError::new(HEADER[0], format!("'{date_text}': {e}")))?;
    let account = cell(1)
        .to_string()
        .parse()
        .map_err(|e: holdbook_core::DomainError| RowDecodeError::new(HEADER[1], e.message()))?;
    let category = cell(2)
        .to_string()
        .parse()
        .map_err(|e: holdbook_core::DomainError| RowDecodeError::new(HEADER[2], e.message()))?;

    Ok(LedgerEntry {
        date,
        account,
        category,
        project: cell(3).to_string(),
        income: amount(cell(4), HEADER[4])?,
        expense: amount(cell(5), HEADER[5])?,
        comment: cell(6).to_string(),
    })
}

fn amount(cell: &Cell, column: &'static str) -> Result<Amount, RowDecodeError> {
    if cell.is_blank() {
        return Ok(Amount::ZERO);
    }
    let value = cell
        .as_int()
        .ok_or_else(|| RowDecodeError::new(column, format!("'{cell}' is not a whole number")))?;
    Amount::new(value).map_err(|e| RowDecodeError::new(column, e.message()))
}
