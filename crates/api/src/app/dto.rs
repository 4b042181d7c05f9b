use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use holdbook_accounting::{
    Account, Amount, Category, Direction, LedgerEntry, SimpleEntry, Transfer,
};
use holdbook_auth::{Capability, Identity};

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember: bool,
}

#[derive(Debug, Deserialize)]
pub struct SimpleEntryRequest {
    pub date: Option<NaiveDate>,
    pub account: String,
    pub category: String,
    pub amount: i64,
    pub direction: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub date: Option<NaiveDate>,
    pub source: String,
    pub target: String,
    pub amount: i64,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub granted: bool,
    pub identity: Option<Identity>,
}

#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub granted: bool,
    pub identity: Option<Identity>,
    pub capabilities: Vec<Capability>,
}

#[derive(Debug, Serialize)]
pub struct RowsAppended {
    pub rows_appended: usize,
    pub entries: Vec<LedgerEntry>,
}

// -------------------------
// Mapping
// -------------------------

fn bad_request(err: holdbook_core::DomainError) -> ApiError {
    ApiError::BadRequest(err.message().to_string())
}

fn direction(raw: &str) -> Result<Direction, ApiError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "income" => Ok(Direction::Income),
        "expense" => Ok(Direction::Expense),
        other => Err(ApiError::BadRequest(format!(
            "direction must be income or expense, got '{other}'"
        ))),
    }
}

impl TryFrom<SimpleEntryRequest> for SimpleEntry {
    type Error = ApiError;

    fn try_from(req: SimpleEntryRequest) -> Result<Self, Self::Error> {
        Ok(SimpleEntry {
            date: req.date,
            account: req.account.parse::<Account>().map_err(bad_request)?,
            category: req.category.parse::<Category>().map_err(bad_request)?,
            amount: Amount::new(req.amount).map_err(bad_request)?,
            direction: direction(&req.direction)?,
            project: req.project,
            comment: req.comment,
        })
    }
}

impl TryFrom<TransferRequest> for Transfer {
    type Error = ApiError;

    fn try_from(req: TransferRequest) -> Result<Self, Self::Error> {
        Ok(Transfer {
            date: req.date,
            source: req.source.parse::<Account>().map_err(bad_request)?,
            target: req.target.parse::<Account>().map_err(bad_request)?,
            amount: Amount::new(req.amount).map_err(bad_request)?,
            comment: req.comment,
        })
    }
}
