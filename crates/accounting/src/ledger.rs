use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use holdbook_core::{DomainError, DomainResult, ValueObject};

/// Internal account (legal entity or cash box) a movement is booked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Account {
    #[serde(rename = "PP")]
    Pp,
    #[serde(rename = "IP Sh")]
    IpSh,
    #[serde(rename = "IP D")]
    IpD,
    #[serde(rename = "Cash")]
    Cash,
}

impl Account {
    pub const ALL: [Account; 4] = [Account::Pp, Account::IpSh, Account::IpD, Account::Cash];

    /// Label as stored in the ledger sheet.
    pub fn label(&self) -> &'static str {
        match self {
            Account::Pp => "PP",
            Account::IpSh => "IP Sh",
            Account::IpD => "IP D",
            Account::Cash => "Cash",
        }
    }
}

impl core::fmt::Display for Account {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl core::str::FromStr for Account {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Account::ALL
            .into_iter()
            .find(|a| a.label() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown account '{s}'")))
    }
}

/// Booking category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "revenue")]
    Revenue,
    #[serde(rename = "purchases (import)")]
    PurchasesImport,
    #[serde(rename = "purchases (domestic)")]
    PurchasesDomestic,
    #[serde(rename = "marketing")]
    Marketing,
    #[serde(rename = "payroll")]
    Payroll,
    #[serde(rename = "rent/office")]
    RentOffice,
    #[serde(rename = "taxes")]
    Taxes,
    #[serde(rename = "owner withdrawal")]
    OwnerWithdrawal,
    /// Only ever produced by [`post_transfer`].
    #[serde(rename = "internal transfer")]
    InternalTransfer,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Revenue,
        Category::PurchasesImport,
        Category::PurchasesDomestic,
        Category::Marketing,
        Category::Payroll,
        Category::RentOffice,
        Category::Taxes,
        Category::OwnerWithdrawal,
        Category::InternalTransfer,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Revenue => "revenue",
            Category::PurchasesImport => "purchases (import)",
            Category::PurchasesDomestic => "purchases (domestic)",
            Category::Marketing => "marketing",
            Category::Payroll => "payroll",
            Category::RentOffice => "rent/office",
            Category::Taxes => "taxes",
            Category::OwnerWithdrawal => "owner withdrawal",
            Category::InternalTransfer => "internal transfer",
        }
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self, Category::InternalTransfer)
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl core::str::FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown category '{s}'")))
    }
}

/// Non-negative amount in whole currency units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

impl ValueObject for Amount {}

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn new(value: i64) -> DomainResult<Self> {
        if value < 0 {
            return Err(DomainError::validation("amount must not be negative"));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<i64> for Amount {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl core::fmt::Display for Amount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Which column a simple entry's amount lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Income,
    Expense,
}

/// One immutable ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub account: Account,
    pub category: Category,
    pub project: String,
    pub income: Amount,
    pub expense: Amount,
    pub comment: String,
}

impl LedgerEntry {
    pub fn is_transfer(&self) -> bool {
        self.category.is_transfer()
    }

    /// `income - expense`, widened so sums cannot overflow.
    pub fn net(&self) -> i128 {
        i128::from(self.income.value()) - i128::from(self.expense.value())
    }
}

/// Project label written on both rows of a transfer.
pub const TRANSFER_PROJECT: &str = "transfer";

/// Input of a simple income/expense booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleEntry {
    /// Defaults to the booking day when absent.
    pub date: Option<NaiveDate>,
    pub account: Account,
    pub category: Category,
    pub amount: Amount,
    pub direction: Direction,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub comment: String,
}

/// Input of a transfer between two internal accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub date: Option<NaiveDate>,
    pub source: Account,
    pub target: Account,
    pub amount: Amount,
    #[serde(default)]
    pub comment: String,
}

/// Decide the single row of a simple entry.
///
/// The amount goes to the column chosen by `direction`; the other column is
/// zero. Zero amounts are accepted. `internal transfer` is refused here since
/// a one-sided transfer row would break the pairing invariant.
pub fn post_simple(entry: &SimpleEntry, today: NaiveDate) -> DomainResult<LedgerEntry> {
    if entry.category.is_transfer() {
        return Err(DomainError::validation(
            "internal transfers must be recorded as transfers",
        ));
    }

    let (income, expense) = match entry.direction {
        Direction::Income => (entry.amount, Amount::ZERO),
        Direction::Expense => (Amount::ZERO, entry.amount),
    };

    Ok(LedgerEntry {
        date: entry.date.unwrap_or(today),
        account: entry.account,
        category: entry.category,
        project: entry.project.clone(),
        income,
        expense,
        comment: entry.comment.clone(),
    })
}

/// Decide the two rows of a transfer: the outgoing side first.
pub fn post_transfer(transfer: &Transfer, today: NaiveDate) -> DomainResult<[LedgerEntry; 2]> {
    if transfer.source == transfer.target {
        return Err(DomainError::validation("accounts must differ"));
    }

    let date = transfer.date.unwrap_or(today);
    let outgoing = LedgerEntry {
        date,
        account: transfer.source,
        category: Category::InternalTransfer,
        project: TRANSFER_PROJECT.to_string(),
        income: Amount::ZERO,
        expense: transfer.amount,
        comment: format!("to {}: {}", transfer.target, transfer.comment),
    };
    let incoming = LedgerEntry {
        date,
        account: transfer.target,
        category: Category::InternalTransfer,
        project: TRANSFER_PROJECT.to_string(),
        income: transfer.amount,
        expense: Amount::ZERO,
        comment: format!("from {}: {}", transfer.source, transfer.comment),
    };

    Ok([outgoing, incoming])
}
