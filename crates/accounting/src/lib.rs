//! Accounting module: ledger rows, posting rules and aggregates.
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.

pub mod aggregates;
pub mod ledger;

pub use aggregates::{LedgerSummary, PeriodTotals, summarize};
pub use ledger::{
    Account, Amount, Category, Direction, LedgerEntry, SimpleEntry, TRANSFER_PROJECT, Transfer,
    post_simple, post_transfer,
};
