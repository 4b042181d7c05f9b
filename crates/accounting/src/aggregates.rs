use std::collections::BTreeMap;

use serde::Serialize;

use crate::{Account, LedgerEntry};

/// Totals of one calendar month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PeriodTotals {
    /// Income excluding internal transfers.
    pub revenue: i128,
    /// Expense excluding internal transfers.
    pub expense: i128,
    pub net_profit: i128,
    /// Net movement over all rows, transfers included.
    pub cash_flow: i128,
}

/// Aggregates over a set of ledger rows.
///
/// Profit figures ignore `internal transfer` rows; cash figures include every
/// row. Since both sides of a transfer carry the same amount, the two views
/// agree whenever the ledger only holds complete transfer pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LedgerSummary {
    pub gross_revenue: i128,
    pub total_expense: i128,
    pub net_profit: i128,
    pub cash_on_hand: i128,
    pub by_account: BTreeMap<Account, i128>,
    /// Keyed by `YYYY-MM`.
    pub by_month: BTreeMap<String, PeriodTotals>,
}

impl LedgerSummary {
    fn add(&mut self, entry: &LedgerEntry) {
        let net = entry.net();
        let month = self
            .by_month
            .entry(entry.date.format("%Y-%m").to_string())
            .or_default();

        if !entry.is_transfer() {
            let income = i128::from(entry.income.value());
            let expense = i128::from(entry.expense.value());
            self.gross_revenue += income;
            self.total_expense += expense;
            self.net_profit += net;
            month.revenue += income;
            month.expense += expense;
            month.net_profit += net;
        }

        self.cash_on_hand += net;
        month.cash_flow += net;
        *self.by_account.entry(entry.account).or_default() += net;
    }
}

/// Fold ledger rows into a [`LedgerSummary`].
pub fn summarize<'a, I>(entries: I) -> LedgerSummary
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    entries
        .into_iter()
        .fold(LedgerSummary::default(), |mut summary, entry| {
            summary.add(entry);
            summary
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Amount, Category, Direction, SimpleEntry, Transfer, post_simple, post_transfer,
    };
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn row(account: Account, category: Category, income: i64, expense: i64) -> LedgerEntry {
        LedgerEntry {
            date: day(5, 1),
            account,
            category,
            project: String::new(),
            income: Amount::new(income).unwrap(),
            expense: Amount::new(expense).unwrap(),
            comment: String::new(),
        }
    }

    #[test]
    fn empty_ledger_summarizes_to_zero() {
        assert_eq!(summarize(&Vec::<LedgerEntry>::new()), LedgerSummary::default());
    }

    #[test]
    fn transfers_count_toward_cash_but_not_profit() {
        let rows = vec![
            row(Account::Pp, Category::Revenue, 1000, 0),
            row(Account::Pp, Category::InternalTransfer, 0, 1000),
        ];
        let s = summarize(&rows);
        assert_eq!(s.net_profit, 1000);
        assert_eq!(s.gross_revenue, 1000);
        assert_eq!(s.total_expense, 0);
        assert_eq!(s.cash_on_hand, 0);
        assert_eq!(s.by_account.get(&Account::Pp), Some(&0));
    }

    #[test]
    fn months_are_bucketed_by_entry_date() {
        let mut may = row(Account::Cash, Category::Revenue, 300, 0);
        may.date = day(5, 31);
        let mut june = row(Account::Cash, Category::Payroll, 0, 120);
        june.date = day(6, 1);
        let s = summarize(&[may, june]);

        assert_eq!(s.by_month.len(), 2);
        assert_eq!(s.by_month["2024-05"].revenue, 300);
        assert_eq!(s.by_month["2024-06"].expense, 120);
        assert_eq!(s.by_month["2024-06"].net_profit, -120);
        assert_eq!(s.net_profit, 180);
    }

    fn account() -> impl Strategy<Value = Account> {
        prop::sample::select(Account::ALL.to_vec())
    }

    fn booking_category() -> impl Strategy<Value = Category> {
        prop::sample::select(
            Category::ALL
                .into_iter()
                .filter(|c| !c.is_transfer())
                .collect::<Vec<_>>(),
        )
    }

    #[derive(Debug, Clone)]
    enum Op {
        Simple(SimpleEntry),
        Transfer(Transfer),
    }

    fn op() -> impl Strategy<Value = Op> {
        let simple = (account(), booking_category(), 0i64..1_000_000, any::<bool>()).prop_map(
            |(account, category, amount, income)| {
                Op::Simple(SimpleEntry {
                    date: None,
                    account,
                    category,
                    amount: Amount::new(amount).unwrap(),
                    direction: if income { Direction::Income } else { Direction::Expense },
                    project: String::new(),
                    comment: String::new(),
                })
            },
        );
        let transfer = (account(), account(), 0i64..1_000_000)
            .prop_filter("distinct accounts", |(s, t, _)| s != t)
            .prop_map(|(source, target, amount)| {
                Op::Transfer(Transfer {
                    date: None,
                    source,
                    target,
                    amount: Amount::new(amount).unwrap(),
                    comment: String::new(),
                })
            });
        prop_oneof![simple, transfer]
    }

    proptest! {
        /// Property: with only complete transfer pairs, cash equals profit and
        /// the per-account balances add up to cash.
        #[test]
        fn complete_pairs_keep_cash_equal_to_profit(ops in prop::collection::vec(op(), 0..40)) {
            let today = day(6, 15);
            let mut rows = Vec::new();
            let mut expected_profit: i128 = 0;
            for op in &ops {
                match op {
                    Op::Simple(entry) => {
                        let r = post_simple(entry, today).unwrap();
                        expected_profit += r.net();
                        rows.push(r);
                    }
                    Op::Transfer(t) => rows.extend(post_transfer(t, today).unwrap()),
                }
            }

            let s = summarize(&rows);
            prop_assert_eq!(s.net_profit, expected_profit);
            prop_assert_eq!(s.cash_on_hand, s.net_profit);
            prop_assert_eq!(s.by_account.values().sum::<i128>(), s.cash_on_hand);
            prop_assert_eq!(s.gross_revenue - s.total_expense, s.net_profit);
        }
    }
}
