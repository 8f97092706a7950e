//! Month filtering and per-category aggregation of transactions.
//!
//! Provides the pure functions behind the wallet and report pages: selecting
//! a month's transactions, summing them per category, and ranking the
//! categories for display.

use std::collections::HashMap;

use time::{Date, Month};

use crate::transaction::{Transaction, TransactionType};

/// A calendar month, e.g. "2024-05".
///
/// Used as the unit of navigation and aggregation throughout the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthKey {
    year: i32,
    month: Month,
}

impl MonthKey {
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// The month that `date` falls in.
    pub fn from_date(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse a `YYYY-MM` string, e.g. "2024-05". Returns `None` for anything
    /// that is not a valid year-month pair.
    pub fn parse(value: &str) -> Option<Self> {
        let (year, month) = value.split_once('-')?;
        let year = year.parse().ok()?;
        let month = Month::try_from(month.parse::<u8>().ok()?).ok()?;

        Some(Self { year, month })
    }

    /// Whether `date` falls within this month.
    pub fn contains(self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The month before this one.
    pub fn prev(self) -> Self {
        let year = if self.month == Month::January {
            self.year - 1
        } else {
            self.year
        };

        Self {
            year,
            month: self.month.previous(),
        }
    }

    /// The month after this one.
    pub fn next(self) -> Self {
        let year = if self.month == Month::December {
            self.year + 1
        } else {
            self.year
        };

        Self {
            year,
            month: self.month.next(),
        }
    }

    /// A human-readable label, e.g. "May 2024".
    pub fn label(self) -> String {
        format!("{} {}", self.month, self.year)
    }
}

/// Formats as `YYYY-MM`, the form used in query strings.
impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, u8::from(self.month))
    }
}

/// The transactions dated within `month`, in their original order.
///
/// Transactions without a date never match any month.
pub fn filter_month(transactions: &[Transaction], month: MonthKey) -> Vec<&Transaction> {
    transactions
        .iter()
        .filter(|transaction| {
            transaction
                .date
                .is_some_and(|date| month.contains(date))
        })
        .collect()
}

/// The transactions dated within `month` that match `transaction_type`, in
/// their original order.
pub fn filter_month_and_type(
    transactions: &[Transaction],
    month: MonthKey,
    transaction_type: TransactionType,
) -> Vec<&Transaction> {
    transactions
        .iter()
        .filter(|transaction| {
            transaction.transaction_type == transaction_type
                && transaction
                    .date
                    .is_some_and(|date| month.contains(date))
        })
        .collect()
}

/// A category's name and its summed amount for a month.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub name: String,
    pub total: f64,
}

/// Sums `transactions` per category and ranks the categories by descending
/// total.
///
/// The sort is stable: categories with equal totals keep the order in which
/// they first appear in `transactions`, so a month's ranking does not jump
/// around between renders.
pub fn category_totals(transactions: &[&Transaction]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut index_by_name: HashMap<&str, usize> = HashMap::new();

    for transaction in transactions {
        match index_by_name.get(transaction.category.as_str()) {
            Some(&index) => totals[index].total += transaction.amount,
            None => {
                index_by_name.insert(&transaction.category, totals.len());
                totals.push(CategoryTotal {
                    name: transaction.category.clone(),
                    total: transaction.amount,
                });
            }
        }
    }

    totals.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    totals
}

/// The sum of all category totals, i.e. the month's grand total for one
/// transaction type.
pub fn grand_total(totals: &[CategoryTotal]) -> f64 {
    totals.iter().map(|category| category.total).sum()
}

/// A month's expense and income totals for the wallet page.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WalletTotals {
    pub expense: f64,
    pub income: f64,
}

impl WalletTotals {
    /// Income minus expenses.
    pub fn balance(self) -> f64 {
        self.income - self.expense
    }
}

/// Sums a month's transactions into expense and income totals.
pub fn wallet_totals(transactions: &[&Transaction]) -> WalletTotals {
    let mut totals = WalletTotals::default();

    for transaction in transactions {
        match transaction.transaction_type {
            TransactionType::Expense => totals.expense += transaction.amount,
            TransactionType::Income => totals.income += transaction.amount,
        }
    }

    totals
}
