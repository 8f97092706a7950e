//! Defines the core data model for transactions and its on-disk JSON layout.

use serde::{Deserialize, Serialize};
use time::Date;

/// Alias for the integer type used for transaction IDs.
pub type TransactionId = i64;

/// Whether a transaction spent money or earned money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money spent.
    Expense,
    /// Money earned.
    Income,
}

impl TransactionType {
    /// The lowercase name used in the JSON layout and form values.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Expense => "expense",
            TransactionType::Income => "income",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build] and append the
/// draft to a [crate::store::Ledger], which assigns the ID.
///
/// The serde layout matches the ledger file: `type` is a lowercase string,
/// `amount` may be a JSON number or a decimal string, and `date` is an ISO
/// `YYYY-MM-DD` string that may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    ///
    /// Defaults to zero for records written by ledgers that predate IDs; the
    /// store assigns fresh IDs to such records on load.
    #[serde(default)]
    pub id: TransactionId,
    /// Whether the transaction is an expense or income.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The amount of money spent or earned in this transaction.
    #[serde(with = "amount_repr")]
    pub amount: f64,
    /// The category of the transaction, e.g. "Food", "Rent". Free text.
    pub category: String,
    /// When the transaction happened. `None` for records saved without a
    /// valid date; such records are excluded from monthly views.
    #[serde(default, with = "date_repr")]
    pub date: Option<Date>,
    /// A free text note about the transaction.
    #[serde(default)]
    pub note: String,
}

impl Transaction {
    /// Create a new transaction draft.
    ///
    /// Shortcut for [TransactionDraft] for discoverability.
    pub fn build(
        transaction_type: TransactionType,
        amount: f64,
        category: &str,
    ) -> TransactionDraft {
        TransactionDraft {
            transaction_type,
            amount,
            category: category.to_owned(),
            date: None,
            note: String::new(),
        }
    }
}

/// The fields of a [Transaction] minus the ID.
///
/// Drafts are turned into transactions by [crate::store::Ledger::append],
/// which assigns the ID, or applied to an existing transaction by
/// [crate::store::Ledger::update].
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionDraft {
    /// Whether the transaction is an expense or income.
    pub transaction_type: TransactionType,
    /// The monetary amount of the transaction. Always non-negative; the
    /// direction of the money flow is carried by `transaction_type`.
    pub amount: f64,
    /// The category of the transaction, e.g. "Food", "Transport", "Rent".
    pub category: String,
    /// The date when the transaction occurred, if known.
    pub date: Option<Date>,
    /// A free text note about the transaction.
    pub note: String,
}

impl TransactionDraft {
    /// Set the date for the transaction.
    pub fn date(mut self, date: Option<Date>) -> Self {
        self.date = date;
        self
    }

    /// Set the note for the transaction.
    pub fn note(mut self, note: &str) -> Self {
        self.note = note.to_owned();
        self
    }

    /// Attach `id` to this draft, producing a full transaction.
    pub(crate) fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            transaction_type: self.transaction_type,
            amount: self.amount,
            category: self.category,
            date: self.date,
            note: self.note,
        }
    }
}

/// Serde representation of amounts in the ledger file.
///
/// Ledgers written by hand or by older tools may store amounts as decimal
/// strings such as "12.50". Non-numeric strings deserialize to zero so that
/// one bad record does not make the whole ledger unreadable. "NaN" and "inf"
/// parse as floats but would poison category sums, so they count as
/// non-numeric too.
mod amount_repr {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAmount {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(*amount)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(match RawAmount::deserialize(deserializer)? {
            RawAmount::Number(number) => number,
            RawAmount::Text(text) => text
                .trim()
                .parse()
                .ok()
                .filter(|number: &f64| number.is_finite())
                .unwrap_or(0.0),
        })
    }
}

/// Serde representation of dates in the ledger file.
///
/// Dates are ISO `YYYY-MM-DD` strings. Records saved without a date carry an
/// empty string; empty or unparseable dates deserialize to `None`.
mod date_repr {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

    const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

    pub fn serialize<S: Serializer>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => {
                let formatted = date.format(ISO_DATE).map_err(serde::ser::Error::custom)?;
                serializer.serialize_str(&formatted)
            }
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Date>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Date::parse(&raw, ISO_DATE).ok())
    }
}
