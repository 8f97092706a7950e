//! The flat-file transaction store.
//!
//! The ledger is a single JSON file holding an array of transactions in
//! insertion order. Every mutation rewrites the whole file, which is fine at
//! the scale of a personal ledger and keeps the format trivially inspectable
//! and editable by hand.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{
    Error,
    transaction::{Transaction, TransactionDraft, TransactionId},
};

/// All transactions, backed by a single JSON file.
///
/// Mutating operations persist before returning: writes go to a temporary
/// file which is then renamed over the ledger file, so a crash mid-write
/// cannot corrupt existing data.
#[derive(Debug)]
pub struct Ledger {
    /// `None` for in-memory ledgers, which skip persistence.
    path: Option<PathBuf>,
    transactions: Vec<Transaction>,
    next_id: TransactionId,
}

impl Ledger {
    /// Open the ledger file at `path`, or start an empty ledger if the file
    /// does not exist yet.
    ///
    /// Records without an ID (written by older tools) are assigned fresh IDs.
    /// The new IDs are not persisted until the next mutation.
    ///
    /// # Errors
    /// Returns [Error::InvalidLedger] if the file exists but cannot be parsed
    /// as a JSON array of transactions, or [Error::LedgerIo] if it cannot be
    /// read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();

        let transactions = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|error| Error::InvalidLedger(error.to_string()))?,
            Err(error) if error.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(error) => return Err(Error::LedgerIo(error.to_string())),
        };

        Ok(Self::from_transactions(Some(path), transactions))
    }

    /// Create an empty ledger that is not backed by a file.
    ///
    /// Useful for tests and ephemeral sessions; all mutations succeed but
    /// nothing is written to disk.
    pub fn in_memory() -> Self {
        Self::from_transactions(None, Vec::new())
    }

    fn from_transactions(path: Option<PathBuf>, mut transactions: Vec<Transaction>) -> Self {
        let mut next_id = transactions
            .iter()
            .map(|transaction| transaction.id)
            .max()
            .unwrap_or(0)
            + 1;

        for transaction in &mut transactions {
            if transaction.id == 0 {
                transaction.id = next_id;
                next_id += 1;
            }
        }

        Self {
            path,
            transactions,
            next_id,
        }
    }

    /// All transactions in insertion order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Retrieve a transaction by its `id`.
    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions
            .iter()
            .find(|transaction| transaction.id == id)
    }

    /// Append a new transaction to the ledger, assigning it the next ID.
    ///
    /// # Errors
    /// Returns [Error::LedgerIo] or [Error::JSONSerializationError] if the
    /// ledger file cannot be rewritten.
    pub fn append(&mut self, draft: TransactionDraft) -> Result<Transaction, Error> {
        let transaction = draft.into_transaction(self.next_id);
        self.next_id += 1;
        self.transactions.push(transaction.clone());
        self.persist()?;

        Ok(transaction)
    }

    /// Replace the fields of the transaction with `id` in place, keeping its
    /// position in the ledger.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingTransaction] if no transaction has `id`,
    /// or a persistence error if the ledger file cannot be rewritten.
    pub fn update(
        &mut self,
        id: TransactionId,
        draft: TransactionDraft,
    ) -> Result<Transaction, Error> {
        let transaction = self
            .transactions
            .iter_mut()
            .find(|transaction| transaction.id == id)
            .ok_or(Error::UpdateMissingTransaction)?;

        *transaction = draft.into_transaction(id);
        let transaction = transaction.clone();
        self.persist()?;

        Ok(transaction)
    }

    /// Remove the transaction with `id` from the ledger.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissingTransaction] if no transaction has `id`,
    /// or a persistence error if the ledger file cannot be rewritten.
    pub fn remove(&mut self, id: TransactionId) -> Result<Transaction, Error> {
        let index = self
            .transactions
            .iter()
            .position(|transaction| transaction.id == id)
            .ok_or(Error::DeleteMissingTransaction)?;

        let transaction = self.transactions.remove(index);
        self.persist()?;

        Ok(transaction)
    }

    /// Rewrite the ledger file with the current transactions.
    ///
    /// The JSON is written to a sibling temporary file first and renamed into
    /// place so that existing data survives a crash mid-write.
    fn persist(&self) -> Result<(), Error> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&self.transactions)
            .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

        let temp_path = temp_sibling(path);
        fs::write(&temp_path, json).map_err(|error| Error::LedgerIo(error.to_string()))?;
        fs::rename(&temp_path, path).map_err(|error| Error::LedgerIo(error.to_string()))?;

        Ok(())
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut file_name = path.file_name().unwrap_or_default().to_os_string();
    file_name.push(".tmp");
    path.with_file_name(file_name)
}

#[cfg(test)]
mod ledger_tests {
    use time::macros::date;

    use crate::{
        Error,
        transaction::{Transaction, TransactionType},
    };

    use super::Ledger;

    fn sample_draft(amount: f64) -> crate::transaction::TransactionDraft {
        Transaction::build(TransactionType::Expense, amount, "Food")
            .date(Some(date!(2024 - 05 - 01)))
            .note("lunch")
    }

    #[test]
    fn append_assigns_sequential_ids() {
        let mut ledger = Ledger::in_memory();

        let first = ledger.append(sample_draft(1.0)).unwrap();
        let second = ledger.append(sample_draft(2.0)).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(ledger.transactions().len(), 2);
    }

    #[test]
    fn get_returns_transaction_by_id() {
        let mut ledger = Ledger::in_memory();
        let transaction = ledger.append(sample_draft(1.0)).unwrap();

        assert_eq!(ledger.get(transaction.id), Some(&transaction));
        assert_eq!(ledger.get(999), None);
    }

    #[test]
    fn update_replaces_fields_in_place() {
        let mut ledger = Ledger::in_memory();
        ledger.append(sample_draft(1.0)).unwrap();
        let target = ledger.append(sample_draft(2.0)).unwrap();
        ledger.append(sample_draft(3.0)).unwrap();

        let updated = ledger
            .update(
                target.id,
                Transaction::build(TransactionType::Income, 99.0, "Salary"),
            )
            .unwrap();

        assert_eq!(updated.id, target.id);
        assert_eq!(updated.amount, 99.0);
        // Position in the ledger is unchanged.
        assert_eq!(ledger.transactions()[1], updated);
    }

    #[test]
    fn update_missing_transaction_fails() {
        let mut ledger = Ledger::in_memory();

        let result = ledger.update(42, sample_draft(1.0));

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn remove_deletes_exactly_one_of_two_identical_records() {
        let mut ledger = Ledger::in_memory();
        let first = ledger.append(sample_draft(20.0)).unwrap();
        let second = ledger.append(sample_draft(20.0)).unwrap();

        ledger.remove(first.id).unwrap();

        assert_eq!(ledger.transactions(), &[second]);
    }

    #[test]
    fn remove_missing_transaction_fails() {
        let mut ledger = Ledger::in_memory();
        ledger.append(sample_draft(1.0)).unwrap();

        let result = ledger.remove(42);

        assert_eq!(result, Err(Error::DeleteMissingTransaction));
        assert_eq!(ledger.transactions().len(), 1);
    }

    #[test]
    fn open_missing_file_gives_empty_ledger() {
        let temp_dir = tempfile::tempdir().unwrap();

        let ledger = Ledger::open(temp_dir.path().join("ledger.json")).unwrap();

        assert!(ledger.transactions().is_empty());
    }

    #[test]
    fn reopened_ledger_preserves_insertion_order_and_ids() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ledger.json");

        let mut ledger = Ledger::open(&path).unwrap();
        ledger.append(sample_draft(1.0)).unwrap();
        ledger
            .append(
                Transaction::build(TransactionType::Income, 2.0, "Salary")
                    .date(Some(date!(2024 - 06 - 15))),
            )
            .unwrap();
        let transactions = ledger.transactions().to_vec();
        drop(ledger);

        let reopened = Ledger::open(&path).unwrap();

        assert_eq!(reopened.transactions(), transactions);
    }

    #[test]
    fn new_ids_continue_from_max_after_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ledger.json");

        let mut ledger = Ledger::open(&path).unwrap();
        ledger.append(sample_draft(1.0)).unwrap();
        ledger.append(sample_draft(2.0)).unwrap();
        drop(ledger);

        let mut reopened = Ledger::open(&path).unwrap();
        let transaction = reopened.append(sample_draft(3.0)).unwrap();

        assert_eq!(transaction.id, 3);
    }

    #[test]
    fn open_assigns_ids_to_records_without_them() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ledger.json");
        std::fs::write(
            &path,
            r#"[
                {"type": "expense", "amount": "20", "category": "Food", "date": "2024-05-01"},
                {"type": "income", "amount": 30, "category": "Salary", "date": "2024-05-02"}
            ]"#,
        )
        .unwrap();

        let ledger = Ledger::open(&path).unwrap();

        let ids: Vec<_> = ledger
            .transactions()
            .iter()
            .map(|transaction| transaction.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
        // String amount from the legacy layout is coerced to a number.
        assert_eq!(ledger.transactions()[0].amount, 20.0);
    }

    #[test]
    fn open_malformed_ledger_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("ledger.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = Ledger::open(&path);

        assert!(matches!(result, Err(Error::InvalidLedger(_))));
    }
}
