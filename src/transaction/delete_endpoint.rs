//! Defines the endpoint for deleting a transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use axum_htmx::HxRefresh;
use maud::html;

use crate::{AppState, Error, store::Ledger, transaction::TransactionId};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The ledger holding all transactions.
    pub ledger: Arc<Mutex<Ledger>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            ledger: state.ledger.clone(),
        }
    }
}

/// A route handler for deleting the transaction with `transaction_id`.
///
/// On success, responds with an empty fragment that replaces the deleted
/// transaction's table row, plus an `HX-Refresh` header so the wallet page
/// reloads and its totals and empty state stay in step with the table. The
/// status code has to be 200 OK or HTMX will not delete the table row.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let mut ledger = match state.ledger.lock() {
        Ok(ledger) => ledger,
        Err(error) => {
            tracing::error!("could not acquire ledger lock: {error}");
            return Error::LedgerLockError.into_alert_response();
        }
    };

    if let Err(error) = ledger.remove(transaction_id) {
        tracing::error!("could not delete transaction {transaction_id}: {error}");

        return error.into_alert_response();
    }

    (HxRefresh(true), html!()).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_htmx::HX_REFRESH;

    use crate::{
        store::Ledger,
        transaction::{Transaction, TransactionType},
    };

    use super::{DeleteTransactionState, delete_transaction_endpoint};

    fn test_state(ledger: Ledger) -> DeleteTransactionState {
        DeleteTransactionState {
            ledger: Arc::new(Mutex::new(ledger)),
        }
    }

    #[tokio::test]
    async fn can_delete_transaction() {
        let mut ledger = Ledger::in_memory();
        let transaction = ledger
            .append(Transaction::build(TransactionType::Expense, 12.3, "Food"))
            .unwrap();
        let state = test_state(ledger);

        let response = delete_transaction_endpoint(State(state.clone()), Path(transaction.id))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        // The page refresh is what updates the wallet totals and, for the
        // last row, the empty state.
        let refresh = response
            .headers()
            .get(HX_REFRESH)
            .expect("expected response to have the header hx-refresh");
        assert_eq!(refresh, "true");

        let ledger = state.ledger.lock().unwrap();
        assert!(ledger.get(transaction.id).is_none());
    }

    #[tokio::test]
    async fn deleting_one_of_two_identical_transactions_keeps_the_other() {
        let mut ledger = Ledger::in_memory();
        let first = ledger
            .append(Transaction::build(TransactionType::Expense, 7.5, "Coffee"))
            .unwrap();
        let second = ledger
            .append(Transaction::build(TransactionType::Expense, 7.5, "Coffee"))
            .unwrap();
        let state = test_state(ledger);

        let response = delete_transaction_endpoint(State(state.clone()), Path(first.id))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let ledger = state.ledger.lock().unwrap();
        assert!(ledger.get(first.id).is_none());
        assert!(ledger.get(second.id).is_some());
        assert_eq!(ledger.transactions().len(), 1);
    }

    #[tokio::test]
    async fn deleting_missing_transaction_returns_not_found_alert() {
        let state = test_state(Ledger::in_memory());

        let response = delete_transaction_endpoint(State(state), Path(42))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
