//! Defines the endpoint for updating an existing transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;

use crate::{
    AppState, Error, endpoints,
    store::Ledger,
    transaction::{TransactionId, create_endpoint::TransactionForm},
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The ledger holding all transactions.
    pub ledger: Arc<Mutex<Ledger>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            ledger: state.ledger.clone(),
        }
    }
}

/// A route handler for overwriting the transaction with `transaction_id`,
/// redirects to the wallet view on success.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let mut ledger = match state.ledger.lock() {
        Ok(ledger) => ledger,
        Err(error) => {
            tracing::error!("could not acquire ledger lock: {error}");
            return Error::LedgerLockError.into_alert_response();
        }
    };

    if let Err(error) = ledger.update(transaction_id, form.into_draft()) {
        tracing::error!("could not update transaction {transaction_id}: {error}");

        return error.into_alert_response();
    }

    (
        HxRedirect(endpoints::WALLET_VIEW.to_owned()),
        StatusCode::SEE_OTHER,
    )
        .into_response()
}
